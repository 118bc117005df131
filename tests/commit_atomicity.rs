#![forbid(unsafe_code)]
use blocop::{
    model::{DutyPeriod, HospitalId, PhysiologistId, Shift, SurgeonId, SurgeryDraft, SurgeryTypeId},
    store::{BookingStore, MemoryStore, StoreError},
    BookingEngine, BookingError,
};
use chrono::{NaiveDate, NaiveTime};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn draft(surgeon: &str, time: NaiveTime) -> SurgeryDraft {
    SurgeryDraft {
        hospital: HospitalId::new("H"),
        theatre: None,
        surgeon: SurgeonId::new(surgeon),
        physiologists: vec![PhysiologistId::new("n1")],
        surgery_type: SurgeryTypeId::new("laminectomy"),
        date: day(),
        start_time: time,
        duration_minutes: 60,
        notes: None,
        materials: Vec::new(),
    }
}

#[test]
fn concurrent_commits_on_same_shift_have_exactly_one_winner() {
    let store = MemoryStore::new();
    let s1 = Shift::new(
        HospitalId::new("H"),
        PhysiologistId::new("n1"),
        day(),
        DutyPeriod::Morning,
    )
    .unwrap();
    let s1_id = s1.id.clone();
    store.insert_shift(s1).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for (surgeon, time) in [("X", at(9, 0)), ("Y", at(11, 0))] {
        let store = store.clone();
        let shift_id = s1_id.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let engine = BookingEngine::new(store);
            let d = draft(surgeon, time);
            barrier.wait();
            engine.commit_booking(&d, &[shift_id])
        }));
    }

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    let losers: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 1);
    match losers[0] {
        Err(BookingError::ShiftNoLongerAvailable(ids)) => assert_eq!(ids, &[s1_id.clone()]),
        other => panic!("unexpected loser outcome: {other:?}"),
    }

    // la garde référence uniquement la chirurgie gagnante
    let winner_id = winners[0].as_ref().unwrap().clone();
    let ledger = store.snapshot().unwrap();
    assert_eq!(
        ledger.find_shift(&s1_id).unwrap().booked_by.as_ref(),
        Some(&winner_id)
    );
    assert_eq!(ledger.surgeries.len(), 1);
}

#[test]
fn storage_access_is_bounded_by_the_timeout() {
    let store = MemoryStore::new().with_timeout(Duration::from_millis(20));
    let s1 = Shift::new(
        HospitalId::new("H"),
        PhysiologistId::new("n1"),
        day(),
        DutyPeriod::Morning,
    )
    .unwrap();
    store.insert_shift(s1).unwrap();

    // une lecture pendant qu'une unité de travail détient le registre
    let probe = store.clone();
    let result = store.transaction(&mut |_uow| {
        match probe.shift(&blocop::ShiftId::new("whatever")) {
            Err(StoreError::Timeout(_)) => Err(BookingError::InvalidRequest("expected timeout")),
            other => panic!("expected a bounded timeout, got {other:?}"),
        }
    });
    assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
}
