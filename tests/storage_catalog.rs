#![forbid(unsafe_code)]
use blocop::{
    catalog::{load_catalog_from_file, CatalogEntry, StaticCatalog, SurgeryCatalog},
    model::{DutyPeriod, HospitalId, Material, PhysiologistId, Shift, SurgeonId, SurgeryDraft, SurgeryTypeId},
    store::JsonStore,
    BookingEngine,
};
use chrono::{NaiveDate, NaiveTime};
use tempfile::tempdir;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

#[test]
fn booked_ledger_survives_a_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.json");

    let store = JsonStore::open(&path).unwrap();
    let shift = Shift::new(
        HospitalId::new("H"),
        PhysiologistId::new("n1"),
        day(),
        DutyPeriod::Afternoon,
    )
    .unwrap();
    let shift_id = store.insert_shift(shift).unwrap();

    let engine = BookingEngine::new(store);
    let draft = SurgeryDraft {
        hospital: HospitalId::new("H"),
        theatre: Some("OR-2".to_string()),
        surgeon: SurgeonId::new("X"),
        physiologists: vec![PhysiologistId::new("n1")],
        surgery_type: SurgeryTypeId::new("craniotomy"),
        date: day(),
        start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        duration_minutes: 90,
        notes: None,
        materials: Vec::new(),
    };
    let surgery_id = engine.commit_booking(&draft, &[shift_id.clone()]).unwrap();

    // réouverture : l'état commité est bien sur disque
    let reopened = JsonStore::open(&path).unwrap();
    let ledger = reopened.snapshot().unwrap();
    assert_eq!(
        ledger.find_shift(&shift_id).unwrap().booked_by.as_ref(),
        Some(&surgery_id)
    );
    assert_eq!(ledger.surgeries.len(), 1);
}

fn sample_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            id: SurgeryTypeId::new("craniotomy"),
            name: "Craniotomie".to_string(),
            default_duration_minutes: 180,
            materials: vec![Material {
                name: "neuromonitoring electrodes".to_string(),
                quantity: 8,
                reference: Some("NM-8".to_string()),
            }],
        },
        CatalogEntry {
            id: SurgeryTypeId::new("laminectomy"),
            name: "Laminectomie".to_string(),
            default_duration_minutes: 120,
            materials: Vec::new(),
        },
    ]
}

#[test]
fn catalog_resolves_duration_and_materials() {
    let catalog = StaticCatalog::new(sample_entries()).unwrap();
    assert_eq!(
        catalog.default_duration(&SurgeryTypeId::new("craniotomy")),
        Some(180)
    );
    assert_eq!(catalog.materials(&SurgeryTypeId::new("craniotomy")).len(), 1);
    assert_eq!(catalog.default_duration(&SurgeryTypeId::new("unknown")), None);
    assert!(catalog.materials(&SurgeryTypeId::new("unknown")).is_empty());
}

#[test]
fn catalog_file_roundtrip_and_validation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    let entries = sample_entries();
    std::fs::write(&path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    let loaded = load_catalog_from_file(&path).unwrap();
    assert_eq!(loaded.entries().len(), 2);

    // durée nulle rejetée au chargement
    let bad = vec![CatalogEntry {
        id: SurgeryTypeId::new("bad"),
        name: "Bad".to_string(),
        default_duration_minutes: 0,
        materials: Vec::new(),
    }];
    std::fs::write(&path, serde_json::to_string_pretty(&bad).unwrap()).unwrap();
    assert!(load_catalog_from_file(&path).is_err());
}
