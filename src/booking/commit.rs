use super::{conflict, util, BookingError};
use crate::model::{DutyPeriod, ShiftId, SurgeryDraft, SurgeryId, SurgeryStatus};
use crate::store::{BookingStore, StoreError};

/// Commit d'une réservation : crée la chirurgie et réserve toutes les gardes
/// retenues dans une seule unité de travail, ou ne fait rien.
///
/// Chaque garde est relue dans l'unité et doit être encore libre ; toute
/// garde prise entre-temps fait échouer l'ensemble avec
/// `ShiftNoLongerAvailable` et les identifiants en cause. L'appelant peut
/// re-résoudre la disponibilité et retenter ; aucun retry interne.
pub(super) fn commit_booking<S: BookingStore>(
    store: &S,
    draft: &SurgeryDraft,
    shift_ids: &[ShiftId],
) -> Result<SurgeryId, BookingError> {
    let period = validate_draft(draft, shift_ids)?;

    if conflict::has_conflict(
        store,
        &draft.surgeon,
        &draft.hospital,
        draft.date,
        draft.start_time,
        draft.duration_minutes,
    )? {
        return Err(BookingError::SchedulingConflict {
            surgeon: draft.surgeon.clone(),
        });
    }

    let mut created: Option<SurgeryId> = None;
    store.transaction(&mut |uow| {
        // re-validation au moment du commit : ferme la fenêtre laissée
        // ouverte entre la résolution de disponibilité et l'écriture
        let mut stale: Vec<ShiftId> = Vec::new();
        for (idx, shift_id) in shift_ids.iter().enumerate() {
            match uow.shift(shift_id) {
                None => stale.push(shift_id.clone()),
                Some(shift) if shift.is_booked() => stale.push(shift_id.clone()),
                Some(shift) => {
                    if shift.hospital != draft.hospital
                        || shift.date != draft.date
                        || shift.period != period
                    {
                        return Err(BookingError::InvalidRequest(
                            "shift does not match the requested hospital, date and period",
                        ));
                    }
                    if shift.physiologist != draft.physiologists[idx] {
                        return Err(BookingError::InvalidRequest(
                            "shift is not held by the physiologist at the same position",
                        ));
                    }
                }
            }
        }
        if !stale.is_empty() {
            return Err(BookingError::ShiftNoLongerAvailable(stale));
        }

        let surgery = draft
            .clone()
            .into_surgery(SurgeryId::random(), uow.now());
        let id = uow.create_surgery(surgery);
        for shift_id in shift_ids {
            uow.book_shift(shift_id, &id)?;
        }
        created = Some(id);
        Ok(())
    })?;

    created.ok_or_else(|| {
        StoreError::Unavailable("transaction committed without a surgery id".to_string()).into()
    })
}

/// Annulation : passe la chirurgie en `cancelled` et libère toutes les
/// gardes qu'elle consommait, atomiquement.
pub(super) fn cancel_surgery<S: BookingStore>(
    store: &S,
    id: &SurgeryId,
) -> Result<(), BookingError> {
    store.transaction(&mut |uow| {
        let surgery = uow
            .surgery(id)
            .ok_or_else(|| BookingError::UnknownSurgery(id.as_str().to_string()))?;
        if surgery.status != SurgeryStatus::Scheduled {
            return Err(BookingError::InvalidRequest(
                "only a scheduled surgery can be cancelled",
            ));
        }
        let booked = uow.shifts_booked_by(id);
        uow.set_surgery_status(id, SurgeryStatus::Cancelled)?;
        for shift_id in &booked {
            uow.release_shift(shift_id)?;
        }
        Ok(())
    })
}

fn validate_draft(
    draft: &SurgeryDraft,
    shift_ids: &[ShiftId],
) -> Result<DutyPeriod, BookingError> {
    if draft.hospital.is_empty() {
        return Err(BookingError::InvalidRequest("hospital id cannot be empty"));
    }
    if draft.surgeon.is_empty() {
        return Err(BookingError::InvalidRequest("surgeon id cannot be empty"));
    }
    if draft.surgery_type.is_empty() {
        return Err(BookingError::InvalidRequest(
            "surgery type id cannot be empty",
        ));
    }
    if draft.physiologists.is_empty() {
        return Err(BookingError::InvalidRequest(
            "at least one physiologist is required",
        ));
    }
    if draft.physiologists.iter().any(|p| p.is_empty()) {
        return Err(BookingError::InvalidRequest(
            "physiologist id cannot be empty",
        ));
    }
    if draft.physiologists.len() != shift_ids.len() {
        return Err(BookingError::InvalidRequest(
            "one shift id per physiologist is required",
        ));
    }
    for (idx, p) in draft.physiologists.iter().enumerate() {
        if draft.physiologists[..idx].contains(p) {
            return Err(BookingError::InvalidRequest(
                "duplicate physiologist in selection",
            ));
        }
    }
    for (idx, s) in shift_ids.iter().enumerate() {
        if shift_ids[..idx].contains(s) {
            return Err(BookingError::InvalidRequest(
                "duplicate shift id in selection",
            ));
        }
    }
    if draft.duration_minutes == 0 {
        return Err(BookingError::InvalidRequest(
            "duration must be strictly positive",
        ));
    }
    util::classify_start(draft.start_time)
}
