use super::{util, BookingError, Candidate, ShiftBinding};
use crate::model::{HospitalId, PhysiologistId};
use crate::store::BookingStore;
use chrono::{NaiveDate, NaiveTime};

/// Résolution de disponibilité : neurophysiologistes ayant une garde libre
/// dans la demi-journée du créneau demandé.
///
/// Un résultat vide est un état métier normal, pas une erreur. Lecture seule.
pub(super) fn resolve_available<S: BookingStore>(
    store: &S,
    hospital: &HospitalId,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<Vec<Candidate>, BookingError> {
    if hospital.is_empty() {
        return Err(BookingError::InvalidRequest("hospital id cannot be empty"));
    }
    let period = util::classify_start(start_time)?;

    let mut open = store.open_shifts(hospital, date, period)?;
    // plus petit identifiant de garde par personne, pour un résultat stable
    open.sort_by(|a, b| a.id.cmp(&b.id));

    let mut out: Vec<Candidate> = Vec::new();
    for shift in open {
        if out.iter().any(|c| c.physiologist == shift.physiologist) {
            continue;
        }
        out.push(Candidate {
            physiologist: shift.physiologist,
            shift: shift.id,
        });
    }
    out.sort_by(|a, b| a.physiologist.as_str().cmp(b.physiologist.as_str()));
    Ok(out)
}

/// Re-résout la garde exacte de chaque personne retenue, dans l'ordre de la
/// sélection. La liaison par défaut de `resolve_available` n'est qu'une
/// indication ; une garde réservée entre-temps donne `shift: None` pour cette
/// entrée au lieu de faire échouer l'appel.
pub(super) fn rebind_shifts<S: BookingStore>(
    store: &S,
    hospital: &HospitalId,
    date: NaiveDate,
    start_time: NaiveTime,
    selected: &[PhysiologistId],
) -> Result<Vec<ShiftBinding>, BookingError> {
    if hospital.is_empty() {
        return Err(BookingError::InvalidRequest("hospital id cannot be empty"));
    }
    let period = util::classify_start(start_time)?;

    let mut open = store.open_shifts(hospital, date, period)?;
    open.sort_by(|a, b| a.id.cmp(&b.id));

    let mut bindings = Vec::with_capacity(selected.len());
    for physiologist in selected {
        let shift = open
            .iter()
            .position(|s| &s.physiologist == physiologist)
            .map(|pos| open.remove(pos).id);
        bindings.push(ShiftBinding {
            physiologist: physiologist.clone(),
            shift,
        });
    }
    Ok(bindings)
}
