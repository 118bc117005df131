use super::{util, BookingError};
use crate::model::{HospitalId, SurgeonId};
use crate::store::BookingStore;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Détection de double réservation côté chirurgien : l'intervalle demandé
/// `[start, start + duration)` chevauche-t-il une chirurgie `scheduled` du
/// même chirurgien au même hôpital ?
///
/// Contrôle consultatif au moment de la lecture ; la garantie contre la
/// course réelle est la re-validation de l'unité de travail du commit.
pub(super) fn has_conflict<S: BookingStore>(
    store: &S,
    surgeon: &SurgeonId,
    hospital: &HospitalId,
    date: NaiveDate,
    start_time: NaiveTime,
    duration_minutes: u32,
) -> Result<bool, BookingError> {
    if surgeon.is_empty() {
        return Err(BookingError::InvalidRequest("surgeon id cannot be empty"));
    }
    if hospital.is_empty() {
        return Err(BookingError::InvalidRequest("hospital id cannot be empty"));
    }
    if duration_minutes == 0 {
        return Err(BookingError::InvalidRequest(
            "duration must be strictly positive",
        ));
    }

    let start = Utc.from_utc_datetime(&NaiveDateTime::new(date, start_time));
    let end = start + Duration::minutes(i64::from(duration_minutes));

    let existing = store.scheduled_surgeries(surgeon, hospital, date)?;
    Ok(existing
        .iter()
        .any(|s| util::overlaps(s.start, s.end(), start, end)))
}
