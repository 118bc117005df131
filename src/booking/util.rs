use super::BookingError;
use crate::model::DutyPeriod;
use chrono::{DateTime, NaiveTime, Utc};

/// Test de chevauchement d'intervalles semi-ouverts `[start, end)`.
pub(super) fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

pub(super) fn classify_start(time: NaiveTime) -> Result<DutyPeriod, BookingError> {
    DutyPeriod::classify(time)
        .ok_or(BookingError::InvalidRequest("start time outside duty hours [8,20)"))
}
