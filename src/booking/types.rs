use crate::model::{PhysiologistId, ShiftId, SurgeonId};
use crate::store::StoreError;
use thiserror::Error;

/// Candidat retourné par la résolution de disponibilité : un
/// neurophysiologiste et sa garde libre par défaut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub physiologist: PhysiologistId,
    pub shift: ShiftId,
}

/// Liaison garde/neurophysiologiste re-résolue au moment de la sélection.
/// `shift` vaut `None` si la personne n'a plus de garde libre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftBinding {
    pub physiologist: PhysiologistId,
    pub shift: Option<ShiftId>,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
    #[error("scheduling conflict: surgeon {} already operates in this window", .surgeon.as_str())]
    SchedulingConflict { surgeon: SurgeonId },
    #[error("shift(s) no longer available: {}", join_ids(.0))]
    ShiftNoLongerAvailable(Vec<ShiftId>),
    #[error("unknown surgery: {0}")]
    UnknownSurgery(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

fn join_ids(ids: &[ShiftId]) -> String {
    ids.iter()
        .map(ShiftId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
