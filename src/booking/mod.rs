mod availability;
mod commit;
mod conflict;
mod types;
mod util;

pub use types::{BookingError, Candidate, ShiftBinding};

use crate::model::{HospitalId, PhysiologistId, ShiftId, SurgeonId, SurgeryDraft, SurgeryId};
use crate::notification::BookingNotifier;
use crate::store::BookingStore;
use chrono::{NaiveDate, NaiveTime};

/// Moteur de réservation : enchaîne résolution de disponibilité, contrôle de
/// conflit et commit atomique au-dessus d'un registre partagé.
#[derive(Debug)]
pub struct BookingEngine<S> {
    store: S,
}

impl<S: BookingStore> BookingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Neurophysiologistes disposant d'une garde libre pour le créneau.
    /// Vide = aucun candidat, résultat métier normal.
    pub fn resolve_available(
        &self,
        hospital: &HospitalId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<Vec<Candidate>, BookingError> {
        availability::resolve_available(&self.store, hospital, date, start_time)
    }

    /// Re-résout la garde exacte de chaque personne sélectionnée.
    pub fn rebind_shifts(
        &self,
        hospital: &HospitalId,
        date: NaiveDate,
        start_time: NaiveTime,
        selected: &[PhysiologistId],
    ) -> Result<Vec<ShiftBinding>, BookingError> {
        availability::rebind_shifts(&self.store, hospital, date, start_time, selected)
    }

    /// Le chirurgien a-t-il déjà une chirurgie `scheduled` chevauchant le
    /// créneau demandé à cet hôpital ?
    pub fn has_conflict(
        &self,
        surgeon: &SurgeonId,
        hospital: &HospitalId,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
    ) -> Result<bool, BookingError> {
        conflict::has_conflict(
            &self.store,
            surgeon,
            hospital,
            date,
            start_time,
            duration_minutes,
        )
    }

    /// Commit tout-ou-rien de la réservation.
    pub fn commit_booking(
        &self,
        draft: &SurgeryDraft,
        shift_ids: &[ShiftId],
    ) -> Result<SurgeryId, BookingError> {
        commit::commit_booking(&self.store, draft, shift_ids)
    }

    /// Commit puis notification. L'envoi est au mieux : son échec ne remet
    /// jamais en cause la réservation déjà commitée.
    pub fn commit_booking_notified(
        &self,
        draft: &SurgeryDraft,
        shift_ids: &[ShiftId],
        notifier: &dyn BookingNotifier,
    ) -> Result<SurgeryId, BookingError> {
        let id = commit::commit_booking(&self.store, draft, shift_ids)?;
        if let Ok(Some(surgery)) = self.store.surgery(&id) {
            let _ = notifier.surgery_booked(&surgery);
        }
        Ok(id)
    }

    /// Annule une chirurgie `scheduled` et libère ses gardes, atomiquement.
    pub fn cancel_surgery(&self, id: &SurgeryId) -> Result<(), BookingError> {
        commit::cancel_surgery(&self.store, id)
    }
}
