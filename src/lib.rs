#![forbid(unsafe_code)]
//! Blocop — moteur de réservation chirurgie/garde local (sans BD).
//!
//! - Stockage fichiers (JSON/CSV).
//! - Résolution de disponibilité par demi-journée (matin/après-midi).
//! - Détection de conflits chirurgien, commit atomique tout-ou-rien.
//! - Tout en UTC ; parsing RFC3339 ; affichage local en dehors de la lib.

pub mod booking;
pub mod catalog;
pub mod io;
pub mod model;
pub mod notification;
pub mod store;

pub use booking::{BookingEngine, BookingError, Candidate, ShiftBinding};
pub use catalog::{
    export_catalog_json, load_catalog_from_file, CatalogEntry, StaticCatalog, SurgeryCatalog,
};
pub use model::{
    DutyPeriod, HospitalId, Ledger, Material, PhysiologistId, Shift, ShiftId, SurgeonId, Surgery,
    SurgeryDraft, SurgeryId, SurgeryStatus, SurgeryTypeId,
};
pub use notification::{prepare_booking_notice, BookingNotifier, Notice, NoticeRenderer, TextNotice};
pub use store::{BookingStore, JsonStore, MemoryStore, StoreError, UnitOfWork};
