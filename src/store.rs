use crate::booking::BookingError;
use crate::model::{
    DutyPeriod, HospitalId, Ledger, Shift, ShiftId, SurgeonId, Surgery, SurgeryId, SurgeryStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Borne par défaut des accès au registre partagé.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store timed out after {0:?}")]
    Timeout(Duration),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("missing record: {0}")]
    Missing(String),
    #[error("corrupt ledger: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Unité de travail atomique : soit toutes les écritures sont appliquées,
/// soit aucune. Les lectures voient l'état courant de l'unité en cours.
pub trait UnitOfWork {
    /// Horodatage unique de l'unité, appliqué à toutes ses écritures.
    fn now(&self) -> DateTime<Utc>;
    fn shift(&self, id: &ShiftId) -> Option<&Shift>;
    fn shifts_booked_by(&self, id: &SurgeryId) -> Vec<ShiftId>;
    fn surgery(&self, id: &SurgeryId) -> Option<&Surgery>;
    fn create_surgery(&mut self, surgery: Surgery) -> SurgeryId;
    fn book_shift(&mut self, id: &ShiftId, surgery: &SurgeryId) -> StoreResult<()>;
    fn release_shift(&mut self, id: &ShiftId) -> StoreResult<()>;
    fn set_surgery_status(&mut self, id: &SurgeryId, status: SurgeryStatus) -> StoreResult<()>;
}

/// Accès au registre des gardes et chirurgies.
///
/// Les lectures sont ponctuelles et non coordonnées ; `transaction` est le
/// seul point d'écriture et s'exécute en isolation totale.
pub trait BookingStore {
    /// Gardes libres pour (hôpital, date, demi-journée).
    fn open_shifts(
        &self,
        hospital: &HospitalId,
        date: NaiveDate,
        period: DutyPeriod,
    ) -> StoreResult<Vec<Shift>>;

    fn shift(&self, id: &ShiftId) -> StoreResult<Option<Shift>>;

    /// Chirurgies `scheduled` d'un chirurgien à un hôpital pour un jour donné.
    fn scheduled_surgeries(
        &self,
        surgeon: &SurgeonId,
        hospital: &HospitalId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Surgery>>;

    fn surgery(&self, id: &SurgeryId) -> StoreResult<Option<Surgery>>;

    /// Exécute `work` comme une unité indivisible. Un `Err` de `work`
    /// abandonne toutes les écritures de l'unité.
    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn UnitOfWork) -> Result<(), BookingError>,
    ) -> Result<(), BookingError>;
}

fn lock_bounded<'a>(
    inner: &'a Mutex<Ledger>,
    timeout: Duration,
) -> StoreResult<MutexGuard<'a, Ledger>> {
    let deadline = Instant::now() + timeout;
    loop {
        match inner.try_lock() {
            Ok(guard) => return Ok(guard),
            Err(TryLockError::WouldBlock) => {
                if Instant::now() >= deadline {
                    return Err(StoreError::Timeout(timeout));
                }
                thread::sleep(Duration::from_millis(1));
            }
            Err(TryLockError::Poisoned(_)) => {
                return Err(StoreError::Unavailable("ledger lock poisoned".to_string()))
            }
        }
    }
}

fn open_shifts_in(
    ledger: &Ledger,
    hospital: &HospitalId,
    date: NaiveDate,
    period: DutyPeriod,
) -> Vec<Shift> {
    ledger
        .shifts
        .iter()
        .filter(|s| {
            !s.is_booked() && &s.hospital == hospital && s.date == date && s.period == period
        })
        .cloned()
        .collect()
}

fn scheduled_surgeries_in(
    ledger: &Ledger,
    surgeon: &SurgeonId,
    hospital: &HospitalId,
    date: NaiveDate,
) -> Vec<Surgery> {
    ledger
        .surgeries
        .iter()
        .filter(|s| {
            s.status == SurgeryStatus::Scheduled
                && &s.surgeon == surgeon
                && &s.hospital == hospital
                && s.date() == date
        })
        .cloned()
        .collect()
}

/// Unité de travail sur une copie de travail du registre.
struct LedgerTxn {
    scratch: Ledger,
    now: DateTime<Utc>,
}

impl UnitOfWork for LedgerTxn {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn shift(&self, id: &ShiftId) -> Option<&Shift> {
        self.scratch.find_shift(id)
    }

    fn shifts_booked_by(&self, id: &SurgeryId) -> Vec<ShiftId> {
        self.scratch
            .shifts
            .iter()
            .filter(|s| s.booked_by.as_ref() == Some(id))
            .map(|s| s.id.clone())
            .collect()
    }

    fn surgery(&self, id: &SurgeryId) -> Option<&Surgery> {
        self.scratch.find_surgery(id)
    }

    fn create_surgery(&mut self, surgery: Surgery) -> SurgeryId {
        let id = surgery.id.clone();
        self.scratch.surgeries.push(surgery);
        id
    }

    fn book_shift(&mut self, id: &ShiftId, surgery: &SurgeryId) -> StoreResult<()> {
        let now = self.now;
        let shift = self
            .scratch
            .find_shift_mut(id)
            .ok_or_else(|| StoreError::Missing(format!("shift {}", id.as_str())))?;
        shift.booked_by = Some(surgery.clone());
        shift.updated_at = now;
        Ok(())
    }

    fn release_shift(&mut self, id: &ShiftId) -> StoreResult<()> {
        let now = self.now;
        let shift = self
            .scratch
            .find_shift_mut(id)
            .ok_or_else(|| StoreError::Missing(format!("shift {}", id.as_str())))?;
        shift.booked_by = None;
        shift.updated_at = now;
        Ok(())
    }

    fn set_surgery_status(&mut self, id: &SurgeryId, status: SurgeryStatus) -> StoreResult<()> {
        let now = self.now;
        let surgery = self
            .scratch
            .find_surgery_mut(id)
            .ok_or_else(|| StoreError::Missing(format!("surgery {}", id.as_str())))?;
        surgery.status = status;
        surgery.updated_at = now;
        Ok(())
    }
}

/// Registre en mémoire, partageable entre threads (clone = même registre).
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Ledger>>,
    timeout: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_ledger(Ledger::default())
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
            timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Copie de l'état courant (diagnostic, exports).
    pub fn snapshot(&self) -> StoreResult<Ledger> {
        Ok(lock_bounded(&self.inner, self.timeout)?.clone())
    }

    pub fn insert_shift(&self, shift: Shift) -> StoreResult<ShiftId> {
        let mut guard = lock_bounded(&self.inner, self.timeout)?;
        let id = shift.id.clone();
        guard.shifts.push(shift);
        Ok(id)
    }
}

impl BookingStore for MemoryStore {
    fn open_shifts(
        &self,
        hospital: &HospitalId,
        date: NaiveDate,
        period: DutyPeriod,
    ) -> StoreResult<Vec<Shift>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(open_shifts_in(&guard, hospital, date, period))
    }

    fn shift(&self, id: &ShiftId) -> StoreResult<Option<Shift>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(guard.find_shift(id).cloned())
    }

    fn scheduled_surgeries(
        &self,
        surgeon: &SurgeonId,
        hospital: &HospitalId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Surgery>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(scheduled_surgeries_in(&guard, surgeon, hospital, date))
    }

    fn surgery(&self, id: &SurgeryId) -> StoreResult<Option<Surgery>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(guard.find_surgery(id).cloned())
    }

    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn UnitOfWork) -> Result<(), BookingError>,
    ) -> Result<(), BookingError> {
        let mut guard = lock_bounded(&self.inner, self.timeout).map_err(BookingError::from)?;
        let mut txn = LedgerTxn {
            scratch: guard.clone(),
            now: Utc::now(),
        };
        work(&mut txn)?;
        *guard = txn.scratch;
        Ok(())
    }
}

/// Registre persisté dans un fichier JSON, remplacé de manière atomique.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: Arc<Mutex<Ledger>>,
    timeout: Duration,
}

impl JsonStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let ledger = if path.exists() {
            let data = fs::read(&path)?;
            serde_json::from_slice(&data)
                .map_err(|e| StoreError::Corrupt(format!("parsing {}: {e}", path.display())))?
        } else {
            Ledger::default()
        };
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(ledger)),
            timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn snapshot(&self) -> StoreResult<Ledger> {
        Ok(lock_bounded(&self.inner, self.timeout)?.clone())
    }

    pub fn insert_shift(&self, shift: Shift) -> StoreResult<ShiftId> {
        let mut guard = lock_bounded(&self.inner, self.timeout)?;
        let id = shift.id.clone();
        guard.shifts.push(shift);
        self.persist(&guard)?;
        Ok(id)
    }

    fn persist(&self, ledger: &Ledger) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(ledger)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let mut tmp =
            NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl BookingStore for JsonStore {
    fn open_shifts(
        &self,
        hospital: &HospitalId,
        date: NaiveDate,
        period: DutyPeriod,
    ) -> StoreResult<Vec<Shift>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(open_shifts_in(&guard, hospital, date, period))
    }

    fn shift(&self, id: &ShiftId) -> StoreResult<Option<Shift>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(guard.find_shift(id).cloned())
    }

    fn scheduled_surgeries(
        &self,
        surgeon: &SurgeonId,
        hospital: &HospitalId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Surgery>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(scheduled_surgeries_in(&guard, surgeon, hospital, date))
    }

    fn surgery(&self, id: &SurgeryId) -> StoreResult<Option<Surgery>> {
        let guard = lock_bounded(&self.inner, self.timeout)?;
        Ok(guard.find_surgery(id).cloned())
    }

    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn UnitOfWork) -> Result<(), BookingError>,
    ) -> Result<(), BookingError> {
        let mut guard = lock_bounded(&self.inner, self.timeout).map_err(BookingError::from)?;
        let mut txn = LedgerTxn {
            scratch: guard.clone(),
            now: Utc::now(),
        };
        work(&mut txn)?;
        // le fichier d'abord : un échec disque laisse le registre en mémoire intact
        self.persist(&txn.scratch).map_err(BookingError::from)?;
        *guard = txn.scratch;
        Ok(())
    }
}
