use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiant fort pour un hôpital
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HospitalId(String);

impl HospitalId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Identifiant fort pour un chirurgien
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurgeonId(String);

impl SurgeonId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Identifiant fort pour un neurophysiologiste
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysiologistId(String);

impl PhysiologistId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Identifiant fort pour un type d'intervention
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurgeryTypeId(String);

impl SurgeryTypeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Identifiant fort pour Shift
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Surgery
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurgeryId(String);

impl SurgeryId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Demi-journée de garde. La frontière 14:00 est une constante métier globale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyPeriod {
    Morning,
    Afternoon,
}

/// Heures ouvrées : matin [8,14), après-midi [14,20).
pub const MORNING_START_HOUR: u32 = 8;
pub const PERIOD_BOUNDARY_HOUR: u32 = 14;
pub const AFTERNOON_END_HOUR: u32 = 20;

impl DutyPeriod {
    /// Classe une heure de début dans sa demi-journée. `None` hors plage [8,20).
    pub fn classify(time: NaiveTime) -> Option<Self> {
        let hour = time.hour();
        if (MORNING_START_HOUR..PERIOD_BOUNDARY_HOUR).contains(&hour) {
            Some(Self::Morning)
        } else if (PERIOD_BOUNDARY_HOUR..AFTERNOON_END_HOUR).contains(&hour) {
            Some(Self::Afternoon)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            _ => None,
        }
    }
}

/// Garde d'un neurophysiologiste (demi-journée, par hôpital et par date).
///
/// `booked_by` porte à la fois l'état réservé et la référence vers la
/// chirurgie consommatrice : les deux ne peuvent pas diverger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub hospital: HospitalId,
    pub physiologist: PhysiologistId,
    pub date: NaiveDate,
    pub period: DutyPeriod,
    #[serde(default)]
    pub booked_by: Option<SurgeryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    /// Crée une garde libre en validant les identifiants.
    pub fn new(
        hospital: HospitalId,
        physiologist: PhysiologistId,
        date: NaiveDate,
        period: DutyPeriod,
    ) -> Result<Self, String> {
        if hospital.is_empty() {
            return Err("hospital id cannot be empty".to_string());
        }
        if physiologist.is_empty() {
            return Err("physiologist id cannot be empty".to_string());
        }
        let now = Utc::now();
        Ok(Self {
            id: ShiftId::random(),
            hospital,
            physiologist,
            date,
            period,
            booked_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_booked(&self) -> bool {
        self.booked_by.is_some()
    }
}

/// Statut d'une chirurgie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurgeryStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl SurgeryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Matériel requis pour une intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Chirurgie programmée (UTC).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surgery {
    pub id: SurgeryId,
    pub hospital: HospitalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theatre: Option<String>,
    pub surgeon: SurgeonId,
    pub physiologists: Vec<PhysiologistId>,
    pub surgery_type: SurgeryTypeId,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    pub status: SurgeryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Surgery {
    /// Fin exclusive de l'intervalle `[start, start + duration)`.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Demande de réservation entièrement renseignée, pas encore commitée.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeryDraft {
    pub hospital: HospitalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theatre: Option<String>,
    pub surgeon: SurgeonId,
    pub physiologists: Vec<PhysiologistId>,
    pub surgery_type: SurgeryTypeId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
}

impl SurgeryDraft {
    pub fn start_instant(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDateTime::new(self.date, self.start_time))
    }

    pub fn end_instant(&self) -> DateTime<Utc> {
        self.start_instant() + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Matérialise la chirurgie au moment du commit.
    pub fn into_surgery(self, id: SurgeryId, now: DateTime<Utc>) -> Surgery {
        let start = self.start_instant();
        Surgery {
            id,
            hospital: self.hospital,
            theatre: self.theatre,
            surgeon: self.surgeon,
            physiologists: self.physiologists,
            surgery_type: self.surgery_type,
            start,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
            materials: self.materials,
            status: SurgeryStatus::Scheduled,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Registre complet : gardes et chirurgies d'un périmètre.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Ledger {
    pub shifts: Vec<Shift>,
    pub surgeries: Vec<Surgery>,
}

impl Ledger {
    pub fn find_shift<'a>(&'a self, id: &ShiftId) -> Option<&'a Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }
    pub fn find_shift_mut(&mut self, id: &ShiftId) -> Option<&mut Shift> {
        self.shifts.iter_mut().find(|s| &s.id == id)
    }
    pub fn find_surgery<'a>(&'a self, id: &SurgeryId) -> Option<&'a Surgery> {
        self.surgeries.iter().find(|s| &s.id == id)
    }
    pub fn find_surgery_mut(&mut self, id: &SurgeryId) -> Option<&mut Surgery> {
        self.surgeries.iter_mut().find(|s| &s.id == id)
    }
}
