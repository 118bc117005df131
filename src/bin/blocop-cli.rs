#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use blocop::{
    catalog::{load_catalog_from_file, SurgeryCatalog},
    io,
    model::{DutyPeriod, HospitalId, PhysiologistId, Shift, SurgeonId, SurgeryDraft, SurgeryId, SurgeryTypeId},
    notification::{prepare_booking_notice, TextNotice},
    store::{BookingStore, JsonStore},
    BookingEngine,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de réservation de bloc (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du registre
    #[arg(long, global = true, default_value = "ledger.json")]
    ledger: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer une garde libre
    AddShift {
        #[arg(long)]
        hospital: String,
        #[arg(long)]
        physiologist: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// morning | afternoon
        #[arg(long)]
        period: String,
    },

    /// Importer des gardes depuis un CSV
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Neurophysiologistes disponibles pour un créneau
    Availability {
        #[arg(long)]
        hospital: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
    },

    /// Vérifier un conflit côté chirurgien
    Check {
        #[arg(long)]
        surgeon: String,
        #[arg(long)]
        hospital: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        duration: u32,
    },

    /// Réserver une chirurgie sur les gardes des personnes retenues
    Book {
        #[arg(long)]
        hospital: String,
        #[arg(long)]
        surgeon: String,
        /// liste "id1,id2,..."
        #[arg(long)]
        physiologists: String,
        #[arg(long)]
        surgery_type: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        /// Minutes ; à défaut, durée par défaut du référentiel
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        theatre: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Référentiel JSON des types d'intervention
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Annuler une chirurgie et libérer ses gardes
    Cancel {
        #[arg(long)]
        surgery_id: String,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_shifts_csv: Option<String>,
        #[arg(long)]
        out_surgeries_csv: Option<String>,
    },

    /// Générer l'avis texte d'une chirurgie réservée
    Notify {
        #[arg(long)]
        surgery_id: String,
        /// Fichier de sortie (texte brut)
        #[arg(long)]
        out: String,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid date: {raw} (expected YYYY-MM-DD)"))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| anyhow::anyhow!("invalid time: {raw} (expected HH:MM)"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let engine = BookingEngine::new(JsonStore::open(&cli.ledger)?);

    let code = match cli.cmd {
        Commands::AddShift {
            hospital,
            physiologist,
            date,
            period,
        } => {
            let date = parse_date(&date)?;
            let period = DutyPeriod::parse(&period)
                .ok_or_else(|| anyhow::anyhow!("invalid period: {period}"))?;
            let shift = Shift::new(
                HospitalId::new(hospital),
                PhysiologistId::new(physiologist),
                date,
                period,
            )
            .map_err(anyhow::Error::msg)?;
            let id = engine.store().insert_shift(shift)?;
            println!("{}", id.as_str());
            0
        }
        Commands::ImportShifts { csv } => {
            let shifts = io::import_shifts_csv(csv)?;
            for shift in shifts {
                engine.store().insert_shift(shift)?;
            }
            0
        }
        Commands::Availability {
            hospital,
            date,
            time,
        } => {
            let hospital = HospitalId::new(hospital);
            let date = parse_date(&date)?;
            let time = parse_time(&time)?;
            let candidates = engine.resolve_available(&hospital, date, time)?;
            if candidates.is_empty() {
                println!("no candidates");
            }
            for c in &candidates {
                println!("{} | {}", c.physiologist.as_str(), c.shift.as_str());
            }
            0
        }
        Commands::Check {
            surgeon,
            hospital,
            date,
            time,
            duration,
        } => {
            let conflict = engine.has_conflict(
                &SurgeonId::new(surgeon),
                &HospitalId::new(hospital),
                parse_date(&date)?,
                parse_time(&time)?,
                duration,
            )?;
            if conflict {
                eprintln!("CONFLICT: surgeon already operates in this window");
                // Code 2 = WARNING/INCOMPLETE
                2
            } else {
                println!("OK: no conflict");
                0
            }
        }
        Commands::Book {
            hospital,
            surgeon,
            physiologists,
            surgery_type,
            date,
            time,
            duration,
            theatre,
            notes,
            catalog,
        } => {
            let hospital = HospitalId::new(hospital);
            let date = parse_date(&date)?;
            let time = parse_time(&time)?;
            let surgery_type = SurgeryTypeId::new(surgery_type);
            let selected: Vec<PhysiologistId> = physiologists
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PhysiologistId::new)
                .collect();
            if selected.is_empty() {
                bail!("at least one physiologist is required");
            }

            let catalog = catalog.map(load_catalog_from_file).transpose()?;
            let duration = match (duration, &catalog) {
                (Some(d), _) => d,
                (None, Some(cat)) => cat
                    .default_duration(&surgery_type)
                    .ok_or_else(|| anyhow::anyhow!("unknown surgery type in catalog"))?,
                (None, None) => bail!("either --duration or --catalog is required"),
            };
            let materials = catalog
                .as_ref()
                .map(|cat| cat.materials(&surgery_type))
                .unwrap_or_default();

            let bindings = engine.rebind_shifts(&hospital, date, time, &selected)?;
            let mut missing = Vec::new();
            let mut shift_ids = Vec::new();
            for binding in bindings {
                match binding.shift {
                    Some(id) => shift_ids.push(id),
                    None => missing.push(binding.physiologist),
                }
            }
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|p| p.as_str()).collect();
                bail!("no open shift for: {}", names.join(", "));
            }

            let draft = SurgeryDraft {
                hospital,
                theatre,
                surgeon: SurgeonId::new(surgeon),
                physiologists: selected,
                surgery_type,
                date,
                start_time: time,
                duration_minutes: duration,
                notes,
                materials,
            };
            let id = engine.commit_booking(&draft, &shift_ids)?;
            println!("{}", id.as_str());
            0
        }
        Commands::Cancel { surgery_id } => {
            engine.cancel_surgery(&SurgeryId::new(surgery_id))?;
            0
        }
        Commands::List {
            out_json,
            out_shifts_csv,
            out_surgeries_csv,
        } => {
            let ledger = engine.store().snapshot()?;
            if let Some(path) = out_json {
                io::export_ledger_json(path, &ledger)?;
            }
            if let Some(path) = out_shifts_csv {
                io::export_shifts_csv(path, &ledger)?;
            }
            if let Some(path) = out_surgeries_csv {
                io::export_surgeries_csv(path, &ledger)?;
            }
            // impression compacte
            for s in &ledger.shifts {
                let booked = s.booked_by.as_ref().map(|id| id.as_str()).unwrap_or("-");
                println!(
                    "shift {} | {} {} {} | {} | {}",
                    s.id.as_str(),
                    s.hospital.as_str(),
                    s.date.format("%Y-%m-%d"),
                    s.period.as_str(),
                    s.physiologist.as_str(),
                    booked
                );
            }
            for s in &ledger.surgeries {
                println!(
                    "surgery {} | {} | {} → {} | {} | {}",
                    s.id.as_str(),
                    s.hospital.as_str(),
                    s.start.to_rfc3339(),
                    s.end().to_rfc3339(),
                    s.surgeon.as_str(),
                    s.status.as_str()
                );
            }
            0
        }
        Commands::Notify { surgery_id, out } => {
            let id = SurgeryId::new(surgery_id);
            let surgery = engine
                .store()
                .surgery(&id)?
                .ok_or_else(|| anyhow::anyhow!("unknown surgery: {}", id.as_str()))?;
            let notice = prepare_booking_notice(&surgery, Utc::now(), &TextNotice);
            std::fs::write(&out, notice.content)?;
            println!(
                "Notice generated for surgery {} at {}",
                notice.surgery_id,
                notice.prepared_at.to_rfc3339()
            );
            0
        }
    };

    std::process::exit(code);
}
