use crate::model::{DutyPeriod, HospitalId, Ledger, PhysiologistId, Shift};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de gardes depuis CSV: header `hospital,physiologist,date,period`
/// (date `YYYY-MM-DD`, period `morning`/`afternoon`).
pub fn import_shifts_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Shift>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let hospital = rec.get(0).context("missing hospital")?.trim();
        let physiologist = rec.get(1).context("missing physiologist")?.trim();
        let date = rec.get(2).context("missing date")?.trim();
        let period = rec.get(3).context("missing period")?.trim();
        if hospital.is_empty() || physiologist.is_empty() {
            bail!("invalid shift row (empty)");
        }
        let date = parse_date(date)?;
        let period = parse_period(period)?;
        let shift = Shift::new(
            HospitalId::new(hospital),
            PhysiologistId::new(physiologist),
            date,
            period,
        )
        .map_err(anyhow::Error::msg)?;
        out.push(shift);
    }
    Ok(out)
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_period(raw: &str) -> anyhow::Result<DutyPeriod> {
    DutyPeriod::parse(raw)
        .with_context(|| format!("invalid period: {raw} (expected morning|afternoon)"))
}

/// Export JSON du registre (jolie mise en forme)
pub fn export_ledger_json<P: AsRef<Path>>(path: P, ledger: &Ledger) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(ledger)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des gardes: header `id,hospital,physiologist,date,period,booked_by`
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, ledger: &Ledger) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "hospital", "physiologist", "date", "period", "booked_by"])?;
    for s in &ledger.shifts {
        let date = s.date.format("%Y-%m-%d").to_string();
        let booked_by = s.booked_by.as_ref().map(|id| id.as_str()).unwrap_or("");
        w.write_record([
            s.id.as_str(),
            s.hospital.as_str(),
            s.physiologist.as_str(),
            date.as_str(),
            s.period.as_str(),
            booked_by,
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du programme opératoire:
/// header `id,hospital,surgeon,surgery_type,start,duration_minutes,status,physiologists`
pub fn export_surgeries_csv<P: AsRef<Path>>(path: P, ledger: &Ledger) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "hospital",
        "surgeon",
        "surgery_type",
        "start",
        "duration_minutes",
        "status",
        "physiologists",
    ])?;
    for s in &ledger.surgeries {
        let start = s.start.to_rfc3339();
        let duration = s.duration_minutes.to_string();
        let physiologists = s
            .physiologists
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(";");
        w.write_record([
            s.id.as_str(),
            s.hospital.as_str(),
            s.surgeon.as_str(),
            s.surgery_type.as_str(),
            start.as_str(),
            duration.as_str(),
            s.status.as_str(),
            physiologists.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
