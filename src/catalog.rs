use crate::model::{Material, SurgeryTypeId};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Référentiel des types d'intervention : durée par défaut et matériel
/// requis. Consommé par les appelants pour pré-remplir une demande, jamais
/// modifié par le moteur.
pub trait SurgeryCatalog {
    fn default_duration(&self, id: &SurgeryTypeId) -> Option<u32>;
    fn materials(&self, id: &SurgeryTypeId) -> Vec<Material>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: SurgeryTypeId,
    pub name: String,
    pub default_duration_minutes: u32,
    #[serde(default)]
    pub materials: Vec<Material>,
}

impl CatalogEntry {
    fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            bail!("catalog entry id cannot be empty");
        }
        if self.name.trim().is_empty() {
            bail!("catalog entry name cannot be empty");
        }
        if self.default_duration_minutes == 0 {
            bail!("default duration must be > 0");
        }
        for material in &self.materials {
            if material.name.trim().is_empty() {
                bail!("material name cannot be empty");
            }
            if material.quantity == 0 {
                bail!("material quantity must be > 0");
            }
        }
        Ok(())
    }
}

/// Référentiel en mémoire, chargé une fois.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        for entry in &entries {
            entry.validate()?;
        }
        for (idx, entry) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|e| e.id == entry.id) {
                bail!("duplicate catalog entry: {}", entry.id.as_str());
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn find(&self, id: &SurgeryTypeId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }
}

impl SurgeryCatalog for StaticCatalog {
    fn default_duration(&self, id: &SurgeryTypeId) -> Option<u32> {
        self.find(id).map(|e| e.default_duration_minutes)
    }

    fn materials(&self, id: &SurgeryTypeId) -> Vec<Material> {
        self.find(id).map(|e| e.materials.clone()).unwrap_or_default()
    }
}

/// Charge et valide un référentiel depuis un fichier JSON.
pub fn load_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<StaticCatalog> {
    let data = fs::read(&path)
        .with_context(|| format!("reading catalog {}", path.as_ref().display()))?;
    let entries: Vec<CatalogEntry> =
        serde_json::from_slice(&data).with_context(|| "parsing catalog json")?;
    StaticCatalog::new(entries)
}

pub fn export_catalog_json<P: AsRef<Path>>(path: P, catalog: &StaticCatalog) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog.entries())?;
    fs::write(path, json)?;
    Ok(())
}
