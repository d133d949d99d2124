use std::path::Path;

use fhirchart_client::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Seed tool configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub fhir: ClientConfig,
    pub log: LogSettings,
    pub patient: PatientSettings,
    /// Remove the organization's existing patients before seeding
    pub cleanup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

/// Demographics of the seeded demo patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientSettings {
    pub given: Vec<String>,
    pub family: String,
    pub gender: String,
    pub birth_date: String,
    pub phone: String,
    pub email: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            fhir: ClientConfig::default(),
            log: LogSettings::default(),
            patient: PatientSettings::default(),
            cleanup: true,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for PatientSettings {
    fn default() -> Self {
        Self {
            given: vec!["Eleanor".to_string(), "Rose".to_string()],
            family: "Whitaker".to_string(),
            gender: "female".to_string(),
            birth_date: "1958-03-14".to_string(),
            phone: "555-0142".to_string(),
            email: "eleanor.whitaker@example.com".to_string(),
            address_line: "27 Alder Lane".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62704".to_string(),
        }
    }
}

impl PatientSettings {
    /// Display name as `"{given...} {family}"`
    pub fn display_name(&self) -> String {
        self.given
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.family.as_str()))
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SeedConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        config.fhir.apply_env();

        if let Ok(level) = std::env::var("FHIRCHART_LOG") {
            config.log.level = level;
        }

        Ok(config)
    }
}
