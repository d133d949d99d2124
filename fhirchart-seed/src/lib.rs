//! fhirchart-seed - demo data for a FHIR chart
//!
//! Clears an organization's patients from the FHIR server and seeds one
//! demo patient with several years of kidney-care history.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod history;
pub mod seeder;

pub use cleanup::{CleanupReport, DELETE_ORDER, cleanup_organization};
pub use config::{LogSettings, PatientSettings, SeedConfig};
pub use error::{Result, SeedError};
pub use seeder::{SeedReport, Seeder};

use fhirchart_client::FhirClient;

/// Outcome of a full run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub cleanup: Option<CleanupReport>,
    pub seed: SeedReport,
}

/// Optionally clean up, then seed, against the configured server.
pub async fn run(config: &SeedConfig) -> Result<RunReport> {
    let client = FhirClient::new(&config.fhir)?;

    let cleanup = if config.cleanup {
        Some(cleanup_organization(&client).await?)
    } else {
        None
    };

    let seed = Seeder::new(&client).seed(&config.patient).await?;
    Ok(RunReport { cleanup, seed })
}
