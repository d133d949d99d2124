//! fhirchart-seed - seed tool entry point

use std::path::Path;

use fhirchart_seed::SeedConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config_path = Path::new("seed.yaml");
    let config = SeedConfig::load(config_path.exists().then_some(config_path));

    let log_level = config
        .as_ref()
        .map(|c| c.log.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let json = config.as_ref().map(|c| c.log.json).unwrap_or(false);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));
    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }

    let config = config.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        SeedConfig::default()
    });

    tracing::info!(
        base_url = %config.fhir.base_url,
        organization = %config.fhir.organization_id,
        "Starting fhirchart-seed..."
    );

    match fhirchart_seed::run(&config).await {
        Ok(report) => {
            if let Some(cleanup) = &report.cleanup {
                tracing::info!(
                    patients = cleanup.patients,
                    deleted = cleanup.deleted,
                    warnings = cleanup.warnings.len(),
                    "Removed existing patients"
                );
            }
            tracing::info!(
                patient = %report.seed.patient,
                resources = report.seed.created.len(),
                "Seeded demo patient"
            );
        }
        Err(e) => {
            tracing::error!("Seeding failed: {}", e);
            std::process::exit(1);
        }
    }
}
