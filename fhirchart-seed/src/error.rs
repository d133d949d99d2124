use fhirchart_client::ClientError;
use fhirchart_core::FhirChartError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Build(#[from] FhirChartError),

    /// A resource of the seeded history was rejected; nothing after it was sent
    #[error("Failed to create {label}: {source}")]
    Create {
        label: String,
        #[source]
        source: ClientError,
    },
}

pub type Result<T> = std::result::Result<T, SeedError>;
