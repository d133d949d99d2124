use fhirchart_core::FhirChartError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}{}", diagnostics_suffix(.diagnostics))]
    Status {
        status: u16,
        diagnostics: Option<String>,
    },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Server response for {0} is missing the resource id")]
    MissingId(String),
}

fn diagnostics_suffix(diagnostics: &Option<String>) -> String {
    diagnostics
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl ClientError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A single failed item of a multi-resource submission
#[derive(Debug)]
pub struct SubmissionFailure {
    pub label: String,
    pub error: ClientError,
}

/// Errors from building and submitting new documents
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Rejected before any request was sent
    #[error(transparent)]
    Validation(#[from] FhirChartError),

    /// One or more POSTs failed. Items listed in `created` stay on the server.
    #[error("{}", failure_summary(.attempted, .failures))]
    Failed {
        attempted: usize,
        created: Vec<String>,
        failures: Vec<SubmissionFailure>,
    },
}

fn failure_summary(attempted: &usize, failures: &[SubmissionFailure]) -> String {
    let details = failures
        .iter()
        .map(|f| format!("{}: {}", f.label, f.error))
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "{} of {} submissions failed: {}",
        failures.len(),
        attempted,
        details
    )
}

pub type Result<T> = std::result::Result<T, ClientError>;
