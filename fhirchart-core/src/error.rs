use thiserror::Error;

#[derive(Error, Debug)]
pub enum FhirChartError {
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl FhirChartError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FhirChartError>;
