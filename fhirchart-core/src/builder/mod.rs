//! Construction of new resources from user-entered form fields.

mod composition;
mod observation;

pub use composition::{ConsultationForm, ConsultationSection, build_consultation};
pub use observation::{LabTest, LabValuesForm, build_lab_observations, lab_observation};

use serde_json::{Value, json};

use crate::resource::reference_to;

/// Patient a new resource is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRef {
    pub id: String,
    pub display: String,
}

impl PatientRef {
    pub fn new(id: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
        }
    }

    pub fn to_reference(&self) -> Value {
        json!({
            "reference": reference_to("Patient", &self.id),
            "display": self.display,
        })
    }
}

/// Organization stamped as performer/author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRef {
    pub id: String,
    pub display: String,
}

impl OrganizationRef {
    pub fn new(id: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
        }
    }

    pub fn to_reference(&self) -> Value {
        json!({
            "reference": reference_to("Organization", &self.id),
            "display": self.display,
        })
    }
}

/// Trimmed form value, `None` when blank
pub(crate) fn filled(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// The entered date, or today when left blank
pub(crate) fn date_or_today(value: &str) -> String {
    filled(value)
        .map(str::to_string)
        .unwrap_or_else(crate::date::today)
}
