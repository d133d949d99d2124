//! Display records derived from FHIR resources.
//!
//! Every function here is pure: it reads a parsed [`Resource`](crate::Resource)
//! and returns strings ready for display. Missing data never fails; it
//! degrades to a fixed placeholder.

mod clinical;
mod composition;
mod observation;
mod patient;

pub use clinical::{
    ConditionSummary, DiagnosticReportSummary, MedicationRequestSummary, ProcedureSummary,
    ServiceRequestSummary, format_condition, format_diagnostic_report, format_dosage,
    format_medication_request, format_procedure, format_service_request,
};
pub use composition::{CompositionSummary, SectionText, format_composition};
pub use observation::{
    ComponentValue, ObservationGroups, ObservationSummary, format_observation,
    group_observations, observation_category, observation_value,
};
pub use patient::{PatientSummary, format_name, format_patient, format_patient_on};

use serde_json::Value;

/// Non-empty string value
pub(crate) fn non_empty(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `coding[0].display`, falling back to `text`.
pub fn codeable_display(concept: Option<&Value>) -> Option<String> {
    let concept = concept?;
    non_empty(concept.pointer("/coding/0/display"))
        .or_else(|| non_empty(concept.get("text")))
        .map(str::to_string)
}

/// `coding[0].code` of a CodeableConcept
pub(crate) fn coding_code(concept: Option<&Value>) -> Option<&str> {
    non_empty(concept?.pointer("/coding/0/code"))
}

/// Display text of a Reference, or the literal reference when no display is set.
pub(crate) fn reference_display(reference: &Value) -> Option<String> {
    non_empty(reference.get("display"))
        .or_else(|| non_empty(reference.get("reference")))
        .map(str::to_string)
}

/// Display texts of a list of References
pub(crate) fn reference_displays(list: Option<&Value>) -> Vec<String> {
    list.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(reference_display).collect())
        .unwrap_or_default()
}

/// Display of a scalar JSON value (number or string)
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `"{value} {unit}"` for a Quantity; the unit falls back to `code`.
pub(crate) fn quantity_text(quantity: &Value) -> Option<String> {
    let value = scalar_text(quantity.get("value")?)?;
    match non_empty(quantity.get("unit")).or_else(|| non_empty(quantity.get("code"))) {
        Some(unit) => Some(format!("{} {}", value, unit)),
        None => Some(value),
    }
}
