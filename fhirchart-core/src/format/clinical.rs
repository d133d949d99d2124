use serde_json::Value;

use super::{codeable_display, coding_code, non_empty, quantity_text, reference_display, reference_displays, scalar_text};
use crate::Resource;
use crate::date::{NOT_AVAILABLE, format_date};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSummary {
    pub id: String,
    pub display: String,
    pub clinical_status: String,
    pub verification_status: Option<String>,
    pub severity: String,
    pub onset: String,
    pub recorded: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureSummary {
    pub id: String,
    pub display: String,
    pub status: String,
    pub performed: String,
    pub performers: Vec<String>,
    pub reasons: Vec<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationRequestSummary {
    pub id: String,
    pub medication: String,
    pub status: String,
    pub intent: String,
    pub dosage: String,
    pub authored_on: String,
    pub requester: Option<String>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReportSummary {
    pub id: String,
    pub display: String,
    pub status: String,
    pub effective: String,
    pub conclusion: Option<String>,
    pub conclusion_codes: Vec<String>,
    pub results: Vec<String>,
    pub performers: Vec<String>,
    pub based_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequestSummary {
    pub id: String,
    pub display: String,
    pub status: String,
    pub intent: String,
    pub authored_on: String,
    pub reasons: Vec<String>,
}

pub fn format_condition(resource: &Resource) -> ConditionSummary {
    let onset = resource
        .str_field("onsetDateTime")
        .or_else(|| non_empty(resource.get("onsetPeriod").and_then(|p| p.get("start"))));

    ConditionSummary {
        id: id_of(resource),
        display: display_or(resource.get("code"), "Unknown"),
        clinical_status: coding_code(resource.get("clinicalStatus"))
            .unwrap_or("Unknown")
            .to_string(),
        verification_status: coding_code(resource.get("verificationStatus")).map(str::to_string),
        severity: display_or(resource.get("severity"), NOT_AVAILABLE),
        onset: format_date(onset),
        recorded: format_date(resource.str_field("recordedDate")),
    }
}

pub fn format_procedure(resource: &Resource) -> ProcedureSummary {
    let performed = resource.str_field("performedDateTime").or_else(|| {
        non_empty(
            resource
                .get("performedPeriod")
                .and_then(|p| p.get("start")),
        )
    });

    let performers = resource
        .get("performer")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|p| p.get("actor").and_then(reference_display))
                .collect()
        })
        .unwrap_or_default();

    let notes = resource
        .get("note")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|n| non_empty(n.get("text")))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ProcedureSummary {
        id: id_of(resource),
        display: display_or(resource.get("code"), "Unknown"),
        status: status_of(resource),
        performed: format_date(performed),
        performers,
        reasons: reference_displays(resource.get("reasonReference")),
        notes,
    }
}

pub fn format_medication_request(resource: &Resource) -> MedicationRequestSummary {
    MedicationRequestSummary {
        id: id_of(resource),
        medication: display_or(resource.get("medicationCodeableConcept"), "Unknown medication"),
        status: status_of(resource),
        intent: non_empty(resource.get("intent"))
            .unwrap_or("Unknown")
            .to_string(),
        dosage: format_dosage(resource.get("dosageInstruction")),
        authored_on: format_date(resource.str_field("authoredOn")),
        requester: resource.get("requester").and_then(reference_display),
        reasons: reference_displays(resource.get("reasonReference")),
    }
}

/// Dosage line from `dosageInstruction[0]`.
///
/// Free text wins. Without text, a `timing.repeat` with a frequency renders
/// as `"{dose} {frequency}x per {period} {periodUnit}"`. Anything else is `N/A`.
pub fn format_dosage(instructions: Option<&Value>) -> String {
    let Some(instruction) = instructions.and_then(|d| d.get(0)) else {
        return NOT_AVAILABLE.to_string();
    };

    if let Some(text) = non_empty(instruction.get("text")) {
        return text.to_string();
    }

    let Some(repeat) = instruction.pointer("/timing/repeat") else {
        return NOT_AVAILABLE.to_string();
    };
    let Some(frequency) = repeat.get("frequency").and_then(scalar_text) else {
        return NOT_AVAILABLE.to_string();
    };

    let mut schedule = format!("{}x", frequency);
    if let Some(period) = repeat.get("period").and_then(scalar_text) {
        schedule.push_str(&format!(" per {}", period));
        if let Some(unit) = non_empty(repeat.get("periodUnit")) {
            schedule.push_str(&format!(" {}", unit));
        }
    }

    match instruction
        .pointer("/doseAndRate/0/doseQuantity")
        .and_then(quantity_text)
    {
        Some(dose) => format!("{} {}", dose, schedule),
        None => schedule,
    }
}

pub fn format_diagnostic_report(resource: &Resource) -> DiagnosticReportSummary {
    let effective = resource
        .str_field("effectiveDateTime")
        .or_else(|| resource.str_field("issued"));

    let conclusion_codes = resource
        .get("conclusionCode")
        .and_then(Value::as_array)
        .map(|codes| codes.iter().filter_map(|c| codeable_display(Some(c))).collect())
        .unwrap_or_default();

    DiagnosticReportSummary {
        id: id_of(resource),
        display: display_or(resource.get("code"), "Unknown test"),
        status: status_of(resource),
        effective: format_date(effective),
        conclusion: non_empty(resource.get("conclusion")).map(str::to_string),
        conclusion_codes,
        results: reference_displays(resource.get("result")),
        performers: reference_displays(resource.get("performer")),
        based_on: reference_displays(resource.get("basedOn")),
    }
}

pub fn format_service_request(resource: &Resource) -> ServiceRequestSummary {
    ServiceRequestSummary {
        id: id_of(resource),
        display: display_or(resource.get("code"), "Unknown service"),
        status: status_of(resource),
        intent: non_empty(resource.get("intent"))
            .unwrap_or("Unknown")
            .to_string(),
        authored_on: format_date(resource.str_field("authoredOn")),
        reasons: reference_displays(resource.get("reasonReference")),
    }
}

fn id_of(resource: &Resource) -> String {
    resource.id.clone().unwrap_or_default()
}

fn status_of(resource: &Resource) -> String {
    non_empty(resource.get("status"))
        .unwrap_or("unknown")
        .to_string()
}

fn display_or(concept: Option<&Value>, fallback: &str) -> String {
    codeable_display(concept).unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(value: Value) -> Resource {
        Resource::from_value(value).unwrap()
    }

    #[test]
    fn test_format_condition() {
        let condition = resource(json!({
            "resourceType": "Condition",
            "id": "c1",
            "code": {"coding": [{"system": "http://snomed.info/sct", "code": "44054006", "display": "Type 2 diabetes mellitus"}]},
            "clinicalStatus": {"coding": [{"code": "active"}]},
            "verificationStatus": {"coding": [{"code": "confirmed"}]},
            "severity": {"coding": [{"display": "Moderate"}]},
            "onsetPeriod": {"start": "2015-04-20"},
            "recordedDate": "2015-05-02T10:00:00Z"
        }));

        let summary = format_condition(&condition);
        assert_eq!(summary.display, "Type 2 diabetes mellitus");
        assert_eq!(summary.clinical_status, "active");
        assert_eq!(summary.verification_status.as_deref(), Some("confirmed"));
        assert_eq!(summary.severity, "Moderate");
        assert_eq!(summary.onset, "Apr 20, 2015");
        assert_eq!(summary.recorded, "May 2, 2015");
    }

    #[test]
    fn test_condition_fallbacks() {
        let summary = format_condition(&resource(json!({"resourceType": "Condition"})));
        assert_eq!(summary.display, "Unknown");
        assert_eq!(summary.clinical_status, "Unknown");
        assert_eq!(summary.severity, "N/A");
        assert_eq!(summary.onset, "N/A");
    }

    #[test]
    fn test_format_procedure() {
        let procedure = resource(json!({
            "resourceType": "Procedure",
            "id": "pr1",
            "status": "completed",
            "code": {"text": "Renal ultrasound"},
            "performedDateTime": "2019-08-12",
            "performer": [{"actor": {"reference": "Organization/org-1", "display": "Riverside Nephrology"}}],
            "reasonReference": [{"reference": "Condition/c3", "display": "Chronic kidney disease stage 3"}],
            "note": [{"text": "No obstruction."}]
        }));

        let summary = format_procedure(&procedure);
        assert_eq!(summary.display, "Renal ultrasound");
        assert_eq!(summary.status, "completed");
        assert_eq!(summary.performed, "Aug 12, 2019");
        assert_eq!(summary.performers, vec!["Riverside Nephrology"]);
        assert_eq!(summary.reasons, vec!["Chronic kidney disease stage 3"]);
        assert_eq!(summary.notes, vec!["No obstruction."]);
    }

    #[test]
    fn test_format_medication_request() {
        let request = resource(json!({
            "resourceType": "MedicationRequest",
            "id": "m1",
            "status": "active",
            "intent": "order",
            "medicationCodeableConcept": {"coding": [{"display": "Metformin 500 MG Oral Tablet"}]},
            "dosageInstruction": [{"text": "500 mg twice daily with meals"}],
            "authoredOn": "2015-05-02",
            "requester": {"reference": "Organization/org-1", "display": "Riverside Nephrology"}
        }));

        let summary = format_medication_request(&request);
        assert_eq!(summary.medication, "Metformin 500 MG Oral Tablet");
        assert_eq!(summary.dosage, "500 mg twice daily with meals");
        assert_eq!(summary.authored_on, "May 2, 2015");
        assert_eq!(summary.requester.as_deref(), Some("Riverside Nephrology"));

        let empty = format_medication_request(&resource(json!({"resourceType": "MedicationRequest"})));
        assert_eq!(empty.medication, "Unknown medication");
        assert_eq!(empty.dosage, "N/A");
    }

    #[test]
    fn test_dosage_from_timing_when_text_absent() {
        let instructions = json!([{
            "text": "",
            "timing": {"repeat": {"frequency": 1, "period": 1, "periodUnit": "wk"}},
            "doseAndRate": [{"doseQuantity": {"value": 4000, "unit": "U"}}]
        }]);
        assert_eq!(format_dosage(Some(&instructions)), "4000 U 1x per 1 wk");

        let no_dose = json!([{"timing": {"repeat": {"frequency": 2, "period": 1, "periodUnit": "d"}}}]);
        assert_eq!(format_dosage(Some(&no_dose)), "2x per 1 d");
    }

    #[test]
    fn test_dosage_without_frequency() {
        let instructions = json!([{"timing": {"repeat": {"period": 1, "periodUnit": "d"}}}]);
        assert_eq!(format_dosage(Some(&instructions)), "N/A");
        assert_eq!(format_dosage(Some(&json!([]))), "N/A");
    }

    #[test]
    fn test_format_diagnostic_report() {
        let report = resource(json!({
            "resourceType": "DiagnosticReport",
            "id": "d1",
            "status": "final",
            "code": {"text": "Renal function panel"},
            "issued": "2022-03-10T08:00:00Z",
            "conclusion": "eGFR declining",
            "conclusionCode": [{"coding": [{"display": "Chronic kidney disease stage 3"}]}],
            "result": [{"reference": "Observation/o1", "display": "eGFR"}, {"reference": "Observation/o2"}],
            "basedOn": [{"reference": "ServiceRequest/s1"}]
        }));

        let summary = format_diagnostic_report(&report);
        assert_eq!(summary.display, "Renal function panel");
        assert_eq!(summary.effective, "Mar 10, 2022");
        assert_eq!(summary.conclusion.as_deref(), Some("eGFR declining"));
        assert_eq!(summary.conclusion_codes, vec!["Chronic kidney disease stage 3"]);
        assert_eq!(summary.results, vec!["eGFR", "Observation/o2"]);
        assert_eq!(summary.based_on, vec!["ServiceRequest/s1"]);

        let empty = format_diagnostic_report(&resource(json!({"resourceType": "DiagnosticReport"})));
        assert_eq!(empty.display, "Unknown test");
        assert_eq!(empty.effective, "N/A");
    }

    #[test]
    fn test_format_service_request() {
        let request = resource(json!({
            "resourceType": "ServiceRequest",
            "status": "completed",
            "intent": "order",
            "code": {"text": "Renal function panel"},
            "authoredOn": "2022-03-01"
        }));

        let summary = format_service_request(&request);
        assert_eq!(summary.display, "Renal function panel");
        assert_eq!(summary.intent, "order");
        assert_eq!(summary.authored_on, "Mar 1, 2022");
    }
}
