use serde_json::{Value, json};

use super::{OrganizationRef, PatientRef, date_or_today, filled};
use crate::codes::{CONSULT_NOTE, LOINC};
use crate::error::{FhirChartError, Result};
use crate::narrative::xhtml_div;
use crate::Resource;

/// Sections of a consultation report, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsultationSection {
    ChiefComplaint,
    HistoryOfPresentIllness,
    PhysicalExam,
    Assessment,
    Plan,
    Notes,
}

impl ConsultationSection {
    pub const ALL: [ConsultationSection; 6] = [
        ConsultationSection::ChiefComplaint,
        ConsultationSection::HistoryOfPresentIllness,
        ConsultationSection::PhysicalExam,
        ConsultationSection::Assessment,
        ConsultationSection::Plan,
        ConsultationSection::Notes,
    ];

    pub fn loinc(&self) -> &'static str {
        match self {
            ConsultationSection::ChiefComplaint => "10154-3",
            ConsultationSection::HistoryOfPresentIllness => "10164-2",
            ConsultationSection::PhysicalExam => "29545-1",
            ConsultationSection::Assessment => "51848-0",
            ConsultationSection::Plan => "18776-5",
            ConsultationSection::Notes => "11506-3",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ConsultationSection::ChiefComplaint => "Chief Complaint",
            ConsultationSection::HistoryOfPresentIllness => "History of Present Illness",
            ConsultationSection::PhysicalExam => "Physical Examination",
            ConsultationSection::Assessment => "Assessment",
            ConsultationSection::Plan => "Plan",
            ConsultationSection::Notes => "Additional Notes",
        }
    }

    fn loinc_display(&self) -> &'static str {
        match self {
            ConsultationSection::ChiefComplaint => "Chief complaint Narrative - Reported",
            ConsultationSection::HistoryOfPresentIllness => "History of Present illness Narrative",
            ConsultationSection::PhysicalExam => "Physical findings Narrative",
            ConsultationSection::Assessment => "Evaluation note",
            ConsultationSection::Plan => "Plan of care note",
            ConsultationSection::Notes => "Progress note",
        }
    }
}

/// Consultation form as entered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultationForm {
    pub date: String,
    pub chief_complaint: String,
    pub history_of_present_illness: String,
    pub physical_exam: String,
    pub assessment: String,
    pub plan: String,
    pub notes: String,
}

impl ConsultationForm {
    pub fn field(&self, section: ConsultationSection) -> &str {
        match section {
            ConsultationSection::ChiefComplaint => &self.chief_complaint,
            ConsultationSection::HistoryOfPresentIllness => &self.history_of_present_illness,
            ConsultationSection::PhysicalExam => &self.physical_exam,
            ConsultationSection::Assessment => &self.assessment,
            ConsultationSection::Plan => &self.plan,
            ConsultationSection::Notes => &self.notes,
        }
    }
}

/// Build a consultation Composition with one section per filled-in field.
///
/// Section text is kept exactly as entered. At least one of chief complaint,
/// assessment or plan is required.
pub fn build_consultation(
    form: &ConsultationForm,
    patient: &PatientRef,
    organization: &OrganizationRef,
) -> Result<Resource> {
    let required = [
        ConsultationSection::ChiefComplaint,
        ConsultationSection::Assessment,
        ConsultationSection::Plan,
    ];
    if required.iter().all(|s| filled(form.field(*s)).is_none()) {
        return Err(FhirChartError::validation(
            "Enter a chief complaint, assessment or plan",
        ));
    }

    let sections: Vec<Value> = ConsultationSection::ALL
        .iter()
        .filter(|s| filled(form.field(**s)).is_some())
        .map(|s| section(*s, form.field(*s)))
        .collect();
    if sections.is_empty() {
        return Err(FhirChartError::validation("Consultation has no sections"));
    }

    let mut resource = Resource::new("Composition");
    resource.set("status", json!("final"));
    resource.set(
        "type",
        json!({
            "coding": [{"system": LOINC, "code": CONSULT_NOTE, "display": "Consult note"}],
            "text": "Consultation Report"
        }),
    );
    resource.set("category", json!([{"text": "Consultation"}]));
    resource.set("subject", patient.to_reference());
    resource.set("date", json!(date_or_today(&form.date)));
    resource.set("author", json!([organization.to_reference()]));
    resource.set("title", json!("Consultation Report"));
    resource.set("section", Value::Array(sections));
    Ok(resource)
}

fn section(kind: ConsultationSection, text: &str) -> Value {
    json!({
        "title": kind.title(),
        "code": {
            "coding": [{
                "system": LOINC,
                "code": kind.loinc(),
                "display": kind.loinc_display()
            }]
        },
        "text": {
            "status": "generated",
            "div": xhtml_div(text)
        }
    })
}
