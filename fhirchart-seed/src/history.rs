//! The demo patient's clinical history as ready-to-POST resources.
//!
//! Builders here are pure: references to resources created earlier are
//! passed in as `Type/id` strings.

use fhirchart_core::builder::{ConsultationForm, LabTest};
use fhirchart_core::codes::{
    CONDITION_CLINICAL, CONDITION_VERIFICATION, LOINC, OBSERVATION_CATEGORY, RXNORM, SNOMED, UCUM,
};
use fhirchart_core::{OrganizationRef, PatientRef, Resource};
use serde_json::{Value, json};

use crate::config::PatientSettings;

/// Diagnoses, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnosis {
    Type2Diabetes,
    Hypertension,
    ChronicKidneyDisease,
    RenalAnemia,
}

impl Diagnosis {
    pub const ALL: [Diagnosis; 4] = [
        Diagnosis::Type2Diabetes,
        Diagnosis::Hypertension,
        Diagnosis::ChronicKidneyDisease,
        Diagnosis::RenalAnemia,
    ];

    pub fn snomed(&self) -> &'static str {
        match self {
            Diagnosis::Type2Diabetes => "44054006",
            Diagnosis::Hypertension => "38341003",
            Diagnosis::ChronicKidneyDisease => "433144002",
            Diagnosis::RenalAnemia => "707323002",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Diagnosis::Type2Diabetes => "Type 2 diabetes mellitus",
            Diagnosis::Hypertension => "Hypertensive disorder",
            Diagnosis::ChronicKidneyDisease => "Chronic kidney disease stage 3",
            Diagnosis::RenalAnemia => "Anemia in chronic kidney disease",
        }
    }

    pub fn onset(&self) -> &'static str {
        match self {
            Diagnosis::Type2Diabetes => "2015-06-10",
            Diagnosis::Hypertension => "2016-02-22",
            Diagnosis::ChronicKidneyDisease => "2019-09-05",
            Diagnosis::RenalAnemia => "2021-04-12",
        }
    }

    fn severity(&self) -> (&'static str, &'static str) {
        match self {
            Diagnosis::ChronicKidneyDisease | Diagnosis::RenalAnemia => ("6736007", "Moderate"),
            _ => ("255604002", "Mild"),
        }
    }
}

pub struct ProcedureEntry {
    pub snomed: &'static str,
    pub display: &'static str,
    pub performed: &'static str,
    pub reason: Diagnosis,
    pub note: &'static str,
}

pub const PROCEDURES: [ProcedureEntry; 3] = [
    ProcedureEntry {
        snomed: "134395001",
        display: "Diabetic retinopathy screening",
        performed: "2017-08-14",
        reason: Diagnosis::Type2Diabetes,
        note: "No retinopathy detected",
    },
    ProcedureEntry {
        snomed: "40701008",
        display: "Echocardiography",
        performed: "2018-11-02",
        reason: Diagnosis::Hypertension,
        note: "Mild concentric left ventricular hypertrophy",
    },
    ProcedureEntry {
        snomed: "306005",
        display: "Ultrasonography of kidney",
        performed: "2019-10-21",
        reason: Diagnosis::ChronicKidneyDisease,
        note: "Kidneys of normal size with increased echogenicity",
    },
];

/// One clinic visit's measurements
pub struct Visit {
    pub date: &'static str,
    pub systolic: u32,
    pub diastolic: u32,
    pub gfr: f64,
    pub hemoglobin: f64,
}

/// Yearly visits with a slow decline in kidney function
pub const VISITS: [Visit; 6] = [
    Visit { date: "2019-09-05", systolic: 148, diastolic: 92, gfr: 58.0, hemoglobin: 12.4 },
    Visit { date: "2020-09-14", systolic: 142, diastolic: 88, gfr: 52.0, hemoglobin: 11.8 },
    Visit { date: "2021-04-12", systolic: 138, diastolic: 86, gfr: 47.0, hemoglobin: 10.6 },
    Visit { date: "2022-03-15", systolic: 134, diastolic: 84, gfr: 44.0, hemoglobin: 10.9 },
    Visit { date: "2023-03-20", systolic: 131, diastolic: 82, gfr: 41.0, hemoglobin: 11.3 },
    Visit { date: "2024-05-06", systolic: 128, diastolic: 80, gfr: 38.0, hemoglobin: 11.6 },
];

pub struct MedicationEntry {
    pub rxnorm: Option<&'static str>,
    pub display: &'static str,
    pub authored_on: &'static str,
    pub reason: Diagnosis,
    pub dosage: Dosage,
}

pub enum Dosage {
    Text(&'static str),
    /// `dose unit` given `frequency` times per `period period_unit`
    Timed {
        dose: u32,
        unit: &'static str,
        frequency: u32,
        period: u32,
        period_unit: &'static str,
    },
}

pub const MEDICATIONS: [MedicationEntry; 3] = [
    MedicationEntry {
        rxnorm: Some("861007"),
        display: "metformin hydrochloride 500 MG Oral Tablet",
        authored_on: "2015-06-10",
        reason: Diagnosis::Type2Diabetes,
        dosage: Dosage::Text("500 mg twice daily with meals"),
    },
    MedicationEntry {
        rxnorm: Some("314076"),
        display: "lisinopril 10 MG Oral Tablet",
        authored_on: "2016-02-22",
        reason: Diagnosis::Hypertension,
        dosage: Dosage::Text("10 mg once daily"),
    },
    MedicationEntry {
        rxnorm: None,
        display: "Darbepoetin alfa 40 mcg/0.4 mL injection",
        authored_on: "2021-04-12",
        reason: Diagnosis::RenalAnemia,
        dosage: Dosage::Timed {
            dose: 40,
            unit: "mcg",
            frequency: 1,
            period: 2,
            period_unit: "wk",
        },
    },
];

pub const RENAL_PANEL: &str = "24362-6";

pub fn demo_patient(settings: &PatientSettings, organization: &OrganizationRef) -> Resource {
    let mut patient = Resource::new("Patient");
    patient.set("active", json!(true));
    patient.set(
        "name",
        json!([{
            "use": "official",
            "family": settings.family,
            "given": settings.given,
        }]),
    );
    patient.set("gender", json!(settings.gender));
    patient.set("birthDate", json!(settings.birth_date));
    patient.set(
        "telecom",
        json!([
            {"system": "phone", "value": settings.phone, "use": "home"},
            {"system": "email", "value": settings.email}
        ]),
    );
    patient.set(
        "address",
        json!([{
            "line": [settings.address_line],
            "city": settings.city,
            "state": settings.state,
            "postalCode": settings.postal_code,
        }]),
    );
    patient.set("managingOrganization", organization.to_reference());
    patient
}

pub fn condition(diagnosis: Diagnosis, patient: &PatientRef) -> Resource {
    let (severity_code, severity_display) = diagnosis.severity();

    let mut condition = Resource::new("Condition");
    condition.set(
        "clinicalStatus",
        json!({"coding": [{"system": CONDITION_CLINICAL, "code": "active"}]}),
    );
    condition.set(
        "verificationStatus",
        json!({"coding": [{"system": CONDITION_VERIFICATION, "code": "confirmed"}]}),
    );
    condition.set(
        "severity",
        json!({"coding": [{"system": SNOMED, "code": severity_code, "display": severity_display}]}),
    );
    condition.set("code", snomed_concept(diagnosis.snomed(), diagnosis.display()));
    condition.set("subject", patient.to_reference());
    condition.set("onsetDateTime", json!(diagnosis.onset()));
    condition.set("recordedDate", json!(diagnosis.onset()));
    condition
}

pub fn procedure(
    entry: &ProcedureEntry,
    patient: &PatientRef,
    organization: &OrganizationRef,
    reason: &str,
) -> Resource {
    let mut procedure = Resource::new("Procedure");
    procedure.set("status", json!("completed"));
    procedure.set("code", snomed_concept(entry.snomed, entry.display));
    procedure.set("subject", patient.to_reference());
    procedure.set("performedDateTime", json!(entry.performed));
    procedure.set("performer", json!([{"actor": organization.to_reference()}]));
    procedure.set(
        "reasonReference",
        json!([{"reference": reason, "display": entry.reason.display()}]),
    );
    procedure.set("note", json!([{"text": entry.note}]));
    procedure
}

pub fn blood_pressure(visit: &Visit, patient: &PatientRef, organization: &OrganizationRef) -> Resource {
    let component = |code: &str, display: &str, value: u32| {
        json!({
            "code": {"coding": [{"system": LOINC, "code": code, "display": display}], "text": display},
            "valueQuantity": {"value": value, "unit": "mmHg", "system": UCUM, "code": "mm[Hg]"}
        })
    };

    let mut observation = Resource::new("Observation");
    observation.set("status", json!("final"));
    observation.set(
        "category",
        json!([{"coding": [{"system": OBSERVATION_CATEGORY, "code": "vital-signs", "display": "Vital Signs"}]}]),
    );
    observation.set(
        "code",
        json!({
            "coding": [{"system": LOINC, "code": "85354-9", "display": "Blood pressure panel with all children optional"}],
            "text": "Blood pressure"
        }),
    );
    observation.set("subject", patient.to_reference());
    observation.set("effectiveDateTime", json!(visit.date));
    observation.set("performer", json!([organization.to_reference()]));
    observation.set(
        "component",
        json!([
            component("8480-6", "Systolic blood pressure", visit.systolic),
            component("8462-4", "Diastolic blood pressure", visit.diastolic)
        ]),
    );
    observation
}

pub fn medication_request(
    entry: &MedicationEntry,
    patient: &PatientRef,
    organization: &OrganizationRef,
    reason: &str,
) -> Resource {
    let medication = match entry.rxnorm {
        Some(code) => json!({
            "coding": [{"system": RXNORM, "code": code, "display": entry.display}],
            "text": entry.display
        }),
        None => json!({"text": entry.display}),
    };

    let dosage = match &entry.dosage {
        Dosage::Text(text) => json!({"text": text}),
        Dosage::Timed {
            dose,
            unit,
            frequency,
            period,
            period_unit,
        } => json!({
            "timing": {"repeat": {"frequency": frequency, "period": period, "periodUnit": period_unit}},
            "route": {"text": "Subcutaneous"},
            "doseAndRate": [{"doseQuantity": {"value": dose, "unit": unit, "system": UCUM, "code": unit}}]
        }),
    };

    let mut request = Resource::new("MedicationRequest");
    request.set("status", json!("active"));
    request.set("intent", json!("order"));
    request.set("medicationCodeableConcept", medication);
    request.set("subject", patient.to_reference());
    request.set("authoredOn", json!(entry.authored_on));
    request.set("requester", organization.to_reference());
    request.set(
        "reasonReference",
        json!([{"reference": reason, "display": entry.reason.display()}]),
    );
    request.set("dosageInstruction", json!([dosage]));
    request
}

pub fn renal_panel_request(
    patient: &PatientRef,
    organization: &OrganizationRef,
    authored_on: &str,
    reason: &str,
) -> Resource {
    let mut request = Resource::new("ServiceRequest");
    request.set("status", json!("completed"));
    request.set("intent", json!("order"));
    request.set("code", renal_panel_concept());
    request.set("subject", patient.to_reference());
    request.set("authoredOn", json!(authored_on));
    request.set("requester", organization.to_reference());
    request.set(
        "reasonReference",
        json!([{"reference": reason, "display": Diagnosis::ChronicKidneyDisease.display()}]),
    );
    request
}

pub fn renal_panel_report(
    patient: &PatientRef,
    organization: &OrganizationRef,
    effective: &str,
    based_on: &str,
    results: &[(LabTest, String)],
) -> Resource {
    let results: Vec<Value> = results
        .iter()
        .map(|(test, reference)| json!({"reference": reference, "display": test.label()}))
        .collect();

    let mut report = Resource::new("DiagnosticReport");
    report.set("status", json!("final"));
    report.set(
        "category",
        json!([{"coding": [{"system": "http://terminology.hl7.org/CodeSystem/v2-0074", "code": "LAB", "display": "Laboratory"}]}]),
    );
    report.set("code", renal_panel_concept());
    report.set("subject", patient.to_reference());
    report.set("effectiveDateTime", json!(effective));
    report.set("issued", json!(format!("{}T16:00:00Z", effective)));
    report.set("performer", json!([organization.to_reference()]));
    report.set("basedOn", json!([{"reference": based_on, "display": "Renal function panel order"}]));
    report.set("result", json!(results));
    report.set(
        "conclusion",
        json!("eGFR continues to decline slowly, consistent with CKD stage 3b. Hemoglobin improved on ESA therapy."),
    );
    report.set(
        "conclusionCode",
        json!([snomed_concept(
            Diagnosis::ChronicKidneyDisease.snomed(),
            Diagnosis::ChronicKidneyDisease.display()
        )]),
    );
    report
}

/// Consultation notes written at two of the visits
pub fn consultation_forms() -> Vec<ConsultationForm> {
    vec![
        ConsultationForm {
            date: "2022-03-15".to_string(),
            chief_complaint: "Follow-up of CKD and anemia".to_string(),
            history_of_present_illness:
                "Reports mild fatigue. Started darbepoetin last spring, tolerating injections."
                    .to_string(),
            physical_exam: "BP 134/84. No peripheral edema.".to_string(),
            assessment: "CKD stage 3b, stable. Anemia of CKD responding to ESA.".to_string(),
            plan: "Continue lisinopril and darbepoetin. Repeat renal panel in 12 months."
                .to_string(),
            notes: String::new(),
        },
        ConsultationForm {
            date: "2024-05-20".to_string(),
            chief_complaint: "Annual nephrology review".to_string(),
            history_of_present_illness: "No new symptoms. Glucose well controlled on metformin."
                .to_string(),
            physical_exam: "BP 128/80. Heart and lungs normal.".to_string(),
            assessment: "eGFR 38, slow decline. Metformin dose at upper limit for this eGFR."
                .to_string(),
            plan: "Reduce metformin if eGFR falls below 30. Dietitian referral.".to_string(),
            notes: "Patient prefers morning appointments.".to_string(),
        },
    ]
}

fn snomed_concept(code: &str, display: &str) -> Value {
    json!({
        "coding": [{"system": SNOMED, "code": code, "display": display}],
        "text": display
    })
}

fn renal_panel_concept() -> Value {
    json!({
        "coding": [{"system": LOINC, "code": RENAL_PANEL, "display": "Renal function panel - Serum or Plasma"}],
        "text": "Renal function panel"
    })
}
