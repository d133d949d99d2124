use serde_json::{Value, json};

use super::{OrganizationRef, PatientRef, date_or_today, filled};
use crate::codes::{LOINC, OBSERVATION_CATEGORY, UCUM};
use crate::error::{FhirChartError, Result};
use crate::Resource;

/// Lab values that can be entered from the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabTest {
    Gfr,
    Hemoglobin,
}

impl LabTest {
    pub fn loinc(&self) -> &'static str {
        match self {
            LabTest::Gfr => "33914-3",
            LabTest::Hemoglobin => "718-7",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            LabTest::Gfr => {
                "Glomerular filtration rate/1.73 sq M.predicted [Volume Rate/Area] in Serum or Plasma by Creatinine-based formula (MDRD)"
            }
            LabTest::Hemoglobin => "Hemoglobin [Mass/volume] in Blood",
        }
    }

    /// Short label used in forms and error messages
    pub fn label(&self) -> &'static str {
        match self {
            LabTest::Gfr => "GFR",
            LabTest::Hemoglobin => "Hemoglobin",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            LabTest::Gfr => "mL/min/1.73m2",
            LabTest::Hemoglobin => "g/dL",
        }
    }
}

/// Lab-values form as entered: every field is raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabValuesForm {
    pub gfr: String,
    pub hemoglobin: String,
    pub date: String,
}

/// Observation for a single laboratory value.
pub fn lab_observation(
    test: LabTest,
    value: f64,
    effective: &str,
    patient: &PatientRef,
    organization: &OrganizationRef,
) -> Resource {
    let mut resource = Resource::new("Observation");
    resource.set("status", json!("final"));
    resource.set(
        "category",
        json!([{
            "coding": [{
                "system": OBSERVATION_CATEGORY,
                "code": "laboratory",
                "display": "Laboratory"
            }]
        }]),
    );
    resource.set(
        "code",
        json!({
            "coding": [{
                "system": LOINC,
                "code": test.loinc(),
                "display": test.display()
            }],
            "text": test.label()
        }),
    );
    resource.set("subject", patient.to_reference());
    resource.set("effectiveDateTime", json!(effective));
    resource.set("performer", json!([organization.to_reference()]));
    resource.set(
        "valueQuantity",
        json!({
            "value": quantity_value(value),
            "unit": test.unit(),
            "system": UCUM,
            "code": test.unit()
        }),
    );
    resource
}

/// Whole numbers are sent as JSON integers so `14` reads back as `14`, not `14.0`.
fn quantity_value(value: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// One Observation per filled-in lab value, GFR first.
///
/// Fails when a value is not a non-negative number or when both are blank.
pub fn build_lab_observations(
    form: &LabValuesForm,
    patient: &PatientRef,
    organization: &OrganizationRef,
) -> Result<Vec<(LabTest, Resource)>> {
    let entries = [
        (LabTest::Gfr, form.gfr.as_str()),
        (LabTest::Hemoglobin, form.hemoglobin.as_str()),
    ];

    let mut values = Vec::with_capacity(entries.len());
    for (test, raw) in entries {
        if let Some(raw) = filled(raw) {
            values.push((test, parse_lab_value(test, raw)?));
        }
    }

    if values.is_empty() {
        return Err(FhirChartError::validation(
            "Enter at least one lab value (GFR or Hemoglobin)",
        ));
    }

    let effective = date_or_today(&form.date);
    Ok(values
        .into_iter()
        .map(|(test, value)| {
            (
                test,
                lab_observation(test, value, &effective, patient, organization),
            )
        })
        .collect())
}

fn parse_lab_value(test: LabTest, raw: &str) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        Ok(_) => Err(FhirChartError::validation(format!(
            "{} must be zero or greater, got '{}'",
            test.label(),
            raw
        ))),
        Err(_) => Err(FhirChartError::validation(format!(
            "{} must be a number, got '{}'",
            test.label(),
            raw
        ))),
    }
}
