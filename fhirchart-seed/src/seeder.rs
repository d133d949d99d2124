use std::collections::HashMap;

use fhirchart_client::{ClientError, FhirClient};
use fhirchart_core::builder::{LabTest, build_consultation, lab_observation};
use fhirchart_core::{PatientRef, Resource, reference_to};

use crate::config::PatientSettings;
use crate::error::{Result, SeedError};
use crate::history::{
    Diagnosis, MEDICATIONS, PROCEDURES, VISITS, blood_pressure, condition, consultation_forms,
    demo_patient, medication_request, procedure, renal_panel_request, renal_panel_report,
};

/// Date the renal panel behind the final report was ordered
const PANEL_ORDERED: &str = "2024-05-02";
const LAST_VISIT: &str = VISITS[VISITS.len() - 1].date;

/// References created by a seed run, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub patient: String,
    pub created: Vec<String>,
}

impl SeedReport {
    pub fn count(&self, resource_type: &str) -> usize {
        let prefix = format!("{}/", resource_type);
        self.created.iter().filter(|r| r.starts_with(&prefix)).count()
    }
}

/// Creates the demo patient and its history one resource at a time.
///
/// Later resources reference the server-assigned ids of earlier ones, so
/// nothing is sent concurrently and the first rejection stops the run.
pub struct Seeder<'a> {
    client: &'a FhirClient,
    created: Vec<String>,
}

impl<'a> Seeder<'a> {
    pub fn new(client: &'a FhirClient) -> Self {
        Self {
            client,
            created: Vec::new(),
        }
    }

    async fn create(&mut self, label: &str, resource: Resource) -> Result<String> {
        let created = self
            .client
            .create(&resource)
            .await
            .map_err(|source| SeedError::Create {
                label: label.to_string(),
                source,
            })?;

        let reference = created
            .reference()
            .ok_or_else(|| ClientError::MissingId(resource.resource_type.clone()))?;
        tracing::debug!(label, reference = %reference, "Seeded");
        self.created.push(reference.clone());
        Ok(reference)
    }

    pub async fn seed(mut self, settings: &PatientSettings) -> Result<SeedReport> {
        let organization = self.client.organization().clone();

        let patient_reference = self
            .create("Patient", demo_patient(settings, &organization))
            .await?;
        let patient_id = patient_reference
            .strip_prefix("Patient/")
            .unwrap_or(&patient_reference);
        let patient = PatientRef::new(patient_id, settings.display_name());
        tracing::info!(patient = %patient_reference, name = %patient.display, "Created demo patient");

        let mut conditions = HashMap::new();
        for diagnosis in Diagnosis::ALL {
            let reference = self
                .create(diagnosis.display(), condition(diagnosis, &patient))
                .await?;
            conditions.insert(diagnosis, reference);
        }

        for entry in &PROCEDURES {
            let reason = reason_for(&conditions, entry.reason);
            self.create(entry.display, procedure(entry, &patient, &organization, reason))
                .await?;
        }

        let mut latest_labs = Vec::new();
        for visit in &VISITS {
            self.create("Blood pressure", blood_pressure(visit, &patient, &organization))
                .await?;

            latest_labs.clear();
            for (test, value) in [(LabTest::Gfr, visit.gfr), (LabTest::Hemoglobin, visit.hemoglobin)] {
                let reference = self
                    .create(
                        test.label(),
                        lab_observation(test, value, visit.date, &patient, &organization),
                    )
                    .await?;
                latest_labs.push((test, reference));
            }
        }

        for entry in &MEDICATIONS {
            let reason = reason_for(&conditions, entry.reason);
            self.create(
                entry.display,
                medication_request(entry, &patient, &organization, reason),
            )
            .await?;
        }

        let order = self
            .create(
                "Renal function panel order",
                renal_panel_request(
                    &patient,
                    &organization,
                    PANEL_ORDERED,
                    reason_for(&conditions, Diagnosis::ChronicKidneyDisease),
                ),
            )
            .await?;
        self.create(
            "Renal function panel report",
            renal_panel_report(&patient, &organization, LAST_VISIT, &order, &latest_labs),
        )
        .await?;

        for form in consultation_forms() {
            let composition = build_consultation(&form, &patient, &organization)?;
            self.create("Consultation", composition).await?;
        }

        tracing::info!(
            patient = %patient_reference,
            created = self.created.len(),
            "Seed complete"
        );
        Ok(SeedReport {
            patient: reference_to("Patient", &patient.id),
            created: self.created,
        })
    }
}

fn reason_for(conditions: &HashMap<Diagnosis, String>, diagnosis: Diagnosis) -> &str {
    conditions.get(&diagnosis).map(String::as_str).unwrap_or_default()
}
