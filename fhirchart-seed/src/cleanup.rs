//! Removal of an organization's patients and everything recorded about them

use fhirchart_client::{DeleteOutcome, FhirClient};
use fhirchart_core::{ResourceKind, reference_to};

use crate::error::Result;

/// Dependent resource types in deletion order, with whether to cascade.
///
/// Reports and requests go before the records they point at; the Patient
/// itself is deleted last.
pub const DELETE_ORDER: [(ResourceKind, bool); 7] = [
    (ResourceKind::DiagnosticReport, false),
    (ResourceKind::ServiceRequest, false),
    (ResourceKind::MedicationRequest, false),
    (ResourceKind::Procedure, true),
    (ResourceKind::Composition, false),
    (ResourceKind::Observation, false),
    (ResourceKind::Condition, true),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub patients: usize,
    pub deleted: usize,
    pub warnings: Vec<String>,
}

impl CleanupReport {
    fn record(&mut self, resource_type: &str, id: &str, outcome: DeleteOutcome) {
        let reference = reference_to(resource_type, id);
        match outcome {
            DeleteOutcome::Deleted => self.deleted += 1,
            DeleteOutcome::DeletedWithoutCascade => {
                self.deleted += 1;
                self.warnings
                    .push(format!("Deleted {} without cascade", reference));
            }
            DeleteOutcome::Failed(e) => self
                .warnings
                .push(format!("Failed to delete {}: {}", reference, e)),
        }
    }
}

/// Delete every patient of the configured organization with their records.
///
/// Only listing the patients can fail; individual deletion failures end up
/// in [`CleanupReport::warnings`] and the batch carries on.
pub async fn cleanup_organization(client: &FhirClient) -> Result<CleanupReport> {
    let patients = client.list_patients().await?;
    tracing::info!(
        organization = %client.organization().id,
        count = patients.len(),
        "Cleaning up existing patients"
    );

    let mut report = CleanupReport::default();
    for patient in &patients {
        let Some(id) = patient.id.as_deref() else {
            continue;
        };
        cleanup_patient(client, id, &mut report).await;
        report.patients += 1;
    }

    tracing::info!(
        patients = report.patients,
        deleted = report.deleted,
        warnings = report.warnings.len(),
        "Cleanup complete"
    );
    Ok(report)
}

async fn cleanup_patient(client: &FhirClient, patient_id: &str, report: &mut CleanupReport) {
    for (kind, cascade) in DELETE_ORDER {
        let resources = match client.list_for_patient(kind, patient_id).await {
            Ok(resources) => resources,
            Err(e) => {
                tracing::warn!(patient = patient_id, resource_type = %kind, error = %e, "Failed to list");
                report.warnings.push(format!(
                    "Failed to list {} for {}: {}",
                    kind,
                    reference_to("Patient", patient_id),
                    e
                ));
                continue;
            }
        };

        for resource in &resources {
            if let Some(id) = resource.id.as_deref() {
                let outcome = client.delete_lenient(kind.as_str(), id, cascade).await;
                report.record(kind.as_str(), id, outcome);
            }
        }
    }

    let outcome = client.delete_lenient("Patient", patient_id, false).await;
    report.record("Patient", patient_id, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhirchart_client::ClientError;

    #[test]
    fn test_delete_order() {
        let order: Vec<&str> = DELETE_ORDER.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "DiagnosticReport",
                "ServiceRequest",
                "MedicationRequest",
                "Procedure",
                "Composition",
                "Observation",
                "Condition"
            ]
        );

        let cascading: Vec<&str> = DELETE_ORDER
            .iter()
            .filter(|(_, cascade)| *cascade)
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(cascading, vec!["Procedure", "Condition"]);
    }

    #[test]
    fn test_report_records_outcomes() {
        let mut report = CleanupReport::default();
        report.record("Observation", "o1", DeleteOutcome::Deleted);
        report.record("Condition", "c1", DeleteOutcome::DeletedWithoutCascade);
        report.record(
            "Procedure",
            "p1",
            DeleteOutcome::Failed(ClientError::Status {
                status: 409,
                diagnostics: Some("referenced".to_string()),
            }),
        );

        assert_eq!(report.deleted, 2);
        assert_eq!(
            report.warnings,
            vec![
                "Deleted Condition/c1 without cascade",
                "Failed to delete Procedure/p1: HTTP 409: referenced"
            ]
        );
    }
}
