//! Submission of new clinical documents built from chart forms

use fhirchart_core::builder::{
    ConsultationForm, LabTest, LabValuesForm, build_consultation, build_lab_observations,
};
use fhirchart_core::{PatientRef, Resource};

use crate::client::FhirClient;
use crate::error::{ClientError, SubmissionFailure, SubmitError};

/// Build and POST the lab-value Observations of a form.
///
/// The (at most two) Observations are sent concurrently. When any of them
/// fails, the error lists every failed item; the others remain created.
pub async fn submit_lab_values(
    client: &FhirClient,
    form: &LabValuesForm,
    patient: &PatientRef,
) -> Result<Vec<Resource>, SubmitError> {
    let built = build_lab_observations(form, patient, client.organization())?;
    let attempted = built.len();

    let mut pending = built.into_iter();
    let (first, second) = tokio::join!(
        submit_one(client, pending.next()),
        submit_one(client, pending.next()),
    );

    let mut created = Vec::with_capacity(attempted);
    let mut failures = Vec::new();
    for (test, result) in [first, second].into_iter().flatten() {
        match result {
            Ok(resource) => created.push(resource),
            Err(error) => failures.push(SubmissionFailure {
                label: test.label().to_string(),
                error,
            }),
        }
    }

    if failures.is_empty() {
        return Ok(created);
    }

    tracing::warn!(
        patient = %patient.id,
        attempted,
        failed = failures.len(),
        "Lab value submission incomplete"
    );
    Err(SubmitError::Failed {
        attempted,
        created: created.iter().filter_map(Resource::reference).collect(),
        failures,
    })
}

async fn submit_one(
    client: &FhirClient,
    item: Option<(LabTest, Resource)>,
) -> Option<(LabTest, Result<Resource, ClientError>)> {
    let (test, resource) = item?;
    Some((test, client.create(&resource).await))
}

/// Build and POST a consultation Composition.
pub async fn submit_consultation(
    client: &FhirClient,
    form: &ConsultationForm,
    patient: &PatientRef,
) -> Result<Resource, SubmitError> {
    let composition = build_consultation(form, patient, client.organization())?;

    client
        .create(&composition)
        .await
        .map_err(|error| SubmitError::Failed {
            attempted: 1,
            created: Vec::new(),
            failures: vec![SubmissionFailure {
                label: "Consultation".to_string(),
                error,
            }],
        })
}
