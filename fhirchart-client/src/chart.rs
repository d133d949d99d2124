//! Per-view state for the patient list and a patient's chart.
//!
//! Each section is fetched only when the collaborator asks for it
//! ([`PatientChart::expand`]). Fetch errors are kept in the section's
//! [`ViewState`] and never escape the view.

use fhirchart_core::builder::{ConsultationForm, LabValuesForm};
use fhirchart_core::format::{
    CompositionSummary, ConditionSummary, DiagnosticReportSummary, MedicationRequestSummary,
    ObservationGroups, PatientSummary, ProcedureSummary, ServiceRequestSummary, format_composition,
    format_condition, format_diagnostic_report, format_medication_request, format_observation,
    format_patient, format_procedure, format_service_request, group_observations,
};
use fhirchart_core::{PatientRef, Resource, ResourceKind};

use crate::client::FhirClient;
use crate::error::{ClientError, SubmitError};
use crate::submit::{submit_consultation, submit_lab_values};

/// Load state of one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState<T> {
    #[default]
    NotLoaded,
    Loaded(T),
    /// Display message of the last failed fetch
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ViewState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => ViewState::Loaded(data),
            Err(e) => ViewState::Failed(e.to_string()),
        }
    }
}

/// The organization's patient list
#[derive(Debug, Clone, Default)]
pub struct PatientDirectory {
    pub patients: ViewState<Vec<PatientSummary>>,
}

impl PatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a fresh fetch.
    pub async fn refresh(&mut self, client: &FhirClient) {
        let result = client
            .list_patients()
            .await
            .map(|patients| patients.iter().map(format_patient).collect());
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to load patients");
        }
        self.patients = ViewState::from_result(result);
    }
}

/// Expandable sections of a patient's chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSection {
    Conditions,
    Procedures,
    Medications,
    DiagnosticReports,
    Observations,
    Consultations,
    ServiceRequests,
}

impl ChartSection {
    pub const ALL: [ChartSection; 7] = [
        ChartSection::Conditions,
        ChartSection::Procedures,
        ChartSection::Medications,
        ChartSection::DiagnosticReports,
        ChartSection::Observations,
        ChartSection::Consultations,
        ChartSection::ServiceRequests,
    ];

    pub fn kind(&self) -> ResourceKind {
        match self {
            ChartSection::Conditions => ResourceKind::Condition,
            ChartSection::Procedures => ResourceKind::Procedure,
            ChartSection::Medications => ResourceKind::MedicationRequest,
            ChartSection::DiagnosticReports => ResourceKind::DiagnosticReport,
            ChartSection::Observations => ResourceKind::Observation,
            ChartSection::Consultations => ResourceKind::Composition,
            ChartSection::ServiceRequests => ResourceKind::ServiceRequest,
        }
    }
}

/// One patient's chart, each section loaded on demand
#[derive(Debug, Clone)]
pub struct PatientChart {
    patient: PatientRef,
    pub conditions: ViewState<Vec<ConditionSummary>>,
    pub procedures: ViewState<Vec<ProcedureSummary>>,
    pub medications: ViewState<Vec<MedicationRequestSummary>>,
    pub diagnostic_reports: ViewState<Vec<DiagnosticReportSummary>>,
    pub observations: ViewState<ObservationGroups>,
    pub consultations: ViewState<Vec<CompositionSummary>>,
    pub service_requests: ViewState<Vec<ServiceRequestSummary>>,
}

impl PatientChart {
    pub fn new(patient: PatientRef) -> Self {
        Self {
            patient,
            conditions: ViewState::NotLoaded,
            procedures: ViewState::NotLoaded,
            medications: ViewState::NotLoaded,
            diagnostic_reports: ViewState::NotLoaded,
            observations: ViewState::NotLoaded,
            consultations: ViewState::NotLoaded,
            service_requests: ViewState::NotLoaded,
        }
    }

    pub fn for_patient(summary: &PatientSummary) -> Self {
        Self::new(PatientRef::new(&summary.id, &summary.name))
    }

    pub fn patient(&self) -> &PatientRef {
        &self.patient
    }

    pub fn is_loaded(&self, section: ChartSection) -> bool {
        match section {
            ChartSection::Conditions => self.conditions.is_loaded(),
            ChartSection::Procedures => self.procedures.is_loaded(),
            ChartSection::Medications => self.medications.is_loaded(),
            ChartSection::DiagnosticReports => self.diagnostic_reports.is_loaded(),
            ChartSection::Observations => self.observations.is_loaded(),
            ChartSection::Consultations => self.consultations.is_loaded(),
            ChartSection::ServiceRequests => self.service_requests.is_loaded(),
        }
    }

    /// Fetch a section unless it is already loaded.
    pub async fn expand(&mut self, client: &FhirClient, section: ChartSection) {
        if !self.is_loaded(section) {
            self.refresh(client, section).await;
        }
    }

    /// Fetch a section, replacing whatever it held.
    pub async fn refresh(&mut self, client: &FhirClient, section: ChartSection) {
        let result = client
            .list_for_patient(section.kind(), &self.patient.id)
            .await;
        if let Err(e) = &result {
            tracing::warn!(
                patient = %self.patient.id,
                section = ?section,
                error = %e,
                "Failed to load chart section"
            );
        }

        match section {
            ChartSection::Conditions => self.conditions = summarize(result, format_condition),
            ChartSection::Procedures => self.procedures = summarize(result, format_procedure),
            ChartSection::Medications => {
                self.medications = summarize(result, format_medication_request)
            }
            ChartSection::DiagnosticReports => {
                self.diagnostic_reports = summarize(result, format_diagnostic_report)
            }
            ChartSection::Observations => {
                self.observations = ViewState::from_result(result.map(|resources| {
                    group_observations(resources.iter().map(format_observation))
                }))
            }
            ChartSection::Consultations => {
                self.consultations = summarize(result, format_composition)
            }
            ChartSection::ServiceRequests => {
                self.service_requests = summarize(result, format_service_request)
            }
        }
    }

    /// Submit lab values; a loaded observations section is refreshed afterwards.
    pub async fn submit_lab_values(
        &mut self,
        client: &FhirClient,
        form: &LabValuesForm,
    ) -> Result<Vec<Resource>, SubmitError> {
        let result = submit_lab_values(client, form, &self.patient).await;
        if created_any(&result) && self.observations.is_loaded() {
            self.refresh(client, ChartSection::Observations).await;
        }
        result
    }

    /// Submit a consultation; a loaded consultations section is refreshed afterwards.
    pub async fn submit_consultation(
        &mut self,
        client: &FhirClient,
        form: &ConsultationForm,
    ) -> Result<Resource, SubmitError> {
        let result = submit_consultation(client, form, &self.patient).await;
        if result.is_ok() && self.consultations.is_loaded() {
            self.refresh(client, ChartSection::Consultations).await;
        }
        result
    }
}

fn summarize<T>(
    result: Result<Vec<Resource>, ClientError>,
    format: fn(&Resource) -> T,
) -> ViewState<Vec<T>> {
    ViewState::from_result(result.map(|resources| resources.iter().map(format).collect()))
}

fn created_any<T>(result: &Result<T, SubmitError>) -> bool {
    match result {
        Ok(_) => true,
        Err(SubmitError::Failed { created, .. }) => !created.is_empty(),
        Err(SubmitError::Validation(_)) => false,
    }
}
