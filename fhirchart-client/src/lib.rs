//! fhirchart-client - FHIR R4 access for the clinical chart
//!
//! Reads an organization's patients and their clinical records from a
//! remote FHIR server and submits new lab values and consultation reports.

pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod submit;

pub use chart::{ChartSection, PatientChart, PatientDirectory, ViewState};
pub use client::{DeleteOutcome, FhirClient};
pub use config::ClientConfig;
pub use error::{ClientError, Result, SubmissionFailure, SubmitError};
pub use submit::{submit_consultation, submit_lab_values};
