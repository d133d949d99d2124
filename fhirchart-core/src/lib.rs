pub mod builder;
pub mod codes;
pub mod date;
pub mod error;
pub mod format;
pub mod narrative;
pub mod operation_outcome;
pub mod resource;
pub mod search;

pub use builder::{OrganizationRef, PatientRef};
pub use error::{FhirChartError, Result};
pub use operation_outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use resource::{Meta, Resource, reference_to};
pub use search::{ResourceKind, SearchRequest, SortOrder};
