//! Search request shapes for the resource types this client reads.

use std::fmt;

use crate::resource::reference_to;

/// Page size for organization patient listings
pub const PATIENT_PAGE_SIZE: usize = 100;

/// Page size for per-patient clinical listings
pub const CLINICAL_PAGE_SIZE: usize = 50;

/// Resource types read or written by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patient,
    Condition,
    Procedure,
    MedicationRequest,
    DiagnosticReport,
    Observation,
    Composition,
    ServiceRequest,
}

impl ResourceKind {
    pub const CLINICAL: [ResourceKind; 7] = [
        ResourceKind::Condition,
        ResourceKind::Procedure,
        ResourceKind::MedicationRequest,
        ResourceKind::DiagnosticReport,
        ResourceKind::Observation,
        ResourceKind::Composition,
        ResourceKind::ServiceRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Condition => "Condition",
            ResourceKind::Procedure => "Procedure",
            ResourceKind::MedicationRequest => "MedicationRequest",
            ResourceKind::DiagnosticReport => "DiagnosticReport",
            ResourceKind::Observation => "Observation",
            ResourceKind::Composition => "Composition",
            ResourceKind::ServiceRequest => "ServiceRequest",
        }
    }

    /// Search parameter for the resource's natural date, used for sorting.
    pub fn date_search_param(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Patient => None,
            ResourceKind::Condition => Some("onset-date"),
            ResourceKind::MedicationRequest => Some("authoredon"),
            ResourceKind::ServiceRequest => Some("authored"),
            ResourceKind::Procedure
            | ResourceKind::DiagnosticReport
            | ResourceKind::Observation
            | ResourceKind::Composition => Some("date"),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for `_sort`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A search against `{base}/{ResourceType}?{query}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub kind: ResourceKind,
    pub parameters: Vec<(String, String)>,
    pub sort: Option<(String, SortOrder)>,
    pub count: Option<usize>,
}

impl SearchRequest {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            parameters: Vec::new(),
            sort: None,
            count: None,
        }
    }

    /// Patients managed by an organization
    pub fn patients_of(organization_id: &str) -> Self {
        Self::new(ResourceKind::Patient)
            .with_param("organization", reference_to("Organization", organization_id))
            .with_count(PATIENT_PAGE_SIZE)
    }

    /// Clinical records of one patient, newest first
    pub fn for_patient(kind: ResourceKind, patient_id: &str) -> Self {
        let request = Self::new(kind)
            .with_param("subject", reference_to("Patient", patient_id))
            .with_count(CLINICAL_PAGE_SIZE);

        match kind.date_search_param() {
            Some(field) => request.with_sort(field, SortOrder::Descending),
            None => request,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Encode as a URL query string (without the leading `?`).
    ///
    /// Reference values keep their `/` so the query reads `subject=Patient/1`.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = self
            .parameters
            .iter()
            .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
            .collect();

        if let Some((field, order)) = &self.sort {
            let prefix = match order {
                SortOrder::Ascending => "",
                SortOrder::Descending => "-",
            };
            pairs.push(format!("_sort={}{}", prefix, encode(field)));
        }

        if let Some(count) = self.count {
            pairs.push(format!("_count={}", count));
        }

        pairs.join("&")
    }

    /// Relative URL `{ResourceType}?{query}`
    pub fn path_and_query(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            self.kind.as_str().to_string()
        } else {
            format!("{}?{}", self.kind, query)
        }
    }
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).replace("%2F", "/")
}
