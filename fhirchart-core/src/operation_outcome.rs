use serde::Deserialize;

/// FHIR OperationOutcome resource for error reporting
/// See: https://www.hl7.org/fhir/operationoutcome.html
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    pub id: Option<String>,
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    pub code: IssueType,
    pub diagnostics: Option<String>,
    pub expression: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// Issue codes this client inspects. Codes outside this set
/// deserialize as `Unknown` so a server's outcome is never rejected.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Invalid,
    Structure,
    Required,
    Value,
    Processing,
    NotSupported,
    NotFound,
    CodeInvalid,
    BusinessRule,
    Conflict,
    Exception,
    Informational,
    #[serde(other)]
    Unknown,
}

impl OperationOutcome {
    /// First `issue[].diagnostics` string carried by the outcome.
    pub fn first_diagnostics(&self) -> Option<&str> {
        self.issue
            .iter()
            .find_map(|issue| issue.diagnostics.as_deref())
    }

    /// Best-effort parse of an error response body.
    ///
    /// Returns `None` when the body is not an OperationOutcome.
    pub fn parse_body(body: &str) -> Option<Self> {
        let outcome: Self = serde_json::from_str(body).ok()?;
        (outcome.resource_type == "OperationOutcome").then_some(outcome)
    }
}
