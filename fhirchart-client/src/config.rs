use fhirchart_core::OrganizationRef;
use serde::{Deserialize, Serialize};

/// Connection settings for the remote FHIR server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the FHIR R4 endpoint, without trailing slash
    pub base_url: String,
    /// Organization whose patients are listed and which authors new documents
    pub organization_id: String,
    pub organization_name: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/fhir".to_string(),
            organization_id: "demo-organization".to_string(),
            organization_name: "Demo Nephrology Clinic".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            organization_id: organization_id.into(),
            ..Default::default()
        }
    }

    /// Override fields from `FHIRCHART_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(base_url) = std::env::var("FHIRCHART_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(org_id) = std::env::var("FHIRCHART_ORG_ID") {
            self.organization_id = org_id;
        }

        if let Ok(org_name) = std::env::var("FHIRCHART_ORG_NAME") {
            self.organization_name = org_name;
        }

        if let Ok(timeout) = std::env::var("FHIRCHART_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse()
        {
            self.timeout_secs = secs;
        }
    }

    pub fn organization(&self) -> OrganizationRef {
        OrganizationRef::new(&self.organization_id, &self.organization_name)
    }
}
