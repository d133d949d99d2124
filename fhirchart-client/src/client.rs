//! Async client for the remote FHIR R4 REST API

use std::time::Duration;

use fhirchart_core::codes::FHIR_JSON;
use fhirchart_core::{OperationOutcome, OrganizationRef, Resource, ResourceKind, SearchRequest};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Search result envelope. Only `entry[].resource` is consumed.
#[derive(Debug, Deserialize)]
struct SearchBundle {
    #[serde(default)]
    entry: Option<Vec<BundleEntry>>,
}

#[derive(Debug, Deserialize)]
struct BundleEntry {
    resource: Option<Resource>,
}

/// Result of a lenient delete
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    /// The cascading delete failed and a plain delete succeeded
    DeletedWithoutCascade,
    Failed(ClientError),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        !matches!(self, DeleteOutcome::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
    organization: OrganizationRef,
}

impl FhirClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/');

        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("'{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "'{}': scheme must be http or https",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(base_url, organization = %config.organization_id, "FHIR client ready");

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            organization: config.organization(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn organization(&self) -> &OrganizationRef {
        &self.organization
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Run a search and return the matched resources in server order.
    ///
    /// A Bundle without `entry` is an empty result.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Resource>> {
        let url = self.url(&request.path_and_query());
        tracing::debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;
        let bundle: SearchBundle = handle_response(response).await?;

        let resources: Vec<Resource> = bundle
            .entry
            .unwrap_or_default()
            .into_iter()
            .filter_map(|e| e.resource)
            .collect();

        tracing::debug!(
            resource_type = %request.kind,
            count = resources.len(),
            "Search complete"
        );
        Ok(resources)
    }

    /// Patients managed by the configured organization
    pub async fn list_patients(&self) -> Result<Vec<Resource>> {
        self.search(&SearchRequest::patients_of(&self.organization.id))
            .await
    }

    /// Records of one kind for a patient, newest first
    pub async fn list_for_patient(
        &self,
        kind: ResourceKind,
        patient_id: &str,
    ) -> Result<Vec<Resource>> {
        self.search(&SearchRequest::for_patient(kind, patient_id))
            .await
    }

    pub async fn read(&self, resource_type: &str, id: &str) -> Result<Resource> {
        let url = self.url(&format!("{}/{}", resource_type, id));
        tracing::debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;
        handle_response(response).await
    }

    /// POST a new resource and return the server's copy, including its id.
    pub async fn create(&self, resource: &Resource) -> Result<Resource> {
        let url = self.url(&resource.resource_type);
        let body = serde_json::to_vec(resource)?;
        tracing::debug!(url = %url, "POST");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, FHIR_JSON)
            .header(ACCEPT, FHIR_JSON)
            .body(body)
            .send()
            .await?;
        let created: Resource = handle_response(response).await?;

        let reference = created
            .reference()
            .ok_or_else(|| ClientError::MissingId(resource.resource_type.clone()))?;
        tracing::info!(reference = %reference, "Created resource");
        Ok(created)
    }

    /// DELETE `{type}/{id}`, with `_cascade=delete` when `cascade` is set.
    pub async fn delete(&self, resource_type: &str, id: &str, cascade: bool) -> Result<()> {
        let mut url = self.url(&format!("{}/{}", resource_type, id));
        if cascade {
            url.push_str("?_cascade=delete");
        }
        tracing::debug!(url = %url, "DELETE");

        let response = self
            .http
            .delete(&url)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(status_error(status.as_u16(), response).await)
    }

    /// Delete without failing the caller.
    ///
    /// A failed cascading delete is retried once without cascade. A final
    /// failure is logged as a warning and returned as [`DeleteOutcome::Failed`].
    pub async fn delete_lenient(&self, resource_type: &str, id: &str, cascade: bool) -> DeleteOutcome {
        let first = match self.delete(resource_type, id, cascade).await {
            Ok(()) => return DeleteOutcome::Deleted,
            Err(e) => e,
        };

        if !cascade {
            tracing::warn!(resource_type, id, error = %first, "Delete failed");
            return DeleteOutcome::Failed(first);
        }

        tracing::warn!(
            resource_type,
            id,
            error = %first,
            "Cascading delete failed, retrying without cascade"
        );
        match self.delete(resource_type, id, false).await {
            Ok(()) => DeleteOutcome::DeletedWithoutCascade,
            Err(e) => {
                tracing::warn!(resource_type, id, error = %e, "Delete failed");
                DeleteOutcome::Failed(e)
            }
        }
    }
}

/// Decode a success body, or turn a non-2xx response into `ClientError::Status`.
async fn handle_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status.as_u16(), response).await);
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

async fn status_error(status: u16, response: reqwest::Response) -> ClientError {
    let body = response.text().await.unwrap_or_default();
    let diagnostics = OperationOutcome::parse_body(&body)
        .and_then(|outcome| outcome.first_diagnostics().map(str::to_string));

    tracing::debug!(status, diagnostics = ?diagnostics, "Request rejected");
    ClientError::Status { status, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_slash() {
        let client = FhirClient::new(&ClientConfig::new("https://fhir.example.org/r4/", "org-1")).unwrap();
        assert_eq!(client.base_url(), "https://fhir.example.org/r4");
        assert_eq!(client.organization().id, "org-1");
        assert_eq!(client.url("Patient/1"), "https://fhir.example.org/r4/Patient/1");
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let err = FhirClient::new(&ClientConfig::new("not a url", "org-1")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));

        let err = FhirClient::new(&ClientConfig::new("ftp://fhir.example.org", "org-1")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_bundle_without_entry() {
        let bundle: SearchBundle =
            serde_json::from_str(r#"{"resourceType": "Bundle", "type": "searchset", "total": 0}"#).unwrap();
        assert!(bundle.entry.is_none());

        let bundle: SearchBundle = serde_json::from_str(
            r#"{"resourceType": "Bundle", "entry": [{"resource": {"resourceType": "Patient", "id": "1"}}, {"fullUrl": "x"}]}"#,
        )
        .unwrap();
        let resources: Vec<Resource> = bundle.entry.unwrap().into_iter().filter_map(|e| e.resource).collect();
        assert_eq!(resources.len(), 1);
    }
}
