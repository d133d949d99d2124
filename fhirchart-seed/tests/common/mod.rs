//! In-memory FHIR server that records every request it receives

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde_json::{Value, json};

#[derive(Default)]
struct MockState {
    resources: Vec<Value>,
    requests: Vec<String>,
    rejected_types: Vec<String>,
    undeletable_types: Vec<String>,
    reject_cascade: bool,
}

#[derive(Clone, Default)]
pub struct MockFhir {
    state: Arc<Mutex<MockState>>,
}

impl MockFhir {
    pub fn insert(&self, resource: Value) {
        self.state.lock().unwrap().resources.push(resource);
    }

    /// Answer POSTs of this resource type with 422
    pub fn reject_type(&self, resource_type: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_types
            .push(resource_type.to_string());
    }

    /// Answer DELETEs of this resource type with 409
    pub fn refuse_delete(&self, resource_type: &str) {
        self.state
            .lock()
            .unwrap()
            .undeletable_types
            .push(resource_type.to_string());
    }

    pub fn reject_cascade(&self) {
        self.state.lock().unwrap().reject_cascade = true;
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn resources_of(&self, resource_type: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .resources
            .iter()
            .filter(|r| r["resourceType"] == resource_type)
            .cloned()
            .collect()
    }

    pub fn find(&self, reference: &str) -> Option<Value> {
        let (resource_type, id) = reference.split_once('/')?;
        self.resources_of(resource_type)
            .into_iter()
            .find(|r| r["id"] == id)
    }

    /// Serve on a random port, returns the FHIR base URL
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/fhir/{resource_type}", get(search).post(create))
            .route("/fhir/{resource_type}/{id}", delete(remove))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/fhir", addr)
    }
}

fn outcome(status: StatusCode, code: &str, diagnostics: &str) -> Response {
    let body = json!({
        "resourceType": "OperationOutcome",
        "issue": [{"severity": "error", "code": code, "diagnostics": diagnostics}]
    });
    (status, Json(body)).into_response()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

async fn search(
    State(mock): State<MockFhir>,
    Path(resource_type): Path<String>,
    RawQuery(query): RawQuery,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let query = query.unwrap_or_default();
    let mut state = mock.state.lock().unwrap();
    state.requests.push(format!("GET /{}?{}", resource_type, query));

    let count = match param(&params, "_count").map(str::parse::<usize>) {
        Some(Ok(count)) => count,
        Some(Err(_)) => return outcome(StatusCode::BAD_REQUEST, "invalid", "Invalid _count"),
        None => usize::MAX,
    };
    let subject = param(&params, "subject");
    let organization = param(&params, "organization");
    let entries: Vec<Value> = state
        .resources
        .iter()
        .filter(|r| r["resourceType"] == resource_type)
        .filter(|r| subject.is_none_or(|s| r["subject"]["reference"] == s))
        .filter(|r| organization.is_none_or(|o| r["managingOrganization"]["reference"] == o))
        .take(count)
        .map(|r| json!({"resource": r}))
        .collect();

    let mut bundle = json!({"resourceType": "Bundle", "type": "searchset"});
    if !entries.is_empty() {
        bundle["entry"] = json!(entries);
    }
    Json(bundle).into_response()
}

async fn create(
    State(mock): State<MockFhir>,
    Path(resource_type): Path<String>,
    Json(mut resource): Json<Value>,
) -> Response {
    let mut state = mock.state.lock().unwrap();
    state.requests.push(format!("POST /{}", resource_type));

    if state.rejected_types.contains(&resource_type) {
        return outcome(StatusCode::UNPROCESSABLE_ENTITY, "code-invalid", "invalid code");
    }

    resource["id"] = json!(uuid::Uuid::new_v4().to_string());
    state.resources.push(resource.clone());
    (StatusCode::CREATED, Json(resource)).into_response()
}

async fn remove(
    State(mock): State<MockFhir>,
    Path((resource_type, id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let query = query.unwrap_or_default();
    let mut state = mock.state.lock().unwrap();
    state
        .requests
        .push(format!("DELETE /{}/{}?{}", resource_type, id, query));

    if query.contains("_cascade=delete") && state.reject_cascade {
        return outcome(StatusCode::BAD_REQUEST, "not-supported", "Cascading delete is not supported");
    }
    if state.undeletable_types.contains(&resource_type) {
        return outcome(StatusCode::CONFLICT, "conflict", "Resource is referenced");
    }

    state
        .resources
        .retain(|r| !(r["resourceType"] == resource_type.as_str() && r["id"] == id.as_str()));
    StatusCode::NO_CONTENT.into_response()
}

/// A patient of another organization that cleanup must leave alone
pub fn foreign_patient() -> Value {
    json!({
        "resourceType": "Patient",
        "id": "foreign-1",
        "name": [{"family": "Elsewhere"}],
        "managingOrganization": {"reference": "Organization/other-org"}
    })
}
