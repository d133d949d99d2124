//! In-memory FHIR server used by the integration tests

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};

#[derive(Default)]
struct MockState {
    resources: Vec<Value>,
    requests: Vec<String>,
    rejected_codes: Vec<String>,
    reject_cascade: bool,
}

#[derive(Clone, Default)]
pub struct MockFhir {
    state: Arc<Mutex<MockState>>,
}

impl MockFhir {
    pub fn with_resources(resources: Vec<Value>) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().resources = resources;
        mock
    }

    /// Answer POSTs whose `code.coding[0].code` matches with 422
    pub fn reject_code(&self, code: &str) {
        self.state.lock().unwrap().rejected_codes.push(code.to_string());
    }

    /// Answer DELETEs carrying `_cascade=delete` with 400
    pub fn reject_cascade(&self) {
        self.state.lock().unwrap().reject_cascade = true;
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
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

    /// Serve on a random port, returns the FHIR base URL
    pub async fn start(self) -> String {
        let app = Router::new()
            .route("/fhir/{resource_type}", get(search).post(create))
            .route("/fhir/{resource_type}/{id}", get(read).delete(delete))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/fhir", addr)
    }
}

const KNOWN_TYPES: [&str; 8] = [
    "Patient",
    "Condition",
    "Procedure",
    "MedicationRequest",
    "DiagnosticReport",
    "Observation",
    "Composition",
    "ServiceRequest",
];

fn outcome(status: StatusCode, code: &str, diagnostics: &str) -> Response {
    let body = json!({
        "resourceType": "OperationOutcome",
        "issue": [{"severity": "error", "code": code, "diagnostics": diagnostics}]
    });
    (status, Json(body)).into_response()
}

fn not_found(resource_type: &str, id: &str) -> Response {
    outcome(
        StatusCode::NOT_FOUND,
        "not-found",
        &format!("Resource not found: {}/{}", resource_type, id),
    )
}

fn matches_param(resource: &Value, name: &str, value: &str) -> bool {
    match name {
        "subject" => resource["subject"]["reference"] == value,
        "organization" => resource["managingOrganization"]["reference"] == value,
        _ => true,
    }
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

    if resource_type == "Broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }

    if !KNOWN_TYPES.contains(&resource_type.as_str()) {
        return outcome(StatusCode::NOT_FOUND, "not-supported", "Unknown resource type");
    }
    let count = match params.iter().find(|(name, _)| name == "_count") {
        Some((_, value)) => match value.parse::<usize>() {
            Ok(count) => count,
            Err(_) => return outcome(StatusCode::BAD_REQUEST, "invalid", "Invalid _count"),
        },
        None => usize::MAX,
    };

    let matched: Vec<Value> = state
        .resources
        .iter()
        .filter(|r| r["resourceType"] == resource_type)
        .filter(|r| params.iter().all(|(name, value)| matches_param(r, name, value)))
        .take(count)
        .cloned()
        .collect();

    let mut bundle = json!({
        "resourceType": "Bundle",
        "type": "searchset",
        "total": matched.len()
    });
    if !matched.is_empty() {
        bundle["entry"] = matched
            .into_iter()
            .map(|r| json!({"resource": r, "search": {"mode": "match"}}))
            .collect();
    }

    Json(bundle).into_response()
}

async fn create(
    State(mock): State<MockFhir>,
    Path(resource_type): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = mock.state.lock().unwrap();
    state.requests.push(format!("POST /{}", resource_type));

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type != "application/fhir+json" {
        return outcome(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "not-supported",
            "Expected application/fhir+json",
        );
    }

    if resource_type == "Broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }

    let mut resource: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => return outcome(StatusCode::BAD_REQUEST, "structure", &e.to_string()),
    };
    if resource["resourceType"] != resource_type.as_str() {
        return outcome(StatusCode::BAD_REQUEST, "invalid", "resourceType mismatch");
    }

    if let Some(code) = resource["code"]["coding"][0]["code"].as_str()
        && state.rejected_codes.iter().any(|c| c == code)
    {
        return outcome(StatusCode::UNPROCESSABLE_ENTITY, "code-invalid", "invalid code");
    }

    resource["id"] = json!(uuid::Uuid::new_v4().to_string());
    resource["meta"] = json!({"versionId": "1"});
    state.resources.push(resource.clone());

    (StatusCode::CREATED, Json(resource)).into_response()
}

async fn read(
    State(mock): State<MockFhir>,
    Path((resource_type, id)): Path<(String, String)>,
) -> Response {
    let mut state = mock.state.lock().unwrap();
    state.requests.push(format!("GET /{}/{}", resource_type, id));

    match state
        .resources
        .iter()
        .find(|r| r["resourceType"] == resource_type.as_str() && r["id"] == id.as_str())
    {
        Some(resource) => Json(resource.clone()).into_response(),
        None => not_found(&resource_type, &id),
    }
}

async fn delete(
    State(mock): State<MockFhir>,
    Path((resource_type, id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let mut state = mock.state.lock().unwrap();
    let query = query.unwrap_or_default();
    state.requests.push(format!("DELETE /{}/{}?{}", resource_type, id, query));

    if query.contains("_cascade=delete") && state.reject_cascade {
        return outcome(StatusCode::BAD_REQUEST, "not-supported", "Cascading delete is not supported");
    }

    let before = state.resources.len();
    state
        .resources
        .retain(|r| !(r["resourceType"] == resource_type.as_str() && r["id"] == id.as_str()));

    if state.resources.len() < before {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&resource_type, &id)
    }
}

pub fn patient(id: &str, organization: &str, family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "id": id,
        "name": [{"family": family, "given": ["Test"]}],
        "gender": "female",
        "birthDate": "1960-01-01",
        "managingOrganization": {"reference": format!("Organization/{}", organization)}
    })
}

pub fn observation(id: &str, patient: &str, category: &str, code: &str, value: Value) -> Value {
    json!({
        "resourceType": "Observation",
        "id": id,
        "status": "final",
        "category": [{"coding": [{"code": category}]}],
        "code": {"text": code},
        "subject": {"reference": format!("Patient/{}", patient)},
        "effectiveDateTime": "2023-05-01",
        "valueQuantity": value
    })
}
