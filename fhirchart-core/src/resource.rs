use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Core FHIR resource structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// All other fields are stored here
    #[serde(flatten)]
    pub rest: Value,
}

/// FHIR resource metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Meta {
    #[serde(rename = "versionId", skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    #[serde(rename = "lastUpdated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Resource {
    /// Create a new, empty resource
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            meta: None,
            rest: Value::Object(Map::new()),
        }
    }

    /// Build a resource from a JSON object whose `resourceType` is already set.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Parse a resource from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert the resource to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Look up a top-level field other than resourceType/id/meta.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.rest.get(field)
    }

    /// Top-level string field, if present and a string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Set a top-level field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        if !self.rest.is_object() {
            self.rest = Value::Object(Map::new());
        }
        if let Some(obj) = self.rest.as_object_mut() {
            obj.insert(field.into(), value);
        }
    }

    /// `ResourceType/id` literal reference, once the server has assigned an id.
    pub fn reference(&self) -> Option<String> {
        self.id
            .as_deref()
            .map(|id| format!("{}/{}", self.resource_type, id))
    }
}

/// Reference literal such as `Patient/123`.
pub fn reference_to(resource_type: &str, id: &str) -> String {
    format!("{}/{}", resource_type, id)
}
