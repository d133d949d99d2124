use chrono::{NaiveDate, Utc};
use serde_json::Value;

use super::non_empty;
use crate::date::{NOT_AVAILABLE, age_on, format_date, parse_date};
use crate::Resource;

/// Patient row for the organization patient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Format `name[0]` as `"{given...} {family}"`, or `Unknown`.
pub fn format_name(names: Option<&Value>) -> String {
    let Some(name) = names.and_then(|n| n.get(0)) else {
        return "Unknown".to_string();
    };

    let mut parts: Vec<&str> = name
        .get("given")
        .and_then(Value::as_array)
        .map(|given| given.iter().filter_map(|g| non_empty(Some(g))).collect())
        .unwrap_or_default();
    if let Some(family) = non_empty(name.get("family")) {
        parts.push(family);
    }

    if !parts.is_empty() {
        return parts.join(" ");
    }
    non_empty(name.get("text"))
        .unwrap_or("Unknown")
        .to_string()
}

pub fn format_patient(resource: &Resource) -> PatientSummary {
    format_patient_on(resource, Utc::now().date_naive())
}

/// Same as [`format_patient`], computing the age as of `today`.
pub fn format_patient_on(resource: &Resource, today: NaiveDate) -> PatientSummary {
    let birth_date = resource.str_field("birthDate");

    PatientSummary {
        id: resource.id.clone().unwrap_or_default(),
        name: format_name(resource.get("name")),
        gender: non_empty(resource.get("gender"))
            .unwrap_or("unknown")
            .to_string(),
        birth_date: format_date(birth_date),
        age: birth_date
            .and_then(parse_date)
            .and_then(|born| age_on(born, today)),
        phone: telecom(resource, "phone"),
        email: telecom(resource, "email"),
        address: resource
            .get("address")
            .and_then(|a| a.get(0))
            .and_then(format_address),
    }
}

fn telecom(resource: &Resource, system: &str) -> Option<String> {
    resource
        .get("telecom")?
        .as_array()?
        .iter()
        .find(|t| t.get("system").and_then(Value::as_str) == Some(system))
        .and_then(|t| non_empty(t.get("value")))
        .map(str::to_string)
}

fn format_address(address: &Value) -> Option<String> {
    if let Some(text) = non_empty(address.get("text")) {
        return Some(text.to_string());
    }

    let mut parts: Vec<String> = address
        .get("line")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(|l| non_empty(Some(l)))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(city) = non_empty(address.get("city")) {
        parts.push(city.to_string());
    }

    let region: Vec<&str> = [address.get("state"), address.get("postalCode")]
        .into_iter()
        .filter_map(non_empty)
        .collect();
    if !region.is_empty() {
        parts.push(region.join(" "));
    }

    (!parts.is_empty()).then(|| parts.join(", "))
}

impl PatientSummary {
    /// Birth date with age, e.g. `Mar 14, 1958 (66 y)`
    pub fn birth_date_with_age(&self) -> String {
        match self.age {
            Some(age) if self.birth_date != NOT_AVAILABLE => {
                format!("{} ({} y)", self.birth_date, age)
            }
            _ => self.birth_date.clone(),
        }
    }
}
