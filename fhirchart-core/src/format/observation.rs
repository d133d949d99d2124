use serde_json::Value;

use super::{codeable_display, coding_code, non_empty, quantity_text, reference_displays, scalar_text};
use crate::Resource;
use crate::date::{NOT_AVAILABLE, format_date};

pub const VITAL_SIGNS: &str = "vital-signs";
pub const LABORATORY: &str = "laboratory";

/// One `component[]` entry of an Observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentValue {
    pub code: String,
    pub value: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationSummary {
    pub id: String,
    pub display: String,
    /// `category[0].coding[0].code`
    pub category: Option<String>,
    pub value: String,
    pub components: Vec<ComponentValue>,
    pub effective: String,
    pub performers: Vec<String>,
}

/// Observations split by category, server order kept within each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationGroups {
    pub vital_signs: Vec<ObservationSummary>,
    pub laboratory: Vec<ObservationSummary>,
    pub other: Vec<ObservationSummary>,
}

impl ObservationGroups {
    pub fn len(&self) -> usize {
        self.vital_signs.len() + self.laboratory.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn observation_category(resource: &Resource) -> Option<&str> {
    coding_code(resource.get("category").and_then(|c| c.get(0)))
}

pub fn format_observation(resource: &Resource) -> ObservationSummary {
    ObservationSummary {
        id: resource.id.clone().unwrap_or_default(),
        display: codeable_display(resource.get("code")).unwrap_or_else(|| "Unknown".to_string()),
        category: observation_category(resource).map(str::to_string),
        value: observation_value(resource),
        components: components(resource),
        effective: format_date(
            resource
                .str_field("effectiveDateTime")
                .or_else(|| resource.str_field("issued")),
        ),
        performers: reference_displays(resource.get("performer")),
    }
}

/// Display value of an Observation.
///
/// Components take priority: a two-component blood pressure renders as
/// `systolic/diastolic`, any other component list as `code: value` pairs
/// (units stay on [`ComponentValue::unit`]).
/// Otherwise `valueQuantity`, `valueString` and `valueCodeableConcept` are
/// tried in turn.
pub fn observation_value(resource: &Resource) -> String {
    let components = components(resource);
    if !components.is_empty() {
        if components.len() == 2 && is_blood_pressure(resource) {
            return format!("{}/{}", components[0].value, components[1].value);
        }
        return components
            .iter()
            .map(|c| format!("{}: {}", c.code, c.value))
            .collect::<Vec<_>>()
            .join(", ");
    }

    value_text(&resource.rest).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Partition summaries into vital signs, laboratory and everything else.
pub fn group_observations(
    observations: impl IntoIterator<Item = ObservationSummary>,
) -> ObservationGroups {
    let mut groups = ObservationGroups::default();
    for observation in observations {
        match observation.category.as_deref() {
            Some(VITAL_SIGNS) => groups.vital_signs.push(observation),
            Some(LABORATORY) => groups.laboratory.push(observation),
            _ => groups.other.push(observation),
        }
    }
    groups
}

fn components(resource: &Resource) -> Vec<ComponentValue> {
    resource
        .get("component")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .map(|component| {
                    let quantity = component.get("valueQuantity");
                    ComponentValue {
                        code: codeable_display(component.get("code"))
                            .unwrap_or_else(|| "Unknown".to_string()),
                        value: quantity
                            .and_then(|q| q.get("value"))
                            .and_then(scalar_text)
                            .or_else(|| value_text(component))
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                        unit: quantity
                            .and_then(|q| non_empty(q.get("unit")))
                            .map(str::to_string),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

/// value[x] of an Observation or component
fn value_text(element: &Value) -> Option<String> {
    element
        .get("valueQuantity")
        .and_then(quantity_text)
        .or_else(|| non_empty(element.get("valueString")).map(str::to_string))
        .or_else(|| codeable_display(element.get("valueCodeableConcept")))
}

/// Only `code.text` is consulted; coding displays vary between servers.
fn is_blood_pressure(resource: &Resource) -> bool {
    resource
        .get("code")
        .and_then(|c| non_empty(c.get("text")))
        .is_some_and(|text| text.to_lowercase().contains("blood pressure"))
}
