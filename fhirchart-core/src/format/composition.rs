use serde_json::Value;

use super::{codeable_display, coding_code, non_empty, reference_displays};
use crate::Resource;
use crate::date::format_date;
use crate::narrative::extract_text;

/// A rendered `section[]` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionText {
    pub title: String,
    /// LOINC section code
    pub code: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionSummary {
    pub id: String,
    pub title: String,
    pub document_type: String,
    pub status: String,
    pub date: String,
    pub authors: Vec<String>,
    pub sections: Vec<SectionText>,
}

impl CompositionSummary {
    /// Text of the section tagged with a LOINC code
    pub fn section_text(&self, code: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.code.as_deref() == Some(code))
            .map(|s| s.text.as_str())
    }
}

pub fn format_composition(resource: &Resource) -> CompositionSummary {
    let document_type =
        codeable_display(resource.get("type")).unwrap_or_else(|| "Clinical document".to_string());

    let sections = resource
        .get("section")
        .and_then(Value::as_array)
        .map(|list| list.iter().map(format_section).collect())
        .unwrap_or_default();

    CompositionSummary {
        id: resource.id.clone().unwrap_or_default(),
        title: non_empty(resource.get("title"))
            .map(str::to_string)
            .unwrap_or_else(|| document_type.clone()),
        document_type,
        status: non_empty(resource.get("status"))
            .unwrap_or("unknown")
            .to_string(),
        date: format_date(resource.str_field("date")),
        authors: reference_displays(resource.get("author")),
        sections,
    }
}

fn format_section(section: &Value) -> SectionText {
    let title = non_empty(section.get("title"))
        .map(str::to_string)
        .or_else(|| codeable_display(section.get("code")))
        .unwrap_or_else(|| "Section".to_string());

    SectionText {
        title,
        code: coding_code(section.get("code")).map(str::to_string),
        text: section
            .pointer("/text/div")
            .and_then(Value::as_str)
            .map(extract_text)
            .unwrap_or_default(),
    }
}
