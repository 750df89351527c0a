//! Shared types for kardex
//!
//! This crate provides the domain model used across the kardex ecosystem:
//! clinical text templates with titled sections, the three facet axes
//! (disease, template type, tag), and the filter state that drives the
//! faceted search layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Template identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag identifier
///
/// Templates hold tag ids as weak references: deleting a tag does not
/// cascade into the templates that mention it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(pub String);

impl TagId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One titled section of a template
///
/// Section order within a template is significant and preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A clinical text template
///
/// Wire field names mirror the backend contract (camelCase).
/// Invariant: `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub title: String,
    pub sections: Vec<Section>,
    pub disease: String,
    pub template_type: String,
    pub tags: Vec<TagId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_favorite: bool,
}

impl Template {
    /// Check whether the template carries the given tag
    pub fn has_tag(&self, tag: &TagId) -> bool {
        self.tags.contains(tag)
    }

    /// Render the template as plain text for the copy feature,
    /// one "title：content" line per section
    pub fn clipboard_text(&self) -> String {
        self.sections
            .iter()
            .map(|section| format!("{}：{}", section.title, section.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A user-defined tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Cached usage count, filled in by the backend when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_count: Option<u32>,
}

/// A disease vocabulary entry with its template count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseInfo {
    pub name: String,
    pub template_count: u32,
}

/// A template-type vocabulary entry with its template count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTypeInfo {
    pub name: String,
    pub template_count: u32,
}

/// The three orthogonal classification axes, doubling as the category view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Disease,
    #[serde(rename = "type")]
    TemplateType,
    Tag,
}

impl FacetKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "disease" => Some(FacetKind::Disease),
            "type" => Some(FacetKind::TemplateType),
            "tag" => Some(FacetKind::Tag),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKind::Disease => "disease",
            FacetKind::TemplateType => "type",
            FacetKind::Tag => "tag",
        }
    }
}

/// Category selection within the active view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategorySelection {
    /// The "all" sentinel: no category narrowing
    All,
    /// A concrete facet value (disease name, type name, or tag id)
    Value(String),
}

impl CategorySelection {
    pub fn is_all(&self) -> bool {
        matches!(self, CategorySelection::All)
    }
}

impl Default for CategorySelection {
    fn default() -> Self {
        CategorySelection::All
    }
}

/// Multi-select filter options applied on top of the category selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(default)]
    pub is_favorite: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diseases: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagId>,
}

impl FilterOptions {
    /// True when no option narrows the result set
    pub fn is_empty(&self) -> bool {
        !self.is_favorite
            && self.diseases.is_empty()
            && self.template_types.is_empty()
            && self.tags.is_empty()
    }
}

/// A derived, ephemeral facet bucket: value plus template count
///
/// Never persisted; recomputed from the current template collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub value: String,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_template() -> Template {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Template {
            id: TemplateId::new("1"),
            title: "高血压病历模板".to_string(),
            sections: vec![
                Section::new("主诉", "头痛、头晕3天"),
                Section::new("诊断", "高血压病2级"),
            ],
            disease: "心血管疾病".to_string(),
            template_type: "门诊病历".to_string(),
            tags: vec![TagId::new("常见病")],
            created_at: t,
            updated_at: t,
            is_favorite: true,
        }
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample_template()).unwrap();
        assert!(json.get("templateType").is_some());
        assert!(json.get("isFavorite").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("template_type").is_none());
    }

    #[test]
    fn test_clipboard_text() {
        let text = sample_template().clipboard_text();
        assert_eq!(text, "主诉：头痛、头晕3天\n诊断：高血压病2级");
    }

    #[test]
    fn test_facet_kind_conversion() {
        assert_eq!(FacetKind::from_str("disease"), Some(FacetKind::Disease));
        assert_eq!(FacetKind::from_str("TYPE"), Some(FacetKind::TemplateType));
        assert_eq!(FacetKind::from_str("tag"), Some(FacetKind::Tag));
        assert_eq!(FacetKind::from_str("other"), None);
        assert_eq!(FacetKind::Tag.as_str(), "tag");
    }

    #[test]
    fn test_filter_options_empty() {
        assert!(FilterOptions::default().is_empty());

        let narrowed = FilterOptions {
            is_favorite: true,
            ..Default::default()
        };
        assert!(!narrowed.is_empty());
    }

    #[test]
    fn test_has_tag() {
        let template = sample_template();
        assert!(template.has_tag(&TagId::new("常见病")));
        assert!(!template.has_tag(&TagId::new("急诊")));
    }
}
