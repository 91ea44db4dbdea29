//! Field configuration inference.
//!
//! Submissions carry only field identifiers and values, so the rules for a
//! field are derived from its identifier: `contact_email` is an email field
//! and required, `website_url` is a url field, and so on. Hosts can replace
//! the keyword tables, pin rules for specific identifiers, or plug in their
//! own [`FieldConfigResolver`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field types with type-specific validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Url,
    Tel,
    Textarea,
}

/// Validation rules for one field.
///
/// Produced fresh for every validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub invalid_message: Option<String>,
}

/// Rules pinned for a specific field identifier.
///
/// Unset attributes keep the inferred value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOverride {
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub required: Option<bool>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub invalid_message: Option<String>,
}

impl FieldOverride {
    fn apply(&self, config: &mut FieldConfig) {
        if let Some(field_type) = self.field_type {
            config.field_type = field_type;
        }
        if let Some(required) = self.required {
            config.required = required;
        }
        if self.min_length.is_some() {
            config.min_length = self.min_length;
        }
        if self.max_length.is_some() {
            config.max_length = self.max_length;
        }
        if self.pattern.is_some() {
            config.pattern.clone_from(&self.pattern);
        }
        if self.invalid_message.is_some() {
            config.invalid_message.clone_from(&self.invalid_message);
        }
    }
}

/// Keywords that select a field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeKeywords {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub keywords: Vec<String>,
}

impl TypeKeywords {
    pub fn new(field_type: FieldType, keywords: &[&str]) -> Self {
        Self {
            field_type,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Inference tables and per-field overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRulesConfig {
    /// Ordered type table; the first keyword found in the identifier wins
    #[serde(default = "default_type_mapping")]
    pub type_mapping: Vec<TypeKeywords>,
    /// Identifiers containing any of these are required
    #[serde(default = "default_required_patterns")]
    pub required_patterns: Vec<String>,
    /// Rules pinned by exact field identifier
    #[serde(default)]
    pub overrides: HashMap<String, FieldOverride>,
}

fn default_type_mapping() -> Vec<TypeKeywords> {
    vec![
        TypeKeywords::new(FieldType::Email, &["email"]),
        TypeKeywords::new(FieldType::Url, &["url", "website", "link"]),
        TypeKeywords::new(FieldType::Tel, &["phone", "tel", "telephone"]),
        TypeKeywords::new(
            FieldType::Textarea,
            &["textarea", "message", "comment", "description"],
        ),
    ]
}

fn default_required_patterns() -> Vec<String> {
    vec!["email".to_string(), "name".to_string()]
}

impl Default for FieldRulesConfig {
    fn default() -> Self {
        Self {
            type_mapping: default_type_mapping(),
            required_patterns: default_required_patterns(),
            overrides: HashMap::new(),
        }
    }
}

/// Resolves the rules for a field identifier.
pub trait FieldConfigResolver: Send + Sync {
    fn resolve(&self, field_id: &str) -> FieldConfig;
}

/// Keyword-based resolver.
///
/// Matching is case-insensitive: `Email_Address` resolves to a required
/// email field.
#[derive(Debug, Clone)]
pub struct HeuristicResolver {
    type_mapping: Vec<(FieldType, Vec<String>)>,
    required_patterns: Vec<String>,
    overrides: HashMap<String, FieldOverride>,
}

impl HeuristicResolver {
    pub fn new(config: &FieldRulesConfig) -> Self {
        let lower = |words: &[String]| words.iter().map(|w| w.to_lowercase()).collect();

        Self {
            type_mapping: config
                .type_mapping
                .iter()
                .map(|entry| (entry.field_type, lower(&entry.keywords)))
                .collect(),
            required_patterns: lower(&config.required_patterns),
            overrides: config.overrides.clone(),
        }
    }

    /// Pin rules for one identifier.
    pub fn with_override(mut self, field_id: impl Into<String>, rules: FieldOverride) -> Self {
        self.overrides.insert(field_id.into(), rules);
        self
    }

    fn infer_type(&self, field_id: &str) -> FieldType {
        self.type_mapping
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| field_id.contains(k.as_str())))
            .map(|(field_type, _)| *field_type)
            .unwrap_or_default()
    }

    fn infer_required(&self, field_id: &str) -> bool {
        self.required_patterns
            .iter()
            .any(|p| field_id.contains(p.as_str()))
    }
}

impl Default for HeuristicResolver {
    fn default() -> Self {
        Self::new(&FieldRulesConfig::default())
    }
}

impl FieldConfigResolver for HeuristicResolver {
    fn resolve(&self, field_id: &str) -> FieldConfig {
        let normalized = field_id.to_lowercase();

        let mut config = FieldConfig {
            field_type: self.infer_type(&normalized),
            required: self.infer_required(&normalized),
            ..FieldConfig::default()
        };

        if let Some(rules) = self.overrides.get(field_id) {
            rules.apply(&mut config);
        }

        config
    }
}
