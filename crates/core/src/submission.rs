//! Form submission payloads.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::Value;

/// Raw form data as received from the client, in field order.
///
/// Values are kept as JSON so non-string payloads can be reported per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    fields: Vec<(String, Value)>,
}

impl Submission {
    /// Build from a decoded JSON object. Returns `None` if `form_data` is not an object.
    pub fn from_json(form_data: &Value) -> Option<Self> {
        let object = form_data.as_object()?;
        Some(Self {
            fields: object
                .iter()
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        })
    }

    /// Build from string values.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(id, value)| (id.as_str(), value))
    }

    /// String value of a field, if present and textual.
    pub fn get_str(&self, field_id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(id, _)| id == field_id)
            .and_then(|(_, value)| value.as_str())
    }
}

/// Sanitized form data, safe to persist and display.
///
/// Serializes as a JSON object `{ fieldId: value }`. Field ids are unique:
/// pushing an existing id replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedSubmission(Vec<(String, String)>);

impl SanitizedSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field_id: impl Into<String>, value: impl Into<String>) {
        let field_id = field_id.into();
        let value = value.into();
        match self.0.iter_mut().find(|(id, _)| *id == field_id) {
            Some(entry) => entry.1 = value,
            None => self.0.push((field_id, value)),
        }
    }

    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, value)| (id.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for SanitizedSubmission {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut submission = Self::new();
        for (field_id, value) in iter {
            submission.push(field_id, value);
        }
        submission
    }
}

impl Serialize for SanitizedSubmission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, value) in &self.0 {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SanitizedSubmission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self(
            object
                .into_iter()
                .map(|(id, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (id, value)
                })
                .collect(),
        ))
    }
}
