//! Loosely-typed CRM records.
//!
//! Everything the store returns arrives as an [`Entity`]: a logical name, an id
//! and a bag of attributes. Typed getters coerce the representations the Web
//! API produces (ISO strings for dates, integers for option sets, comma lists
//! for multi-selects) so decoding code can ask for what it expects.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityReference {
    pub logical_name: String,
    pub id: Uuid,
    pub name: Option<String>,
}

impl EntityReference {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    OptionSet(i32),
    OptionSetCollection(Vec<i32>),
    Reference(EntityReference),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Uuid> for AttributeValue {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl From<EntityReference> for AttributeValue {
    fn from(value: EntityReference) -> Self {
        Self::Reference(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub logical_name: String,
    pub id: Uuid,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub formatted_values: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            ..Default::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_formatted(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.formatted_values.insert(key.into(), text.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Reference(r) => r.name.clone(),
            AttributeValue::Integer(n) => Some(n.to_string()),
            AttributeValue::Guid(g) => Some(g.to_string()),
            _ => None,
        }
    }

    /// Non-blank string value, trimmed.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            AttributeValue::Integer(n) => Some(*n),
            AttributeValue::OptionSet(n) => Some(i64::from(*n)),
            AttributeValue::Float(f) => Some(*f as i64),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Option set value; plain integers are accepted since the Web API does not
    /// distinguish them.
    pub fn get_option(&self, key: &str) -> Option<i32> {
        self.get_int(key).and_then(|n| i32::try_from(n).ok())
    }

    pub fn get_options(&self, key: &str) -> Vec<i32> {
        match self.get(key) {
            Some(AttributeValue::OptionSetCollection(values)) => values.clone(),
            Some(AttributeValue::OptionSet(n)) => vec![*n],
            Some(AttributeValue::String(s)) => s
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            AttributeValue::Boolean(b) => Some(*b),
            AttributeValue::Integer(n) => Some(*n != 0),
            AttributeValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_datetime(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key)? {
            AttributeValue::DateTime(dt) => Some(*dt),
            AttributeValue::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }

    pub fn get_guid(&self, key: &str) -> Option<Uuid> {
        match self.get(key)? {
            AttributeValue::Guid(g) => Some(*g),
            AttributeValue::Reference(r) => Some(r.id),
            AttributeValue::String(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }

    pub fn get_reference(&self, key: &str) -> Option<EntityReference> {
        match self.get(key)? {
            AttributeValue::Reference(r) => {
                let mut r = r.clone();
                if r.name.is_none() {
                    r.name = self.formatted(key).map(str::to_string);
                }
                Some(r)
            }
            _ => None,
        }
    }

    pub fn formatted(&self, key: &str) -> Option<&str> {
        self.formatted_values.get(key).map(String::as_str)
    }

    /// Formatted value when present, else the raw value rendered as text.
    pub fn formatted_or_raw(&self, key: &str) -> Option<String> {
        self.formatted(key)
            .map(str::to_string)
            .or_else(|| match self.get(key)? {
                AttributeValue::Boolean(b) => Some(b.to_string()),
                AttributeValue::OptionSet(n) => Some(n.to_string()),
                _ => self.get_string(key),
            })
    }
}
