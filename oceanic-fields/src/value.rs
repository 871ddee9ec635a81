//! The flat configuration representation.
//!
//! A `ResourceConfig` is an ordered mapping from field name to value with
//! "get if present" semantics: absence is distinct from presence with a zero
//! value, and the `get_ok` accessor additionally treats zero values as
//! absent, which is the convention for optional scalar fields without
//! explicit presence tracking.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// One configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Shape name, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Str(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Map(_) => "map",
        }
    }

    /// Whether this is the zero value for its shape: `false`, `0`, `0.0`,
    /// `""`, or an empty container.
    pub fn is_zero(&self) -> bool {
        match self {
            ConfigValue::Bool(b) => !b,
            ConfigValue::Int(i) => *i == 0,
            ConfigValue::Float(f) => *f == 0.0,
            ConfigValue::Str(s) => s.is_empty(),
            ConfigValue::List(items) => items.is_empty(),
            ConfigValue::Map(entries) => entries.is_empty(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Build a list of strings.
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::List(items.into_iter().map(|s| ConfigValue::Str(s.into())).collect())
    }

    /// Build a map from `(name, value)` pairs, preserving order.
    pub fn map<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ConfigValue)>,
        S: Into<String>,
    {
        ConfigValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Str(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::List(items)
    }
}

/// The ordered field-name → value mapping for one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceConfig {
    entries: IndexMap<String, ConfigValue>,
}

impl ResourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present entry, if any. Distinguishes absent from present-with-zero.
    pub fn get(&self, field: &str) -> Option<&ConfigValue> {
        self.entries.get(field)
    }

    /// Present and non-zero entry. Zero values (`false`, `0`, `""`, empty
    /// containers) read as absent, the convention for optional scalars
    /// without explicit presence tracking.
    pub fn get_ok(&self, field: &str) -> Option<&ConfigValue> {
        self.entries.get(field).filter(|value| !value.is_zero())
    }

    /// Present entry regardless of zero value. Used where a zero value is
    /// meaningful, such as the update-policy booleans and capacity counts.
    pub fn get_exists(&self, field: &str) -> Option<&ConfigValue> {
        self.entries.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<ConfigValue>) {
        self.entries.insert(field.into(), value.into());
    }

    /// Set when `Some`, remove when `None`. Flatten paths use this so an
    /// empty remote sub-object yields an absent entry, never an explicit
    /// empty container.
    pub fn set_opt(&mut self, field: &str, value: Option<ConfigValue>) {
        match value {
            Some(value) => {
                self.entries.insert(field.to_string(), value);
            }
            None => {
                self.entries.shift_remove(field);
            }
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<ConfigValue> {
        self.entries.shift_remove(field)
    }

    /// Present string entry, or a type-mismatch error for another shape.
    pub fn get_str(&self, field: &str) -> Result<Option<&str>, FieldError> {
        self.typed(field, "string", ConfigValue::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        self.typed(field, "bool", ConfigValue::as_bool)
    }

    pub fn get_i64(&self, field: &str) -> Result<Option<i64>, FieldError> {
        self.typed(field, "int", ConfigValue::as_i64)
    }

    pub fn get_list(&self, field: &str) -> Result<Option<&[ConfigValue]>, FieldError> {
        self.typed(field, "list", ConfigValue::as_list)
    }

    pub fn get_map(
        &self,
        field: &str,
    ) -> Result<Option<&IndexMap<String, ConfigValue>>, FieldError> {
        self.typed(field, "map", ConfigValue::as_map)
    }

    fn typed<'a, T>(
        &'a self,
        field: &str,
        expected: &'static str,
        accessor: impl Fn(&'a ConfigValue) -> Option<T>,
    ) -> Result<Option<T>, FieldError> {
        match self.entries.get(field) {
            None => Ok(None),
            Some(value) => accessor(value).map(Some).ok_or_else(|| {
                FieldError::type_mismatch(field, expected, value.type_name())
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ConfigValue)> for ResourceConfig {
    fn from_iter<I: IntoIterator<Item = (S, ConfigValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
