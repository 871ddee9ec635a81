//! Field groups for the Ocean cluster resource.
//!
//! One module per group. Each exposes `register` to add its descriptors to a
//! registry, plus the group's flatten/expand helpers. Flatten never fails
//! and yields `None` for empty sub-objects; expand takes a `nullify` flag:
//! `true` on full-replace update paths (an absent source clears the domain
//! field), `false` on create paths (an absent source is skipped).

use indexmap::IndexMap;
use oceanic_fields::{ConfigValue, FieldError, FieldRegistry};
use oceanic_sdk::Cluster;

pub mod autoscaler;
pub mod cluster;
pub mod instance_types;
pub mod launch_config;
pub mod logging;
pub mod scheduling;
pub mod strategy;

/// Compose the full Ocean cluster registry.
///
/// Registration order is execution order for every lifecycle pass.
pub fn cluster_registry() -> Result<FieldRegistry<Cluster>, FieldError> {
    let mut registry = FieldRegistry::new("ocean_cluster");
    cluster::register(&mut registry)?;
    autoscaler::register(&mut registry)?;
    instance_types::register(&mut registry)?;
    launch_config::register(&mut registry)?;
    strategy::register(&mut registry)?;
    scheduling::register(&mut registry)?;
    logging::register(&mut registry)?;
    Ok(registry)
}

/// Expand a configuration list into strings, dropping empty items.
pub(crate) fn expand_string_list(
    field: &str,
    value: &ConfigValue,
) -> Result<Vec<String>, FieldError> {
    let items = value
        .as_list()
        .ok_or_else(|| FieldError::type_mismatch(field, "list", value.type_name()))?;
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some("") => {}
            Some(s) => result.push(s.to_string()),
            None => {
                return Err(FieldError::invalid(
                    field,
                    format!("list items must be strings, got {}", item.type_name()),
                ));
            }
        }
    }
    Ok(result)
}

/// Flatten a string list; empty or missing lists yield an absent value.
pub(crate) fn flatten_string_list(items: Option<&Vec<String>>) -> Option<ConfigValue> {
    match items {
        Some(list) if !list.is_empty() => Some(ConfigValue::string_list(list.iter().cloned())),
        _ => None,
    }
}

/// String entry of a nested map, with a `group.key` scoped error.
pub(crate) fn entry_str(
    field: &str,
    map: &IndexMap<String, ConfigValue>,
    key: &str,
) -> Result<Option<String>, FieldError> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| s.to_string())
            .map(Some)
            .ok_or_else(|| {
                FieldError::type_mismatch(format!("{field}.{key}"), "string", value.type_name())
            }),
    }
}

/// Boolean entry of a nested map.
pub(crate) fn entry_bool(
    field: &str,
    map: &IndexMap<String, ConfigValue>,
    key: &str,
) -> Result<Option<bool>, FieldError> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| {
            FieldError::type_mismatch(format!("{field}.{key}"), "bool", value.type_name())
        }),
    }
}

/// Integer entry of a nested map.
pub(crate) fn entry_i64(
    field: &str,
    map: &IndexMap<String, ConfigValue>,
    key: &str,
) -> Result<Option<i64>, FieldError> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            FieldError::type_mismatch(format!("{field}.{key}"), "int", value.type_name())
        }),
    }
}

/// Map entry of a nested map.
pub(crate) fn entry_map<'a>(
    field: &str,
    map: &'a IndexMap<String, ConfigValue>,
    key: &str,
) -> Result<Option<&'a IndexMap<String, ConfigValue>>, FieldError> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value.as_map().map(Some).ok_or_else(|| {
            FieldError::type_mismatch(format!("{field}.{key}"), "map", value.type_name())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_composes_all_groups() {
        let registry = cluster_registry().unwrap();
        let names: Vec<_> = registry.names().collect();
        assert!(names.contains(&cluster::NAME));
        assert!(names.contains(&autoscaler::AUTOSCALER));
        assert!(names.contains(&instance_types::WHITELIST));
        assert!(names.contains(&launch_config::TAGS));
        assert!(names.contains(&strategy::SPOT_PERCENTAGE));
        assert!(names.contains(&scheduling::SCHEDULING));
        assert!(names.contains(&logging::LOGGING));
        // base group runs first
        assert_eq!(names[0], cluster::NAME);
    }

    #[test]
    fn expand_string_list_drops_empty_items() {
        let value = ConfigValue::string_list(["a", "", "b"]);
        let list = expand_string_list("whitelist", &value).unwrap();
        assert_eq!(list, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn expand_string_list_rejects_non_string_items() {
        let value = ConfigValue::List(vec![ConfigValue::Int(1)]);
        let err = expand_string_list("whitelist", &value).unwrap_err();
        assert!(err.to_string().contains("whitelist"));
    }

    #[test]
    fn flatten_string_list_yields_absent_for_empty() {
        assert!(flatten_string_list(None).is_none());
        assert!(flatten_string_list(Some(&vec![])).is_none());
        assert!(flatten_string_list(Some(&vec!["a".into()])).is_some());
    }
}
