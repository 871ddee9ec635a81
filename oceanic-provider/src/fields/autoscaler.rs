//! Autoscaler settings, carried as one nested configuration block.

use indexmap::IndexMap;
use oceanic_fields::{
    ConfigValue, FieldDescriptor, FieldError, FieldRegistry, FieldSchema, ValueType,
};
use oceanic_sdk::{AutoScaler, Cluster, Headroom, ResourceLimits, ScaleDown};

use super::{entry_bool, entry_i64, entry_map};

pub const AUTOSCALER: &str = "autoscaler";

pub const IS_ENABLED: &str = "is_enabled";
pub const IS_AUTO_CONFIG: &str = "is_auto_config";
pub const COOLDOWN: &str = "cooldown";
pub const HEADROOM: &str = "headroom";
pub const DOWN: &str = "down";
pub const RESOURCE_LIMITS: &str = "resource_limits";

pub fn register(registry: &mut FieldRegistry<Cluster>) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            AUTOSCALER,
            FieldSchema::optional(ValueType::Map),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(AUTOSCALER, flatten_autoscaler(cluster.auto_scaler.as_ref()));
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(AUTOSCALER) {
                    cluster.auto_scaler = Some(expand_autoscaler(value)?);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.auto_scaler = match config.get_ok(AUTOSCALER) {
                Some(value) => Some(expand_autoscaler(value)?),
                None => None,
            };
            Ok(())
        })),
    )
}

pub fn expand_autoscaler(value: &ConfigValue) -> Result<AutoScaler, FieldError> {
    let entries = value
        .as_map()
        .ok_or_else(|| FieldError::type_mismatch(AUTOSCALER, "map", value.type_name()))?;

    let mut scaler = AutoScaler {
        is_enabled: entry_bool(AUTOSCALER, entries, IS_ENABLED)?,
        is_auto_config: entry_bool(AUTOSCALER, entries, IS_AUTO_CONFIG)?,
        cooldown: entry_i64(AUTOSCALER, entries, COOLDOWN)?,
        ..Default::default()
    };

    if let Some(headroom) = entry_map(AUTOSCALER, entries, HEADROOM)? {
        scaler.headroom = Some(Headroom {
            cpu_per_unit: entry_i64(HEADROOM, headroom, "cpu_per_unit")?,
            memory_per_unit: entry_i64(HEADROOM, headroom, "memory_per_unit")?,
            gpu_per_unit: entry_i64(HEADROOM, headroom, "gpu_per_unit")?,
            num_of_units: entry_i64(HEADROOM, headroom, "num_of_units")?,
        });
    }
    if let Some(down) = entry_map(AUTOSCALER, entries, DOWN)? {
        scaler.down = Some(ScaleDown {
            evaluation_periods: entry_i64(DOWN, down, "evaluation_periods")?,
            max_scale_down_percentage: entry_i64(DOWN, down, "max_scale_down_percentage")?,
        });
    }
    if let Some(limits) = entry_map(AUTOSCALER, entries, RESOURCE_LIMITS)? {
        scaler.resource_limits = Some(ResourceLimits {
            max_vcpu: entry_i64(RESOURCE_LIMITS, limits, "max_vcpu")?,
            max_memory_gib: entry_i64(RESOURCE_LIMITS, limits, "max_memory_gib")?,
        });
    }

    Ok(scaler)
}

/// Flatten to a nested map of the entries that are present; a fully empty
/// autoscaler yields absent.
pub fn flatten_autoscaler(scaler: Option<&AutoScaler>) -> Option<ConfigValue> {
    let scaler = scaler?;
    let mut entries = IndexMap::new();
    push_bool(&mut entries, IS_ENABLED, scaler.is_enabled);
    push_bool(&mut entries, IS_AUTO_CONFIG, scaler.is_auto_config);
    push_i64(&mut entries, COOLDOWN, scaler.cooldown);

    if let Some(headroom) = scaler.headroom.as_ref() {
        let mut sub = IndexMap::new();
        push_i64(&mut sub, "cpu_per_unit", headroom.cpu_per_unit);
        push_i64(&mut sub, "memory_per_unit", headroom.memory_per_unit);
        push_i64(&mut sub, "gpu_per_unit", headroom.gpu_per_unit);
        push_i64(&mut sub, "num_of_units", headroom.num_of_units);
        push_map(&mut entries, HEADROOM, sub);
    }
    if let Some(down) = scaler.down.as_ref() {
        let mut sub = IndexMap::new();
        push_i64(&mut sub, "evaluation_periods", down.evaluation_periods);
        push_i64(&mut sub, "max_scale_down_percentage", down.max_scale_down_percentage);
        push_map(&mut entries, DOWN, sub);
    }
    if let Some(limits) = scaler.resource_limits.as_ref() {
        let mut sub = IndexMap::new();
        push_i64(&mut sub, "max_vcpu", limits.max_vcpu);
        push_i64(&mut sub, "max_memory_gib", limits.max_memory_gib);
        push_map(&mut entries, RESOURCE_LIMITS, sub);
    }

    if entries.is_empty() {
        None
    } else {
        Some(ConfigValue::Map(entries))
    }
}

fn push_bool(entries: &mut IndexMap<String, ConfigValue>, key: &str, value: Option<bool>) {
    if let Some(value) = value {
        entries.insert(key.to_string(), ConfigValue::Bool(value));
    }
}

fn push_i64(entries: &mut IndexMap<String, ConfigValue>, key: &str, value: Option<i64>) {
    if let Some(value) = value {
        entries.insert(key.to_string(), ConfigValue::Int(value));
    }
}

fn push_map(
    entries: &mut IndexMap<String, ConfigValue>,
    key: &str,
    sub: IndexMap<String, ConfigValue>,
) {
    if !sub.is_empty() {
        entries.insert(key.to_string(), ConfigValue::Map(sub));
    }
}
