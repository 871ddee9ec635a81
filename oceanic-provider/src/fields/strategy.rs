//! Purchasing strategy fields.
//!
//! All of these are optional scalars without a computed counterpart, so they
//! follow the zero-means-absent convention: `0` and `false` read as unset.

use oceanic_fields::{
    ConfigValue, FieldDescriptor, FieldError, FieldRegistry, FieldSchema, ValueType,
};
use oceanic_sdk::Cluster;

pub const SPOT_PERCENTAGE: &str = "spot_percentage";
pub const FALLBACK_TO_ON_DEMAND: &str = "fallback_to_ondemand";
pub const UTILIZE_RESERVED_INSTANCES: &str = "utilize_reserved_instances";
pub const UTILIZE_COMMITMENTS: &str = "utilize_commitments";
pub const DRAINING_TIMEOUT: &str = "draining_timeout";
pub const GRACE_PERIOD: &str = "grace_period";

pub fn register(registry: &mut FieldRegistry<Cluster>) -> Result<(), FieldError> {
    register_int(
        registry,
        SPOT_PERCENTAGE,
        |c: &mut Cluster| &mut c.strategy_mut().spot_percentage,
        |c: &Cluster| c.strategy.as_ref().and_then(|s| s.spot_percentage),
    )?;
    register_int(
        registry,
        DRAINING_TIMEOUT,
        |c: &mut Cluster| &mut c.strategy_mut().draining_timeout,
        |c: &Cluster| c.strategy.as_ref().and_then(|s| s.draining_timeout),
    )?;
    register_int(
        registry,
        GRACE_PERIOD,
        |c: &mut Cluster| &mut c.strategy_mut().grace_period,
        |c: &Cluster| c.strategy.as_ref().and_then(|s| s.grace_period),
    )?;
    register_bool(
        registry,
        FALLBACK_TO_ON_DEMAND,
        |c: &mut Cluster| &mut c.strategy_mut().fallback_to_on_demand,
        |c: &Cluster| c.strategy.as_ref().and_then(|s| s.fallback_to_on_demand),
    )?;
    register_bool(
        registry,
        UTILIZE_RESERVED_INSTANCES,
        |c: &mut Cluster| &mut c.strategy_mut().utilize_reserved_instances,
        |c: &Cluster| {
            c.strategy
                .as_ref()
                .and_then(|s| s.utilize_reserved_instances)
        },
    )?;
    register_bool(
        registry,
        UTILIZE_COMMITMENTS,
        |c: &mut Cluster| &mut c.strategy_mut().utilize_commitments,
        |c: &Cluster| c.strategy.as_ref().and_then(|s| s.utilize_commitments),
    )?;
    Ok(())
}

fn register_int(
    registry: &mut FieldRegistry<Cluster>,
    field: &'static str,
    slot: fn(&mut Cluster) -> &mut Option<i64>,
    value_of: fn(&Cluster) -> Option<i64>,
) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            field,
            FieldSchema::optional(ValueType::Int),
            Box::new(move |cluster: &Cluster, config| {
                config.set_opt(field, value_of(cluster).map(ConfigValue::from));
                Ok(())
            }),
            Box::new(move |config, cluster: &mut Cluster| {
                if let Some(value) = ok_i64(config, field)? {
                    *slot(cluster) = Some(value);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(move |config, cluster: &mut Cluster| {
            *slot(cluster) = ok_i64(config, field)?;
            Ok(())
        })),
    )
}

fn register_bool(
    registry: &mut FieldRegistry<Cluster>,
    field: &'static str,
    slot: fn(&mut Cluster) -> &mut Option<bool>,
    value_of: fn(&Cluster) -> Option<bool>,
) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            field,
            FieldSchema::optional(ValueType::Bool),
            Box::new(move |cluster: &Cluster, config| {
                config.set_opt(field, value_of(cluster).map(ConfigValue::from));
                Ok(())
            }),
            Box::new(move |config, cluster: &mut Cluster| {
                if let Some(value) = ok_bool(config, field)? {
                    *slot(cluster) = Some(value);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(move |config, cluster: &mut Cluster| {
            *slot(cluster) = ok_bool(config, field)?;
            Ok(())
        })),
    )
}

/// Present-and-non-zero integer entry.
fn ok_i64(
    config: &oceanic_fields::ResourceConfig,
    field: &str,
) -> Result<Option<i64>, FieldError> {
    match config.get_ok(field) {
        None => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            FieldError::type_mismatch(field, "int", value.type_name())
        }),
    }
}

/// Present-and-true boolean entry.
fn ok_bool(
    config: &oceanic_fields::ResourceConfig,
    field: &str,
) -> Result<Option<bool>, FieldError> {
    match config.get_ok(field) {
        None => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| {
            FieldError::type_mismatch(field, "bool", value.type_name())
        }),
    }
}
