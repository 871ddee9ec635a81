//! Base cluster fields: identity, placement, and capacity.

use oceanic_fields::{
    ConfigValue, FieldDescriptor, FieldError, FieldRegistry, FieldSchema, ValueType,
};
use oceanic_sdk::Cluster;

use super::{expand_string_list, flatten_string_list};
use crate::policy::UPDATE_POLICY;

pub const NAME: &str = "name";
pub const REGION: &str = "region";
pub const CONTROLLER_CLUSTER_ID: &str = "controller_cluster_id";
pub const SUBNET_IDS: &str = "subnet_ids";
pub const MAX_SIZE: &str = "max_size";
pub const MIN_SIZE: &str = "min_size";
pub const DESIRED_CAPACITY: &str = "desired_capacity";

pub fn register(registry: &mut FieldRegistry<Cluster>) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            NAME,
            FieldSchema::required(ValueType::Str),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(NAME, cluster.name.clone().map(ConfigValue::from));
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(name) = config.get_str(NAME)? {
                    cluster.name = Some(name.to_string());
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.name = config.get_str(NAME)?.map(str::to_string);
            Ok(())
        })),
    )?;

    // region and the controller id are replacement-only: no update mapper.
    registry.register(FieldDescriptor::new(
        REGION,
        FieldSchema::required(ValueType::Str),
        Box::new(|cluster: &Cluster, config| {
            config.set_opt(REGION, cluster.region.clone().map(ConfigValue::from));
            Ok(())
        }),
        Box::new(|config, cluster: &mut Cluster| {
            if let Some(region) = config.get_str(REGION)? {
                cluster.region = Some(region.to_string());
            }
            Ok(())
        }),
    ))?;

    registry.register(FieldDescriptor::new(
        CONTROLLER_CLUSTER_ID,
        FieldSchema::required(ValueType::Str),
        Box::new(|cluster: &Cluster, config| {
            config.set_opt(
                CONTROLLER_CLUSTER_ID,
                cluster.controller_cluster_id.clone().map(ConfigValue::from),
            );
            Ok(())
        }),
        Box::new(|config, cluster: &mut Cluster| {
            if let Some(id) = config.get_str(CONTROLLER_CLUSTER_ID)? {
                cluster.controller_cluster_id = Some(id.to_string());
            }
            Ok(())
        }),
    ))?;

    // placement moves nodes, so it is a roll trigger
    registry.register(
        FieldDescriptor::new(
            SUBNET_IDS,
            FieldSchema::required(ValueType::List).with_elem(ValueType::Str),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(
                    SUBNET_IDS,
                    flatten_string_list(
                        cluster.compute.as_ref().and_then(|c| c.subnet_ids.as_ref()),
                    ),
                );
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(SUBNET_IDS) {
                    cluster.compute_mut().subnet_ids =
                        Some(expand_string_list(SUBNET_IDS, value)?);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.compute_mut().subnet_ids = match config.get_ok(SUBNET_IDS) {
                Some(value) => Some(expand_string_list(SUBNET_IDS, value)?),
                None => None,
            };
            Ok(())
        }))
        .with_roll_trigger(),
    )?;

    register_capacity(
        registry,
        MAX_SIZE,
        |c: &mut Cluster| &mut c.capacity_mut().maximum,
        |c: &Cluster| c.capacity.as_ref().and_then(|cap| cap.maximum),
    )?;
    register_capacity(
        registry,
        MIN_SIZE,
        |c: &mut Cluster| &mut c.capacity_mut().minimum,
        |c: &Cluster| c.capacity.as_ref().and_then(|cap| cap.minimum),
    )?;
    register_capacity(
        registry,
        DESIRED_CAPACITY,
        |c: &mut Cluster| &mut c.capacity_mut().target,
        |c: &Cluster| c.capacity.as_ref().and_then(|cap| cap.target),
    )?;

    // Config-only: the update policy never reaches the control plane, and
    // changing it alone must not trigger a remote update.
    registry.register(FieldDescriptor::new(
        UPDATE_POLICY,
        FieldSchema::optional(ValueType::Map),
        Box::new(|_: &Cluster, _| Ok(())),
        Box::new(|_, _: &mut Cluster| Ok(())),
    ))?;

    Ok(())
}

/// Capacity counts are optional-and-computed: an explicit zero is
/// meaningful, so presence alone decides whether the value is written.
fn register_capacity(
    registry: &mut FieldRegistry<Cluster>,
    field: &'static str,
    slot: fn(&mut Cluster) -> &mut Option<i64>,
    value_of: fn(&Cluster) -> Option<i64>,
) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            field,
            FieldSchema::optional(ValueType::Int).computed(),
            Box::new(move |cluster: &Cluster, config| {
                config.set_opt(field, value_of(cluster).map(ConfigValue::from));
                Ok(())
            }),
            Box::new(move |config, cluster: &mut Cluster| {
                if let Some(count) = config.get_i64(field)? {
                    *slot(cluster) = Some(count);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(move |config, cluster: &mut Cluster| {
            *slot(cluster) = config.get_i64(field)?;
            Ok(())
        })),
    )
}
