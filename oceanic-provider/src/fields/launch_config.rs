//! Node launch template fields.
//!
//! Template changes only affect nodes launched after the change, so the
//! fields baked into running nodes (image, launch profile, security groups,
//! user data) are roll triggers. Tags carry the tags marker instead: the
//! roll policy decides separately whether a tags-only change rolls.

use indexmap::IndexMap;
use oceanic_fields::{
    ConfigValue, FieldDescriptor, FieldError, FieldRegistry, FieldSchema, ValueType,
};
use oceanic_sdk::{Cluster, Tag};

use super::{expand_string_list, flatten_string_list};

pub const IMAGE_ID: &str = "image_id";
pub const LAUNCH_PROFILE_NAME: &str = "launch_profile_name";
pub const SECURITY_GROUP_IDS: &str = "security_group_ids";
pub const KEY_PAIR: &str = "key_pair";
pub const USER_DATA: &str = "user_data";
pub const MONITORING: &str = "monitoring";
pub const ROOT_VOLUME_SIZE: &str = "root_volume_size";
pub const TAGS: &str = "tags";

pub fn register(registry: &mut FieldRegistry<Cluster>) -> Result<(), FieldError> {
    register_str(registry, IMAGE_ID, true, |c: &mut Cluster| {
        &mut c.launch_spec_mut().image_id
    })?;
    register_str(registry, LAUNCH_PROFILE_NAME, true, |c: &mut Cluster| {
        &mut c.launch_spec_mut().launch_profile_name
    })?;
    register_str(registry, KEY_PAIR, false, |c: &mut Cluster| {
        &mut c.launch_spec_mut().key_pair
    })?;
    register_str(registry, USER_DATA, true, |c: &mut Cluster| {
        &mut c.launch_spec_mut().user_data
    })?;

    registry.register(
        FieldDescriptor::new(
            SECURITY_GROUP_IDS,
            FieldSchema::optional(ValueType::List).with_elem(ValueType::Str),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(
                    SECURITY_GROUP_IDS,
                    flatten_string_list(
                        cluster
                            .launch_spec()
                            .and_then(|spec| spec.security_group_ids.as_ref()),
                    ),
                );
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(SECURITY_GROUP_IDS) {
                    cluster.launch_spec_mut().security_group_ids =
                        Some(expand_string_list(SECURITY_GROUP_IDS, value)?);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.launch_spec_mut().security_group_ids = match config.get_ok(SECURITY_GROUP_IDS)
            {
                Some(value) => Some(expand_string_list(SECURITY_GROUP_IDS, value)?),
                None => None,
            };
            Ok(())
        }))
        .with_roll_trigger(),
    )?;

    registry.register(
        FieldDescriptor::new(
            MONITORING,
            FieldSchema::optional(ValueType::Bool),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(
                    MONITORING,
                    cluster
                        .launch_spec()
                        .and_then(|spec| spec.monitoring)
                        .map(ConfigValue::from),
                );
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(MONITORING).and_then(ConfigValue::as_bool) {
                    cluster.launch_spec_mut().monitoring = Some(value);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.launch_spec_mut().monitoring =
                config.get_ok(MONITORING).and_then(ConfigValue::as_bool);
            Ok(())
        })),
    )?;

    registry.register(
        FieldDescriptor::new(
            ROOT_VOLUME_SIZE,
            FieldSchema::optional(ValueType::Int),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(
                    ROOT_VOLUME_SIZE,
                    cluster
                        .launch_spec()
                        .and_then(|spec| spec.root_volume_size)
                        .map(ConfigValue::from),
                );
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(ROOT_VOLUME_SIZE).and_then(ConfigValue::as_i64)
                {
                    cluster.launch_spec_mut().root_volume_size = Some(value);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.launch_spec_mut().root_volume_size =
                config.get_ok(ROOT_VOLUME_SIZE).and_then(ConfigValue::as_i64);
            Ok(())
        })),
    )?;

    registry.register(
        FieldDescriptor::new(
            TAGS,
            FieldSchema::optional(ValueType::Map),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(
                    TAGS,
                    flatten_tags(cluster.launch_spec().and_then(|spec| spec.tags.as_ref())),
                );
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(TAGS) {
                    cluster.launch_spec_mut().tags = Some(expand_tags(TAGS, value)?);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.launch_spec_mut().tags = match config.get_ok(TAGS) {
                Some(value) => Some(expand_tags(TAGS, value)?),
                None => None,
            };
            Ok(())
        }))
        .with_tags_marker(),
    )?;

    Ok(())
}

fn register_str(
    registry: &mut FieldRegistry<Cluster>,
    field: &'static str,
    triggers_roll: bool,
    slot: fn(&mut Cluster) -> &mut Option<String>,
) -> Result<(), FieldError> {
    let descriptor = FieldDescriptor::new(
        field,
        FieldSchema::optional(ValueType::Str),
        Box::new(move |cluster: &Cluster, config| {
            let value = cluster
                .launch_spec()
                .and_then(|spec| spec_field(spec, field))
                .map(ConfigValue::from);
            config.set_opt(field, value);
            Ok(())
        }),
        Box::new(move |config, cluster: &mut Cluster| {
            if let Some(value) = config.get_ok(field).and_then(ConfigValue::as_str) {
                *slot(cluster) = Some(value.to_string());
            }
            Ok(())
        }),
    )
    .with_update(Box::new(move |config, cluster: &mut Cluster| {
        *slot(cluster) = config
            .get_ok(field)
            .and_then(ConfigValue::as_str)
            .map(str::to_string);
        Ok(())
    }));

    registry.register(if triggers_roll {
        descriptor.with_roll_trigger()
    } else {
        descriptor
    })
}

fn spec_field(spec: &oceanic_sdk::LaunchSpec, field: &str) -> Option<String> {
    match field {
        IMAGE_ID => spec.image_id.clone(),
        LAUNCH_PROFILE_NAME => spec.launch_profile_name.clone(),
        KEY_PAIR => spec.key_pair.clone(),
        USER_DATA => spec.user_data.clone(),
        _ => None,
    }
}

/// Flatten node tags as a `key → value` map; tags missing either side are
/// dropped. Empty yields absent.
pub fn flatten_tags(tags: Option<&Vec<Tag>>) -> Option<ConfigValue> {
    let tags = tags?;
    let entries: IndexMap<String, ConfigValue> = tags
        .iter()
        .filter_map(|tag| {
            let key = tag.key.clone()?;
            let value = tag.value.clone()?;
            Some((key, ConfigValue::Str(value)))
        })
        .collect();
    if entries.is_empty() {
        None
    } else {
        Some(ConfigValue::Map(entries))
    }
}

/// Expand a `key → value` map into node tags, preserving entry order.
pub fn expand_tags(field: &str, value: &ConfigValue) -> Result<Vec<Tag>, FieldError> {
    let entries = value
        .as_map()
        .ok_or_else(|| FieldError::type_mismatch(field, "map", value.type_name()))?;
    let mut tags = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let value = entry.as_str().ok_or_else(|| {
            FieldError::type_mismatch(
                format!("{field}.{key}"),
                "string",
                entry.type_name(),
            )
        })?;
        tags.push(Tag::new(key.clone(), value));
    }
    Ok(tags)
}
