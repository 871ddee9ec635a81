//! Instance type allow/deny filters.
//!
//! Changing either filter requires a roll: nodes launched under the old
//! filter set stay up until replaced.

use oceanic_fields::{
    ConfigValue, FieldDescriptor, FieldError, FieldRegistry, FieldSchema, ValueType,
};
use oceanic_sdk::Cluster;

use super::{expand_string_list, flatten_string_list};

pub const WHITELIST: &str = "whitelist";
pub const BLACKLIST: &str = "blacklist";

pub fn register(registry: &mut FieldRegistry<Cluster>) -> Result<(), FieldError> {
    register_filter(
        registry,
        WHITELIST,
        |c: &mut Cluster| &mut c.instance_types_mut().whitelist,
        |c: &Cluster| c.instance_types().and_then(|t| t.whitelist.as_ref()),
    )?;
    register_filter(
        registry,
        BLACKLIST,
        |c: &mut Cluster| &mut c.instance_types_mut().blacklist,
        |c: &Cluster| c.instance_types().and_then(|t| t.blacklist.as_ref()),
    )?;
    Ok(())
}

fn register_filter(
    registry: &mut FieldRegistry<Cluster>,
    field: &'static str,
    slot: fn(&mut Cluster) -> &mut Option<Vec<String>>,
    value_of: for<'a> fn(&'a Cluster) -> Option<&'a Vec<String>>,
) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            field,
            FieldSchema::optional(ValueType::List).with_elem(ValueType::Str),
            Box::new(move |cluster: &Cluster, config| {
                config.set_opt(field, flatten_string_list(value_of(cluster)));
                Ok(())
            }),
            Box::new(move |config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(field) {
                    *slot(cluster) = Some(expand_string_list(field, value)?);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(move |config, cluster: &mut Cluster| {
            *slot(cluster) = match config.get_ok(field) {
                Some(value) => Some(expand_string_list(field, value)?),
                None => None,
            };
            Ok(())
        }))
        .with_roll_trigger(),
    )
}
