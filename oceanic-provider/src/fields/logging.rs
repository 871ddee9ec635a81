//! Log shipping configuration.

use indexmap::IndexMap;
use oceanic_fields::{
    ConfigValue, FieldDescriptor, FieldError, FieldRegistry, FieldSchema, ValueType,
};
use oceanic_sdk::{Cluster, Logging, LoggingExport, S3Export};

use super::{entry_map, entry_str};

pub const LOGGING: &str = "logging";

pub const EXPORT: &str = "export";
pub const S3: &str = "s3";
pub const ID: &str = "id";

pub fn register(registry: &mut FieldRegistry<Cluster>) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            LOGGING,
            FieldSchema::optional(ValueType::Map),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(LOGGING, flatten_logging(cluster.logging.as_ref()));
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(LOGGING) {
                    cluster.logging = Some(expand_logging(value)?);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.logging = match config.get_ok(LOGGING) {
                Some(value) => Some(expand_logging(value)?),
                None => None,
            };
            Ok(())
        })),
    )
}

pub fn expand_logging(value: &ConfigValue) -> Result<Logging, FieldError> {
    let entries = value
        .as_map()
        .ok_or_else(|| FieldError::type_mismatch(LOGGING, "map", value.type_name()))?;

    let mut logging = Logging::default();
    if let Some(export) = entry_map(LOGGING, entries, EXPORT)? {
        let mut result = LoggingExport::default();
        if let Some(s3) = entry_map(EXPORT, export, S3)? {
            result.s3 = Some(S3Export {
                id: entry_str(S3, s3, ID)?,
            });
        }
        logging.export = Some(result);
    }
    Ok(logging)
}

/// Flatten to a nested map; a logging block with no destination yields
/// absent.
pub fn flatten_logging(logging: Option<&Logging>) -> Option<ConfigValue> {
    let export = logging?.export.as_ref()?;
    let id = export.s3.as_ref()?.id.clone()?;

    let mut s3 = IndexMap::new();
    s3.insert(ID.to_string(), ConfigValue::Str(id));
    let mut export = IndexMap::new();
    export.insert(S3.to_string(), ConfigValue::Map(s3));
    let mut entries = IndexMap::new();
    entries.insert(EXPORT.to_string(), ConfigValue::Map(export));
    Some(ConfigValue::Map(entries))
}
