//! Time-based automation: shutdown hours and cron tasks.

use indexmap::IndexMap;
use oceanic_fields::{
    ConfigValue, FieldDescriptor, FieldError, FieldRegistry, FieldSchema, ValueType,
};
use oceanic_sdk::{Cluster, Scheduling, SchedulingTask, ShutdownHours};

use super::{entry_bool, entry_map, entry_str};

pub const SCHEDULING: &str = "scheduled_task";

pub const SHUTDOWN_HOURS: &str = "shutdown_hours";
pub const TASKS: &str = "tasks";
pub const IS_ENABLED: &str = "is_enabled";
pub const TIME_WINDOWS: &str = "time_windows";
pub const CRON_EXPRESSION: &str = "cron_expression";
pub const TASK_TYPE: &str = "task_type";

pub fn register(registry: &mut FieldRegistry<Cluster>) -> Result<(), FieldError> {
    registry.register(
        FieldDescriptor::new(
            SCHEDULING,
            FieldSchema::optional(ValueType::Map),
            Box::new(|cluster: &Cluster, config| {
                config.set_opt(SCHEDULING, flatten_scheduling(cluster.scheduling.as_ref()));
                Ok(())
            }),
            Box::new(|config, cluster: &mut Cluster| {
                if let Some(value) = config.get_ok(SCHEDULING) {
                    cluster.scheduling = Some(expand_scheduling(value)?);
                }
                Ok(())
            }),
        )
        .with_update(Box::new(|config, cluster: &mut Cluster| {
            cluster.scheduling = match config.get_ok(SCHEDULING) {
                Some(value) => Some(expand_scheduling(value)?),
                None => None,
            };
            Ok(())
        })),
    )
}

pub fn expand_scheduling(value: &ConfigValue) -> Result<Scheduling, FieldError> {
    let entries = value
        .as_map()
        .ok_or_else(|| FieldError::type_mismatch(SCHEDULING, "map", value.type_name()))?;

    let mut scheduling = Scheduling::default();

    if let Some(hours) = entry_map(SCHEDULING, entries, SHUTDOWN_HOURS)? {
        let windows = match hours.get(TIME_WINDOWS) {
            None => None,
            Some(value) => {
                let items = value.as_list().ok_or_else(|| {
                    FieldError::type_mismatch(
                        format!("{SHUTDOWN_HOURS}.{TIME_WINDOWS}"),
                        "list",
                        value.type_name(),
                    )
                })?;
                let mut result = Vec::with_capacity(items.len());
                for item in items {
                    let window = item.as_str().ok_or_else(|| {
                        FieldError::invalid(
                            format!("{SHUTDOWN_HOURS}.{TIME_WINDOWS}"),
                            format!("time windows must be strings, got {}", item.type_name()),
                        )
                    })?;
                    result.push(window.to_string());
                }
                Some(result)
            }
        };
        scheduling.shutdown_hours = Some(ShutdownHours {
            is_enabled: entry_bool(SHUTDOWN_HOURS, hours, IS_ENABLED)?,
            time_windows: windows,
        });
    }

    if let Some(value) = entries.get(TASKS) {
        let items = value.as_list().ok_or_else(|| {
            FieldError::type_mismatch(
                format!("{SCHEDULING}.{TASKS}"),
                "list",
                value.type_name(),
            )
        })?;
        let mut tasks = Vec::with_capacity(items.len());
        for item in items {
            let task = item.as_map().ok_or_else(|| {
                FieldError::type_mismatch(
                    format!("{SCHEDULING}.{TASKS}"),
                    "map",
                    item.type_name(),
                )
            })?;
            tasks.push(SchedulingTask {
                is_enabled: entry_bool(TASKS, task, IS_ENABLED)?,
                cron_expression: entry_str(TASKS, task, CRON_EXPRESSION)?,
                task_type: entry_str(TASKS, task, TASK_TYPE)?,
            });
        }
        scheduling.tasks = Some(tasks);
    }

    Ok(scheduling)
}

/// Flatten to a map of present blocks; a fully empty scheduling yields
/// absent.
pub fn flatten_scheduling(scheduling: Option<&Scheduling>) -> Option<ConfigValue> {
    let scheduling = scheduling?;
    let mut entries = IndexMap::new();

    if let Some(hours) = scheduling.shutdown_hours.as_ref() {
        let mut sub = IndexMap::new();
        if let Some(enabled) = hours.is_enabled {
            sub.insert(IS_ENABLED.to_string(), ConfigValue::Bool(enabled));
        }
        if let Some(windows) = hours.time_windows.as_ref() {
            if !windows.is_empty() {
                sub.insert(
                    TIME_WINDOWS.to_string(),
                    ConfigValue::string_list(windows.iter().cloned()),
                );
            }
        }
        if !sub.is_empty() {
            entries.insert(SHUTDOWN_HOURS.to_string(), ConfigValue::Map(sub));
        }
    }

    if let Some(tasks) = scheduling.tasks.as_ref() {
        if !tasks.is_empty() {
            let items = tasks
                .iter()
                .map(|task| {
                    let mut sub = IndexMap::new();
                    if let Some(enabled) = task.is_enabled {
                        sub.insert(IS_ENABLED.to_string(), ConfigValue::Bool(enabled));
                    }
                    if let Some(cron) = task.cron_expression.clone() {
                        sub.insert(CRON_EXPRESSION.to_string(), ConfigValue::Str(cron));
                    }
                    if let Some(kind) = task.task_type.clone() {
                        sub.insert(TASK_TYPE.to_string(), ConfigValue::Str(kind));
                    }
                    ConfigValue::Map(sub)
                })
                .collect();
            entries.insert(TASKS.to_string(), ConfigValue::List(items));
        }
    }

    if entries.is_empty() {
        None
    } else {
        Some(ConfigValue::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oceanic_fields::ResourceConfig;

    fn registry() -> FieldRegistry<Cluster> {
        let mut registry = FieldRegistry::new("test");
        register(&mut registry).unwrap();
        registry
    }

    fn sample() -> ConfigValue {
        ConfigValue::map([
            (
                SHUTDOWN_HOURS,
                ConfigValue::map([
                    (IS_ENABLED, ConfigValue::from(true)),
                    (
                        TIME_WINDOWS,
                        ConfigValue::string_list(["Sat:08:00-Sun:08:00"]),
                    ),
                ]),
            ),
            (
                TASKS,
                ConfigValue::List(vec![ConfigValue::map([
                    (IS_ENABLED, ConfigValue::from(true)),
                    (CRON_EXPRESSION, ConfigValue::from("0 1 * * *")),
                    (TASK_TYPE, ConfigValue::from("clusterRoll")),
                ])]),
            ),
        ])
    }

    #[test]
    fn expand_builds_hours_and_tasks() {
        let scheduling = expand_scheduling(&sample()).unwrap();
        let hours = scheduling.shutdown_hours.unwrap();
        assert_eq!(hours.is_enabled, Some(true));
        assert_eq!(
            hours.time_windows,
            Some(vec!["Sat:08:00-Sun:08:00".to_string()])
        );
        let tasks = scheduling.tasks.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_type.as_deref(), Some("clusterRoll"));
    }

    #[test]
    fn expand_rejects_non_map_tasks() {
        let value = ConfigValue::map([(TASKS, ConfigValue::string_list(["oops"]))]);
        let err = expand_scheduling(&value).unwrap_err();
        assert!(err.to_string().contains("scheduled_task.tasks"));
    }

    #[test]
    fn flatten_round_trips() {
        let scheduling = expand_scheduling(&sample()).unwrap();
        assert_eq!(flatten_scheduling(Some(&scheduling)), Some(sample()));
        assert!(flatten_scheduling(Some(&Scheduling::default())).is_none());
    }

    #[test]
    fn create_skips_absent_block() {
        let cluster = registry().apply_on_create(&ResourceConfig::new()).unwrap();
        assert!(cluster.scheduling.is_none());
    }
}
