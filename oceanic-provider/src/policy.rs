//! The update policy: whether a remote update rolls the cluster's nodes,
//! and how the roll is batched.
//!
//! The policy is configuration-only. It never reaches the control plane as
//! part of the cluster object; the controller consults it after a remote
//! update to decide whether to start a roll.

use oceanic_fields::{ConfigValue, FieldError, ResourceConfig};
use oceanic_sdk::RollSpec;

use crate::fields::{entry_bool, entry_i64, expand_string_list};

pub const UPDATE_POLICY: &str = "update_policy";

pub const SHOULD_ROLL: &str = "should_roll";
pub const CONDITIONED_ROLL: &str = "conditioned_roll";
pub const AUTO_APPLY_TAGS: &str = "auto_apply_tags";
pub const ROLL_CONFIG: &str = "roll_config";

pub const BATCH_SIZE_PERCENTAGE: &str = "batch_size_percentage";
pub const BATCH_MIN_HEALTHY_PERCENTAGE: &str = "batch_min_healthy_percentage";
pub const LAUNCH_SPEC_IDS: &str = "launch_spec_ids";
pub const RESPECT_PDB: &str = "respect_pdb";

/// The parsed `update_policy` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePolicy {
    pub should_roll: bool,
    pub conditioned_roll: bool,
    pub auto_apply_tags: bool,
    pub roll_config: Option<ConfigValue>,
}

impl UpdatePolicy {
    /// Parse the policy out of a resource configuration. Absent policy is
    /// `Ok(None)`; the booleans default to `false` when unset.
    pub fn from_config(config: &ResourceConfig) -> Result<Option<Self>, FieldError> {
        let Some(value) = config.get_exists(UPDATE_POLICY) else {
            return Ok(None);
        };
        let entries = value.as_map().ok_or_else(|| {
            FieldError::type_mismatch(UPDATE_POLICY, "map", value.type_name())
        })?;

        Ok(Some(Self {
            should_roll: entry_bool(UPDATE_POLICY, entries, SHOULD_ROLL)?.unwrap_or(false),
            conditioned_roll: entry_bool(UPDATE_POLICY, entries, CONDITIONED_ROLL)?
                .unwrap_or(false),
            auto_apply_tags: entry_bool(UPDATE_POLICY, entries, AUTO_APPLY_TAGS)?
                .unwrap_or(false),
            roll_config: entries.get(ROLL_CONFIG).cloned(),
        }))
    }

    /// Whether an update with the given change markers should roll the
    /// cluster. A conditioned roll only fires when a roll-triggering field
    /// changed; tag changes count unless tags are applied automatically.
    pub fn wants_roll(&self, changes_required_roll: bool, tags_changed: bool) -> bool {
        if !self.should_roll {
            return false;
        }
        !self.conditioned_roll
            || changes_required_roll
            || (!self.auto_apply_tags && tags_changed)
    }
}

/// Expand a `roll_config` block into a roll specification stamped with the
/// cluster's remote identity.
///
/// The minimum-healthy percentage is only sent when positive; zero would
/// otherwise read as "no healthy nodes required".
pub fn expand_roll_config(
    value: &ConfigValue,
    cluster_id: &str,
) -> Result<RollSpec, FieldError> {
    let entries = value
        .as_map()
        .ok_or_else(|| FieldError::type_mismatch(ROLL_CONFIG, "map", value.type_name()))?;

    let mut spec = RollSpec {
        cluster_id: Some(cluster_id.to_string()),
        batch_size_percentage: entry_i64(ROLL_CONFIG, entries, BATCH_SIZE_PERCENTAGE)?,
        respect_pdb: entry_bool(ROLL_CONFIG, entries, RESPECT_PDB)?,
        ..Default::default()
    };

    if let Some(healthy) = entry_i64(ROLL_CONFIG, entries, BATCH_MIN_HEALTHY_PERCENTAGE)? {
        if healthy > 0 {
            spec.batch_min_healthy_percentage = Some(healthy);
        }
    }
    if let Some(ids) = entries.get(LAUNCH_SPEC_IDS) {
        spec.launch_spec_ids = Some(expand_string_list(LAUNCH_SPEC_IDS, ids)?);
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_config(entries: ConfigValue) -> ResourceConfig {
        let mut config = ResourceConfig::new();
        config.set(UPDATE_POLICY, entries);
        config
    }

    #[test]
    fn absent_policy_parses_to_none() {
        assert_eq!(
            UpdatePolicy::from_config(&ResourceConfig::new()).unwrap(),
            None
        );
    }

    #[test]
    fn booleans_default_to_false() {
        let config = policy_config(ConfigValue::map([(
            SHOULD_ROLL,
            ConfigValue::from(true),
        )]));
        let policy = UpdatePolicy::from_config(&config).unwrap().unwrap();
        assert!(policy.should_roll);
        assert!(!policy.conditioned_roll);
        assert!(!policy.auto_apply_tags);
        assert!(policy.roll_config.is_none());
    }

    #[test]
    fn wants_roll_matrix() {
        let unconditional = UpdatePolicy {
            should_roll: true,
            ..Default::default()
        };
        assert!(unconditional.wants_roll(false, false));

        let conditioned = UpdatePolicy {
            should_roll: true,
            conditioned_roll: true,
            ..Default::default()
        };
        assert!(!conditioned.wants_roll(false, false));
        assert!(conditioned.wants_roll(true, false));
        assert!(conditioned.wants_roll(false, true));

        let auto_tags = UpdatePolicy {
            should_roll: true,
            conditioned_roll: true,
            auto_apply_tags: true,
            ..Default::default()
        };
        assert!(!auto_tags.wants_roll(false, true));

        let disabled = UpdatePolicy::default();
        assert!(!disabled.wants_roll(true, true));
    }

    #[test]
    fn roll_config_expands_with_identity() {
        let value = ConfigValue::map([
            (BATCH_SIZE_PERCENTAGE, ConfigValue::from(25i64)),
            (BATCH_MIN_HEALTHY_PERCENTAGE, ConfigValue::from(50i64)),
            (LAUNCH_SPEC_IDS, ConfigValue::string_list(["ols-1", ""])),
            (RESPECT_PDB, ConfigValue::from(true)),
        ]);
        let spec = expand_roll_config(&value, "o-123").unwrap();
        assert_eq!(spec.cluster_id.as_deref(), Some("o-123"));
        assert_eq!(spec.batch_size_percentage, Some(25));
        assert_eq!(spec.batch_min_healthy_percentage, Some(50));
        assert_eq!(spec.launch_spec_ids, Some(vec!["ols-1".to_string()]));
        assert_eq!(spec.respect_pdb, Some(true));
    }

    #[test]
    fn zero_min_healthy_is_not_sent() {
        let value = ConfigValue::map([
            (BATCH_SIZE_PERCENTAGE, ConfigValue::from(0i64)),
            (BATCH_MIN_HEALTHY_PERCENTAGE, ConfigValue::from(0i64)),
        ]);
        let spec = expand_roll_config(&value, "o-123").unwrap();
        // batch size keeps an explicit zero, minimum healthy does not
        assert_eq!(spec.batch_size_percentage, Some(0));
        assert_eq!(spec.batch_min_healthy_percentage, None);
    }

    #[test]
    fn malformed_roll_config_errors() {
        let err = expand_roll_config(&ConfigValue::from("nope"), "o-123").unwrap_err();
        assert_eq!(err.to_string(), "field roll_config: expected map, got string");
    }
}
