//! Wire-shaped model types for the Ocean control plane API.
//!
//! Every sub-object is `Option` and omitted from payloads when unset. The
//! `*_mut` accessors materialize missing ancestry on demand so a field
//! mapper can write a deeply nested value without caring whether any other
//! mapper has run before it.

use serde::{Deserialize, Serialize};

/// A managed cluster as the control plane represents it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<Compute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaler: Option<AutoScaler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<Scheduling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,
}

impl Cluster {
    pub fn capacity_mut(&mut self) -> &mut Capacity {
        self.capacity.get_or_insert_with(Capacity::default)
    }

    pub fn strategy_mut(&mut self) -> &mut Strategy {
        self.strategy.get_or_insert_with(Strategy::default)
    }

    pub fn compute_mut(&mut self) -> &mut Compute {
        self.compute.get_or_insert_with(Compute::default)
    }

    pub fn instance_types_mut(&mut self) -> &mut InstanceTypes {
        self.compute_mut()
            .instance_types
            .get_or_insert_with(InstanceTypes::default)
    }

    pub fn launch_spec_mut(&mut self) -> &mut LaunchSpec {
        self.compute_mut()
            .launch_specification
            .get_or_insert_with(LaunchSpec::default)
    }

    pub fn auto_scaler_mut(&mut self) -> &mut AutoScaler {
        self.auto_scaler.get_or_insert_with(AutoScaler::default)
    }

    pub fn scheduling_mut(&mut self) -> &mut Scheduling {
        self.scheduling.get_or_insert_with(Scheduling::default)
    }

    /// Launch specification, if any ancestor is present.
    pub fn launch_spec(&self) -> Option<&LaunchSpec> {
        self.compute.as_ref()?.launch_specification.as_ref()
    }

    /// Instance type filters, if any ancestor is present.
    pub fn instance_types(&self) -> Option<&InstanceTypes> {
        self.compute.as_ref()?.instance_types.as_ref()
    }
}

/// Desired node counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,
}

/// Purchasing strategy for the cluster's compute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_to_on_demand: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilize_reserved_instances: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilize_commitments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draining_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<i64>,
}

/// Compute settings: placement, instance type filters, launch template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_types: Option<InstanceTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_specification: Option<LaunchSpec>,
}

/// Instance type allow/deny filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTypes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<Vec<String>>,
}

/// Template applied to every node the cluster launches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pair: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_volume_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

/// A key/value tag propagated to launched nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

/// Autoscaler settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScaler {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_config: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headroom: Option<Headroom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<ScaleDown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<ResourceLimits>,
}

/// Spare capacity the autoscaler keeps available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headroom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_per_unit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_per_unit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_per_unit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_of_units: Option<i64>,
}

/// Scale-down behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleDown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_periods: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale_down_percentage: Option<i64>,
}

/// Hard ceilings for the autoscaler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_vcpu: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_gib: Option<i64>,
}

/// Time-based automation for the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_hours: Option<ShutdownHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<SchedulingTask>>,
}

/// Recurring windows during which the cluster is scaled to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownHours {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_windows: Option<Vec<String>>,
}

/// A cron-scheduled maintenance task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

/// Log shipping settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logging {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<LoggingExport>,
}

/// Export destinations for cluster logs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingExport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Export>,
}

/// An object-storage export destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Export {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Specification for one rolling replacement of a cluster's compute.
///
/// `cluster_id` always carries the remote identity of the cluster being
/// rolled; the remaining knobs come from the resource's update policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size_percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_min_healthy_percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_spec_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respect_pdb: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_sub_objects_are_omitted_from_payloads() {
        let cluster = Cluster {
            name: Some("prod".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&cluster).unwrap();
        assert_eq!(json, r#"{"name":"prod"}"#);
    }

    #[test]
    fn nested_fields_serialize_camel_case() {
        let mut cluster = Cluster::default();
        cluster.launch_spec_mut().image_id = Some("img-1".into());
        let json = serde_json::to_string(&cluster).unwrap();
        assert_eq!(
            json,
            r#"{"compute":{"launchSpecification":{"imageId":"img-1"}}}"#
        );
    }

    #[test]
    fn ancestry_accessors_materialize_on_demand() {
        let mut cluster = Cluster::default();
        assert!(cluster.instance_types().is_none());
        cluster.instance_types_mut().whitelist = Some(vec!["m5.large".into()]);
        assert_eq!(
            cluster.instance_types().unwrap().whitelist,
            Some(vec!["m5.large".to_string()])
        );
        // the sibling sub-object is still untouched
        assert!(cluster.compute.as_ref().unwrap().launch_specification.is_none());
    }

    #[test]
    fn cluster_round_trips_through_json() {
        let mut cluster = Cluster {
            id: Some("o-123".into()),
            name: Some("prod".into()),
            region: Some("us-west-2".into()),
            ..Default::default()
        };
        cluster.capacity_mut().target = Some(3);
        cluster.launch_spec_mut().tags = Some(vec![Tag::new("env", "prod")]);

        let json = serde_json::to_string(&cluster).unwrap();
        let parsed: Cluster = serde_json::from_str(&json).unwrap();
        assert_eq!(cluster, parsed);
    }
}
