//! Cluster lifecycle controller.
//!
//! Drives one Ocean cluster resource through create, read, update, and
//! delete against the control plane, translating between the flat
//! configuration and the wire-shaped cluster object via the field registry.

use std::time::Duration;

use oceanic_fields::{FieldRegistry, ResourceConfig};
use oceanic_sdk::{Cluster, OceanApi};
use tracing::{debug, info};

use crate::error::{ProviderError, Result};
use crate::fields::{cluster_registry, launch_config};
use crate::policy::{expand_roll_config, UpdatePolicy};
use crate::retry::{retry_create, CreateRetry};

/// Timing knobs for the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Wait before the first create attempt when the cluster references a
    /// launch profile, giving the grant time to propagate.
    pub settle_delay: Duration,
    pub create_retry: CreateRetry,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(10),
            create_retry: CreateRetry::default(),
        }
    }
}

/// One resource's identity and configuration.
#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    /// Remote identity; `None` until created and after the remote side is
    /// observed gone.
    pub id: Option<String>,
    pub config: ResourceConfig,
}

impl ResourceState {
    pub fn new(config: ResourceConfig) -> Self {
        Self { id: None, config }
    }

    pub fn with_id(id: impl Into<String>, config: ResourceConfig) -> Self {
        Self {
            id: Some(id.into()),
            config,
        }
    }

    pub fn is_created(&self) -> bool {
        self.id.is_some()
    }
}

/// Lifecycle controller for the Ocean cluster resource.
pub struct ClusterController<C> {
    api: C,
    registry: FieldRegistry<Cluster>,
    config: ControllerConfig,
}

impl<C: OceanApi> ClusterController<C> {
    pub fn new(api: C) -> Result<Self> {
        Self::with_config(api, ControllerConfig::default())
    }

    pub fn with_config(api: C, config: ControllerConfig) -> Result<Self> {
        Ok(Self {
            api,
            registry: cluster_registry()?,
            config,
        })
    }

    /// Create the remote cluster from the state's configuration, record the
    /// assigned id, and read the result back.
    pub async fn create(&self, state: &mut ResourceState) -> Result<()> {
        let cluster = self.registry.apply_on_create(&state.config)?;
        debug!(payload = %serde_json::to_string(&cluster)?, "creating cluster");

        if state
            .config
            .get_ok(launch_config::LAUNCH_PROFILE_NAME)
            .is_some()
        {
            // a freshly granted launch profile is not visible immediately
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let created = retry_create(&self.config.create_retry, || {
            self.api.create_cluster(&cluster)
        })
        .await
        .map_err(ProviderError::create)?;

        let id = created.id.ok_or(ProviderError::MissingClusterId)?;
        info!(cluster_id = %id, "cluster created");
        state.id = Some(id);

        self.read(state).await
    }

    /// Refresh the state's configuration from the remote cluster.
    ///
    /// A cluster the control plane no longer knows clears the identity and
    /// succeeds, so callers can treat the resource as gone.
    pub async fn read(&self, state: &mut ResourceState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };

        let cluster = match self.api.read_cluster(&id).await {
            Ok(cluster) => cluster,
            Err(err) if err.is_cluster_not_found() => None,
            Err(err) => return Err(ProviderError::read(id, err)),
        };

        let Some(cluster) = cluster else {
            info!(cluster_id = %id, "cluster no longer exists, clearing identity");
            state.id = None;
            return Ok(());
        };

        self.registry.apply_on_read(&cluster, &mut state.config)?;
        debug!(cluster_id = %id, "configuration refreshed");
        Ok(())
    }

    /// Apply the difference between `prev` and the state's configuration to
    /// the remote cluster, roll if the update policy asks for one, and read
    /// the result back.
    ///
    /// A failed roll aborts with the remote update already applied; the
    /// caller's next update starts from the refreshed remote state.
    pub async fn update(&self, state: &mut ResourceState, prev: &ResourceConfig) -> Result<()> {
        let id = state.id.clone().ok_or(ProviderError::NotCreated)?;

        let outcome = self.registry.apply_on_update(prev, &state.config)?;
        if outcome.should_update {
            let mut cluster = outcome.object;
            cluster.id = Some(id.clone());
            debug!(payload = %serde_json::to_string(&cluster)?, "updating cluster");

            self.api
                .update_cluster(&cluster)
                .await
                .map_err(|err| ProviderError::update(&id, err))?;
            info!(cluster_id = %id, "cluster updated");

            let policy = UpdatePolicy::from_config(&state.config)?;
            let wants_roll = policy
                .as_ref()
                .is_some_and(|p| p.wants_roll(outcome.changes_required_roll, outcome.tags_changed));
            if wants_roll {
                self.roll(&id, &state.config).await?;
            } else {
                debug!(cluster_id = %id, "roll not required for this update");
            }
        } else {
            debug!(cluster_id = %id, "no remote change required");
        }

        self.read(state).await
    }

    /// Start a rolling replacement per the configuration's update policy.
    pub async fn roll(&self, cluster_id: &str, config: &ResourceConfig) -> Result<()> {
        let policy = UpdatePolicy::from_config(config)?.ok_or_else(|| {
            ProviderError::MissingUpdatePolicy {
                cluster_id: cluster_id.to_string(),
            }
        })?;
        let roll_config = policy.roll_config.as_ref().ok_or_else(|| {
            ProviderError::MissingRollConfiguration {
                cluster_id: cluster_id.to_string(),
            }
        })?;

        let spec = expand_roll_config(roll_config, cluster_id)?;
        debug!(payload = %serde_json::to_string(&spec)?, "rolling cluster");

        self.api
            .create_roll(&spec)
            .await
            .map_err(|err| ProviderError::roll_failed(cluster_id, err))?;
        info!(cluster_id = %cluster_id, "cluster roll started");
        Ok(())
    }

    /// Delete the remote cluster and clear the identity.
    pub async fn delete(&self, state: &mut ResourceState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };

        self.api
            .delete_cluster(&id)
            .await
            .map_err(|err| ProviderError::delete(&id, err))?;
        info!(cluster_id = %id, "cluster deleted");
        state.id = None;
        Ok(())
    }
}
