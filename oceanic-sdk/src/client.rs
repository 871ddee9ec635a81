//! Async client trait for the Ocean control plane.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Cluster, RollSpec};

/// Result alias for control plane calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the lifecycle controller issues against the control plane.
///
/// `read_cluster` may answer `Ok(None)`: the call succeeded but carried no
/// object, which callers treat the same as the not-found error class.
#[async_trait]
pub trait OceanApi: Send + Sync {
    /// Create a cluster; the response echoes the cluster with its assigned id.
    async fn create_cluster(&self, cluster: &Cluster) -> ApiResult<Cluster>;

    /// Fetch a cluster by id.
    async fn read_cluster(&self, cluster_id: &str) -> ApiResult<Option<Cluster>>;

    /// Replace the mutable portion of a cluster. The input carries its id.
    async fn update_cluster(&self, cluster: &Cluster) -> ApiResult<()>;

    /// Delete a cluster by id.
    async fn delete_cluster(&self, cluster_id: &str) -> ApiResult<()>;

    /// Start a rolling replacement of the cluster's compute.
    async fn create_roll(&self, roll: &RollSpec) -> ApiResult<()>;
}

#[async_trait]
impl<T: OceanApi + ?Sized> OceanApi for Arc<T> {
    async fn create_cluster(&self, cluster: &Cluster) -> ApiResult<Cluster> {
        (**self).create_cluster(cluster).await
    }

    async fn read_cluster(&self, cluster_id: &str) -> ApiResult<Option<Cluster>> {
        (**self).read_cluster(cluster_id).await
    }

    async fn update_cluster(&self, cluster: &Cluster) -> ApiResult<()> {
        (**self).update_cluster(cluster).await
    }

    async fn delete_cluster(&self, cluster_id: &str) -> ApiResult<()> {
        (**self).delete_cluster(cluster_id).await
    }

    async fn create_roll(&self, roll: &RollSpec) -> ApiResult<()> {
        (**self).create_roll(roll).await
    }
}
