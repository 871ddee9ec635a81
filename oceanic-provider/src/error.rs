//! Controller-level errors.

use oceanic_fields::FieldError;
use oceanic_sdk::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("failed to encode cluster payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to create cluster: {source}")]
    Create { source: ApiError },

    #[error("failed to read cluster {cluster_id}: {source}")]
    Read {
        cluster_id: String,
        source: ApiError,
    },

    #[error("failed to update cluster {cluster_id}: {source}")]
    Update {
        cluster_id: String,
        source: ApiError,
    },

    #[error("failed to delete cluster {cluster_id}: {source}")]
    Delete {
        cluster_id: String,
        source: ApiError,
    },

    #[error("cluster {cluster_id}: unable to roll, no update policy found")]
    MissingUpdatePolicy { cluster_id: String },

    #[error("cluster {cluster_id}: unable to roll, no roll configuration found")]
    MissingRollConfiguration { cluster_id: String },

    #[error("failed to roll cluster {cluster_id}: {source}")]
    RollFailed {
        cluster_id: String,
        source: ApiError,
    },

    #[error("control plane returned a cluster without an id")]
    MissingClusterId,

    #[error("resource has no remote identity yet")]
    NotCreated,
}

impl ProviderError {
    pub fn create(source: ApiError) -> Self {
        Self::Create { source }
    }

    pub fn read(cluster_id: impl Into<String>, source: ApiError) -> Self {
        Self::Read {
            cluster_id: cluster_id.into(),
            source,
        }
    }

    pub fn update(cluster_id: impl Into<String>, source: ApiError) -> Self {
        Self::Update {
            cluster_id: cluster_id.into(),
            source,
        }
    }

    pub fn delete(cluster_id: impl Into<String>, source: ApiError) -> Self {
        Self::Delete {
            cluster_id: cluster_id.into(),
            source,
        }
    }

    pub fn roll_failed(cluster_id: impl Into<String>, source: ApiError) -> Self {
        Self::RollFailed {
            cluster_id: cluster_id.into(),
            source,
        }
    }
}
