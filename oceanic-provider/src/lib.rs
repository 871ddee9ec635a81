//! Lifecycle management for Ocean clusters.
//!
//! The crate wires three layers together: the field registry describing the
//! cluster resource ([`fields`]), the update policy deciding when a remote
//! update rolls the cluster's nodes ([`policy`]), and the controller driving
//! create/read/update/delete against the control plane ([`controller`]).

pub mod controller;
pub mod error;
pub mod fields;
pub mod policy;
pub mod retry;

pub use controller::{ClusterController, ControllerConfig, ResourceState};
pub use error::{ProviderError, Result};
pub use fields::cluster_registry;
pub use policy::{expand_roll_config, UpdatePolicy};
pub use retry::{classify_create_error, retry_create, CreateRetry, RetryClass};
