//! Typed client surface for the Ocean cluster control plane.
//!
//! This crate holds the wire-shaped model types (`Cluster` and its
//! sub-objects, `RollSpec`), the structured error envelope the control plane
//! answers with (`ApiError`), and the async `OceanApi` trait that the
//! lifecycle controller in `oceanic-provider` calls through.
//!
//! All sub-objects are optional and skipped during serialization when unset,
//! so a serialized payload shows exactly the fields that would go on the
//! wire.
//!
//! With the `test-support` feature enabled, [`mock::MockOceanApi`] provides a
//! scripted in-memory client for lifecycle tests.

mod client;
mod error;
mod model;

#[cfg(feature = "test-support")]
pub mod mock;

pub use client::{ApiResult, OceanApi};
pub use error::{ApiError, ApiErrorItem, ERR_CODE_CLUSTER_NOT_FOUND, ERR_CODE_INVALID_PARAMETER};
pub use model::{
    AutoScaler, Capacity, Cluster, Compute, Headroom, InstanceTypes, LaunchSpec, Logging,
    LoggingExport, ResourceLimits, RollSpec, S3Export, ScaleDown, Scheduling, SchedulingTask,
    ShutdownHours, Strategy, Tag,
};
