//! Configuration representation and typed field registry.
//!
//! A declarative resource is described twice: as a flat, ordered mapping of
//! field name to value (the configuration a user writes) and as the remote
//! control plane's typed domain object. This crate holds the pieces that
//! bridge the two:
//!
//! - [`ConfigValue`] / [`ResourceConfig`]: the ordered configuration
//!   mapping, with absent-vs-present semantics and the zero-means-absent
//!   convention for optional scalars.
//! - [`FieldDescriptor`] / [`FieldRegistry`]: one registered entry per
//!   field, bundling its declared schema with typed read/create/update
//!   closures over the domain object. Registries are built by explicit
//!   composition; there is no global registration.

mod error;
mod registry;
mod value;

pub use error::FieldError;
pub use registry::{FieldDescriptor, FieldRegistry, FieldSchema, UpdateOutcome, ValueType};
pub use value::{ConfigValue, ResourceConfig};
