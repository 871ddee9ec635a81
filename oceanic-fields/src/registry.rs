//! Typed field registry.
//!
//! Each resource type composes one `FieldRegistry` at startup from its
//! field-group modules. A registered descriptor bundles the field's declared
//! schema with typed closures over the domain object; the registry runs them
//! in registration order and short-circuits on the first error.
//!
//! No closure may assume another field has or has not run: read closures
//! tolerate missing ancestry in the domain object, and write closures
//! materialize ancestry on demand.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::FieldError;
use crate::value::ResourceConfig;

/// Declared value shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
}

/// Declared schema of one field. Descriptive only; validation belongs to
/// the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub value_type: ValueType,
    pub required: bool,
    pub computed: bool,
    /// Element shape for `List` fields.
    pub elem: Option<ValueType>,
}

impl FieldSchema {
    pub fn optional(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: false,
            computed: false,
            elem: None,
        }
    }

    pub fn required(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: true,
            computed: false,
            elem: None,
        }
    }

    /// Mark the field as remotely computed when not set.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_elem(mut self, elem: ValueType) -> Self {
        self.elem = Some(elem);
        self
    }
}

/// Reads one field out of the domain object into the configuration.
pub type ReadFn<D> = Box<dyn Fn(&D, &mut ResourceConfig) -> Result<(), FieldError> + Send + Sync>;

/// Writes one field from the configuration into the domain object.
pub type WriteFn<D> = Box<dyn Fn(&ResourceConfig, &mut D) -> Result<(), FieldError> + Send + Sync>;

/// One field's registration: schema plus read/create/update mappers.
pub struct FieldDescriptor<D> {
    name: String,
    schema: FieldSchema,
    read: ReadFn<D>,
    create: WriteFn<D>,
    update: Option<WriteFn<D>>,
    triggers_roll: bool,
    tags_field: bool,
}

impl<D> FieldDescriptor<D> {
    pub fn new(
        name: impl Into<String>,
        schema: FieldSchema,
        read: ReadFn<D>,
        create: WriteFn<D>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            read,
            create,
            update: None,
            triggers_roll: false,
            tags_field: false,
        }
    }

    /// Attach the update mapper. Fields without one are config-only: their
    /// changes never trigger a remote update.
    pub fn with_update(mut self, update: WriteFn<D>) -> Self {
        self.update = Some(update);
        self
    }

    /// A change to this field requires a roll of the cluster's compute.
    pub fn with_roll_trigger(mut self) -> Self {
        self.triggers_roll = true;
        self
    }

    /// A change to this field counts as a tags-only change for the roll
    /// policy.
    pub fn with_tags_marker(mut self) -> Self {
        self.tags_field = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> FieldSchema {
        self.schema
    }
}

/// What a prev/next comparison decided, plus the assembled domain object.
///
/// This is the collaborator contract the lifecycle controller consumes:
/// `should_update` gates the remote update call, and the two flags feed the
/// conditional roll policy.
#[derive(Debug)]
pub struct UpdateOutcome<D> {
    pub should_update: bool,
    pub changes_required_roll: bool,
    pub tags_changed: bool,
    pub object: D,
}

/// Ordered field registry for one resource type.
pub struct FieldRegistry<D> {
    resource: String,
    fields: IndexMap<String, FieldDescriptor<D>>,
}

impl<D: Default> FieldRegistry<D> {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            fields: IndexMap::new(),
        }
    }

    /// Resource type name this registry serves.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Add one field. Registration order is execution order.
    pub fn register(&mut self, descriptor: FieldDescriptor<D>) -> Result<(), FieldError> {
        if self.fields.contains_key(descriptor.name()) {
            return Err(FieldError::Duplicate {
                field: descriptor.name().to_string(),
            });
        }
        self.fields
            .insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Registered field names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Assemble a fresh domain object from the configuration by running
    /// every create mapper against one shared builder value.
    pub fn apply_on_create(&self, config: &ResourceConfig) -> Result<D, FieldError> {
        let mut object = D::default();
        for descriptor in self.fields.values() {
            (descriptor.create)(config, &mut object)?;
        }
        debug!(resource = %self.resource, fields = self.fields.len(), "assembled object on create");
        Ok(object)
    }

    /// Repopulate the configuration in place from the authoritative domain
    /// object.
    pub fn apply_on_read(&self, object: &D, config: &mut ResourceConfig) -> Result<(), FieldError> {
        for descriptor in self.fields.values() {
            (descriptor.read)(object, config)?;
        }
        debug!(resource = %self.resource, "configuration populated on read");
        Ok(())
    }

    /// Compare previous and next configuration per field and assemble the
    /// domain object carrying every changed, updatable field.
    pub fn apply_on_update(
        &self,
        prev: &ResourceConfig,
        next: &ResourceConfig,
    ) -> Result<UpdateOutcome<D>, FieldError> {
        let mut outcome = UpdateOutcome {
            should_update: false,
            changes_required_roll: false,
            tags_changed: false,
            object: D::default(),
        };

        for descriptor in self.fields.values() {
            if prev.get(descriptor.name()) == next.get(descriptor.name()) {
                continue;
            }
            debug!(resource = %self.resource, field = %descriptor.name(), "field changed");

            if descriptor.triggers_roll {
                outcome.changes_required_roll = true;
            }
            if descriptor.tags_field {
                outcome.tags_changed = true;
            }

            let Some(update) = &descriptor.update else {
                // config-only field, nothing to send to the control plane
                continue;
            };
            update(next, &mut outcome.object)?;
            outcome.should_update = true;
        }

        Ok(outcome)
    }
}
