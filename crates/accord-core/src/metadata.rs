//! Explicit metadata side-table for command DTOs.
//!
//! Where a reflective platform would attach option metadata to DTO properties
//! through decorators, Accord records it in an explicit side-table keyed by
//! `(TypeId, property name)`. Each DTO type declares its schema exactly once
//! via [`CommandDto::schema`]; the resolver phase registers the schema into a
//! [`MetadataRegistry`], and the transform pipe later iterates the schema
//! rather than the runtime object shape when filling a DTO from an
//! interaction.
//!
//! Lookup is idempotent and side-effect free. Absence of metadata for a
//! property is a valid outcome meaning "skip this property".

use std::any::TypeId;
use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::RegistryError;

// ============================================================================
// Param metadata
// ============================================================================

/// Option metadata recorded for one DTO property.
///
/// `name` is the external option name; when unset, the property name itself
/// is used. `required` is passed through to the interaction's option lookup,
/// which enforces it at the event-source boundary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParamSpec {
    /// External option name; defaults to the property name if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the option must be present on the interaction.
    pub required: bool,
    /// Declared value choices, exported with the command definition.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    /// Human-readable description, exported with the command definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    /// Creates metadata with no explicit option name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates metadata mapping the property to a differently named option.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Marks the option as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Adds an allowed value choice.
    pub fn choice(mut self, value: impl Into<Value>) -> Self {
        self.choices.push(value.into());
        self
    }

    /// Sets the option description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// DTO schema
// ============================================================================

/// The declared option schema of one DTO type.
///
/// Declared once per type in [`CommandDto::schema`]; field order is
/// preserved and drives both template filling and command export.
#[derive(Debug, Clone)]
pub struct DtoSchema {
    /// The DTO type name, used in diagnostics and export payloads.
    pub type_name: &'static str,
    fields: Vec<(String, ParamSpec)>,
}

impl DtoSchema {
    /// Creates an empty schema for the named DTO type.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    /// Declares option metadata for one DTO property.
    pub fn param(mut self, property: impl Into<String>, spec: ParamSpec) -> Self {
        self.fields.push((property.into(), spec));
        self
    }

    /// Iterates the declared `(property, spec)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
        self.fields.iter().map(|(p, s)| (p.as_str(), s))
    }
}

/// A data-holder filled from interaction options and handed to a handler.
///
/// The `Default` value doubles as the prototype: properties without
/// registered metadata keep their default value after the transform pipe
/// runs.
pub trait CommandDto: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Declares the option metadata for this DTO's properties.
    fn schema() -> DtoSchema;
}

// ============================================================================
// DTO template
// ============================================================================

/// The prototype object instantiated once per leaf at resolution time.
///
/// Holds the DTO's default value serialized to a JSON object. Each
/// invocation clones the template and fills it; the clone is owned by that
/// single invocation and discarded after the handler returns.
#[derive(Debug, Clone)]
pub struct DtoTemplate {
    /// Identity of the DTO type, the metadata lookup key.
    pub type_id: TypeId,
    /// The DTO type name, used in diagnostics.
    pub type_name: &'static str,
    /// Default property values, keyed by property name.
    pub values: Map<String, Value>,
}

impl DtoTemplate {
    /// Builds the template for a DTO type from its default value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidTemplate`] when the default value does
    /// not serialize to a JSON object.
    pub fn of<T: CommandDto>() -> Result<Self, RegistryError> {
        let type_name = std::any::type_name::<T>();
        let value = serde_json::to_value(T::default()).map_err(|e| {
            RegistryError::InvalidTemplate {
                dto: type_name.into(),
                reason: e.to_string(),
            }
        })?;
        match value {
            Value::Object(values) => Ok(Self {
                type_id: TypeId::of::<T>(),
                type_name,
                values,
            }),
            other => Err(RegistryError::InvalidTemplate {
                dto: type_name.into(),
                reason: format!("expected object, got {other}"),
            }),
        }
    }

    /// Returns whether the DTO declares a property of the given name.
    pub fn has_property(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }
}

// ============================================================================
// Metadata registry
// ============================================================================

/// The side-table mapping `(TypeId, property)` to [`ParamSpec`].
///
/// Populated append-only during startup resolution, read-only afterwards.
/// Repeated lookups for the same key are stable and never mutate the table.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    params: RwLock<HashMap<(TypeId, String), ParamSpec>>,
    schemas: RwLock<HashMap<TypeId, DtoSchema>>,
}

impl MetadataRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every field of a DTO schema under the given type identity.
    pub fn register_schema(&self, type_id: TypeId, schema: &DtoSchema) {
        let mut params = self.params.write();
        for (property, spec) in schema.fields() {
            params.insert((type_id, property.to_string()), spec.clone());
        }
        self.schemas.write().insert(type_id, schema.clone());
    }

    /// Looks up the metadata recorded for one DTO property.
    ///
    /// Absence means the transform pipe skips the property.
    pub fn param_metadata(&self, type_id: TypeId, property: &str) -> Option<ParamSpec> {
        self.params
            .read()
            .get(&(type_id, property.to_string()))
            .cloned()
    }

    /// Returns the full schema registered for a DTO type, if any.
    pub fn schema_of(&self, type_id: TypeId) -> Option<DtoSchema> {
        self.schemas.read().get(&type_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct BanDto {
        target: String,
        reason: Option<String>,
    }

    impl CommandDto for BanDto {
        fn schema() -> DtoSchema {
            DtoSchema::new("BanDto")
                .param("target", ParamSpec::new().required(true))
                .param("reason", ParamSpec::named("why"))
        }
    }

    #[test]
    fn lookup_is_idempotent() {
        let registry = MetadataRegistry::new();
        registry.register_schema(TypeId::of::<BanDto>(), &BanDto::schema());

        for _ in 0..3 {
            let spec = registry
                .param_metadata(TypeId::of::<BanDto>(), "target")
                .expect("registered");
            assert!(spec.required);
            assert!(spec.name.is_none());
        }
    }

    #[test]
    fn absent_metadata_is_not_an_error() {
        let registry = MetadataRegistry::new();
        registry.register_schema(TypeId::of::<BanDto>(), &BanDto::schema());
        assert!(
            registry
                .param_metadata(TypeId::of::<BanDto>(), "unknown")
                .is_none()
        );
    }

    #[test]
    fn named_spec_overrides_property_name() {
        let registry = MetadataRegistry::new();
        registry.register_schema(TypeId::of::<BanDto>(), &BanDto::schema());
        let spec = registry
            .param_metadata(TypeId::of::<BanDto>(), "reason")
            .expect("registered");
        assert_eq!(spec.name.as_deref(), Some("why"));
        assert!(!spec.required);
    }

    #[test]
    fn template_captures_defaults() {
        let template = DtoTemplate::of::<BanDto>().expect("object template");
        assert!(template.has_property("target"));
        assert!(template.has_property("reason"));
        assert_eq!(template.values["target"], Value::String(String::new()));
        assert_eq!(template.values["reason"], Value::Null);
    }
}
