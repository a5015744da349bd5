//! Registers DTO option schemas into the metadata side-table.
//!
//! Also the place where declared-parameter configuration errors surface: a
//! schema field naming a property the DTO does not have is fatal at startup.

use accord_core::RegistryError;

use super::MethodResolver;
use crate::handler::HandlerKey;
use crate::manifest::HandlerSpec;
use crate::registry::Registry;

pub(crate) struct ParamResolver;

impl MethodResolver for ParamResolver {
    fn name(&self) -> &'static str {
        "param"
    }

    fn resolve(
        &self,
        handler: &HandlerSpec,
        _key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError> {
        let Some(dto) = &handler.dto else {
            return Ok(());
        };
        let template = dto.template()?;
        for (property, _) in dto.schema.fields() {
            if !template.has_property(property) {
                return Err(RegistryError::UnknownProperty {
                    dto: dto.type_name.to_string(),
                    property: property.to_string(),
                });
            }
        }
        registry.metadata().register_schema(dto.type_id, &dto.schema);
        Ok(())
    }
}
