//! Records carrying an `element_metadata` dictionary.
//!
//! The dictionary's keys and value types are governed by the definitions of
//! the record's metadata collection (its "element type").

use contracts::domain::a001_metadata_definition::aggregate::MetadataDefinition;
use contracts::domain::a002_metadata_collection::aggregate::MetadataCollectionId;
use contracts::domain::a004_element::aggregate::ElementMetadata;
use contracts::enums::{MetaType, RelationModel};
use serde_json::Value;

use super::attrs::parse_integer;
use super::error::MetadataError;
use super::form::derive_form;
use super::registry::{FieldKindRegistry, MODEL};
use super::resolver::RecordResolver;
use crate::shared::format::intcomma;

/// Capability of a record that stores dynamic metadata values
pub trait ElementMetadataContainer {
    fn element_metadata(&self) -> Option<&ElementMetadata>;

    fn element_metadata_mut(&mut self) -> &mut Option<ElementMetadata>;

    /// The metadata collection governing this record.
    ///
    /// Must be overridden; the default signals an integration bug.
    fn element_type(&self) -> Result<Option<MetadataCollectionId>, MetadataError> {
        Err(MetadataError::ElementTypeNotImplemented(
            std::any::type_name::<Self>(),
        ))
    }

    /// `true` when there is at least one stored value
    fn has_metadata(&self) -> bool {
        self.element_metadata().is_some_and(|m| !m.is_empty())
    }
}

/// Replace record references (`{"pk": 5, ..}` / `{"id": 5, ..}`) held by
/// Relation fields with their primary key. Other values are kept as they are.
pub fn coerce_record_references(
    definitions: &[MetadataDefinition],
    metadata: &mut ElementMetadata,
) {
    let relations = definitions
        .iter()
        .filter(|d| d.meta_type == MetaType::Relation);
    for definition in relations {
        let Some(Value::Object(reference)) = metadata.get(&definition.field_name) else {
            continue;
        };
        let pk = reference
            .get("pk")
            .and_then(Value::as_i64)
            .or_else(|| reference.get("id").and_then(Value::as_i64));
        if let Some(pk) = pk {
            metadata.insert(definition.field_name.clone(), Value::from(pk));
        }
    }
}

/// Pre-save validation of a record's metadata.
///
/// `definitions` is `None` when the record's element type could not be
/// resolved; validation is then skipped. A form that cannot be built from
/// its definitions is logged and the save proceeds. Invalid values abort
/// the save with per-field messages.
pub async fn validate_element_metadata(
    registry: &FieldKindRegistry,
    definitions: Option<&[MetadataDefinition]>,
    metadata: &mut Option<ElementMetadata>,
    resolver: &dyn RecordResolver,
) -> Result<(), MetadataError> {
    let Some(definitions) = definitions else {
        tracing::debug!("No metadata form available, element type is not resolved");
        return Ok(());
    };

    if let Some(values) = metadata.as_mut() {
        coerce_record_references(definitions, values);
    }

    let values = match metadata.as_ref() {
        Some(values) if !values.is_empty() => values,
        _ => return Ok(()),
    };

    let form = match derive_form(registry, definitions, None, resolver).await {
        Ok(form) => form,
        Err(e @ MetadataError::FieldBuild { .. }) => {
            tracing::error!("Metadata form error: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if let Err(errors) = form.validate(values) {
        tracing::error!("Got errors for metadata form: {}", errors);
        return Err(MetadataError::InvalidElementMetadata(errors));
    }

    Ok(())
}

/// Render stored metadata for display.
///
/// Relation values are resolved to the referenced record (its JSON view, or
/// its display string when `as_display_string` is set); missing records keep
/// the raw value. Integer and Decimal values get thousands separators.
/// Returns `None` when there is no metadata at all.
pub async fn render_element_metadata(
    definitions: Option<&[MetadataDefinition]>,
    metadata: Option<&ElementMetadata>,
    resolver: &dyn RecordResolver,
    as_display_string: bool,
) -> Result<Option<ElementMetadata>, MetadataError> {
    let Some(metadata) = metadata.filter(|m| !m.is_empty()) else {
        return Ok(None);
    };
    let mut rendered = metadata.clone();

    let Some(definitions) = definitions else {
        tracing::warn!("Element type is not resolved, metadata is returned unformatted");
        return Ok(Some(rendered));
    };

    for definition in definitions {
        let Some(value) = rendered.get_mut(&definition.field_name) else {
            continue;
        };

        match definition.meta_type {
            MetaType::Relation => {
                let Some(model) = relation_model(definition) else {
                    continue;
                };
                let Some(id) = parse_integer(value) else {
                    continue;
                };
                if let Some(record) = resolver.find(model, id).await? {
                    *value = if as_display_string {
                        Value::String(record.display_string())
                    } else {
                        serde_json::to_value(&record).map_err(anyhow::Error::from)?
                    };
                }
            }
            MetaType::Integer | MetaType::Decimal => {
                if let Some(formatted) = intcomma(value) {
                    *value = Value::String(formatted);
                }
            }
            _ => {}
        }
    }

    Ok(Some(rendered))
}

fn relation_model(definition: &MetadataDefinition) -> Option<RelationModel> {
    definition
        .widget_attrs
        .get(MODEL)
        .and_then(Value::as_str)
        .and_then(RelationModel::from_key)
}
