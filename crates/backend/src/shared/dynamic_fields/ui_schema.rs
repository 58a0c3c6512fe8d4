//! UI JSON schemas for the form-widget renderer

use contracts::domain::a001_metadata_definition::aggregate::MetadataDefinition;
use contracts::enums::MetaType;
use serde_json::{json, Map, Value};

use super::error::MetadataError;
use super::registry::FieldKindRegistry;

/// `{type, title}` entry for one definition; depends on `meta_type` only
pub fn ui_schema_fragment(
    registry: &FieldKindRegistry,
    definition: &MetadataDefinition,
) -> Result<Value, MetadataError> {
    let spec = registry.require(definition.meta_type)?;
    Ok(json!({
        "type": spec.ui_type,
        "title": definition.name,
    }))
}

/// Schema of the widget that edits `widget_attrs` for a field kind
pub fn attrs_ui_schema(
    registry: &FieldKindRegistry,
    meta_type: MetaType,
) -> Result<Value, MetadataError> {
    let spec = registry.require(meta_type)?;

    let mut keys = Map::new();
    for attr in &spec.attrs {
        let mut entry = Map::new();
        entry.insert("type".into(), Value::from(attr.ui_type));
        entry.insert("title".into(), Value::from(attr.label));
        if let Some(source) = attr.autocomplete {
            entry.insert("widget".into(), Value::from("autocomplete"));
            entry.insert("handler".into(), Value::from(source.handler_url()));
        }
        keys.insert(attr.name.to_string(), Value::Object(entry));
    }

    Ok(json!({
        "type": "dict",
        "keys": keys,
        "additionalProperties": {"type": "string"},
    }))
}

/// Schema of a whole collection: one entry per definition, keyed by field name
pub fn collection_json_schema(
    registry: &FieldKindRegistry,
    definitions: &[MetadataDefinition],
) -> Result<Value, MetadataError> {
    let mut keys = Map::new();
    for definition in definitions {
        keys.insert(
            definition.field_name.clone(),
            ui_schema_fragment(registry, definition)?,
        );
    }
    Ok(json!({
        "type": "dict",
        "keys": keys,
    }))
}
