//! Dynamic forms: one value field per definition of a collection

use contracts::domain::a001_metadata_definition::aggregate::MetadataDefinition;
use contracts::shared::validation::FieldErrors;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::MetadataError;
use super::registry::FieldKindRegistry;
use super::resolver::RecordResolver;
use super::value_field::{build_value_field, ValueField};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DynamicForm {
    pub fields: Vec<ValueField>,
}

impl DynamicForm {
    /// Add a field; a field with the same name is replaced in place
    pub fn insert(&mut self, field: ValueField) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => {
                tracing::warn!(
                    "Duplicate metadata field name '{}', the last definition wins",
                    field.name
                );
                *existing = field;
            }
            None => self.fields.push(field),
        }
    }

    pub fn field(&self, name: &str) -> Option<&ValueField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a value dictionary; keys without a field are ignored.
    ///
    /// Returns the cleaned values of the fields that have one.
    pub fn validate(&self, data: &Map<String, Value>) -> Result<Map<String, Value>, FieldErrors> {
        let mut cleaned = Map::new();
        let mut errors = FieldErrors::new();

        for field in &self.fields {
            match field.clean(data.get(&field.name)) {
                Ok(Some(value)) => {
                    cleaned.insert(field.name.clone(), value);
                }
                Ok(None) => {}
                Err(messages) => errors.extend_field(&field.name, messages),
            }
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}

/// Build the form of a collection, in definition order.
///
/// `initial` supplies per-field initial values (the record's current metadata).
pub async fn derive_form(
    registry: &FieldKindRegistry,
    definitions: &[MetadataDefinition],
    initial: Option<&Map<String, Value>>,
    resolver: &dyn RecordResolver,
) -> Result<DynamicForm, MetadataError> {
    let mut form = DynamicForm::default();
    for definition in definitions {
        let initial_value = initial.and_then(|values| values.get(&definition.field_name).cloned());
        let field = build_value_field(registry, definition, initial_value, resolver).await?;
        form.insert(field);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::dynamic_fields::resolver::testing::MemoryResolver;
    use contracts::enums::MetaType;
    use serde_json::json;

    fn definition(name: &str, field_name: &str, meta_type: MetaType) -> MetadataDefinition {
        let mut d = MetadataDefinition::new_for_insert(
            name.into(),
            Some(field_name.into()),
            meta_type,
            false,
            None,
        );
        d.ensure_field_name();
        d
    }

    async fn title_count_form() -> DynamicForm {
        let registry = FieldKindRegistry::standard();
        let definitions = vec![
            definition("Title", "title", MetaType::Text),
            definition("Count", "count", MetaType::Integer),
        ];
        derive_form(&registry, &definitions, None, &MemoryResolver::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_metadata() {
        let form = title_count_form().await;
        let data = json!({"title": "Widget", "count": 5});
        let cleaned = form.validate(data.as_object().unwrap()).unwrap();
        assert_eq!(Value::Object(cleaned), data);
    }

    #[tokio::test]
    async fn test_invalid_count_reported_on_count() {
        let form = title_count_form().await;
        let data = json!({"count": "not-a-number"});
        let errors = form.validate(data.as_object().unwrap()).unwrap_err();
        assert!(errors.contains("count"));
        assert_eq!(
            errors.get("count"),
            Some(&["Enter a whole number.".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_unknown_keys_are_ignored() {
        let form = title_count_form().await;
        let data = json!({"title": "Widget", "count": 1, "legacy": [1]});
        let cleaned = form.validate(data.as_object().unwrap()).unwrap();
        assert!(!cleaned.contains_key("legacy"));
    }

    #[tokio::test]
    async fn test_duplicate_field_name_last_wins_in_place() {
        let registry = FieldKindRegistry::standard();
        let definitions = vec![
            definition("Code", "code", MetaType::Text),
            definition("Count", "count", MetaType::Integer),
            definition("Code number", "code", MetaType::Integer),
        ];
        let form = derive_form(&registry, &definitions, None, &MemoryResolver::default())
            .await
            .unwrap();
        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["code", "count"]);
        assert_eq!(form.field("code").unwrap().label, "Code number");
    }

    #[tokio::test]
    async fn test_initial_values() {
        let registry = FieldKindRegistry::standard();
        let definitions = vec![definition("Title", "title", MetaType::Text)];
        let initial = json!({"title": "Widget"});
        let form = derive_form(
            &registry,
            &definitions,
            initial.as_object(),
            &MemoryResolver::default(),
        )
        .await
        .unwrap();
        assert_eq!(form.field("title").unwrap().initial, Some(json!("Widget")));
    }
}
