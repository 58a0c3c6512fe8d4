//! Widget attribute normalization and validation
//!
//! `widget_attrs` is normalized on every save (irrelevant keys stripped,
//! required keys defaulted) and then checked against the attrs form of the
//! definition's field kind.

use contracts::domain::a001_metadata_definition::aggregate::{MetadataDefinition, WidgetAttrs};
use contracts::enums::MetaType;
use contracts::shared::validation::FieldErrors;
use serde::Serialize;
use serde_json::Value;

use super::error::MetadataError;
use super::registry::{AttrKind, FieldKindRegistry};
use super::value_field::ChoiceOption;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const WHOLE_NUMBER_MESSAGE: &str = "Enter a whole number.";

/// Bring `widget_attrs` in line with the policy of the definition's kind
pub fn normalize_attrs(
    registry: &FieldKindRegistry,
    definition: &mut MetadataDefinition,
) -> Result<(), MetadataError> {
    let spec = registry.require(definition.meta_type)?;

    for (key, default) in &spec.defaults {
        definition
            .widget_attrs
            .entry(key.to_string())
            .or_insert_with(|| Value::from(*default));
    }
    for key in &spec.strips {
        definition.widget_attrs.remove(*key);
    }

    Ok(())
}

/// Kind of an attrs form field, as exposed to clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttrFieldKind {
    Integer,
    Choice { choices: Vec<ChoiceOption> },
}

#[derive(Debug, Clone, Serialize)]
pub struct AttrField {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub kind: AttrFieldKind,
}

/// Form whose fields are exactly the configuration attributes of one kind
#[derive(Debug, Clone, Serialize)]
pub struct AttrsForm {
    pub meta_type: MetaType,
    pub fields: Vec<AttrField>,
}

impl AttrsForm {
    pub fn field(&self, name: &str) -> Option<&AttrField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate attribute values; keys unknown to the form are ignored
    pub fn validate(&self, attrs: &WidgetAttrs) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for field in &self.fields {
            let value = attrs.get(&field.name).filter(|v| !is_blank(v));
            let Some(value) = value else {
                if field.required {
                    errors.add(&field.name, REQUIRED_MESSAGE);
                }
                continue;
            };

            match &field.kind {
                AttrFieldKind::Integer => {
                    if parse_integer(value).is_none() {
                        errors.add(&field.name, WHOLE_NUMBER_MESSAGE);
                    }
                }
                AttrFieldKind::Choice { choices } => {
                    let raw = value_as_text(value);
                    if !choices.iter().any(|c| c.value == raw) {
                        errors.add(
                            &field.name,
                            format!(
                                "Select a valid choice. {} is not one of the available choices.",
                                raw
                            ),
                        );
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Attrs-validation form for a field kind
pub fn attrs_form(
    registry: &FieldKindRegistry,
    meta_type: MetaType,
) -> Result<AttrsForm, MetadataError> {
    let spec = registry.require(meta_type)?;
    let fields = spec
        .attrs
        .iter()
        .map(|attr| AttrField {
            name: attr.name.to_string(),
            label: attr.label.to_string(),
            required: attr.required,
            kind: match &attr.kind {
                AttrKind::Integer => AttrFieldKind::Integer,
                AttrKind::Choice(choices) => AttrFieldKind::Choice {
                    choices: choices
                        .iter()
                        .map(|(value, title)| ChoiceOption {
                            value: value.clone(),
                            title: title.clone(),
                        })
                        .collect(),
                },
            },
        })
        .collect();

    Ok(AttrsForm { meta_type, fields })
}

/// Pre-save hook of a definition: normalize, validate attrs, derive field name
pub fn clean_definition(
    registry: &FieldKindRegistry,
    definition: &mut MetadataDefinition,
) -> Result<(), MetadataError> {
    normalize_attrs(registry, definition)?;

    let form = attrs_form(registry, definition.meta_type)?;
    if let Err(errors) = form.validate(&definition.widget_attrs) {
        tracing::error!(
            "Error in metadata attrs form for '{}': {}",
            definition.name,
            errors
        );
        return Err(MetadataError::InvalidAttributes(errors));
    }

    definition.ensure_field_name();
    definition.validate().map_err(MetadataError::Validation)
}

/// Null, empty string and empty containers count as "no value"
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Integer from a JSON integer, an integral float or an integer string
pub(crate) fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(meta_type: MetaType, attrs: Value) -> MetadataDefinition {
        MetadataDefinition::new_for_insert(
            "Sample Field".into(),
            None,
            meta_type,
            false,
            attrs.as_object().cloned(),
        )
    }

    fn keys(d: &MetadataDefinition) -> Vec<&str> {
        let mut keys: Vec<&str> = d.widget_attrs.keys().map(String::as_str).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_normalize_text_injects_max_length_and_strips_decimal_keys() {
        let registry = FieldKindRegistry::standard();
        let mut d = definition(
            MetaType::Text,
            json!({"max_digits": 5, "decimal_places": 1}),
        );
        normalize_attrs(&registry, &mut d).unwrap();
        assert_eq!(keys(&d), vec!["max_length"]);
        assert_eq!(d.widget_attrs["max_length"], json!(255));

        let mut d = definition(MetaType::Text, json!({"max_length": 40}));
        normalize_attrs(&registry, &mut d).unwrap();
        assert_eq!(d.widget_attrs["max_length"], json!(40));
    }

    #[test]
    fn test_normalize_decimal_keeps_configured_precision() {
        let registry = FieldKindRegistry::standard();
        let mut d = definition(MetaType::Decimal, json!({"max_length": 3, "max_digits": 12}));
        normalize_attrs(&registry, &mut d).unwrap();
        assert_eq!(keys(&d), vec!["decimal_places", "max_digits"]);
        assert_eq!(d.widget_attrs["max_digits"], json!(12));
        assert_eq!(d.widget_attrs["decimal_places"], json!(2));
    }

    #[test]
    fn test_normalize_other_kinds_strip_every_policy_key() {
        let registry = FieldKindRegistry::standard();
        let all = json!({
            "max_length": 1, "max_digits": 2, "decimal_places": 3, "on_delete": "CASCADE"
        });
        for meta_type in [
            MetaType::Date,
            MetaType::DateTime,
            MetaType::Integer,
            MetaType::Json,
            MetaType::Relation,
            MetaType::Choice,
        ] {
            let mut d = definition(meta_type, all.clone());
            normalize_attrs(&registry, &mut d).unwrap();
            assert!(d.widget_attrs.is_empty(), "{meta_type}: {:?}", d.widget_attrs);
        }
    }

    #[test]
    fn test_normalize_leaves_choice_values_alone() {
        let registry = FieldKindRegistry::standard();
        let mut d = definition(MetaType::Choice, json!({"values": ["a", "b"], "max_length": 3}));
        normalize_attrs(&registry, &mut d).unwrap();
        assert_eq!(keys(&d), vec!["values"]);
    }

    #[test]
    fn test_attrs_form_rejects_bad_integer() {
        let registry = FieldKindRegistry::standard();
        let form = attrs_form(&registry, MetaType::Decimal).unwrap();
        let attrs = json!({"max_digits": "ten", "decimal_places": "2"});
        let errors = form.validate(attrs.as_object().unwrap()).unwrap_err();
        assert_eq!(errors.get("max_digits"), Some(&[WHOLE_NUMBER_MESSAGE.to_string()][..]));
        assert!(!errors.contains("decimal_places"));
    }

    #[test]
    fn test_attrs_form_requires_text_max_length() {
        let registry = FieldKindRegistry::standard();
        let form = attrs_form(&registry, MetaType::Text).unwrap();
        let errors = form.validate(&WidgetAttrs::new()).unwrap_err();
        assert_eq!(errors.get("max_length"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn test_attrs_form_relation_choices() {
        let registry = FieldKindRegistry::standard();
        let form = attrs_form(&registry, MetaType::Relation).unwrap();
        assert_eq!(form.fields.len(), 2);

        let ok = json!({"model": "market.Product", "on_delete": "PROTECT"});
        assert!(form.validate(ok.as_object().unwrap()).is_ok());
        assert!(form.validate(&WidgetAttrs::new()).is_ok());

        let bad = json!({"model": "auth.User"});
        let errors = form.validate(bad.as_object().unwrap()).unwrap_err();
        assert!(errors.contains("model"));
    }

    #[test]
    fn test_clean_definition() {
        let registry = FieldKindRegistry::standard();
        let mut d = definition(MetaType::Text, json!({}));
        clean_definition(&registry, &mut d).unwrap();
        assert_eq!(d.field_name, "sample_field");
        assert_eq!(d.widget_attrs["max_length"], json!(255));

        let mut d = definition(MetaType::Relation, json!({"model": "nope"}));
        match clean_definition(&registry, &mut d) {
            Err(MetadataError::InvalidAttributes(errors)) => assert!(errors.contains("model")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_relation_on_delete_is_stripped_before_validation() {
        let registry = FieldKindRegistry::standard();
        let mut d = definition(
            MetaType::Relation,
            json!({"model": "market.Market", "on_delete": "NOT_AN_ACTION"}),
        );
        clean_definition(&registry, &mut d).unwrap();
        assert_eq!(keys(&d), vec!["model"]);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer(&json!(5)), Some(5));
        assert_eq!(parse_integer(&json!(5.0)), Some(5));
        assert_eq!(parse_integer(&json!(" 12 ")), Some(12));
        assert_eq!(parse_integer(&json!(5.5)), None);
        assert_eq!(parse_integer(&json!("not-a-number")), None);
        assert_eq!(parse_integer(&json!(true)), None);
    }
}
