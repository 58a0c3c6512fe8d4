//! Value fields
//!
//! A [`ValueField`] is the input descriptor for one value of a definition:
//! kind-specific rules, label, required flag and optional initial value.
//! Widget attributes act like constructor arguments: known keys configure
//! the field, unknown keys make construction fail.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use contracts::domain::a001_metadata_definition::aggregate::{MetadataDefinition, WidgetAttrs};
use contracts::enums::{MetaType, RelationModel};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::attrs::{is_blank, parse_integer, value_as_text, REQUIRED_MESSAGE, WHOLE_NUMBER_MESSAGE};
use super::error::MetadataError;
use super::registry::{FieldKindRegistry, DECIMAL_PLACES, MAX_DIGITS, MAX_LENGTH, MODEL, ON_DELETE, VALUES};
use super::resolver::{RecordResolver, RelatedRecord};

const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// One selectable option of a Choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueFieldKind {
    Text {
        max_length: Option<usize>,
        min_length: Option<usize>,
    },
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
    Decimal {
        max_digits: Option<u32>,
        decimal_places: Option<u32>,
        min_value: Option<Decimal>,
        max_value: Option<Decimal>,
    },
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Json,
    Relation {
        model: Option<RelationModel>,
        candidates: Vec<RelatedRecord>,
    },
    Choice {
        choices: Vec<ChoiceOption>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueField {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub help_text: Option<String>,
    pub initial: Option<Value>,
    /// Input hint for plain form rendering
    pub input: &'static str,
    #[serde(flatten)]
    pub kind: ValueFieldKind,
}

/// Build the value field of a definition.
///
/// Relation candidates come from `resolver`; an unknown or missing target
/// model yields an empty candidate list rather than an error.
pub async fn build_value_field(
    registry: &FieldKindRegistry,
    definition: &MetadataDefinition,
    initial: Option<Value>,
    resolver: &dyn RecordResolver,
) -> Result<ValueField, MetadataError> {
    let spec = registry.require(definition.meta_type)?;
    let mut attrs = AttrReader::new(&definition.field_name, definition.widget_attrs.clone());

    let required = attrs.take_bool("required")?.unwrap_or(true);
    let help_text = attrs.take_string("help_text")?;

    let kind = match definition.meta_type {
        MetaType::Text => ValueFieldKind::Text {
            max_length: attrs.take_usize(MAX_LENGTH)?,
            min_length: attrs.take_usize("min_length")?,
        },
        MetaType::Integer => ValueFieldKind::Integer {
            min_value: attrs.take_i64("min_value")?,
            max_value: attrs.take_i64("max_value")?,
        },
        MetaType::Decimal => ValueFieldKind::Decimal {
            max_digits: attrs.take_u32(MAX_DIGITS)?,
            decimal_places: attrs.take_u32(DECIMAL_PLACES)?,
            min_value: attrs.take_decimal("min_value")?,
            max_value: attrs.take_decimal("max_value")?,
        },
        MetaType::Date => ValueFieldKind::Date,
        MetaType::DateTime => ValueFieldKind::DateTime,
        MetaType::Json => ValueFieldKind::Json,
        MetaType::Relation => {
            attrs.take(ON_DELETE);
            let model = attrs
                .take(MODEL)
                .and_then(|v| v.as_str().and_then(RelationModel::from_key));
            let candidates = match model {
                Some(model) => resolver.candidates(model).await?,
                None => {
                    tracing::debug!(
                        "Relation field '{}' has no resolvable target model",
                        definition.field_name
                    );
                    Vec::new()
                }
            };
            ValueFieldKind::Relation { model, candidates }
        }
        MetaType::Choice => ValueFieldKind::Choice {
            choices: attrs.take_choices(VALUES)?,
        },
    };

    attrs.finish()?;

    Ok(ValueField {
        name: definition.field_name.clone(),
        label: definition.name.clone(),
        required,
        help_text,
        initial,
        input: spec.input,
        kind,
    })
}

impl ValueField {
    /// Validate one raw value.
    ///
    /// `Ok(None)` means "no value" for an optional field.
    pub fn clean(&self, raw: Option<&Value>) -> Result<Option<Value>, Vec<String>> {
        let value = match raw.filter(|v| !is_blank(v)) {
            Some(value) => value,
            None if self.required => return Err(vec![REQUIRED_MESSAGE.to_string()]),
            None => return Ok(None),
        };

        let cleaned = match &self.kind {
            ValueFieldKind::Text {
                max_length,
                min_length,
            } => clean_text(value, *max_length, *min_length),
            ValueFieldKind::Integer {
                min_value,
                max_value,
            } => clean_integer(value, *min_value, *max_value),
            ValueFieldKind::Decimal {
                max_digits,
                decimal_places,
                min_value,
                max_value,
            } => clean_decimal(value, *max_digits, *decimal_places, *min_value, *max_value),
            ValueFieldKind::Date => clean_date(value),
            ValueFieldKind::DateTime => clean_datetime(value),
            ValueFieldKind::Json => Ok(value.clone()),
            ValueFieldKind::Relation { candidates, .. } => match parse_integer(value) {
                Some(id) if candidates.iter().any(|c| c.id == id) => Ok(Value::from(id)),
                _ => Err(vec![INVALID_CHOICE_MESSAGE.to_string()]),
            },
            ValueFieldKind::Choice { choices } => {
                let raw = value_as_text(value);
                if choices.iter().any(|c| c.value == raw) {
                    Ok(Value::String(raw))
                } else {
                    Err(vec![format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        raw
                    )])
                }
            }
        };
        cleaned.map(Some)
    }
}

fn clean_text(
    value: &Value,
    max_length: Option<usize>,
    min_length: Option<usize>,
) -> Result<Value, Vec<String>> {
    if value.is_array() || value.is_object() {
        return Err(vec!["Enter a valid text value.".to_string()]);
    }
    let text = value_as_text(value);
    let length = text.chars().count();

    let mut errors = Vec::new();
    if let Some(max) = max_length {
        if length > max {
            errors.push(format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, length
            ));
        }
    }
    if let Some(min) = min_length {
        if length < min {
            errors.push(format!(
                "Ensure this value has at least {} characters (it has {}).",
                min, length
            ));
        }
    }

    if errors.is_empty() {
        Ok(Value::String(text))
    } else {
        Err(errors)
    }
}

fn clean_integer(
    value: &Value,
    min_value: Option<i64>,
    max_value: Option<i64>,
) -> Result<Value, Vec<String>> {
    let number = parse_integer(value).ok_or_else(|| vec![WHOLE_NUMBER_MESSAGE.to_string()])?;

    let mut errors = Vec::new();
    if let Some(max) = max_value {
        if number > max {
            errors.push(format!("Ensure this value is less than or equal to {}.", max));
        }
    }
    if let Some(min) = min_value {
        if number < min {
            errors.push(format!("Ensure this value is greater than or equal to {}.", min));
        }
    }

    if errors.is_empty() {
        Ok(Value::from(number))
    } else {
        Err(errors)
    }
}

pub(crate) fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn clean_decimal(
    value: &Value,
    max_digits: Option<u32>,
    decimal_places: Option<u32>,
    min_value: Option<Decimal>,
    max_value: Option<Decimal>,
) -> Result<Value, Vec<String>> {
    let number = parse_decimal(value).ok_or_else(|| vec!["Enter a number.".to_string()])?;

    if let Some(max) = max_value {
        if number > max {
            return Err(vec![format!("Ensure this value is less than or equal to {}.", max)]);
        }
    }
    if let Some(min) = min_value {
        if number < min {
            return Err(vec![format!("Ensure this value is greater than or equal to {}.", min)]);
        }
    }

    let (digits, decimals) = digit_counts(&number);
    let whole_digits = digits.saturating_sub(decimals);

    if let Some(max) = max_digits {
        if digits > max {
            return Err(vec![format!(
                "Ensure that there are no more than {} digits in total.",
                max
            )]);
        }
    }
    if let Some(places) = decimal_places {
        if decimals > places {
            return Err(vec![format!(
                "Ensure that there are no more than {} decimal places.",
                places
            )]);
        }
    }
    if let (Some(max), Some(places)) = (max_digits, decimal_places) {
        if whole_digits > max.saturating_sub(places) {
            return Err(vec![format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max.saturating_sub(places)
            )]);
        }
    }

    Ok(Value::String(number.to_string()))
}

/// Total significant digits and digits after the point, as written.
///
/// `0.001` counts as 3 digits / 3 decimals, `1.50` as 3 / 2.
fn digit_counts(number: &Decimal) -> (u32, u32) {
    let mantissa_digits = number.mantissa().unsigned_abs().to_string().len() as u32;
    let scale = number.scale();
    if scale > mantissa_digits {
        (scale, scale)
    } else {
        (mantissa_digits, scale)
    }
}

fn clean_date(value: &Value) -> Result<Value, Vec<String>> {
    let text = value.as_str().map(str::trim).unwrap_or_default();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
        .map_err(|_| vec!["Enter a valid date.".to_string()])
}

fn clean_datetime(value: &Value) -> Result<Value, Vec<String>> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    let invalid = || vec!["Enter a valid date/time.".to_string()];
    let text = value.as_str().map(str::trim).ok_or_else(invalid)?;

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Ok(Value::String(dt.to_rfc3339()));
    }
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Value::String(format!("{} 00:00:00", date.format("%Y-%m-%d"))));
    }
    Err(invalid())
}

/// Consumes widget attributes one by one; whatever is left over at the end
/// is an unsupported attribute.
struct AttrReader<'a> {
    field: &'a str,
    attrs: WidgetAttrs,
}

impl<'a> AttrReader<'a> {
    fn new(field: &'a str, attrs: WidgetAttrs) -> Self {
        Self { field, attrs }
    }

    fn take(&mut self, key: &str) -> Option<Value> {
        self.attrs.remove(key).filter(|v| !v.is_null())
    }

    fn invalid(&self, key: &str, expected: &str) -> MetadataError {
        MetadataError::field_build(
            self.field,
            format!("attribute '{}' must be {}", key, expected),
        )
    }

    fn take_bool(&mut self, key: &str) -> Result<Option<bool>, MetadataError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(_) => Err(self.invalid(key, "a boolean")),
        }
    }

    fn take_string(&mut self, key: &str) -> Result<Option<String>, MetadataError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.invalid(key, "a string")),
        }
    }

    fn take_i64(&mut self, key: &str) -> Result<Option<i64>, MetadataError> {
        match self.take(key) {
            None => Ok(None),
            Some(v) => parse_integer(&v)
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a whole number")),
        }
    }

    fn take_usize(&mut self, key: &str) -> Result<Option<usize>, MetadataError> {
        match self.take_i64(key)? {
            None => Ok(None),
            Some(v) => usize::try_from(v)
                .map(Some)
                .map_err(|_| self.invalid(key, "a non-negative whole number")),
        }
    }

    fn take_u32(&mut self, key: &str) -> Result<Option<u32>, MetadataError> {
        match self.take_i64(key)? {
            None => Ok(None),
            Some(v) => u32::try_from(v)
                .map(Some)
                .map_err(|_| self.invalid(key, "a whole number between 0 and 4294967295")),
        }
    }

    fn take_decimal(&mut self, key: &str) -> Result<Option<Decimal>, MetadataError> {
        match self.take(key) {
            None => Ok(None),
            Some(v) => parse_decimal(&v)
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a number")),
        }
    }

    /// `values` is a list of strings or `{"value", "title"}` objects
    fn take_choices(&mut self, key: &str) -> Result<Vec<ChoiceOption>, MetadataError> {
        let items = match self.take(key) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(self.invalid(key, "a list")),
        };

        let mut choices = Vec::with_capacity(items.len());
        for item in items {
            let choice = match item {
                Value::String(s) => ChoiceOption {
                    value: s.clone(),
                    title: s,
                },
                Value::Number(n) => ChoiceOption {
                    value: n.to_string(),
                    title: n.to_string(),
                },
                Value::Object(obj) => {
                    let value = obj
                        .get("value")
                        .filter(|v| !v.is_null())
                        .map(value_as_text)
                        .ok_or_else(|| self.invalid(key, "a list of values"))?;
                    let title = obj
                        .get("title")
                        .or_else(|| obj.get("label"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| value.clone());
                    ChoiceOption { value, title }
                }
                _ => return Err(self.invalid(key, "a list of values")),
            };
            choices.push(choice);
        }
        Ok(choices)
    }

    fn finish(self) -> Result<(), MetadataError> {
        match self.attrs.keys().next() {
            None => Ok(()),
            Some(key) => Err(MetadataError::field_build(
                self.field,
                format!("unexpected attribute '{}'", key),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::dynamic_fields::resolver::testing::MemoryResolver;
    use serde_json::json;

    fn definition(meta_type: MetaType, field_name: &str, attrs: Value) -> MetadataDefinition {
        let mut d = MetadataDefinition::new_for_insert(
            field_name.into(),
            Some(field_name.into()),
            meta_type,
            false,
            attrs.as_object().cloned(),
        );
        d.ensure_field_name();
        d
    }

    async fn field(meta_type: MetaType, attrs: Value) -> ValueField {
        let registry = FieldKindRegistry::standard();
        let resolver = MemoryResolver::default()
            .with(1, RelationModel::Market, "Central")
            .with(2, RelationModel::Market, "Harbour")
            .with(3, RelationModel::Product, "Tea");
        build_value_field(&registry, &definition(meta_type, "value", attrs), None, &resolver)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_text_field() {
        let f = field(MetaType::Text, json!({"max_length": 5})).await;
        assert_eq!(f.input, "text");
        assert_eq!(f.clean(Some(&json!(" Tea "))), Ok(Some(json!("Tea"))));
        assert_eq!(f.clean(Some(&json!(42))), Ok(Some(json!("42"))));
        assert!(f.clean(Some(&json!("Too long"))).is_err());
        assert_eq!(
            f.clean(None),
            Err(vec![REQUIRED_MESSAGE.to_string()])
        );
        assert_eq!(f.clean(Some(&json!("   "))), Err(vec![REQUIRED_MESSAGE.to_string()]));
    }

    #[tokio::test]
    async fn test_optional_field_skips_missing_value() {
        let f = field(MetaType::Integer, json!({"required": false})).await;
        assert!(!f.required);
        assert_eq!(f.clean(None), Ok(None));
        assert_eq!(f.clean(Some(&Value::Null)), Ok(None));
    }

    #[tokio::test]
    async fn test_integer_field() {
        let f = field(MetaType::Integer, json!({"min_value": 0, "max_value": 100})).await;
        assert_eq!(f.clean(Some(&json!(5))), Ok(Some(json!(5))));
        assert_eq!(f.clean(Some(&json!("7"))), Ok(Some(json!(7))));
        assert_eq!(
            f.clean(Some(&json!("not-a-number"))),
            Err(vec![WHOLE_NUMBER_MESSAGE.to_string()])
        );
        assert!(f.clean(Some(&json!(101))).is_err());
        assert!(f.clean(Some(&json!(-1))).is_err());
    }

    #[tokio::test]
    async fn test_decimal_field_digit_limits() {
        let f = field(MetaType::Decimal, json!({"max_digits": 5, "decimal_places": 2})).await;
        assert_eq!(f.clean(Some(&json!("123.45"))), Ok(Some(json!("123.45"))));
        assert_eq!(f.clean(Some(&json!(1.5))), Ok(Some(json!("1.5"))));
        assert_eq!(
            f.clean(Some(&json!("1.234"))),
            Err(vec!["Ensure that there are no more than 2 decimal places.".to_string()])
        );
        assert_eq!(
            f.clean(Some(&json!("123456"))),
            Err(vec!["Ensure that there are no more than 5 digits in total.".to_string()])
        );
        assert_eq!(
            f.clean(Some(&json!("1234.5"))),
            Err(vec![
                "Ensure that there are no more than 3 digits before the decimal point.".to_string()
            ])
        );
        assert_eq!(
            f.clean(Some(&json!("abc"))),
            Err(vec!["Enter a number.".to_string()])
        );
    }

    #[test]
    fn test_digit_counts() {
        let count = |s: &str| digit_counts(&Decimal::from_str(s).unwrap());
        assert_eq!(count("1.50"), (3, 2));
        assert_eq!(count("0.001"), (3, 3));
        assert_eq!(count("-120"), (3, 0));
        assert_eq!(count("0"), (1, 0));
    }

    #[tokio::test]
    async fn test_date_fields() {
        let date = field(MetaType::Date, json!({})).await;
        assert_eq!(date.clean(Some(&json!("2024-02-29"))), Ok(Some(json!("2024-02-29"))));
        assert!(date.clean(Some(&json!("2023-02-29"))).is_err());
        assert!(date.clean(Some(&json!(20240101))).is_err());

        let datetime = field(MetaType::DateTime, json!({})).await;
        assert_eq!(
            datetime.clean(Some(&json!("2024-01-02 10:30"))),
            Ok(Some(json!("2024-01-02 10:30:00")))
        );
        assert!(datetime.clean(Some(&json!("2024-01-02T10:30:00+03:00"))).is_ok());
        assert!(datetime.clean(Some(&json!("yesterday"))).is_err());
    }

    #[tokio::test]
    async fn test_json_field_accepts_any_value() {
        let f = field(MetaType::Json, json!({})).await;
        assert_eq!(f.clean(Some(&json!({"a": [1, 2]}))), Ok(Some(json!({"a": [1, 2]}))));
        assert_eq!(f.clean(Some(&json!(false))), Ok(Some(json!(false))));
    }

    #[tokio::test]
    async fn test_relation_field_candidates() {
        let f = field(
            MetaType::Relation,
            json!({"model": "market.Market", "on_delete": "CASCADE"}),
        )
        .await;
        match &f.kind {
            ValueFieldKind::Relation { model, candidates } => {
                assert_eq!(*model, Some(RelationModel::Market));
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(f.clean(Some(&json!(2))), Ok(Some(json!(2))));
        assert_eq!(
            f.clean(Some(&json!(3))),
            Err(vec![INVALID_CHOICE_MESSAGE.to_string()])
        );
    }

    #[tokio::test]
    async fn test_relation_without_model_has_no_candidates() {
        for attrs in [json!({}), json!({"model": "auth.User"})] {
            let f = field(MetaType::Relation, attrs).await;
            match &f.kind {
                ValueFieldKind::Relation { model, candidates } => {
                    assert!(model.is_none());
                    assert!(candidates.is_empty());
                }
                other => panic!("unexpected kind {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_choice_field() {
        let f = field(
            MetaType::Choice,
            json!({"values": ["red", {"value": "g", "title": "Green"}, 3]}),
        )
        .await;
        match &f.kind {
            ValueFieldKind::Choice { choices } => {
                assert_eq!(choices.len(), 3);
                assert_eq!(choices[1].title, "Green");
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(f.clean(Some(&json!("g"))), Ok(Some(json!("g"))));
        assert_eq!(f.clean(Some(&json!(3))), Ok(Some(json!("3"))));
        assert!(f.clean(Some(&json!("blue"))).is_err());
    }

    #[tokio::test]
    async fn test_unknown_attribute_fails_construction() {
        let registry = FieldKindRegistry::standard();
        let resolver = MemoryResolver::default();
        let d = definition(MetaType::Date, "when", json!({"max_length": 10}));
        let result = build_value_field(&registry, &d, None, &resolver).await;
        match result {
            Err(MetadataError::FieldBuild { field, reason }) => {
                assert_eq!(field, "when");
                assert!(reason.contains("max_length"));
            }
            other => panic!("unexpected result {other:?}"),
        }

        let d = definition(MetaType::Integer, "n", json!({"required": "yes"}));
        assert!(build_value_field(&registry, &d, None, &resolver).await.is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_digit_limits_fail_construction() {
        let registry = FieldKindRegistry::standard();
        let resolver = MemoryResolver::default();
        let d = definition(MetaType::Decimal, "price", json!({"max_digits": 4294967297u64}));
        match build_value_field(&registry, &d, None, &resolver).await {
            Err(MetadataError::FieldBuild { field, reason }) => {
                assert_eq!(field, "price");
                assert!(reason.contains("max_digits"));
            }
            other => panic!("unexpected result {other:?}"),
        }

        let d = definition(MetaType::Decimal, "price", json!({"decimal_places": -1}));
        assert!(build_value_field(&registry, &d, None, &resolver).await.is_err());
    }

    #[tokio::test]
    async fn test_initial_and_label() {
        let registry = FieldKindRegistry::standard();
        let resolver = MemoryResolver::default();
        let mut d = definition(MetaType::Text, "title", json!({"help_text": "Shown on cards"}));
        d.name = "Title".into();
        let f = build_value_field(&registry, &d, Some(json!("Widget")), &resolver)
            .await
            .unwrap();
        assert_eq!(f.label, "Title");
        assert_eq!(f.name, "title");
        assert_eq!(f.initial, Some(json!("Widget")));
        assert_eq!(f.help_text.as_deref(), Some("Shown on cards"));

        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], json!("text"));
        assert_eq!(json["input"], json!("text"));
    }
}
