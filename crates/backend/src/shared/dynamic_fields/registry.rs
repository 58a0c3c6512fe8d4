//! Field kind registry
//!
//! One immutable entry per [`MetaType`]: UI schema type, input hint,
//! configuration attributes and the normalization policy (defaults to
//! inject, keys to strip).

use std::collections::HashMap;

use contracts::enums::{MetaType, OnDeleteAction, RelationModel};
use contracts::shared::autocomplete::AutocompleteSource;

use super::error::MetadataError;

/// Keys that normalization may strip from any definition.
pub const MAX_LENGTH: &str = "max_length";
pub const MAX_DIGITS: &str = "max_digits";
pub const DECIMAL_PLACES: &str = "decimal_places";
pub const MODEL: &str = "model";
pub const ON_DELETE: &str = "on_delete";
pub const VALUES: &str = "values";

/// Value kind of a configuration attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    /// Whole number, given as JSON integer or integer string
    Integer,
    /// One of a fixed list of `(value, label)` pairs
    Choice(Vec<(String, String)>),
}

/// One configuration attribute of a field kind
#[derive(Debug, Clone)]
pub struct AttrSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: AttrKind,
    pub required: bool,
    /// Type used in the attrs-editing UI schema
    pub ui_type: &'static str,
    /// Remote autocomplete source for the attrs-editing widget
    pub autocomplete: Option<AutocompleteSource>,
}

impl AttrSpec {
    fn integer(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: AttrKind::Integer,
            required: true,
            ui_type: "number",
            autocomplete: None,
        }
    }

    fn choice(
        name: &'static str,
        label: &'static str,
        choices: Vec<(String, String)>,
        autocomplete: AutocompleteSource,
    ) -> Self {
        Self {
            name,
            label,
            kind: AttrKind::Choice(choices),
            required: false,
            ui_type: "string",
            autocomplete: Some(autocomplete),
        }
    }
}

/// Everything the deriver needs to know about one [`MetaType`]
#[derive(Debug, Clone)]
pub struct FieldKindSpec {
    pub meta_type: MetaType,
    /// Type in the value JSON schema (`string`, `number`, `integer`, `list`)
    pub ui_type: &'static str,
    /// Input hint for plain form rendering (`text`, `date`, `select`, ...)
    pub input: &'static str,
    pub attrs: Vec<AttrSpec>,
    /// Injected by normalization when absent
    pub defaults: Vec<(&'static str, i64)>,
    /// Removed by normalization
    pub strips: Vec<&'static str>,
}

impl FieldKindSpec {
    pub fn attr(&self, name: &str) -> Option<&AttrSpec> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

/// Immutable registry of field kinds, constructed at startup
#[derive(Debug, Clone, Default)]
pub struct FieldKindRegistry {
    kinds: HashMap<MetaType, FieldKindSpec>,
}

impl FieldKindRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in field kind
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for meta_type in MetaType::all() {
            registry = registry.with(standard_spec(meta_type));
        }
        registry
    }

    /// Register (or replace) a field kind
    pub fn with(mut self, spec: FieldKindSpec) -> Self {
        self.kinds.insert(spec.meta_type, spec);
        self
    }

    pub fn get(&self, meta_type: MetaType) -> Option<&FieldKindSpec> {
        self.kinds.get(&meta_type)
    }

    pub fn require(&self, meta_type: MetaType) -> Result<&FieldKindSpec, MetadataError> {
        self.get(meta_type).ok_or_else(|| {
            MetadataError::Validation(format!("Field kind '{}' is not registered", meta_type))
        })
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// `(value, label)` pairs of the attribute served by an autocomplete source
    pub fn autocomplete_choices(&self, source: AutocompleteSource) -> &[(String, String)] {
        self.kinds
            .values()
            .flat_map(|spec| spec.attrs.iter())
            .filter(|attr| attr.autocomplete == Some(source))
            .find_map(|attr| match &attr.kind {
                AttrKind::Choice(choices) => Some(choices.as_slice()),
                AttrKind::Integer => None,
            })
            .unwrap_or(&[])
    }
}

fn standard_spec(meta_type: MetaType) -> FieldKindSpec {
    let strip_all = vec![MAX_LENGTH, MAX_DIGITS, DECIMAL_PLACES, ON_DELETE];

    match meta_type {
        MetaType::Text => FieldKindSpec {
            meta_type,
            ui_type: "string",
            input: "text",
            attrs: vec![AttrSpec::integer(MAX_LENGTH, "Max length")],
            defaults: vec![(MAX_LENGTH, 255)],
            strips: vec![MAX_DIGITS, DECIMAL_PLACES],
        },
        MetaType::Decimal => FieldKindSpec {
            meta_type,
            ui_type: "string",
            input: "text",
            attrs: vec![
                AttrSpec::integer(MAX_DIGITS, "Max digits"),
                AttrSpec::integer(DECIMAL_PLACES, "Decimal places"),
            ],
            defaults: vec![(MAX_DIGITS, 30), (DECIMAL_PLACES, 2)],
            strips: vec![MAX_LENGTH],
        },
        MetaType::Integer => FieldKindSpec {
            meta_type,
            ui_type: "number",
            input: "number",
            attrs: vec![],
            defaults: vec![],
            strips: strip_all,
        },
        MetaType::Date => FieldKindSpec {
            meta_type,
            ui_type: "string",
            input: "date",
            attrs: vec![],
            defaults: vec![],
            strips: strip_all,
        },
        MetaType::DateTime => FieldKindSpec {
            meta_type,
            ui_type: "string",
            input: "datetime",
            attrs: vec![],
            defaults: vec![],
            strips: strip_all,
        },
        MetaType::Json => FieldKindSpec {
            meta_type,
            ui_type: "string",
            input: "text",
            attrs: vec![],
            defaults: vec![],
            strips: strip_all,
        },
        MetaType::Relation => FieldKindSpec {
            meta_type,
            ui_type: "integer",
            input: "select",
            attrs: vec![
                AttrSpec::choice(
                    MODEL,
                    "Relation",
                    RelationModel::all()
                        .into_iter()
                        .map(|m| (m.key().to_string(), m.label().to_string()))
                        .collect(),
                    AutocompleteSource::Models,
                ),
                AttrSpec::choice(
                    ON_DELETE,
                    "Action on delete",
                    OnDeleteAction::all()
                        .into_iter()
                        .map(|a| (a.key().to_string(), a.label().to_string()))
                        .collect(),
                    AutocompleteSource::OnDelete,
                ),
            ],
            defaults: vec![],
            strips: strip_all,
        },
        MetaType::Choice => FieldKindSpec {
            meta_type,
            ui_type: "list",
            input: "select",
            attrs: vec![],
            defaults: vec![],
            strips: strip_all,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_meta_type() {
        let registry = FieldKindRegistry::standard();
        assert_eq!(registry.len(), MetaType::all().len());
        for meta_type in MetaType::all() {
            assert!(registry.require(meta_type).is_ok(), "{meta_type}");
        }
    }

    #[test]
    fn test_ui_types() {
        let registry = FieldKindRegistry::standard();
        let ui = |t| registry.get(t).map(|s| s.ui_type);
        assert_eq!(ui(MetaType::Text), Some("string"));
        assert_eq!(ui(MetaType::Date), Some("string"));
        assert_eq!(ui(MetaType::DateTime), Some("string"));
        assert_eq!(ui(MetaType::Json), Some("string"));
        assert_eq!(ui(MetaType::Decimal), Some("string"));
        assert_eq!(ui(MetaType::Integer), Some("number"));
        assert_eq!(ui(MetaType::Relation), Some("integer"));
        assert_eq!(ui(MetaType::Choice), Some("list"));
    }

    #[test]
    fn test_relation_attrs_use_autocomplete() {
        let registry = FieldKindRegistry::standard();
        let relation = registry.require(MetaType::Relation).unwrap();
        let model = relation.attr(MODEL).unwrap();
        assert_eq!(model.autocomplete, Some(AutocompleteSource::Models));
        assert!(!model.required);
        match &model.kind {
            AttrKind::Choice(choices) => assert_eq!(choices.len(), 3),
            other => panic!("unexpected kind {other:?}"),
        }
        let on_delete = relation.attr(ON_DELETE).unwrap();
        assert_eq!(on_delete.autocomplete, Some(AutocompleteSource::OnDelete));
    }

    #[test]
    fn test_empty_registry_reports_missing_kind() {
        let registry = FieldKindRegistry::empty();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.require(MetaType::Text),
            Err(MetadataError::Validation(_))
        ));
    }

    #[test]
    fn test_autocomplete_choices() {
        let registry = FieldKindRegistry::standard();
        let models = registry.autocomplete_choices(AutocompleteSource::Models);
        assert_eq!(models.len(), RelationModel::all().len());
        assert!(models.contains(&("market.Market".to_string(), "Market".to_string())));

        let actions = registry.autocomplete_choices(AutocompleteSource::OnDelete);
        assert_eq!(actions.len(), OnDeleteAction::all().len());

        assert!(FieldKindRegistry::empty()
            .autocomplete_choices(AutocompleteSource::Models)
            .is_empty());
    }
}
