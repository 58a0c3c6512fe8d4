use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::enums::MetaType;

/// Типо-зависимые атрибуты виджета (JSON-объект)
pub type WidgetAttrs = Map<String, Value>;

const NAME_MAX_LENGTH: usize = 200;

// ============================================================================
// ID Type
// ============================================================================

crate::aggregate_id!(
    /// Уникальный идентификатор определения метаданных
    MetadataDefinitionId
);

// ============================================================================
// Field name derivation
// ============================================================================

/// Slug из произвольного названия: нижний регистр, только буквы/цифры/`_`,
/// пробелы и дефисы схлопываются в один `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    for ch in value.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        } else if ch.is_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Приводит имя поля к виду ключа: пробелы и `-` заменяются на `_`
pub fn normalize_field_name(value: &str) -> String {
    value.trim().replace(['-', ' '], "_")
}

/// Имя поля, производное от отображаемого названия
pub fn derive_field_name(name: &str) -> String {
    let derived = normalize_field_name(&slugify(name));
    if derived.is_empty() {
        // Название без букв и цифр (например, "!!!")
        "field".to_string()
    } else {
        derived
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Определение одного динамического поля метаданных
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataDefinition {
    pub id: MetadataDefinitionId,
    /// Отображаемое название
    pub name: String,
    /// Машинный ключ значения в `element_metadata`
    pub field_name: String,
    pub meta_type: MetaType,
    pub searchable: bool,
    pub widget_attrs: WidgetAttrs,
    pub metadata: EntityMetadata,
}

impl MetadataDefinition {
    /// Создать новое определение для вставки в БД
    pub fn new_for_insert(
        name: String,
        field_name: Option<String>,
        meta_type: MetaType,
        searchable: bool,
        widget_attrs: Option<WidgetAttrs>,
    ) -> Self {
        Self {
            id: MetadataDefinitionId::unsaved(),
            name,
            field_name: field_name.unwrap_or_default(),
            meta_type,
            searchable,
            widget_attrs: widget_attrs.unwrap_or_default(),
            metadata: EntityMetadata::new(),
        }
    }

    /// Обновить данные из DTO.
    ///
    /// Имя поля меняется только если оно явно передано.
    pub fn update(&mut self, dto: &MetadataDefinitionDto) {
        self.name = dto.name.clone();
        if let Some(field_name) = dto.field_name.as_ref().filter(|f| !f.trim().is_empty()) {
            self.field_name = field_name.clone();
        }
        self.meta_type = dto.meta_type;
        self.searchable = dto.searchable;
        self.widget_attrs = dto.widget_attrs.clone().unwrap_or_default();
    }

    /// Заполнить `field_name` из названия, если не задано, и нормализовать
    pub fn ensure_field_name(&mut self) {
        if self.field_name.trim().is_empty() {
            self.field_name = derive_field_name(&self.name);
        }
        self.field_name = normalize_field_name(&self.field_name);
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Название не может быть пустым".into());
        }
        if self.name.chars().count() > NAME_MAX_LENGTH {
            return Err(format!(
                "Название не должно превышать {} символов",
                NAME_MAX_LENGTH
            ));
        }
        if self.field_name.is_empty() {
            return Err("Имя поля не может быть пустым".into());
        }
        if self.field_name.contains([' ', '-']) {
            return Err("Имя поля не может содержать пробелы и '-'".into());
        }
        if self.field_name.chars().count() > NAME_MAX_LENGTH {
            return Err(format!(
                "Имя поля не должно превышать {} символов",
                NAME_MAX_LENGTH
            ));
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
    }

    /// Краткое представление: `{id, name, field_name, meta_type}`
    pub fn short_view(&self) -> MetadataDefinitionShort {
        MetadataDefinitionShort {
            id: self.id,
            name: self.name.clone(),
            field_name: self.field_name.clone(),
            meta_type: self.meta_type,
        }
    }

    /// Полное представление, дополнительно с `widget_attrs`
    pub fn full_view(&self) -> MetadataDefinitionView {
        MetadataDefinitionView {
            id: self.id,
            name: self.name.clone(),
            field_name: self.field_name.clone(),
            meta_type: self.meta_type,
            widget_attrs: self.widget_attrs.clone(),
        }
    }
}

impl std::fmt::Display for MetadataDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.meta_type.display_name())
    }
}

impl AggregateRoot for MetadataDefinition {
    type Id = MetadataDefinitionId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "metadata_definition"
    }

    fn element_name() -> &'static str {
        "Elements Metadata"
    }

    fn list_name() -> &'static str {
        "Elements Metadatas"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления определения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataDefinitionDto {
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub field_name: Option<String>,
    pub meta_type: MetaType,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub widget_attrs: Option<WidgetAttrs>,
}

/// Краткое представление для списков
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDefinitionShort {
    pub id: MetadataDefinitionId,
    pub name: String,
    pub field_name: String,
    pub meta_type: MetaType,
}

/// Полное представление с атрибутами виджета
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDefinitionView {
    pub id: MetadataDefinitionId,
    pub name: String,
    pub field_name: String,
    pub meta_type: MetaType,
    pub widget_attrs: WidgetAttrs,
}

/// Фильтры списка в админке: поиск по названию/имени поля, тип, признак поиска
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataDefinitionFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub meta_type: Option<MetaType>,
    #[serde(default)]
    pub searchable: Option<bool>,
}

impl MetadataDefinitionFilter {
    pub fn matches(&self, definition: &MetadataDefinition) -> bool {
        if let Some(meta_type) = self.meta_type {
            if definition.meta_type != meta_type {
                return false;
            }
        }
        if let Some(searchable) = self.searchable {
            if definition.searchable != searchable {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => {
                let needle = search.to_lowercase();
                definition.name.to_lowercase().contains(&needle)
                    || definition.field_name.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(name: &str, field_name: Option<&str>) -> MetadataDefinition {
        MetadataDefinition::new_for_insert(
            name.into(),
            field_name.map(Into::into),
            MetaType::Text,
            false,
            None,
        )
    }

    #[test]
    fn test_derive_field_name() {
        assert_eq!(derive_field_name("Max Weight"), "max_weight");
        assert_eq!(derive_field_name("  Serial - Number "), "serial_number");
        assert_eq!(derive_field_name("Gross-weight (kg)"), "gross_weight_kg");
        assert_eq!(derive_field_name("Цена закупки"), "цена_закупки");
        assert_eq!(derive_field_name("!!!"), "field");
    }

    #[test]
    fn test_derived_field_name_has_no_separators() {
        for name in ["a b", "a-b", "A  -  B", "x--y", "Title", "--lead", "trail  "] {
            let field_name = derive_field_name(name);
            assert!(!field_name.is_empty(), "{name}");
            assert!(!field_name.contains(' ') && !field_name.contains('-'), "{name}");
            assert_eq!(field_name, field_name.to_lowercase());
        }
    }

    #[test]
    fn test_ensure_field_name_keeps_explicit_value() {
        let mut d = definition("Title", Some(" My-Field name "));
        d.ensure_field_name();
        assert_eq!(d.field_name, "My_Field_name");

        let mut d = definition("Item Count", None);
        d.ensure_field_name();
        assert_eq!(d.field_name, "item_count");
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut d = definition("   ", Some("x"));
        d.ensure_field_name();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_update_preserves_field_name_when_absent() {
        let mut d = definition("Title", Some("title"));
        let dto = MetadataDefinitionDto {
            id: Some(1),
            name: "New title".into(),
            field_name: None,
            meta_type: MetaType::Integer,
            searchable: true,
            widget_attrs: Some(json!({"max_value": 10}).as_object().unwrap().clone()),
        };
        d.update(&dto);
        assert_eq!(d.field_name, "title");
        assert_eq!(d.name, "New title");
        assert_eq!(d.meta_type, MetaType::Integer);
        assert!(d.searchable);
        assert_eq!(d.widget_attrs.get("max_value"), Some(&json!(10)));
    }

    #[test]
    fn test_views() {
        let mut d = definition("Title", None);
        d.ensure_field_name();
        d.widget_attrs.insert("max_length".into(), json!(255));

        let short = serde_json::to_value(d.short_view()).unwrap();
        assert_eq!(
            short,
            json!({"id": 0, "name": "Title", "field_name": "title", "meta_type": "text"})
        );
        let full = serde_json::to_value(d.full_view()).unwrap();
        assert_eq!(full["widget_attrs"], json!({"max_length": 255}));
        assert_eq!(d.to_string(), "Title (Text)");
    }

    #[test]
    fn test_filter() {
        let mut d = definition("Gross Weight", None);
        d.ensure_field_name();
        d.searchable = true;

        let by_search = MetadataDefinitionFilter {
            search: Some("WEIGHT".into()),
            ..Default::default()
        };
        assert!(by_search.matches(&d));

        let by_type = MetadataDefinitionFilter {
            meta_type: Some(MetaType::Integer),
            ..Default::default()
        };
        assert!(!by_type.matches(&d));

        let by_flag = MetadataDefinitionFilter {
            searchable: Some(false),
            ..Default::default()
        };
        assert!(!by_flag.matches(&d));
        assert!(MetadataDefinitionFilter::default().matches(&d));
    }
}
