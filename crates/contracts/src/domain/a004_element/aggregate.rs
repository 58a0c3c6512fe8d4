use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::a002_metadata_collection::aggregate::MetadataCollectionId;
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};

/// Значения динамических полей: `field_name` -> сырое значение
pub type ElementMetadata = Map<String, Value>;

crate::aggregate_id!(
    /// Уникальный идентификатор элемента
    ElementId
);

/// Прикладная запись с динамическими метаданными.
///
/// Состав и типы ключей `element_metadata` задаются набором
/// `element_type_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub base: BaseAggregate<ElementId>,

    pub element_type_id: Option<MetadataCollectionId>,

    pub element_metadata: Option<ElementMetadata>,
}

impl Element {
    pub fn new_for_insert(
        code: String,
        description: String,
        comment: Option<String>,
        element_type_id: Option<MetadataCollectionId>,
        element_metadata: Option<ElementMetadata>,
    ) -> Self {
        let mut base = BaseAggregate::new(ElementId::unsaved(), code, description);
        base.comment = comment;

        Self {
            base,
            element_type_id,
            element_metadata,
        }
    }

    pub fn update(&mut self, dto: &ElementDto) {
        self.base.code = dto.code.clone().unwrap_or_else(|| self.base.code.clone());
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.element_type_id = dto.element_type_id.map(MetadataCollectionId::new);
        self.element_metadata = dto.element_metadata.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        self.base.validate()
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Element {
    type Id = ElementId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "element"
    }

    fn element_name() -> &'static str {
        "Element"
    }

    fn list_name() -> &'static str {
        "Elements"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ElementDto {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    #[serde(default)]
    pub element_type_id: Option<i64>,
    #[serde(default)]
    pub element_metadata: Option<ElementMetadata>,
}
