use serde::{Deserialize, Serialize};

use crate::domain::a001_metadata_definition::aggregate::{
    MetadataDefinitionId, MetadataDefinitionShort,
};
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};

crate::aggregate_id!(
    /// Уникальный идентификатор набора метаданных
    MetadataCollectionId
);

/// Набор определений метаданных ("тип" элемента).
///
/// Определения только связаны с набором (many-to-many), но не принадлежат ему.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataCollection {
    #[serde(flatten)]
    pub base: BaseAggregate<MetadataCollectionId>,

    /// Связанные определения, в порядке добавления
    #[serde(rename = "metadata")]
    pub definition_ids: Vec<MetadataDefinitionId>,
}

impl MetadataCollection {
    pub fn new_for_insert(
        code: String,
        description: String,
        comment: Option<String>,
        definition_ids: Vec<MetadataDefinitionId>,
    ) -> Self {
        let mut base = BaseAggregate::new(MetadataCollectionId::unsaved(), code, description);
        base.comment = comment;

        let mut collection = Self {
            base,
            definition_ids: Vec::new(),
        };
        collection.set_definitions(definition_ids);
        collection
    }

    /// Заменить набор связанных определений (дубликаты отбрасываются)
    pub fn set_definitions(&mut self, ids: Vec<MetadataDefinitionId>) {
        self.definition_ids.clear();
        for id in ids {
            if !self.definition_ids.contains(&id) {
                self.definition_ids.push(id);
            }
        }
    }

    pub fn update(&mut self, dto: &MetadataCollectionDto) {
        self.base.code = dto.code.clone().unwrap_or_else(|| self.base.code.clone());
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.set_definitions(
            dto.metadata
                .iter()
                .copied()
                .map(MetadataDefinitionId::new)
                .collect(),
        );
    }

    pub fn validate(&self) -> Result<(), String> {
        self.base.validate()
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for MetadataCollection {
    type Id = MetadataCollectionId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "metadata_collection"
    }

    fn element_name() -> &'static str {
        "Metadata type"
    }

    fn list_name() -> &'static str {
        "Metadata types"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetadataCollectionDto {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    /// Идентификаторы связанных определений
    #[serde(default)]
    pub metadata: Vec<i64>,
}

/// Набор вместе с краткими представлениями его определений
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataCollectionDetail {
    #[serde(flatten)]
    pub collection: MetadataCollection,
    pub definitions: Vec<MetadataDefinitionShort>,
}
