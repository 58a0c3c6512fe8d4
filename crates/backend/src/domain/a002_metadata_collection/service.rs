use super::repository;
use contracts::domain::a001_metadata_definition::aggregate::{
    MetadataDefinition, MetadataDefinitionId,
};
use contracts::domain::a002_metadata_collection::aggregate::{
    MetadataCollection, MetadataCollectionDetail, MetadataCollectionDto, MetadataCollectionId,
};
use contracts::domain::common::AggregateId;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::a001_metadata_definition;
use crate::shared::dynamic_fields::form::derive_form;
use crate::shared::dynamic_fields::ui_schema::collection_json_schema;
use crate::shared::dynamic_fields::{
    DynamicForm, FieldKindRegistry, MetadataError, RecordResolver,
};

/// Все ли определения набора существуют
async fn ensure_definitions_exist(collection: &MetadataCollection) -> anyhow::Result<()> {
    let found = a001_metadata_definition::repository::list_by_ids(&collection.definition_ids).await?;
    let missing: Vec<String> = collection
        .definition_ids
        .iter()
        .filter(|id| !found.iter().any(|d| d.id == **id))
        .map(|id| id.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MetadataError::Validation(format!(
            "Unknown metadata definitions: {}",
            missing.join(", ")
        ))
        .into())
    }
}

/// Создание нового набора метаданных
pub async fn create(dto: MetadataCollectionDto) -> anyhow::Result<MetadataCollectionId> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("COL-{}", Uuid::new_v4()));
    let mut aggregate = MetadataCollection::new_for_insert(
        code,
        dto.description,
        dto.comment,
        dto.metadata.into_iter().map(MetadataDefinitionId::new).collect(),
    );

    aggregate.validate().map_err(MetadataError::Validation)?;
    ensure_definitions_exist(&aggregate).await?;

    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Обновление существующего набора
pub async fn update(dto: MetadataCollectionDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .map(MetadataCollectionId::new)
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| MetadataError::not_found::<MetadataCollection>(id.value()))?;

    aggregate.update(&dto);

    aggregate.validate().map_err(MetadataError::Validation)?;
    ensure_definitions_exist(&aggregate).await?;

    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: MetadataCollectionId) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: MetadataCollectionId) -> anyhow::Result<Option<MetadataCollection>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<MetadataCollection>> {
    repository::list_all().await
}

/// Определения набора в порядке набора
pub async fn definitions(collection: &MetadataCollection) -> anyhow::Result<Vec<MetadataDefinition>> {
    a001_metadata_definition::repository::list_by_ids(&collection.definition_ids).await
}

/// Определения набора по его ID; `None`, если набор не найден
pub async fn definitions_by_id(
    id: MetadataCollectionId,
) -> anyhow::Result<Option<Vec<MetadataDefinition>>> {
    match repository::get_by_id(id).await? {
        Some(collection) => Ok(Some(definitions(&collection).await?)),
        None => Ok(None),
    }
}

/// Набор вместе с краткими представлениями его определений
pub async fn detail(id: MetadataCollectionId) -> anyhow::Result<Option<MetadataCollectionDetail>> {
    let Some(collection) = repository::get_by_id(id).await? else {
        return Ok(None);
    };
    let definitions = definitions(&collection)
        .await?
        .iter()
        .map(MetadataDefinition::short_view)
        .collect();
    Ok(Some(MetadataCollectionDetail {
        collection,
        definitions,
    }))
}

/// JSON-схема набора
pub async fn schema(
    registry: &FieldKindRegistry,
    id: MetadataCollectionId,
) -> anyhow::Result<Option<Value>> {
    match definitions_by_id(id).await? {
        Some(definitions) => Ok(Some(collection_json_schema(registry, &definitions)?)),
        None => Ok(None),
    }
}

/// Форма значений набора; `initial` задаёт начальные значения полей
pub async fn form(
    registry: &FieldKindRegistry,
    resolver: &dyn RecordResolver,
    id: MetadataCollectionId,
    initial: Option<&Map<String, Value>>,
) -> anyhow::Result<Option<DynamicForm>> {
    match definitions_by_id(id).await? {
        Some(definitions) => Ok(Some(
            derive_form(registry, &definitions, initial, resolver).await?,
        )),
        None => Ok(None),
    }
}
