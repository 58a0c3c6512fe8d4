use super::repository;
use contracts::domain::a001_metadata_definition::aggregate::{
    MetadataDefinition, MetadataDefinitionDto, MetadataDefinitionFilter, MetadataDefinitionId,
    MetadataDefinitionShort, MetadataDefinitionView,
};
use contracts::domain::common::AggregateId;
use contracts::enums::MetaType;
use serde_json::Value;

use crate::shared::dynamic_fields::attrs::{self, AttrsForm};
use crate::shared::dynamic_fields::ui_schema;
use crate::shared::dynamic_fields::{FieldKindRegistry, MetadataError};

/// Создание нового определения
pub async fn create(
    registry: &FieldKindRegistry,
    dto: MetadataDefinitionDto,
) -> anyhow::Result<MetadataDefinitionId> {
    let mut aggregate = MetadataDefinition::new_for_insert(
        dto.name,
        dto.field_name,
        dto.meta_type,
        dto.searchable,
        dto.widget_attrs,
    );

    // Нормализация атрибутов, проверка и вывод имени поля
    attrs::clean_definition(registry, &mut aggregate)?;

    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Created metadata definition {} '{}'", id, aggregate.field_name);
    Ok(id)
}

/// Обновление существующего определения
pub async fn update(registry: &FieldKindRegistry, dto: MetadataDefinitionDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .map(MetadataDefinitionId::new)
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| MetadataError::not_found::<MetadataDefinition>(id.value()))?;

    aggregate.update(&dto);

    attrs::clean_definition(registry, &mut aggregate)?;

    aggregate.before_write();

    repository::update(&aggregate).await
}

/// Мягкое удаление определения
pub async fn delete(id: MetadataDefinitionId) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: MetadataDefinitionId) -> anyhow::Result<Option<MetadataDefinition>> {
    repository::get_by_id(id).await
}

/// Список в кратком представлении с фильтрами админки
pub async fn list(filter: &MetadataDefinitionFilter) -> anyhow::Result<Vec<MetadataDefinitionShort>> {
    Ok(repository::list_all()
        .await?
        .iter()
        .filter(|d| filter.matches(d))
        .map(MetadataDefinition::short_view)
        .collect())
}

/// Список в полном представлении
pub async fn list_full() -> anyhow::Result<Vec<MetadataDefinitionView>> {
    Ok(repository::list_all()
        .await?
        .iter()
        .map(MetadataDefinition::full_view)
        .collect())
}

/// UI-схема атрибутов для сохранённого определения
pub async fn attrs_schema(
    registry: &FieldKindRegistry,
    id: MetadataDefinitionId,
) -> anyhow::Result<Option<Value>> {
    match repository::get_by_id(id).await? {
        Some(definition) => Ok(Some(attrs_schema_for_type(registry, definition.meta_type)?)),
        None => Ok(None),
    }
}

/// UI-схема атрибутов для типа (используется до сохранения определения)
pub fn attrs_schema_for_type(registry: &FieldKindRegistry, meta_type: MetaType) -> anyhow::Result<Value> {
    Ok(ui_schema::attrs_ui_schema(registry, meta_type)?)
}

/// Форма проверки атрибутов для сохранённого определения
pub async fn attrs_form(
    registry: &FieldKindRegistry,
    id: MetadataDefinitionId,
) -> anyhow::Result<Option<AttrsForm>> {
    match repository::get_by_id(id).await? {
        Some(definition) => Ok(Some(attrs::attrs_form(registry, definition.meta_type)?)),
        None => Ok(None),
    }
}
