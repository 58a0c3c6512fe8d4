use super::repository;
use contracts::domain::a003_reference_record::aggregate::{
    ReferenceRecord, ReferenceRecordDto, ReferenceRecordId,
};
use contracts::domain::common::AggregateId;

use crate::shared::dynamic_fields::MetadataError;

/// Создание новой записи справочника
pub async fn create(dto: ReferenceRecordDto) -> anyhow::Result<ReferenceRecordId> {
    let mut aggregate =
        ReferenceRecord::new_for_insert(dto.model, dto.description, dto.metadata_description);

    aggregate.validate().map_err(MetadataError::Validation)?;

    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Обновление существующей записи
pub async fn update(dto: ReferenceRecordDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .map(ReferenceRecordId::new)
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| MetadataError::not_found::<ReferenceRecord>(id.value()))?;

    aggregate.update(&dto);

    aggregate.validate().map_err(MetadataError::Validation)?;

    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: ReferenceRecordId) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: ReferenceRecordId) -> anyhow::Result<Option<ReferenceRecord>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<ReferenceRecord>> {
    repository::list_all().await
}
