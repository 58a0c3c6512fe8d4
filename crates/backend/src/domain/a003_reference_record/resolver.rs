use async_trait::async_trait;
use contracts::domain::a003_reference_record::aggregate::{ReferenceRecord, ReferenceRecordId};
use contracts::domain::common::AggregateId;
use contracts::enums::RelationModel;

use super::repository;
use crate::shared::dynamic_fields::{RecordResolver, RelatedRecord};

/// Поиск записей для полей Relation по таблице справочника
#[derive(Debug, Clone, Copy, Default)]
pub struct DbRecordResolver;

impl From<ReferenceRecord> for RelatedRecord {
    fn from(record: ReferenceRecord) -> Self {
        RelatedRecord {
            id: record.id.value(),
            model: record.model,
            description: record.description,
            metadata_description: record.metadata_description,
        }
    }
}

#[async_trait]
impl RecordResolver for DbRecordResolver {
    async fn candidates(&self, model: RelationModel) -> anyhow::Result<Vec<RelatedRecord>> {
        Ok(repository::list_by_model(model)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn find(&self, model: RelationModel, id: i64) -> anyhow::Result<Option<RelatedRecord>> {
        Ok(repository::find_by_model(model, ReferenceRecordId(id))
            .await?
            .map(Into::into))
    }
}
