use chrono::Utc;
use contracts::domain::a003_reference_record::aggregate::{ReferenceRecord, ReferenceRecordId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::RelationModel;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_reference_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub model: String,
    pub description: String,
    pub metadata_description: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ReferenceRecord {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let model = RelationModel::from_key(&m.model)
            .ok_or_else(|| anyhow::anyhow!("Unknown relation model '{}' in record {}", m.model, m.id))?;
        Ok(ReferenceRecord {
            id: ReferenceRecordId(m.id),
            model,
            description: m.description,
            metadata_description: m.metadata_description,
            metadata: EntityMetadata {
                created_at: m.created_at.unwrap_or_else(Utc::now),
                updated_at: m.updated_at.unwrap_or_else(Utc::now),
                is_deleted: m.is_deleted,
                version: m.version,
            },
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Записи с неизвестной моделью пропускаются с предупреждением
fn into_records(models: Vec<Model>) -> Vec<ReferenceRecord> {
    models
        .into_iter()
        .filter_map(|m| match ReferenceRecord::try_from(m) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping reference record: {}", e);
                None
            }
        })
        .collect()
}

pub async fn list_all() -> anyhow::Result<Vec<ReferenceRecord>> {
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Model)
        .order_by_asc(Column::Description)
        .all(conn())
        .await?;
    Ok(into_records(models))
}

pub async fn list_by_model(model: RelationModel) -> anyhow::Result<Vec<ReferenceRecord>> {
    let models = Entity::find()
        .filter(Column::Model.eq(model.key()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Description)
        .all(conn())
        .await?;
    Ok(into_records(models))
}

pub async fn get_by_id(id: ReferenceRecordId) -> anyhow::Result<Option<ReferenceRecord>> {
    let result = Entity::find_by_id(id.value())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    result.map(ReferenceRecord::try_from).transpose()
}

pub async fn find_by_model(
    model: RelationModel,
    id: ReferenceRecordId,
) -> anyhow::Result<Option<ReferenceRecord>> {
    let result = Entity::find_by_id(id.value())
        .filter(Column::Model.eq(model.key()))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    result.map(ReferenceRecord::try_from).transpose()
}

pub async fn insert(aggregate: &ReferenceRecord) -> anyhow::Result<ReferenceRecordId> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        model: Set(aggregate.model.key().to_string()),
        description: Set(aggregate.description.clone()),
        metadata_description: Set(aggregate.metadata_description.clone()),
        is_deleted: Set(aggregate.metadata.is_deleted),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    };
    let model = active.insert(conn()).await?;
    Ok(ReferenceRecordId(model.id))
}

pub async fn update(aggregate: &ReferenceRecord) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.id.value()),
        model: Set(aggregate.model.key().to_string()),
        description: Set(aggregate.description.clone()),
        metadata_description: Set(aggregate.metadata_description.clone()),
        is_deleted: Set(aggregate.metadata.is_deleted),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: ReferenceRecordId) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.value()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(key: &str) -> Model {
        Model {
            id: 3,
            model: key.into(),
            description: "Harbour".into(),
            metadata_description: None,
            is_deleted: false,
            created_at: None,
            updated_at: None,
            version: 1,
        }
    }

    #[test]
    fn test_model_conversion() {
        let record = ReferenceRecord::try_from(model("market.Market")).unwrap();
        assert_eq!(record.model, RelationModel::Market);
        assert_eq!(record.id, ReferenceRecordId(3));
    }

    #[test]
    fn test_unknown_models_are_skipped() {
        let records = into_records(vec![model("market.Market"), model("auth.User")]);
        assert_eq!(records.len(), 1);
    }
}
