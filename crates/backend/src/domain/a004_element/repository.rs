use chrono::Utc;
use contracts::domain::a002_metadata_collection::aggregate::MetadataCollectionId;
use contracts::domain::a004_element::aggregate::{Element, ElementId, ElementMetadata};
use contracts::domain::common::{AggregateId, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_element")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub element_type_id: Option<i64>,
    pub element_metadata: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Element {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let element_metadata = m.element_metadata.as_deref().and_then(|text| {
            match serde_json::from_str::<ElementMetadata>(text) {
                Ok(values) => Some(values),
                Err(e) => {
                    tracing::warn!("Element {} has unreadable element_metadata: {}", m.id, e);
                    None
                }
            }
        });

        Element {
            base: BaseAggregate::with_metadata(
                ElementId(m.id),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            element_type_id: m.element_type_id.map(MetadataCollectionId),
            element_metadata,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn metadata_to_text(values: &Option<ElementMetadata>) -> anyhow::Result<Option<String>> {
    values
        .as_ref()
        .map(|v| serde_json::to_string(v).map_err(Into::into))
        .transpose()
}

pub async fn list_all() -> anyhow::Result<Vec<Element>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Description)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: ElementId) -> anyhow::Result<Option<Element>> {
    let result = Entity::find_by_id(id.value())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Element) -> anyhow::Result<ElementId> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        element_type_id: Set(aggregate.element_type_id.map(|id| id.value())),
        element_metadata: Set(metadata_to_text(&aggregate.element_metadata)?),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    let model = active.insert(conn()).await?;
    Ok(ElementId(model.id))
}

pub async fn update(aggregate: &Element) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.base.id.value()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        element_type_id: Set(aggregate.element_type_id.map(|id| id.value())),
        element_metadata: Set(metadata_to_text(&aggregate.element_metadata)?),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: ElementId) -> anyhow::Result<bool> {
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
    use serde_json::json;

    #[test]
    fn test_metadata_round_trips_through_text_column() {
        let values = json!({"weight": "12.50", "market": 3}).as_object().cloned();
        let text = metadata_to_text(&values).unwrap();

        let element: Element = Model {
            id: 5,
            code: "EL-5".into(),
            description: "Crate".into(),
            comment: None,
            element_type_id: Some(2),
            element_metadata: text,
            is_deleted: false,
            created_at: None,
            updated_at: None,
            version: 1,
        }
        .into();
        assert_eq!(element.element_type_id, Some(MetadataCollectionId(2)));
        assert_eq!(element.element_metadata, values);
    }

    #[test]
    fn test_missing_metadata_stays_none() {
        assert_eq!(metadata_to_text(&None).unwrap(), None);
    }
}
