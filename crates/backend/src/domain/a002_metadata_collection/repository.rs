use chrono::Utc;
use contracts::domain::a001_metadata_definition::aggregate::MetadataDefinitionId;
use contracts::domain::a002_metadata_collection::aggregate::{
    MetadataCollection, MetadataCollectionId,
};
use contracts::domain::common::{AggregateId, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_metadata_collection")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Связь набора с определениями (many-to-many), с сохранением порядка
pub mod link {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "a002_metadata_collection_definition")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub collection_id: i64,
        #[sea_orm(primary_key, auto_increment = false)]
        pub definition_id: i64,
        pub position: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl Model {
    fn into_aggregate(self, definition_ids: Vec<MetadataDefinitionId>) -> MetadataCollection {
        let metadata = EntityMetadata {
            created_at: self.created_at.unwrap_or_else(Utc::now),
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
            is_deleted: self.is_deleted,
            version: self.version,
        };
        MetadataCollection {
            base: BaseAggregate::with_metadata(
                MetadataCollectionId(self.id),
                self.code,
                self.description,
                self.comment,
                metadata,
            ),
            definition_ids,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

async fn definition_ids_of<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> anyhow::Result<Vec<MetadataDefinitionId>> {
    let links = link::Entity::find()
        .filter(link::Column::CollectionId.eq(id))
        .order_by_asc(link::Column::Position)
        .all(db)
        .await?;
    Ok(links
        .into_iter()
        .map(|l| MetadataDefinitionId(l.definition_id))
        .collect())
}

async fn replace_links<C: ConnectionTrait>(
    db: &C,
    id: i64,
    definition_ids: &[MetadataDefinitionId],
) -> anyhow::Result<()> {
    link::Entity::delete_many()
        .filter(link::Column::CollectionId.eq(id))
        .exec(db)
        .await?;

    if definition_ids.is_empty() {
        return Ok(());
    }

    let links = definition_ids
        .iter()
        .enumerate()
        .map(|(position, definition_id)| link::ActiveModel {
            collection_id: Set(id),
            definition_id: Set(definition_id.value()),
            position: Set(position as i32),
        });
    link::Entity::insert_many(links).exec(db).await?;
    Ok(())
}

pub async fn list_all() -> anyhow::Result<Vec<MetadataCollection>> {
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Description)
        .all(conn())
        .await?;

    let mut items = Vec::with_capacity(models.len());
    for model in models {
        let ids = definition_ids_of(conn(), model.id).await?;
        items.push(model.into_aggregate(ids));
    }
    Ok(items)
}

pub async fn get_by_id(id: MetadataCollectionId) -> anyhow::Result<Option<MetadataCollection>> {
    let Some(model) = Entity::find_by_id(id.value())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
    else {
        return Ok(None);
    };
    let ids = definition_ids_of(conn(), model.id).await?;
    Ok(Some(model.into_aggregate(ids)))
}

pub async fn insert(aggregate: &MetadataCollection) -> anyhow::Result<MetadataCollectionId> {
    let txn = conn().begin().await?;
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    let model = active.insert(&txn).await?;
    replace_links(&txn, model.id, &aggregate.definition_ids).await?;
    txn.commit().await?;
    Ok(MetadataCollectionId(model.id))
}

pub async fn update(aggregate: &MetadataCollection) -> anyhow::Result<()> {
    let id = aggregate.base.id.value();
    let txn = conn().begin().await?;
    let active = ActiveModel {
        id: Set(id),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(&txn).await?;
    replace_links(&txn, id, &aggregate.definition_ids).await?;
    txn.commit().await?;
    Ok(())
}

pub async fn soft_delete(id: MetadataCollectionId) -> anyhow::Result<bool> {
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
