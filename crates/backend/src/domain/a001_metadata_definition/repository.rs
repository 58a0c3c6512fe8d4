use chrono::Utc;
use contracts::domain::a001_metadata_definition::aggregate::{
    MetadataDefinition, MetadataDefinitionId, WidgetAttrs,
};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::MetaType;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_metadata_definition")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub field_name: String,
    pub meta_type: String,
    pub searchable: bool,
    pub widget_attrs: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MetadataDefinition {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let meta_type = MetaType::from_code(&m.meta_type).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown meta_type '{}' in metadata definition {}",
                m.meta_type,
                m.id
            );
            MetaType::Text
        });
        let widget_attrs: WidgetAttrs = serde_json::from_str(&m.widget_attrs).unwrap_or_default();

        MetadataDefinition {
            id: MetadataDefinitionId(m.id),
            name: m.name,
            field_name: m.field_name,
            meta_type,
            searchable: m.searchable,
            widget_attrs,
            metadata,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn attrs_to_text(attrs: &WidgetAttrs) -> anyhow::Result<String> {
    Ok(serde_json::to_string(attrs)?)
}

pub async fn list_all() -> anyhow::Result<Vec<MetadataDefinition>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Name)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Определения по списку ID в порядке списка; удалённые пропускаются
pub async fn list_by_ids(ids: &[MetadataDefinitionId]) -> anyhow::Result<Vec<MetadataDefinition>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<i64> = ids.iter().map(|id| id.value()).collect();
    let mut found: Vec<MetadataDefinition> = Entity::find()
        .filter(Column::Id.is_in(raw))
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let mut ordered = Vec::with_capacity(found.len());
    for id in ids {
        if let Some(pos) = found.iter().position(|d| d.id == *id) {
            ordered.push(found.swap_remove(pos));
        }
    }
    Ok(ordered)
}

pub async fn get_by_id(id: MetadataDefinitionId) -> anyhow::Result<Option<MetadataDefinition>> {
    let result = Entity::find_by_id(id.value())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &MetadataDefinition) -> anyhow::Result<MetadataDefinitionId> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        name: Set(aggregate.name.clone()),
        field_name: Set(aggregate.field_name.clone()),
        meta_type: Set(aggregate.meta_type.code().to_string()),
        searchable: Set(aggregate.searchable),
        widget_attrs: Set(attrs_to_text(&aggregate.widget_attrs)?),
        is_deleted: Set(aggregate.metadata.is_deleted),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    };
    let model = active.insert(conn()).await?;
    Ok(MetadataDefinitionId(model.id))
}

pub async fn update(aggregate: &MetadataDefinition) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.id.value()),
        name: Set(aggregate.name.clone()),
        field_name: Set(aggregate.field_name.clone()),
        meta_type: Set(aggregate.meta_type.code().to_string()),
        searchable: Set(aggregate.searchable),
        widget_attrs: Set(attrs_to_text(&aggregate.widget_attrs)?),
        is_deleted: Set(aggregate.metadata.is_deleted),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: MetadataDefinitionId) -> anyhow::Result<bool> {
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

    #[test]
    fn test_model_into_aggregate() {
        let model = Model {
            id: 7,
            name: "Weight".into(),
            field_name: "weight".into(),
            meta_type: "decimal".into(),
            searchable: true,
            widget_attrs: r#"{"max_digits": 10, "decimal_places": 3}"#.into(),
            is_deleted: false,
            created_at: None,
            updated_at: None,
            version: 2,
        };
        let definition: MetadataDefinition = model.into();
        assert_eq!(definition.id, MetadataDefinitionId(7));
        assert_eq!(definition.meta_type, MetaType::Decimal);
        assert_eq!(definition.widget_attrs["max_digits"], 10);
        assert_eq!(definition.metadata.version, 2);
    }

    #[test]
    fn test_broken_widget_attrs_become_empty() {
        let model = Model {
            id: 1,
            name: "Note".into(),
            field_name: "note".into(),
            meta_type: "text".into(),
            searchable: false,
            widget_attrs: "not json".into(),
            is_deleted: false,
            created_at: None,
            updated_at: None,
            version: 0,
        };
        let definition: MetadataDefinition = model.into();
        assert!(definition.widget_attrs.is_empty());
    }
}
