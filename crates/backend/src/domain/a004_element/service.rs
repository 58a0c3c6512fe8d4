use super::repository;
use contracts::domain::a001_metadata_definition::aggregate::MetadataDefinition;
use contracts::domain::a002_metadata_collection::aggregate::MetadataCollectionId;
use contracts::domain::a004_element::aggregate::{Element, ElementDto, ElementId, ElementMetadata};
use contracts::domain::common::AggregateId;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::a002_metadata_collection;
use crate::shared::dynamic_fields::container::{render_element_metadata, validate_element_metadata};
use crate::shared::dynamic_fields::form::derive_form;
use crate::shared::dynamic_fields::ui_schema::collection_json_schema;
use crate::shared::dynamic_fields::{
    DynamicForm, ElementMetadataContainer, FieldKindRegistry, MetadataError, RecordResolver,
};

/// Определения типа элемента для сохранения.
///
/// Элемент без типа не проверяется; несуществующий тип является ошибкой.
async fn definitions_for_save(
    element: &Element,
) -> anyhow::Result<Option<Vec<MetadataDefinition>>> {
    let Some(type_id) = element.element_type()? else {
        return Ok(None);
    };
    match a002_metadata_collection::service::definitions_by_id(type_id).await? {
        Some(definitions) => Ok(Some(definitions)),
        None => Err(MetadataError::Validation(format!("Unknown element type {}", type_id)).into()),
    }
}

/// Определения типа элемента для отображения; `None`, если тип не загрузился
async fn definitions_for_render(type_id: Option<MetadataCollectionId>) -> Option<Vec<MetadataDefinition>> {
    let type_id = type_id?;
    match a002_metadata_collection::service::definitions_by_id(type_id).await {
        Ok(Some(definitions)) => Some(definitions),
        Ok(None) => {
            tracing::warn!("Element type {} does not exist", type_id);
            None
        }
        Err(e) => {
            tracing::warn!("Cannot load element type {}: {}", type_id, e);
            None
        }
    }
}

/// Проверка метаданных перед записью
async fn clean_metadata(
    registry: &FieldKindRegistry,
    resolver: &dyn RecordResolver,
    element: &mut Element,
) -> anyhow::Result<()> {
    let definitions = definitions_for_save(element).await?;
    validate_element_metadata(
        registry,
        definitions.as_deref(),
        element.element_metadata_mut(),
        resolver,
    )
    .await?;
    Ok(())
}

/// Создание нового элемента
pub async fn create(
    registry: &FieldKindRegistry,
    resolver: &dyn RecordResolver,
    dto: ElementDto,
) -> anyhow::Result<ElementId> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("EL-{}", Uuid::new_v4()));
    let mut aggregate = Element::new_for_insert(
        code,
        dto.description,
        dto.comment,
        dto.element_type_id.map(MetadataCollectionId::new),
        dto.element_metadata,
    );

    aggregate.validate().map_err(MetadataError::Validation)?;
    clean_metadata(registry, resolver, &mut aggregate).await?;

    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Обновление существующего элемента
pub async fn update(
    registry: &FieldKindRegistry,
    resolver: &dyn RecordResolver,
    dto: ElementDto,
) -> anyhow::Result<()> {
    let id = dto
        .id
        .map(ElementId::new)
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| MetadataError::not_found::<Element>(id.value()))?;

    aggregate.update(&dto);

    aggregate.validate().map_err(MetadataError::Validation)?;
    clean_metadata(registry, resolver, &mut aggregate).await?;

    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: ElementId) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: ElementId) -> anyhow::Result<Option<Element>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Element>> {
    repository::list_all().await
}

/// Отформатированные метаданные элемента.
///
/// Внешний `None` означает, что элемента нет; внутренний, что метаданных нет.
pub async fn formatted(
    resolver: &dyn RecordResolver,
    id: ElementId,
    as_display_string: bool,
) -> anyhow::Result<Option<Option<ElementMetadata>>> {
    let Some(element) = repository::get_by_id(id).await? else {
        return Ok(None);
    };
    let definitions = definitions_for_render(element.element_type()?).await;
    let rendered = render_element_metadata(
        definitions.as_deref(),
        element.element_metadata(),
        resolver,
        as_display_string,
    )
    .await?;
    Ok(Some(rendered))
}

/// Форма метаданных с текущими значениями элемента
pub async fn metadata_form(
    registry: &FieldKindRegistry,
    resolver: &dyn RecordResolver,
    id: ElementId,
) -> anyhow::Result<Option<DynamicForm>> {
    let Some(element) = repository::get_by_id(id).await? else {
        return Ok(None);
    };
    let Some(definitions) = definitions_for_render(element.element_type()?).await else {
        return Ok(Some(DynamicForm::default()));
    };
    let form = derive_form(registry, &definitions, element.element_metadata(), resolver).await?;
    Ok(Some(form))
}

/// JSON-схема метаданных элемента (пустая, если тип не задан)
pub async fn schema(registry: &FieldKindRegistry, id: ElementId) -> anyhow::Result<Option<Value>> {
    let Some(element) = repository::get_by_id(id).await? else {
        return Ok(None);
    };
    let definitions = definitions_for_render(element.element_type()?)
        .await
        .unwrap_or_default();
    Ok(Some(collection_json_schema(registry, &definitions)?))
}
