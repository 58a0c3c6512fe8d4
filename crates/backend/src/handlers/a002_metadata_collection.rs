use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a002_metadata_collection::aggregate::{
    MetadataCollection, MetadataCollectionDetail, MetadataCollectionDto, MetadataCollectionId,
};
use serde_json::{json, Value};

use super::error::{parse_id, read_error, save_error, SaveError};
use crate::domain::a002_metadata_collection::service;
use crate::shared::dynamic_fields::DynamicForm;
use crate::state::AppState;

/// GET /api/metadata_collection
pub async fn list_all() -> Result<Json<Vec<MetadataCollection>>, StatusCode> {
    service::list_all()
        .await
        .map(Json)
        .map_err(|e| read_error(e, "metadata collections"))
}

/// GET /api/metadata_collection/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<MetadataCollectionDetail>, StatusCode> {
    let id = parse_id::<MetadataCollectionId>(&id)?;
    match service::detail(id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "metadata collection")),
    }
}

/// POST /api/metadata_collection
pub async fn upsert(Json(dto): Json<MetadataCollectionDto>) -> Result<Json<Value>, SaveError> {
    let result = match dto.id {
        Some(id) => service::update(dto).await.map(|_| id),
        None => service::create(dto).await.map(|id| id.0),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(save_error(e, "metadata collection")),
    }
}

/// DELETE /api/metadata_collection/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let id = parse_id::<MetadataCollectionId>(&id)?;
    match service::delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "metadata collection")),
    }
}

/// GET /api/metadata_collection/:id/schema
pub async fn schema(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let id = parse_id::<MetadataCollectionId>(&id)?;
    match service::schema(&state.registry, id).await {
        Ok(Some(schema)) => Ok(Json(schema)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "collection schema")),
    }
}

/// GET /api/metadata_collection/:id/form
pub async fn form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DynamicForm>, StatusCode> {
    let id = parse_id::<MetadataCollectionId>(&id)?;
    match service::form(&state.registry, state.resolver.as_ref(), id, None).await {
        Ok(Some(form)) => Ok(Json(form)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "collection form")),
    }
}
