use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a001_metadata_definition::aggregate::{
    MetadataDefinitionDto, MetadataDefinitionFilter, MetadataDefinitionId,
    MetadataDefinitionShort, MetadataDefinitionView,
};
use contracts::enums::MetaType;
use serde_json::{json, Value};

use super::error::{parse_id, read_error, save_error, SaveError};
use crate::domain::a001_metadata_definition::service;
use crate::shared::dynamic_fields::attrs::AttrsForm;
use crate::state::AppState;

/// GET /api/metadata_definition
pub async fn list(
    Query(filter): Query<MetadataDefinitionFilter>,
) -> Result<Json<Vec<MetadataDefinitionShort>>, StatusCode> {
    service::list(&filter)
        .await
        .map(Json)
        .map_err(|e| read_error(e, "metadata definitions"))
}

/// GET /api/metadata_definition/full
pub async fn list_full() -> Result<Json<Vec<MetadataDefinitionView>>, StatusCode> {
    service::list_full()
        .await
        .map(Json)
        .map_err(|e| read_error(e, "metadata definitions"))
}

/// GET /api/metadata_definition/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<MetadataDefinitionView>, StatusCode> {
    let id = parse_id::<MetadataDefinitionId>(&id)?;
    match service::get_by_id(id).await {
        Ok(Some(v)) => Ok(Json(v.full_view())),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "metadata definition")),
    }
}

/// POST /api/metadata_definition
pub async fn upsert(
    State(state): State<AppState>,
    Json(dto): Json<MetadataDefinitionDto>,
) -> Result<Json<Value>, SaveError> {
    tracing::debug!(
        "Received metadata definition upsert: id={:?}, name={}",
        dto.id,
        dto.name
    );

    let result = match dto.id {
        Some(id) => service::update(&state.registry, dto).await.map(|_| id),
        None => service::create(&state.registry, dto).await.map(|id| id.0),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(save_error(e, "metadata definition")),
    }
}

/// DELETE /api/metadata_definition/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let id = parse_id::<MetadataDefinitionId>(&id)?;
    match service::delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "metadata definition")),
    }
}

/// GET /api/metadata_definition/:id/attrs_schema
pub async fn attrs_schema(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let id = parse_id::<MetadataDefinitionId>(&id)?;
    match service::attrs_schema(&state.registry, id).await {
        Ok(Some(schema)) => Ok(Json(schema)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "attrs schema")),
    }
}

/// GET /api/metadata_definition/attrs_schema/:meta_type
pub async fn attrs_schema_for_type(
    State(state): State<AppState>,
    Path(meta_type): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let meta_type = MetaType::from_code(&meta_type).ok_or(StatusCode::BAD_REQUEST)?;
    service::attrs_schema_for_type(&state.registry, meta_type)
        .map(Json)
        .map_err(|e| read_error(e, "attrs schema"))
}

/// GET /api/metadata_definition/:id/attrs_form
pub async fn attrs_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AttrsForm>, StatusCode> {
    let id = parse_id::<MetadataDefinitionId>(&id)?;
    match service::attrs_form(&state.registry, id).await {
        Ok(Some(form)) => Ok(Json(form)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "attrs form")),
    }
}
