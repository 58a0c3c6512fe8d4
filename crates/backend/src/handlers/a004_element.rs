use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_element::aggregate::{Element, ElementDto, ElementId};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{parse_id, read_error, save_error, SaveError};
use crate::domain::a004_element::service;
use crate::shared::dynamic_fields::DynamicForm;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FormattedQuery {
    #[serde(default)]
    pub as_string: bool,
}

/// GET /api/element
pub async fn list_all() -> Result<Json<Vec<Element>>, StatusCode> {
    service::list_all()
        .await
        .map(Json)
        .map_err(|e| read_error(e, "elements"))
}

/// GET /api/element/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Element>, StatusCode> {
    let id = parse_id::<ElementId>(&id)?;
    match service::get_by_id(id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "element")),
    }
}

/// POST /api/element
pub async fn upsert(
    State(state): State<AppState>,
    Json(dto): Json<ElementDto>,
) -> Result<Json<Value>, SaveError> {
    tracing::debug!(
        "Received element upsert: id={:?}, element_type_id={:?}",
        dto.id,
        dto.element_type_id
    );

    let registry = state.registry.as_ref();
    let resolver = state.resolver.as_ref();
    let result = match dto.id {
        Some(id) => service::update(registry, resolver, dto).await.map(|_| id),
        None => service::create(registry, resolver, dto).await.map(|id| id.0),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(save_error(e, "element")),
    }
}

/// DELETE /api/element/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let id = parse_id::<ElementId>(&id)?;
    match service::delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "element")),
    }
}

/// GET /api/element/:id/formatted?as_string=bool
pub async fn formatted(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FormattedQuery>,
) -> Result<Json<Value>, StatusCode> {
    let id = parse_id::<ElementId>(&id)?;
    match service::formatted(state.resolver.as_ref(), id, query.as_string).await {
        Ok(Some(rendered)) => Ok(Json(rendered.map(Value::Object).unwrap_or(Value::Null))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "formatted metadata")),
    }
}

/// GET /api/element/:id/form
pub async fn form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DynamicForm>, StatusCode> {
    let id = parse_id::<ElementId>(&id)?;
    match service::metadata_form(&state.registry, state.resolver.as_ref(), id).await {
        Ok(Some(form)) => Ok(Json(form)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "metadata form")),
    }
}

/// GET /api/element/:id/schema
pub async fn schema(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let id = parse_id::<ElementId>(&id)?;
    match service::schema(&state.registry, id).await {
        Ok(Some(schema)) => Ok(Json(schema)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "metadata schema")),
    }
}
