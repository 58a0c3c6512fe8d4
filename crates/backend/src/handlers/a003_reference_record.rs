use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a003_reference_record::aggregate::{
    ReferenceRecord, ReferenceRecordDto, ReferenceRecordId,
};
use serde_json::{json, Value};

use super::error::{parse_id, read_error, save_error, SaveError};
use crate::domain::a003_reference_record::service;

/// GET /api/reference_record
pub async fn list_all() -> Result<Json<Vec<ReferenceRecord>>, StatusCode> {
    service::list_all()
        .await
        .map(Json)
        .map_err(|e| read_error(e, "reference records"))
}

/// GET /api/reference_record/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<ReferenceRecord>, StatusCode> {
    let id = parse_id::<ReferenceRecordId>(&id)?;
    match service::get_by_id(id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "reference record")),
    }
}

/// POST /api/reference_record
pub async fn upsert(Json(dto): Json<ReferenceRecordDto>) -> Result<Json<Value>, SaveError> {
    let result = match dto.id {
        Some(id) => service::update(dto).await.map(|_| id),
        None => service::create(dto).await.map(|id| id.0),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(save_error(e, "reference record")),
    }
}

/// DELETE /api/reference_record/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let id = parse_id::<ReferenceRecordId>(&id)?;
    match service::delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(read_error(e, "reference record")),
    }
}
