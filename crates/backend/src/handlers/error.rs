use axum::http::StatusCode;
use axum::Json;
use contracts::domain::common::AggregateId;
use serde_json::{json, Value};

use crate::shared::dynamic_fields::MetadataError;

/// Ошибка записи: статус и JSON-тело с деталями
pub type SaveError = (StatusCode, Json<Value>);

fn status_of(e: &anyhow::Error) -> StatusCode {
    match e.downcast_ref::<MetadataError>() {
        Some(MetadataError::InvalidAttributes(_))
        | Some(MetadataError::InvalidElementMetadata(_))
        | Some(MetadataError::FieldBuild { .. })
        | Some(MetadataError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(MetadataError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Some(MetadataError::ElementTypeNotImplemented(_)) | Some(MetadataError::Storage(_)) | None => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Ответ на неудачную запись.
///
/// Ошибки проверки отдаются по полям:
/// `{"widget_attrs": {..}}` или `{"element_metadata": {..}}`.
pub fn save_error(e: anyhow::Error, what: &str) -> SaveError {
    let status = status_of(&e);
    if status.is_server_error() {
        tracing::error!("Failed to save {}: {:#}", what, e);
    } else {
        tracing::warn!("Rejected {}: {}", what, e);
    }

    let body = match e.downcast_ref::<MetadataError>() {
        Some(MetadataError::InvalidAttributes(errors)) => json!({ "widget_attrs": errors }),
        Some(MetadataError::InvalidElementMetadata(errors)) => json!({ "element_metadata": errors }),
        _ if status.is_server_error() => json!({ "error": "Internal server error" }),
        _ => json!({ "error": e.to_string() }),
    };
    (status, Json(body))
}

/// Статус для ошибки чтения (ошибка записывается в лог)
pub fn read_error(e: anyhow::Error, what: &str) -> StatusCode {
    let status = status_of(&e);
    if status.is_server_error() {
        tracing::error!("Failed to load {}: {:#}", what, e);
    } else {
        tracing::warn!("Cannot load {}: {}", what, e);
    }
    status
}

/// ID из сегмента пути; некорректный ID даёт 400
pub fn parse_id<Id: AggregateId>(raw: &str) -> Result<Id, StatusCode> {
    Id::from_string(raw).map_err(|e| {
        tracing::debug!("{}", e);
        StatusCode::BAD_REQUEST
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a004_element::aggregate::ElementId;
    use contracts::shared::validation::FieldErrors;

    #[test]
    fn test_attribute_errors_are_reported_per_attribute() {
        let mut errors = FieldErrors::new();
        errors.add("max_length", "Enter a whole number.");
        let (status, Json(body)) =
            save_error(MetadataError::InvalidAttributes(errors).into(), "definition");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"widget_attrs": {"max_length": ["Enter a whole number."]}}));
    }

    #[test]
    fn test_element_metadata_errors() {
        let mut errors = FieldErrors::new();
        errors.add("count", "Enter a whole number.");
        let (status, Json(body)) =
            save_error(MetadataError::InvalidElementMetadata(errors).into(), "element");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["element_metadata"]["count"][0], "Enter a whole number.");
    }

    #[test]
    fn test_statuses() {
        let missing: anyhow::Error = MetadataError::NotFound { entity: "Element", id: 4 }.into();
        assert_eq!(status_of(&missing), StatusCode::NOT_FOUND);

        let storage = anyhow::anyhow!("disk I/O error");
        let (status, Json(body)) = save_error(storage, "element");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id::<ElementId>("42"), Ok(ElementId(42)));
        assert_eq!(parse_id::<ElementId>("abc"), Err(StatusCode::BAD_REQUEST));
    }
}
