use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // AUTOCOMPLETE (attrs editor of Relation definitions)
        // ========================================
        .route(
            "/metadata/autocomplete/:el_type/",
            get(handlers::autocomplete::lookup),
        )
        .route(
            "/metadata/autocomplete/:el_type",
            get(handlers::autocomplete::lookup),
        )
        // A001 Metadata definitions
        .route(
            "/api/metadata_definition",
            get(handlers::a001_metadata_definition::list)
                .post(handlers::a001_metadata_definition::upsert),
        )
        .route(
            "/api/metadata_definition/full",
            get(handlers::a001_metadata_definition::list_full),
        )
        .route(
            "/api/metadata_definition/attrs_schema/:meta_type",
            get(handlers::a001_metadata_definition::attrs_schema_for_type),
        )
        .route(
            "/api/metadata_definition/:id",
            get(handlers::a001_metadata_definition::get_by_id)
                .delete(handlers::a001_metadata_definition::delete),
        )
        .route(
            "/api/metadata_definition/:id/attrs_schema",
            get(handlers::a001_metadata_definition::attrs_schema),
        )
        .route(
            "/api/metadata_definition/:id/attrs_form",
            get(handlers::a001_metadata_definition::attrs_form),
        )
        // A002 Metadata collections
        .route(
            "/api/metadata_collection",
            get(handlers::a002_metadata_collection::list_all)
                .post(handlers::a002_metadata_collection::upsert),
        )
        .route(
            "/api/metadata_collection/:id",
            get(handlers::a002_metadata_collection::get_by_id)
                .delete(handlers::a002_metadata_collection::delete),
        )
        .route(
            "/api/metadata_collection/:id/schema",
            get(handlers::a002_metadata_collection::schema),
        )
        .route(
            "/api/metadata_collection/:id/form",
            get(handlers::a002_metadata_collection::form),
        )
        // A003 Reference records
        .route(
            "/api/reference_record",
            get(handlers::a003_reference_record::list_all)
                .post(handlers::a003_reference_record::upsert),
        )
        .route(
            "/api/reference_record/:id",
            get(handlers::a003_reference_record::get_by_id)
                .delete(handlers::a003_reference_record::delete),
        )
        // A004 Elements
        .route(
            "/api/element",
            get(handlers::a004_element::list_all).post(handlers::a004_element::upsert),
        )
        .route(
            "/api/element/:id",
            get(handlers::a004_element::get_by_id).delete(handlers::a004_element::delete),
        )
        .route(
            "/api/element/:id/formatted",
            get(handlers::a004_element::formatted),
        )
        .route("/api/element/:id/form", get(handlers::a004_element::form))
        .route("/api/element/:id/schema", get(handlers::a004_element::schema))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::dynamic_fields::resolver::testing::MemoryResolver;
    use crate::shared::dynamic_fields::FieldKindRegistry;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        configure_routes(AppState::new(
            FieldKindRegistry::standard(),
            Arc::new(MemoryResolver::default()),
        ))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_attrs_schema_for_type() {
        let (status, body) = get_json("/api/metadata_definition/attrs_schema/relation").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "dict");
        assert_eq!(body["keys"]["model"]["widget"], "autocomplete");
        assert_eq!(body["keys"]["model"]["handler"], "/metadata/autocomplete/models/");
        assert_eq!(body["additionalProperties"]["type"], "string");
    }

    #[tokio::test]
    async fn test_attrs_schema_for_unknown_type() {
        let (status, _) = get_json("/api/metadata_definition/attrs_schema/money").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_ids_are_rejected_before_storage() {
        let (status, _) = get_json("/api/element/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json("/api/metadata_collection/x1/schema").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_autocomplete_without_trailing_slash() {
        let (status, body) = get_json("/metadata/autocomplete/unknown?query=a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"results": []}));
    }
}
