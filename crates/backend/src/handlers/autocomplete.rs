use axum::extract::{Path, Query, State};
use axum::Json;
use contracts::shared::autocomplete::{
    AutocompleteItem, AutocompleteQuery, AutocompleteResponse, AutocompleteSource,
};

use crate::shared::dynamic_fields::FieldKindRegistry;
use crate::state::AppState;

/// Подбор значений атрибутов Relation по подстроке ключа (без учёта регистра).
///
/// Неизвестный `el_type` даёт пустой список.
pub fn autocomplete(registry: &FieldKindRegistry, el_type: &str, query: &str) -> AutocompleteResponse {
    let Some(source) = AutocompleteSource::from_el_type(el_type) else {
        return AutocompleteResponse::default();
    };
    let needle = query.to_lowercase();
    let results = registry
        .autocomplete_choices(source)
        .iter()
        .filter(|(value, _)| value.to_lowercase().contains(&needle))
        .map(|(value, title)| AutocompleteItem {
            title: title.clone(),
            value: value.clone(),
        })
        .collect();
    AutocompleteResponse { results }
}

/// GET /metadata/autocomplete/:el_type/?query=
pub async fn lookup(
    State(state): State<AppState>,
    Path(el_type): Path<String>,
    Query(params): Query<AutocompleteQuery>,
) -> Json<AutocompleteResponse> {
    Json(autocomplete(&state.registry, &el_type, &params.query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::configure_routes;
    use crate::shared::dynamic_fields::resolver::testing::MemoryResolver;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn values(response: &AutocompleteResponse) -> Vec<&str> {
        response.results.iter().map(|i| i.value.as_str()).collect()
    }

    #[test]
    fn test_on_delete_query_matches_cascade_only() {
        let registry = FieldKindRegistry::standard();
        let response = autocomplete(&registry, "on_delete", "cas");
        assert_eq!(
            response.results,
            vec![AutocompleteItem {
                title: "Cascade".into(),
                value: "CASCADE".into(),
            }]
        );
    }

    #[test]
    fn test_models_match_on_key() {
        let registry = FieldKindRegistry::standard();
        let response = autocomplete(&registry, "models", "MARKET.");
        let mut found = values(&response);
        found.sort_unstable();
        assert_eq!(found, vec!["market.Market", "market.Product"]);

        // the label "Province" is not searched, the key is
        let response = autocomplete(&registry, "models", "ptprov");
        assert_eq!(values(&response), vec!["main.PtProvince"]);
        assert_eq!(autocomplete(&registry, "models", "").results.len(), 3);
    }

    #[test]
    fn test_query_is_not_trimmed() {
        let registry = FieldKindRegistry::standard();
        assert!(autocomplete(&registry, "on_delete", " cas").results.is_empty());
        assert!(autocomplete(&registry, "on_delete", "cas ").results.is_empty());
    }

    #[test]
    fn test_unknown_el_type_is_empty() {
        let registry = FieldKindRegistry::standard();
        assert!(autocomplete(&registry, "users", "").results.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_route() {
        let state = AppState::new(
            FieldKindRegistry::standard(),
            Arc::new(MemoryResolver::default()),
        );
        let app = configure_routes(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metadata/autocomplete/on_delete/?query=cas")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"results": [{"title": "Cascade", "value": "CASCADE"}]})
        );
    }
}
