// Thin HTTP layer: every handler resolves its inputs and defers to DatamodelService
pub mod datamodel;
pub mod menu;
pub mod overview;
pub mod record;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::middleware::ApiResponse;
use crate::services::DatamodelService;

pub fn router(service: Arc<DatamodelService>) -> Router {
    Router::new()
        // Public
        .route("/health", get(health))
        .merge(datamodel_routes())
        .merge(record_routes())
        .layer(Extension(service))
}

fn datamodel_routes() -> Router {
    Router::new()
        .route("/api/datamodel/:tenant/:version", get(datamodel::datamodel_get))
        .route("/api/roles/:tenant/:version", get(datamodel::roles_get))
        .route("/api/menu/:tenant/:version", get(menu::menu_get))
}

fn record_routes() -> Router {
    Router::new()
        .route("/api/record/prepare", post(record::record_prepare))
        .route("/api/overview/rows", post(overview::overview_rows))
}

async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TreeMapper;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/config");
        router(Arc::new(DatamodelService::new(root, TreeMapper::default())))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_as(uri: &str, role: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-user-role", role)
            .header("x-user-tenant", "acme")
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_as("/health", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_datamodel_for_approver() {
        let (status, body) = send(get_as("/api/datamodel/acme/1", "approver")).await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let amount = &body["data"]["datamodel"]["invoice"]["amount"];
        assert_eq!(amount["readonly"], false);
        assert_eq!(amount["mandatory"], true);
        assert!(body["data"].get("roles").is_none());
    }

    #[tokio::test]
    async fn test_datamodel_without_role_header_is_default_only() {
        let request = Request::builder().uri("/api/datamodel/acme/1").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["datamodel"]["invoice"]["amount"]["readonly"], true);
    }

    #[tokio::test]
    async fn test_datamodel_root_gets_identifier() {
        let (status, body) = send(get_as("/api/datamodel/acme/1?root=invoice", "default")).await;
        assert_eq!(status, StatusCode::OK);
        let uuid = body["data"]["datamodel"]["invoice"]["uuid"]["value"].as_str().unwrap();
        assert_eq!(uuid.len(), 32);
    }

    #[tokio::test]
    async fn test_missing_version_is_404() {
        let (status, body) = send(get_as("/api/datamodel/acme/9", "default")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_tenant_without_default_role_is_500() {
        let (status, body) = send(get_as("/api/datamodel/broken/1", "default")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_roles() {
        let (status, body) = send(get_as("/api/roles/acme/1", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!(["approver", "default"]));
    }

    #[tokio::test]
    async fn test_menu_for_approver() {
        let (status, body) = send(get_as("/api/menu/acme/1", "approver")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["data"].as_array().unwrap().iter().map(|m| m["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["dashboard", "invoices"]);
    }

    #[tokio::test]
    async fn test_prepare_record() {
        let (status, body) = send(post_json(
            "/api/record/prepare",
            json!({ "entity": { "uuid": "short", "note": null, "amount": 10 } }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        let entity = &body["data"]["entity"];
        assert_eq!(entity["uuid"].as_str().unwrap().len(), 32);
        assert!(entity.get("note").is_none());
        assert_eq!(entity["amount"], 10);
    }

    #[tokio::test]
    async fn test_prepare_record_rejects_bad_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/record/prepare")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn test_overview_rows() {
        let (status, body) = send(post_json(
            "/api/overview/rows",
            json!({
                "records": [{ "entity": { "status": "A", "amount": { "$numberInt": "5" } } }],
                "mapper": { "combobox": { "status": { "A": "Active" } } }
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["row"], json!({ "status": "Active", "amount": 5 }));
        assert_eq!(body["data"][0]["access"], json!([]));
    }
}
