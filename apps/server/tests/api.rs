use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bcportal_core::customers::{CustomerRepositoryTrait, NewCustomer};
use bcportal_core::tenants::{NewTenant, TenantRepositoryTrait};
use bcportal_server::{api::app_router, build_state, config::Config, AppState};

const ADMIN_PATH: &str = "/admin/environments";

struct TestApp {
    _dir: TempDir,
    state: Arc<AppState>,
    router: Router,
}

async fn build_test_app(remote: Option<&MockServer>) -> TestApp {
    let dir = tempdir().unwrap();
    let mut config = Config::with_db_path(dir.path().join("test.db").to_string_lossy());
    if let Some(server) = remote {
        config.identity_url = server.uri();
        config.admin_api_url = format!("{}{}", server.uri(), ADMIN_PATH);
    }
    let state = build_state(&config).await.unwrap();
    let router = app_router(state.clone(), &config);
    TestApp {
        _dir: dir,
        state,
        router,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn seed_tenant(state: &AppState, tenant_id: &str) {
    let customer = state
        .customer_repository
        .create(NewCustomer {
            id: None,
            name: "Contoso".to_string(),
        })
        .await
        .unwrap();
    state
        .tenant_repository
        .create(NewTenant {
            id: tenant_id.to_string(),
            customer_id: Some(customer.id),
            description: None,
            grant_type: Some("client_credentials".to_string()),
            client_id: Some("client-1".to_string()),
            client_secret: Some("s3cret".to_string()),
            scope: Some("https://api.businesscentral.dynamics.com/.default".to_string()),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = build_test_app(None).await;

    let (status, body) = send(&app.router, Method::GET, "/api/v1/healthz", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn environment_sync_without_targets_returns_empty_summary() {
    let app = build_test_app(None).await;

    let (status, body) = send(&app.router, Method::POST, "/api/v1/environments/sync", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["success"], 0);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["message"], "No environments to sync");
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn tenant_sync_reports_unknown_tenant_inside_summary() {
    let app = build_test_app(None).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/tenants/sync",
        Some(json!({ "tenants": [{ "id": "missing", "customerName": "Fabrikam" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["tenantId"], "missing");
    assert_eq!(body["errors"][0]["customerName"], "Fabrikam");
    assert_eq!(body["errors"][0]["error"], "Tenant 'missing' not found");
    assert_eq!(body["errors"][0]["retryable"], false);
}

#[tokio::test]
async fn token_for_unknown_tenant_is_reported_not_raised() {
    let app = build_test_app(None).await;

    let (status, body) = send(&app.router, Method::POST, "/api/v1/tenants/nope/token", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Tenant 'nope' not found");
    assert!(body.get("expiresAt").is_none());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = build_test_app(None).await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/environments/sync")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"environments\": ["))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn token_environment_and_app_sync_against_remote() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/T1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "fresh-token"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_PATH))
        .and(header_eq("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "name": "Production",
                    "type": "Production",
                    "status": "Active",
                    "countryCode": "DK"
                }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/Production/apps", ADMIN_PATH)))
        .and(header_eq("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "id": "A",
                    "name": "App A",
                    "version": "1.0",
                    "publisher": "Contoso",
                    "appType": "PTE",
                    "state": "Installed"
                }
            ]
        })))
        .mount(&server)
        .await;

    let app = build_test_app(Some(&server)).await;
    seed_tenant(&app.state, "T1").await;

    // First call refreshes, second is served from the stored token.
    let (status, body) = send(&app.router, Method::POST, "/api/v1/tenants/T1/token", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["refreshed"], true);
    assert!(body["expiresAt"].is_string());
    assert!(body.get("accessToken").is_none());
    assert!(!body.to_string().contains("fresh-token"));

    let (_, body) = send(&app.router, Method::POST, "/api/v1/tenants/T1/token", None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["refreshed"], false);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/tenants/T1/environments/sync",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "body: {}", body);
    assert_eq!(body["created"], 1);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/tenants/T1/environments/Production/apps/sync",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let uri = "/api/v1/tenants/T1/environments";
    let (status, body) = send(&app.router, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["name"], "Production");
    assert_eq!(body[0]["countryCode"], "DK");

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/v1/tenants/T1/environments/Production/apps",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["appId"], "A");
    assert_eq!(body[0]["version"], "1.0");

    let (status, body) = send(&app.router, Method::POST, "/api/v1/environments/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["success"], 1);
    assert_eq!(body["message"], "Synced 1 of 1 environments.");
}

#[tokio::test]
async fn apps_of_unknown_environment_are_not_found() {
    let app = build_test_app(None).await;
    seed_tenant(&app.state, "T1").await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/v1/tenants/T1/environments/Ghost/apps",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Environment 'T1/Ghost' not found");

    let uri = "/api/v1/tenants/T1/environments";
    let (status, body) = send(&app.router, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn app_sync_for_unknown_environment_reports_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/T1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "fresh-token"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/Ghost/apps", ADMIN_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let app = build_test_app(Some(&server)).await;
    seed_tenant(&app.state, "T1").await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/tenants/T1/environments/Ghost/apps/sync",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Environment 'T1/Ghost' not found");
}
