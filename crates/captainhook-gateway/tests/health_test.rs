
use axum::body::Body;
use axum::http::{Request, StatusCode};
use captainhook_runtime::HookSettings;
use http_body_util::BodyExt;
use tower::ServiceExt;

use captainhook_gateway::create_router;
use test_helpers::make_state;

#[tokio::test]
async fn test_health_reports_version() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_router(make_state(HookSettings::new(dir.path())));

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_needs_no_credentials_even_with_static_token() {
    let dir = tempfile::TempDir::new().unwrap();
    let settings = HookSettings::new(dir.path()).with_static_token(Some("good".into()));
    let app = create_router(make_state(settings));

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::OK);
}
