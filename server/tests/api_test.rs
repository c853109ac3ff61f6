use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use config::Config;
use errors::{DetailPart, SourceError};
use generation::{ScriptedBackend, ScriptedFactory, StaticCredentials};
use pipeline::ReportService;
use serde_json::{Value, json};
use server::AppState;
use server::routes::create_router;
use std::sync::Arc;
use testing::{InMemoryDirectory, InMemoryRecordSource, coarse_record, member};
use tower::ServiceExt;

fn app_with(
    directory: InMemoryDirectory,
    source: InMemoryRecordSource,
    factory: ScriptedFactory
) -> axum::Router {
    let reports = ReportService::new(Arc::new(directory), Arc::new(source), Arc::new(factory));
    let state = AppState::with_service(Config::default(), reports, None);
    create_router(Arc::new(state))
}

fn default_app(backend: Arc<ScriptedBackend>) -> axum::Router {
    let records = vec![coarse_record("1"), coarse_record("2"), coarse_record("3")];
    let source = InMemoryRecordSource::seeded(&records);
    source.fail_on("2", DetailPart::Notes);
    app_with(
        InMemoryDirectory::new(records)
            .with_members(vec![member("dsmith", "Dana Smith"), member("jdoe", "Jo Doe")]),
        source,
        ScriptedFactory::new(backend)
    )
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_generate(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = default_app(Arc::new(ScriptedBackend::replying("ok")));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_members_use_identifier_as_id() {
    let app = default_app(Arc::new(ScriptedBackend::replying("ok")));

    let response = app.oneshot(get("/api/members")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json[0],
        json!({ "id": "dsmith", "name": "Dana Smith", "identifier": "dsmith" })
    );
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_members_source_failure_is_bad_gateway() {
    let app = app_with(
        InMemoryDirectory::new(Vec::new()).failing(SourceError::Status {
            endpoint: "system/members".to_string(),
            status: 401,
            body: None
        }),
        InMemoryRecordSource::new(),
        ScriptedFactory::new(Arc::new(ScriptedBackend::replying("ok")))
    );

    let response = app.oneshot(get("/api/members")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SOURCE_ERROR");
    assert_eq!(json["details"], "system/members");
}

#[tokio::test]
async fn test_providers_lists_only_configured() {
    let app = app_with(
        InMemoryDirectory::new(Vec::new()),
        InMemoryRecordSource::new(),
        ScriptedFactory::with_credentials(
            Arc::new(ScriptedBackend::replying("ok")),
            StaticCredentials::new().with("OPENAI_API_KEY", "sk")
        )
    );

    let response = app.oneshot(get("/api/providers")).await.unwrap();
    let json = body_json(response).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "openai:gpt-4o");
    assert_eq!(entries[0]["provider"], "openai");
    assert_eq!(entries[0]["model"], "gpt-4o");
    assert!(entries.iter().all(|e| e["provider"] == "openai"));
}

#[tokio::test]
async fn test_providers_empty_without_credentials() {
    let app = app_with(
        InMemoryDirectory::new(Vec::new()),
        InMemoryRecordSource::new(),
        ScriptedFactory::with_credentials(
            Arc::new(ScriptedBackend::replying("ok")),
            StaticCredentials::new()
        )
    );

    let response = app.oneshot(get("/api/providers")).await.unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_generate_reports_counts() {
    let backend = Arc::new(ScriptedBackend::replying("# Strategic Value Report"));
    let app = default_app(backend.clone());

    let response = app
        .oneshot(post_generate(&json!({
            "member_id": "dsmith",
            "technician_name": "Dana Smith",
            "start_date": "2024-01-01",
            "end_date": "2024-03-31",
            "provider": "anthropic:claude-3-5-haiku-20241022"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["report"], "# Strategic Value Report");
    assert_eq!(json["ticket_count"], 3);
    assert_eq!(json["processed_count"], 2);
    assert_eq!(backend.calls()[0].model_id, "claude-3-5-haiku-20241022");
}

#[tokio::test]
async fn test_generate_missing_fields_is_bad_request() {
    let backend = Arc::new(ScriptedBackend::replying("ok"));
    let app = default_app(backend.clone());

    let response = app
        .oneshot(post_generate(&json!({ "start_date": "2024-01-01" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_REQUEST");
    assert_eq!(json["details"], "member_id");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_generate_malformed_json_is_bad_request() {
    let app = default_app(Arc::new(ScriptedBackend::replying("ok")));

    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_generate_unknown_provider_is_bad_request() {
    let app = default_app(Arc::new(ScriptedBackend::replying("ok")));

    let response = app
        .oneshot(post_generate(&json!({
            "member_id": "dsmith",
            "start_date": "2024-01-01",
            "end_date": "2024-03-31",
            "provider": "cohere:command"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_PROVIDER");
    assert_eq!(json["error"], "Unknown provider: cohere");
}

#[tokio::test]
async fn test_generate_missing_credential_is_server_error() {
    let app = app_with(
        InMemoryDirectory::new(vec![coarse_record("1")]),
        InMemoryRecordSource::new(),
        ScriptedFactory::with_credentials(
            Arc::new(ScriptedBackend::replying("ok")),
            StaticCredentials::new()
        )
    );

    let response = app
        .oneshot(post_generate(&json!({
            "member_id": "dsmith",
            "start_date": "2024-01-01",
            "end_date": "2024-03-31"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MISSING_CREDENTIAL");
    assert_eq!(json["details"], "GOOGLE_API_KEY");
}

#[tokio::test]
async fn test_generate_failure_is_bad_gateway() {
    let backend = Arc::new(ScriptedBackend::failing("quota exceeded"));
    let app = default_app(backend);

    let response = app
        .oneshot(post_generate(&json!({
            "member_id": "dsmith",
            "start_date": "2024-01-01",
            "end_date": "2024-03-31"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_ERROR");
    assert_eq!(json["details"], "gemini:gemini-2.5-pro");
    assert!(json.get("report").is_none());
}

#[tokio::test]
async fn test_generate_no_tickets() {
    let backend = Arc::new(ScriptedBackend::replying("unused"));
    let app = app_with(
        InMemoryDirectory::new(Vec::new()),
        InMemoryRecordSource::new(),
        ScriptedFactory::new(backend.clone())
    );

    let response = app
        .oneshot(post_generate(&json!({
            "member_id": "dsmith",
            "start_date": "2024-01-01",
            "end_date": "2024-03-31"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ticket_count"], 0);
    assert!(json["report"].as_str().unwrap().starts_with("# No Tickets Found"));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let app = default_app(Arc::new(ScriptedBackend::replying("ok")));
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
