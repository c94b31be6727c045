//! Integration tests for sync mode, where `POST /generate-adventure` returns
//! the finished adventure in the response body.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, body_text, build_test_app, build_test_app_with, get, goblin_wedding, post_json,
    post_raw, test_config,
};
use common::{FakeGenerator, Script};
use questsmith_api::config::ServiceMode;
use questsmith_core::generation::{GenerationError, GENERIC_FAILURE_MESSAGE};

// ---------------------------------------------------------------------------
// Test: successful generation returns the accumulated text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_generation_returns_adventure_text() {
    let generator = Arc::new(FakeGenerator::fragments(&["# Title\n", "Body"]));
    let app = build_test_app(ServiceMode::Sync, generator.clone());

    let response = post_json(&app.router, "/generate-adventure", &goblin_wedding()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["adventureText"], "# Title\nBody");
    assert!(generator.prompts()[0].contains("a goblin wedding"));

    // Sync mode never touches the job registry.
    assert!(app.jobs.is_empty().await);
}

// ---------------------------------------------------------------------------
// Test: provider failure is a 500 with the generic message only
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_generation_failure_hides_provider_detail() {
    let generator = FakeGenerator::new(Script::FailUpfront(GenerationError::Provider {
        status: 429,
        message: "quota exceeded for project secret-project".into(),
    }));
    let app = build_test_app(ServiceMode::Sync, Arc::new(generator));

    let response = post_json(&app.router, "/generate-adventure", &goblin_wedding()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let text = body_text(response).await;
    assert!(!text.contains("secret-project"));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], GENERIC_FAILURE_MESSAGE);
    assert_eq!(json["code"], "GENERATION_FAILED");
}

#[tokio::test]
async fn sync_mid_stream_failure_is_a_500() {
    let generator = FakeGenerator::new(Script::FailMidStream(
        vec!["partial".into()],
        GenerationError::Malformed("unexpected end of event".into()),
    ));
    let app = build_test_app(ServiceMode::Sync, Arc::new(generator));

    let response = post_json(&app.router, "/generate-adventure", &goblin_wedding()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], GENERIC_FAILURE_MESSAGE);
}

// ---------------------------------------------------------------------------
// Test: a provider slower than the request timeout is a JSON 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_generation_past_deadline_is_a_json_500() {
    let (generator, _gate) = FakeGenerator::gated(Script::Fragments(vec!["late".into()]));
    let mut config = test_config(ServiceMode::Sync);
    config.request_timeout_secs = 1;
    let app = build_test_app_with(config, Arc::new(generator));

    let response = post_json(&app.router, "/generate-adventure", &goblin_wedding()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let json = body_json(response).await;
    assert_eq!(json["error"], GENERIC_FAILURE_MESSAGE);
    assert_eq!(json["code"], "GENERATION_FAILED");
}

// ---------------------------------------------------------------------------
// Test: a panicking provider is reported as a generation failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_provider_panic_is_a_generation_failure() {
    let app = build_test_app(ServiceMode::Sync, Arc::new(FakeGenerator::new(Script::Panic)));

    let response = post_json(&app.router, "/generate-adventure", &goblin_wedding()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let text = body_text(response).await;
    assert!(!text.contains("exploded"));
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], GENERIC_FAILURE_MESSAGE);
    assert_eq!(json["code"], "GENERATION_FAILED");
}

// ---------------------------------------------------------------------------
// Test: request parsing matches job mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_malformed_json_is_400() {
    let app = build_test_app(ServiceMode::Sync, Arc::new(FakeGenerator::fragments(&["x"])));

    let response = post_raw(
        &app.router,
        "/generate-adventure",
        Some("application/json"),
        "[not json",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sync_empty_json_body_generates_with_empty_parameters() {
    let generator = Arc::new(FakeGenerator::fragments(&["ok"]));
    let app = build_test_app(ServiceMode::Sync, generator.clone());

    let response = post_raw(&app.router, "/generate-adventure", Some("application/json"), "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["adventureText"], "ok");
    assert!(generator.prompts()[0].contains("- **Game System:** \n"));
}

// ---------------------------------------------------------------------------
// Test: job polling is not mounted in sync mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_route_is_absent_in_sync_mode() {
    let app = build_test_app(ServiceMode::Sync, Arc::new(FakeGenerator::fragments(&["x"])));

    let id = uuid::Uuid::new_v4();
    let response = get(&app.router, &format!("/status/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
