#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures::stream::{self, StreamExt};
use http_body_util::BodyExt;
use questsmith_core::adventure::PromptTemplate;
use questsmith_core::generation::{FragmentStream, GenerationError, TextGenerator};
use serde_json::Value;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use questsmith_api::config::{ServerConfig, ServiceMode};
use questsmith_api::jobs::JobRegistry;
use questsmith_api::router::build_app_router;
use questsmith_api::state::AppState;

// ---------------------------------------------------------------------------
// Fake provider
// ---------------------------------------------------------------------------

/// What a [`FakeGenerator`] does once its gate opens.
#[derive(Clone)]
pub enum Script {
    /// Stream these fragments, then end.
    Fragments(Vec<String>),
    /// Fail before producing a stream.
    FailUpfront(GenerationError),
    /// Stream these fragments, then yield the error.
    FailMidStream(Vec<String>, GenerationError),
    /// Panic inside the provider.
    Panic,
}

/// Scripted [`TextGenerator`] whose output can be held back by a gate.
pub struct FakeGenerator {
    script: Script,
    gate: Arc<Semaphore>,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            gate: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn fragments(fragments: &[&str]) -> Self {
        Self::new(Script::Fragments(
            fragments.iter().map(|f| f.to_string()).collect(),
        ))
    }

    /// A generator that blocks until a permit is added to the returned gate.
    pub fn gated(script: Script) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let generator = Self {
            script,
            gate: Arc::clone(&gate),
            prompts: Mutex::new(Vec::new()),
        };
        (generator, gate)
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<FragmentStream, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let _permit = self.gate.acquire().await.expect("gate closed");

        match self.script.clone() {
            Script::Fragments(fragments) => {
                Ok(stream::iter(fragments.into_iter().map(Ok::<String, GenerationError>)).boxed())
            }
            Script::FailUpfront(err) => Err(err),
            Script::FailMidStream(fragments, err) => Ok(stream::iter(
                fragments
                    .into_iter()
                    .map(Ok::<String, GenerationError>)
                    .chain(std::iter::once(Err(err))),
            )
            .boxed()),
            Script::Panic => panic!("provider exploded"),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses a wildcard CORS origin (matching the default) and a static directory
/// that does not exist unless a test passes one in.
pub fn test_config(mode: ServiceMode) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        mode,
        prompt_template: PromptTemplate::Detailed,
        static_dir: PathBuf::from("/nonexistent/questsmith-static"),
        job_retention_secs: None,
        job_retention_interval_secs: 300,
    }
}

/// Everything a test needs to drive the app and inspect its state.
pub struct TestApp {
    pub router: Router,
    pub jobs: Arc<JobRegistry>,
}

/// Build the full application router (same middleware stack as production)
/// around the given provider.
pub fn build_test_app_with(config: ServerConfig, generator: Arc<dyn TextGenerator>) -> TestApp {
    let jobs = Arc::new(JobRegistry::new());
    let state = AppState {
        config: Arc::new(config.clone()),
        jobs: Arc::clone(&jobs),
        generator,
    };
    TestApp {
        router: build_app_router(state, &config),
        jobs,
    }
}

pub fn build_test_app(mode: ServiceMode, generator: Arc<dyn TextGenerator>) -> TestApp {
    build_test_app_with(test_config(mode), generator)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_raw(app: &Router, uri: &str, content_type: Option<&str>, body: &str) -> Response {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The goblin-wedding parameter set.
pub fn goblin_wedding() -> Value {
    serde_json::json!({
        "system": "D&D 5e",
        "players": "4",
        "experience": "beginner",
        "genre": "fantasy",
        "tone": "lighthearted",
        "concept": "a goblin wedding",
    })
}

/// Submit a job and return its id.
pub async fn submit(app: &Router, params: &Value) -> String {
    let response = post_json(app, "/generate-adventure", params).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    json["jobId"].as_str().expect("jobId must be a string").to_string()
}

/// Poll `/status/{id}` until the job leaves `processing`.
pub async fn wait_for_terminal(app: &Router, job_id: &str) -> Value {
    for _ in 0..200 {
        let response = get(app, &format!("/status/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["status"] != "processing" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never left processing");
}
