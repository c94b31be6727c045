/// Default Vertex AI region.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Vertex AI model addressing.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Vertex AI region (default: `us-central1`).
    pub location: String,
    /// Publisher model name (default: `gemini-2.5-pro`).
    pub model: String,
    /// Scheme and host of the Vertex AI endpoint, without trailing slash.
    pub api_base: String,
}

impl GeminiConfig {
    /// Config for `project_id` with the default region, model and endpoint.
    pub fn new(project_id: impl Into<String>) -> Self {
        let location = DEFAULT_LOCATION.to_string();
        Self {
            project_id: project_id.into(),
            api_base: regional_endpoint(&location),
            location,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var             | Required | Default                                   |
    /// |---------------------|----------|-------------------------------------------|
    /// | `GOOGLE_PROJECT_ID` | **yes**  | --                                        |
    /// | `GOOGLE_LOCATION`   | no       | `us-central1`                             |
    /// | `GEMINI_MODEL`      | no       | `gemini-2.5-pro`                          |
    /// | `GEMINI_API_BASE`   | no       | `https://{location}-aiplatform.googleapis.com` |
    ///
    /// # Panics
    ///
    /// Panics if `GOOGLE_PROJECT_ID` is not set or is empty.
    pub fn from_env() -> Self {
        let project_id = std::env::var("GOOGLE_PROJECT_ID")
            .expect("GOOGLE_PROJECT_ID must be set in the environment");
        assert!(!project_id.is_empty(), "GOOGLE_PROJECT_ID must not be empty");

        let location =
            std::env::var("GOOGLE_LOCATION").unwrap_or_else(|_| DEFAULT_LOCATION.into());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let api_base = std::env::var("GEMINI_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| regional_endpoint(&location));

        Self {
            project_id,
            location,
            model,
            api_base,
        }
    }

    /// Builder-style override of the endpoint (used to point at a mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Resource path of the configured publisher model.
    pub fn model_path(&self) -> String {
        format!(
            "v1/projects/{}/locations/{}/publishers/google/models/{}",
            self.project_id, self.location, self.model
        )
    }

    /// URL of the SSE streaming `generateContent` endpoint.
    pub fn stream_url(&self) -> String {
        format!(
            "{}/{}:streamGenerateContent?alt=sse",
            self.api_base,
            self.model_path()
        )
    }
}

fn regional_endpoint(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com")
}
