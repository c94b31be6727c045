use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use questsmith_core::adventure::PromptTemplate;

/// How `POST /generate-adventure` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceMode {
    /// Return a job id immediately; clients poll `GET /status/{jobId}`.
    #[default]
    Job,
    /// Hold the request open until the adventure text is ready.
    Sync,
}

impl ServiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Sync => "sync",
        }
    }
}

impl FromStr for ServiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "job" | "async" => Ok(Self::Job),
            "sync" => Ok(Self::Sync),
            other => Err(format!("unknown service mode '{other}'")),
        }
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// A `*` entry allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). In sync mode this
    /// also bounds how long a generation may take.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background loops to stop (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Job (async) or sync generation endpoint.
    pub mode: ServiceMode,
    /// Prompt layout used for every request.
    pub prompt_template: PromptTemplate,
    /// Directory of static assets served as the router fallback.
    pub static_dir: PathBuf,
    /// Age after which finished jobs are purged. `None` keeps jobs forever.
    pub job_retention_secs: Option<u64>,
    /// How often the retention sweep runs (default: `300`).
    pub job_retention_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default    |
    /// |-------------------------------|------------|
    /// | `HOST`                        | `0.0.0.0`  |
    /// | `PORT`                        | `3000`     |
    /// | `CORS_ORIGINS`                | `*`        |
    /// | `REQUEST_TIMEOUT_SECS`        | `120`      |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`       |
    /// | `SERVICE_MODE`                | `job`      |
    /// | `PROMPT_TEMPLATE`             | `detailed` |
    /// | `STATIC_DIR`                  | `public`   |
    /// | `JOB_RETENTION_SECS`          | unset      |
    /// | `JOB_RETENTION_INTERVAL_SECS` | `300`      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let mode: ServiceMode = std::env::var("SERVICE_MODE")
            .unwrap_or_else(|_| "job".into())
            .parse()
            .expect("SERVICE_MODE must be 'job' or 'sync'");

        let prompt_template: PromptTemplate = std::env::var("PROMPT_TEMPLATE")
            .unwrap_or_else(|_| "detailed".into())
            .parse()
            .expect("PROMPT_TEMPLATE must be 'brief' or 'detailed'");

        let static_dir =
            PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".into()));

        let job_retention_secs: Option<u64> = std::env::var("JOB_RETENTION_SECS").ok().map(|v| {
            v.parse()
                .expect("JOB_RETENTION_SECS must be a valid u64")
        });

        let job_retention_interval_secs: u64 = std::env::var("JOB_RETENTION_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("JOB_RETENTION_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            mode,
            prompt_template,
            static_dir,
            job_retention_secs,
            job_retention_interval_secs,
        }
    }
}
