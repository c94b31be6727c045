//! Google Cloud credentials and OAuth access tokens.
//!
//! Either a static bearer token is supplied directly, or a service-account
//! key is exchanged for a short-lived access token using the OAuth 2.0
//! JWT-bearer grant. Exchanged tokens are cached until shortly before they
//! expire.

use std::fmt;
use std::path::Path;

use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::GeminiError;

/// OAuth scope covering Vertex AI.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Grant type for exchanging a signed assertion for an access token.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for the signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before their reported expiry.
const REFRESH_MARGIN_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// ServiceAccountKey
// ---------------------------------------------------------------------------

/// The fields of a Google service-account JSON key that token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(bytes: &[u8]) -> Result<Self, GeminiError> {
        serde_json::from_slice(bytes)
            .map_err(|e| GeminiError::Credentials(format!("invalid service account key: {e}")))
    }

    /// Decode a key supplied as base64-encoded JSON.
    pub fn from_base64(encoded: &str) -> Result<Self, GeminiError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| GeminiError::Credentials(format!("credentials are not valid base64: {e}")))?;
        Self::from_json(&bytes)
    }

    pub fn from_file(path: &Path) -> Result<Self, GeminiError> {
        let bytes = std::fs::read(path).map_err(|e| {
            GeminiError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&bytes)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum Credentials {
    /// A ready-to-use bearer token (e.g. from `gcloud auth print-access-token`).
    AccessToken(String),
    /// A service-account key to exchange for access tokens.
    ServiceAccount(ServiceAccountKey),
}

impl Credentials {
    /// Load credentials from environment variables.
    ///
    /// | Env Var                          | Meaning                                   |
    /// |----------------------------------|-------------------------------------------|
    /// | `GOOGLE_ACCESS_TOKEN`            | Static bearer token (checked first)       |
    /// | `GOOGLE_APPLICATION_CREDENTIALS` | Key file path, or base64-encoded key JSON |
    pub fn from_env() -> Result<Self, GeminiError> {
        if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                return Ok(Self::AccessToken(token.trim().to_string()));
            }
        }

        match std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            Ok(value) if !value.trim().is_empty() => Self::from_application_credentials(&value),
            _ => Err(GeminiError::Credentials(
                "set GOOGLE_ACCESS_TOKEN or GOOGLE_APPLICATION_CREDENTIALS".to_string(),
            )),
        }
    }

    /// Interpret a `GOOGLE_APPLICATION_CREDENTIALS` value: an existing file
    /// path is read as a JSON key, anything else is decoded as base64 JSON.
    pub fn from_application_credentials(value: &str) -> Result<Self, GeminiError> {
        let path = Path::new(value.trim());
        let key = if path.is_file() {
            ServiceAccountKey::from_file(path)?
        } else {
            ServiceAccountKey::from_base64(value)?
        };
        Ok(Self::ServiceAccount(key))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Assertion signing
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign the RS256 assertion presented to the token endpoint.
pub fn sign_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String, GeminiError> {
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: CLOUD_PLATFORM_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&header, &claims, &encoding_key)?)
}

// ---------------------------------------------------------------------------
// TokenProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Hands out bearer tokens for Vertex AI requests.
pub struct TokenProvider {
    credentials: Credentials,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(credentials: Credentials, client: reqwest::Client) -> Self {
        Self {
            credentials,
            client,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid access token, exchanging the service-account key when
    /// no cached token is fresh enough.
    pub async fn access_token(&self) -> Result<String, GeminiError> {
        let key = match &self.credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::ServiceAccount(key) => key,
        };

        let mut cached = self.cached.lock().await;
        let now = chrono::Utc::now().timestamp();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange(key, now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn exchange(&self, key: &ServiceAccountKey, now: i64) -> Result<CachedToken, GeminiError> {
        let assertion = sign_assertion(key, now)?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(
            client_email = %key.client_email,
            expires_in = token.expires_in,
            "Exchanged service account assertion for access token",
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}
