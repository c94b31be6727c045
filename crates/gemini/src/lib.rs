//! Vertex AI Gemini client.
//!
//! Provides service-account authentication, typed request/response bodies,
//! a server-sent-events decoder and a streaming client that implements
//! [`questsmith_core::generation::TextGenerator`].

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod sse;

pub use auth::{Credentials, ServiceAccountKey, TokenProvider};
pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::GeminiError;
