// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the ragchat service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level ragchat configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RagchatConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini API settings (embeddings and chat model).
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Weaviate vector store settings.
    #[serde(default)]
    pub weaviate: WeaviateConfig,

    /// Retrieval and memory scoring settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Login and session settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Persistence outbox settings.
    #[serde(default)]
    pub outbox: OutboxConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. Falls back to `GOOGLE_GENERATIVE_AI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL including the API version segment.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model used for embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Model used for streamed chat answers.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            timeout_secs: default_gemini_timeout_secs(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_embedding_model() -> String {
    "embedding-001".to_string()
}

fn default_chat_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_timeout_secs() -> u64 {
    300
}

/// Weaviate vector store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeaviateConfig {
    /// `https` or `http`.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Cluster host, e.g. `my-cluster.weaviate.network`. Falls back to `WEAVIATE_HOST`.
    #[serde(default)]
    pub host: Option<String>,

    /// API key. Falls back to `WEAVIATE_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Class holding the knowledge-base chunks.
    #[serde(default = "default_class_name")]
    pub class_name: String,

    /// Request timeout in seconds.
    #[serde(default = "default_weaviate_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: None,
            api_key: None,
            class_name: default_class_name(),
            timeout_secs: default_weaviate_timeout_secs(),
        }
    }
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_class_name() -> String {
    "Document".to_string()
}

fn default_weaviate_timeout_secs() -> u64 {
    30
}

/// Retrieval, memory scoring and chunking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Number of knowledge-base chunks fetched per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Memory facts must score strictly above this to be included.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Characters per chunk when ingesting raw text.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_similarity_threshold() -> f32 {
    0.7
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ragchat").join("ragchat.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("ragchat.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Login and session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Require a session token on chat routes.
    #[serde(default = "default_require_login")]
    pub require_login: bool,

    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_login: default_require_login(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_require_login() -> bool {
    true
}

fn default_session_ttl_secs() -> u64 {
    86_400
}

/// Persistence outbox configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutboxConfig {
    /// Messages buffered before new submissions are dropped.
    #[serde(default = "default_outbox_capacity")]
    pub capacity: usize,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            capacity: default_outbox_capacity(),
        }
    }
}

fn default_outbox_capacity() -> usize {
    256
}

impl WeaviateConfig {
    /// `{scheme}://{host}` when a host is configured.
    pub fn endpoint(&self) -> Option<String> {
        self.host
            .as_deref()
            .map(|host| format!("{}://{}", self.scheme, host.trim_end_matches('/')))
    }
}
