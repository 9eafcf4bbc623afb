// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ragchat.toml` > `~/.config/ragchat/ragchat.toml` > `/etc/ragchat/ragchat.toml`
//! with environment variable overrides via `RAGCHAT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RagchatConfig;

/// Config sections addressable through `RAGCHAT_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &[
    "server", "gemini", "weaviate", "retrieval", "storage", "auth", "outbox",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ragchat/ragchat.toml` (system-wide)
/// 3. `~/.config/ragchat/ragchat.toml` (user XDG config)
/// 4. `./ragchat.toml` (local directory)
/// 5. `GOOGLE_GENERATIVE_AI_API_KEY`, `WEAVIATE_HOST`, `WEAVIATE_API_KEY`
/// 6. `RAGCHAT_*` environment variables
pub fn load_config() -> Result<RagchatConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RagchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RagchatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RagchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RagchatConfig::default()))
        .merge(Toml::file(path))
        .merge(well_known_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RagchatConfig::default()))
        .merge(Toml::file("/etc/ragchat/ragchat.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ragchat/ragchat.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ragchat.toml"))
        .merge(well_known_env_provider())
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `gemini_api_key` maps to `gemini.api_key`, not `gemini.api.key`.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Create the `RAGCHAT_` environment variable provider.
///
/// Uses `Env::map()` and not `Env::split("_")` because key names contain
/// underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("RAGCHAT_").map(|key| map_env_key(key.as_str()).into())
}

/// Environment variables the hosted services document for their clients.
fn well_known_env_provider() -> Env {
    Env::raw()
        .only(&["GOOGLE_GENERATIVE_AI_API_KEY", "WEAVIATE_HOST", "WEAVIATE_API_KEY"])
        .map(|key| {
            let lowered = key.as_str().to_ascii_lowercase();
            match lowered.as_str() {
                "google_generative_ai_api_key" => "gemini.api_key".into(),
                "weaviate_host" => "weaviate.host".into(),
                "weaviate_api_key" => "weaviate.api_key".into(),
                _ => lowered.into(),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_first_underscore_only() {
        assert_eq!(map_env_key("gemini_api_key"), "gemini.api_key");
        assert_eq!(map_env_key("retrieval_similarity_threshold"), "retrieval.similarity_threshold");
        assert_eq!(map_env_key("server_port"), "server.port");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn prefixed_env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("ragchat.toml", "[server]\nport = 8080\n")?;
            jail.set_env("RAGCHAT_SERVER_PORT", "9090");
            jail.set_env("RAGCHAT_WEAVIATE_CLASS_NAME", "Notes");
            let config = load_config()?;
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.weaviate.class_name, "Notes");
            Ok(())
        });
    }

    #[test]
    fn hosted_service_env_vars_fill_credentials() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_GENERATIVE_AI_API_KEY", "g-key");
            jail.set_env("WEAVIATE_HOST", "demo.weaviate.network");
            jail.set_env("WEAVIATE_API_KEY", "w-key");
            let config = load_config()?;
            assert_eq!(config.gemini.api_key.as_deref(), Some("g-key"));
            assert_eq!(config.weaviate.host.as_deref(), Some("demo.weaviate.network"));
            assert_eq!(config.weaviate.api_key.as_deref(), Some("w-key"));
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_wins_over_hosted_service_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_GENERATIVE_AI_API_KEY", "generic");
            jail.set_env("RAGCHAT_GEMINI_API_KEY", "specific");
            let config = load_config()?;
            assert_eq!(config.gemini.api_key.as_deref(), Some("specific"));
            Ok(())
        });
    }
}
