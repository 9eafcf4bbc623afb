// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid addresses, threshold ranges and chunk geometry.

use crate::diagnostic::ConfigError;
use crate::model::RagchatConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
///
/// Credentials are not required here: `ragchat serve` reports missing keys
/// itself so that offline commands keep working.
pub fn validate_config(config: &RagchatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.server.log_level
            ),
        });
    }

    if config.gemini.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gemini.base_url must not be empty".to_string(),
        });
    }

    if !matches!(config.weaviate.scheme.as_str(), "http" | "https") {
        errors.push(ConfigError::Validation {
            message: format!(
                "weaviate.scheme must be `http` or `https`, got `{}`",
                config.weaviate.scheme
            ),
        });
    }

    let class_name = config.weaviate.class_name.as_str();
    if class_name.is_empty() {
        errors.push(ConfigError::Validation {
            message: "weaviate.class_name must not be empty".to_string(),
        });
    } else if !is_weaviate_class_name(class_name) {
        errors.push(ConfigError::Validation {
            message: format!(
                "weaviate.class_name `{class_name}` must start with an uppercase letter and contain only letters, digits and `_`"
            ),
        });
    }

    if config.retrieval.top_k == 0 {
        errors.push(ConfigError::Validation {
            message: "retrieval.top_k must be at least 1".to_string(),
        });
    }

    let threshold = config.retrieval.similarity_threshold;
    if !(-1.0..=1.0).contains(&threshold) {
        errors.push(ConfigError::Validation {
            message: format!("retrieval.similarity_threshold must be within [-1, 1], got {threshold}"),
        });
    }

    if config.retrieval.chunk_size == 0 {
        errors.push(ConfigError::Validation {
            message: "retrieval.chunk_size must be at least 1".to_string(),
        });
    } else if config.retrieval.chunk_overlap >= config.retrieval.chunk_size {
        errors.push(ConfigError::Validation {
            message: format!(
                "retrieval.chunk_overlap ({}) must be smaller than retrieval.chunk_size ({})",
                config.retrieval.chunk_overlap, config.retrieval.chunk_size
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.auth.session_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "auth.session_ttl_secs must be at least 1".to_string(),
        });
    }

    if config.outbox.capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "outbox.capacity must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Weaviate class names match `^[A-Z][_0-9A-Za-z]*$`. They are written
/// unquoted into GraphQL queries.
fn is_weaviate_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
