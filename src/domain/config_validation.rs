//! Configuration validation.
//!
//! Checks the `[provider]` and `[ranking]` sections before any trade is
//! fetched. Absent keys fall back to defaults; present keys must be valid.

use crate::domain::error::QmoneyError;
use crate::domain::ranking::FailurePolicy;
use crate::ports::config_port::ConfigPort;

pub const PROVIDER_KINDS: &[&str] = &["tiingo", "csv"];

pub fn validate_provider_config(config: &dyn ConfigPort) -> Result<(), QmoneyError> {
    let kind = provider_kind(config);
    if !PROVIDER_KINDS.contains(&kind.as_str()) {
        return Err(QmoneyError::ConfigInvalid {
            section: "provider".to_string(),
            key: "kind".to_string(),
            reason: format!("kind must be one of {}", PROVIDER_KINDS.join(", ")),
        });
    }

    if kind == "csv" {
        match config.get_string("provider", "data_dir") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(QmoneyError::ConfigMissing {
                    section: "provider".to_string(),
                    key: "data_dir".to_string(),
                })
            }
        }
    }

    if let Some(url) = config.get_string("provider", "base_url") {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(QmoneyError::ConfigInvalid {
                section: "provider".to_string(),
                key: "base_url".to_string(),
                reason: "base_url must start with http:// or https://".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_ranking_config(config: &dyn ConfigPort) -> Result<(), QmoneyError> {
    validate_policy(config)?;
    validate_max_concurrency(config)?;
    validate_fetch_timeout(config)?;
    config.get_date("ranking", "end_date")?;
    Ok(())
}

/// Lower-cased `[provider] kind`, defaulting to tiingo.
pub fn provider_kind(config: &dyn ConfigPort) -> String {
    config
        .get_string("provider", "kind")
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| "tiingo".to_string())
}

fn validate_policy(config: &dyn ConfigPort) -> Result<(), QmoneyError> {
    if let Some(value) = config.get_string("ranking", "policy") {
        value
            .parse::<FailurePolicy>()
            .map_err(|reason| QmoneyError::ConfigInvalid {
                section: "ranking".to_string(),
                key: "policy".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_max_concurrency(config: &dyn ConfigPort) -> Result<(), QmoneyError> {
    let value = config.get_int("ranking", "max_concurrency")?;
    if value.is_some_and(|v| v < 1) {
        return Err(QmoneyError::ConfigInvalid {
            section: "ranking".to_string(),
            key: "max_concurrency".to_string(),
            reason: "max_concurrency must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_fetch_timeout(config: &dyn ConfigPort) -> Result<(), QmoneyError> {
    let value = config.get_int("ranking", "fetch_timeout_secs")?;
    if value.is_some_and(|v| v < 0) {
        return Err(QmoneyError::ConfigInvalid {
            section: "ranking".to_string(),
            key: "fetch_timeout_secs".to_string(),
            reason: "fetch_timeout_secs must be non-negative".to_string(),
        });
    }
    Ok(())
}
