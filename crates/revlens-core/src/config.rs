use crate::app_config::{AppConfig, TopicSettings};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default; only malformed values fail. Tests drive this
/// with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `FOO=` in a .env file disables a feature.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let output_dir = PathBuf::from(or_default("REVLENS_OUTPUT_DIR", "./data/outputs"));
    let log_level = or_default("REVLENS_LOG_LEVEL", "info");
    let sentiment_url = optional("REVLENS_SENTIMENT_URL");
    let embed_url = optional("REVLENS_EMBED_URL");
    let inference_timeout_secs = parse_u64("REVLENS_INFERENCE_TIMEOUT_SECS", "30")?;
    let sentiment_batch_size = parse_positive("REVLENS_SENTIMENT_BATCH_SIZE", "32")?;

    let top_n = parse_positive("REVLENS_TOPIC_TOP_N", "5")?;
    let ngram_min = parse_positive("REVLENS_TOPIC_NGRAM_MIN", "1")?;
    let ngram_max = parse_positive("REVLENS_TOPIC_NGRAM_MAX", "2")?;
    if ngram_min > ngram_max {
        return Err(invalid(
            "REVLENS_TOPIC_NGRAM_MIN",
            format!("{ngram_min} exceeds REVLENS_TOPIC_NGRAM_MAX ({ngram_max})"),
        ));
    }

    let diversity = or_default("REVLENS_TOPIC_DIVERSITY", "0.5")
        .parse::<f32>()
        .map_err(|e| invalid("REVLENS_TOPIC_DIVERSITY", e.to_string()))?;
    if !(0.0..=1.0).contains(&diversity) {
        return Err(invalid(
            "REVLENS_TOPIC_DIVERSITY",
            format!("{diversity} is outside [0, 1]"),
        ));
    }

    let review_topic_limit = parse_positive("REVLENS_REVIEW_TOPIC_LIMIT", "5")?;
    let country_map_path = optional("REVLENS_COUNTRY_MAP_PATH").map(PathBuf::from);
    let segmenter_dir = optional("REVLENS_SEGMENTER_DIR").map(PathBuf::from);

    Ok(AppConfig {
        output_dir,
        log_level,
        sentiment_url,
        embed_url,
        inference_timeout_secs,
        sentiment_batch_size,
        topics: TopicSettings {
            top_n,
            ngram_range: (ngram_min, ngram_max),
            diversity,
        },
        review_topic_limit,
        country_map_path,
        segmenter_dir,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
