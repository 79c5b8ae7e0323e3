use crate::config::types::{Config, FetchConfig, OutputConfig, ScrapeSettings};
use crate::url::parse_http_url;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_scrape_settings(&config.scrape)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates transport, pacing and retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.domain_concurrency < 1 || config.domain_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "domain-concurrency must be between 1 and 100, got {}",
            config.domain_concurrency
        )));
    }

    for (name, value) in [
        ("connect-timeout-ms", config.connect_timeout_ms),
        ("request-timeout-ms", config.request_timeout_ms),
        ("robots-timeout-ms", config.robots_timeout_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    Ok(())
}

/// Validates seed URLs and worker pool size
fn validate_scrape_settings(settings: &ScrapeSettings) -> Result<(), ConfigError> {
    if settings.max_concurrent_urls < 1 || settings.max_concurrent_urls > 256 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-urls must be between 1 and 256, got {}",
            settings.max_concurrent_urls
        )));
    }

    if settings.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    for seed in &settings.urls {
        parse_http_url(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    if config.max_file_size == 0 {
        return Err(ConfigError::Validation(
            "max-file-size must be > 0".to_string(),
        ));
    }

    Ok(())
}
