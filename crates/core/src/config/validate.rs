use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - API key present when `auth.method = "api_key"`
/// - Server port is not 0
/// - Processor, downloader retry and retention knobs are usable
/// - Download, media and transcription timeouts are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().is_none_or(str::is_empty)
    {
        return Err(invalid("auth.api_key is required when auth.method = \"api_key\""));
    }

    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    let files_route = config.server.files_route.trim_end_matches('/');
    if !config.server.files_route.starts_with('/') || files_route.is_empty() {
        return Err(invalid("server.files_route must start with '/' and name a path"));
    }
    if files_route == "/api" || files_route.starts_with("/api/") {
        return Err(invalid("server.files_route cannot be under /api"));
    }

    if config.processor.max_concurrent_tasks == 0 {
        return Err(invalid("processor.max_concurrent_tasks must be at least 1"));
    }

    if config.processor.public_base_url.trim().is_empty() {
        return Err(invalid("processor.public_base_url cannot be empty"));
    }

    if config.downloader.timeout_secs == 0 {
        return Err(invalid("downloader.timeout_secs must be at least 1"));
    }
    if config.media.timeout_secs == 0 {
        return Err(invalid("media.timeout_secs must be at least 1"));
    }
    if config.transcriber.timeout_secs == 0 {
        return Err(invalid("transcriber.timeout_secs must be at least 1"));
    }

    let retry = &config.downloader.retry;
    if retry.max_attempts == 0 {
        return Err(invalid("downloader.retry.max_attempts must be at least 1"));
    }
    if retry.backoff_multiplier < 1.0 {
        return Err(invalid("downloader.retry.backoff_multiplier must be >= 1.0"));
    }

    if config.retention.sweep_interval_minutes == 0 {
        return Err(invalid("retention.sweep_interval_minutes must be at least 1"));
    }

    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}
