use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0, session limit is positive
/// - Suggestion cache and breaker bounds
/// - Remote suggester settings, when configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }
    if config.server.max_sessions == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_sessions must be at least 1".to_string(),
        ));
    }

    config
        .suggestions
        .validate()
        .map_err(ConfigError::ValidationError)?;

    if let Some(remote) = &config.remote {
        remote.validate().map_err(ConfigError::ValidationError)?;
    }

    Ok(())
}
