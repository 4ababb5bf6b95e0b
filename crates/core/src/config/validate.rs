use super::{types::Config, ConfigError};

/// Upper bound accepted for `aws.max_attempts`.
const MAX_SDK_ATTEMPTS: u32 = 20;

/// Validate configuration
/// Currently validates:
/// - At least one suspension polling round
/// - SDK attempt count within 1..=20
/// - Region and profile, when given, are not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.teardown.max_poll_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "teardown.max_poll_attempts cannot be 0".to_string(),
        ));
    }

    if config.aws.max_attempts == 0 || config.aws.max_attempts > MAX_SDK_ATTEMPTS {
        return Err(ConfigError::ValidationError(format!(
            "aws.max_attempts must be between 1 and {}, got {}",
            MAX_SDK_ATTEMPTS, config.aws.max_attempts
        )));
    }

    for (key, value) in [
        ("aws.region", &config.aws.region),
        ("aws.profile", &config.aws.profile),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                key
            )));
        }
    }

    Ok(())
}
