//! Validation of a loaded configuration.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, SugarConfig};

/// Checks values that deserialize fine but cannot be used.
pub fn validate_config(config: &SugarConfig) -> ConfigResult<()> {
    if config.runtime.channel_capacity == 0 {
        return Err(ConfigError::validation(
            "runtime.channel_capacity must be greater than zero",
        ));
    }

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is 'file'",
        ));
    }

    if let Some(reply) = &config.dispatch.error_reply
        && reply.trim().is_empty()
    {
        return Err(ConfigError::validation(
            "dispatch.error_reply must not be blank; omit it to disable error replies",
        ));
    }

    Ok(())
}
