use thiserror::Error;

/// Errors raised while assembling or running a service, before any request
/// is handled. Request-level failures use each service's own taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::ConfigError(anyhow::anyhow!(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = AppError::config("OFFICIAL_EMAIL is required but not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: OFFICIAL_EMAIL is required but not set"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
