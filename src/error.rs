use crate::interpolation::error::ConfigurationError;
use crate::output::error::WriteError;
use crate::source::error::SourceError;
use crate::tables::error::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwatMeteoError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SwatMeteoError>();
    }

    #[test]
    fn test_transparent_message() {
        let err: SwatMeteoError = ConfigurationError::EmptyTargets.into();
        assert_eq!(err.to_string(), ConfigurationError::EmptyTargets.to_string());
    }
}
