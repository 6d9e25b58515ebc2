//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;
use crate::session::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("export error: {0}")]
    Export(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn export_error_display() {
        let e = AppError::Export("no result yet".into());
        assert!(e.to_string().starts_with("export error"));
    }

    #[test]
    fn flow_error_converts() {
        let e: AppError = FlowError::MissingCredential.into();
        assert!(e.to_string().contains("flow error"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
