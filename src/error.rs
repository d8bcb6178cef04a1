use std::process::ExitCode;

use thiserror::Error;

use crate::config::ConfigError;
use crate::probe::prelude::DispatchError;
use crate::relays::prelude::DirectoryError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("the relay list is empty")]
    NoRelays,

    #[error("no servers available after filtering")]
    NothingToProbe,

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 2 for bad configuration or arguments, 1 for everything else.
    pub fn exit_status(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Dispatch(DispatchError::InvalidArgument(_)) => 2,
            _ => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Formats an error with its chain of causes.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    use std::fmt::Write;

    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let invalid = AppError::Dispatch(DispatchError::InvalidArgument("x".to_string()));
        assert_eq!(invalid.exit_status(), 2);
        assert_eq!(AppError::Config(ConfigError::Invalid("x".to_string())).exit_status(), 2);
        assert_eq!(AppError::NothingToProbe.exit_status(), 1);
    }

    #[test]
    fn test_report_includes_causes() {
        let err = ConfigError::Read {
            path: "relayping.yml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = report(&err);
        assert!(text.starts_with("failed to read relayping.yml"));
        assert!(text.ends_with("Caused by: no such file"));
    }
}
