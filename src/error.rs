//! Error types and handling for silentpush
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! The taxonomy distinguishes hard failures (abort the session) from
//! per-package failures (terminal job state, sequence continues) and soft
//! failures (degraded continue). Only `AuthCancelled` and configuration load
//! errors abort before the first job runs.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for silentpush operations
#[derive(Error, Diagnostic, Debug)]
pub enum SilentPushError {
    // Artifact staging errors
    #[error("Installer not found: {path}")]
    #[diagnostic(
        code(silentpush::cache::not_found),
        help("Check that the package path in the catalog is correct and the share is reachable")
    )]
    NotFound { path: String },

    #[error("Failed to stage installer copy: {path}")]
    #[diagnostic(code(silentpush::cache::copy_failed))]
    CopyFailed { path: String, reason: String },

    #[error("Failed to map network share: {path}")]
    #[diagnostic(
        code(silentpush::netshare::mapping_failed),
        help("Check the domain credentials and that the server's root share is exported")
    )]
    MappingFailed { path: String, reason: String },

    // Process errors
    #[error("Failed to launch installer: {path}")]
    #[diagnostic(code(silentpush::launch::failed))]
    LaunchFailed { path: String, reason: String },

    #[error("Installer exceeded the {seconds}s time limit")]
    #[diagnostic(
        code(silentpush::launch::timed_out),
        help("The process was terminated; raise the timeout if the installer is legitimately slow")
    )]
    TimedOut { seconds: u64 },

    #[error("Installer exited with code {code}")]
    #[diagnostic(code(silentpush::launch::nonzero_exit))]
    NonZeroExit { code: i32 },

    // Session errors
    #[error("Credential entry was cancelled")]
    #[diagnostic(
        code(silentpush::auth::cancelled),
        help("Domain and administrator credentials are required before any installation can run")
    )]
    AuthCancelled,

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(silentpush::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(silentpush::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to write configuration file: {path}")]
    #[diagnostic(code(silentpush::config::write_failed))]
    ConfigWriteFailed { path: String, reason: String },

    #[error("Package not in catalog: {name}")]
    #[diagnostic(
        code(silentpush::catalog::unknown_package),
        help("Run 'silentpush list' to see the configured packages")
    )]
    UnknownPackage { name: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(silentpush::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for SilentPushError {
    fn from(err: std::io::Error) -> Self {
        SilentPushError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SilentPushError {
    fn from(err: serde_json::Error) -> Self {
        SilentPushError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<dialoguer::Error> for SilentPushError {
    fn from(err: dialoguer::Error) -> Self {
        // An interrupted prompt (Esc/Ctrl-C) is an abandonment, not an
        // IO fault.
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                SilentPushError::AuthCancelled
            }
            other => SilentPushError::IoError {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SilentPushError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = SilentPushError::NotFound {
            path: r"\\srv\apps\setup.exe".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r"Installer not found: \\srv\apps\setup.exe"
        );
    }

    #[test]
    fn test_error_code() {
        let err = SilentPushError::NotFound {
            path: "x".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("silentpush::cache::not_found".to_string())
        );
    }

    #[test]
    fn test_timed_out_display() {
        let err = SilentPushError::TimedOut { seconds: 600 };
        assert!(err.to_string().contains("600s"));
    }

    #[test]
    fn test_nonzero_exit_display() {
        let err = SilentPushError::NonZeroExit { code: 1603 };
        assert!(err.to_string().contains("1603"));
    }

    #[test]
    fn test_auth_cancelled_display() {
        let err = SilentPushError::AuthCancelled;
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_mapping_failed_display() {
        let err = SilentPushError::MappingFailed {
            path: r"\\srv\apps".to_string(),
            reason: "access denied".to_string(),
        };
        assert!(err.to_string().contains("Failed to map network share"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SilentPushError = io_err.into();
        assert!(matches!(err, SilentPushError::IoError { .. }));
    }

    #[test]
    fn test_interrupted_prompt_maps_to_auth_cancelled() {
        let interrupted = dialoguer::Error::from(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "prompt interrupted",
        ));
        let err: SilentPushError = interrupted.into();
        assert!(matches!(err, SilentPushError::AuthCancelled));
    }

    #[test]
    fn test_other_prompt_error_maps_to_io_error() {
        let broken = dialoguer::Error::from(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "terminal went away",
        ));
        let err: SilentPushError = broken.into();
        assert!(matches!(err, SilentPushError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let err: SilentPushError = parse_result.unwrap_err().into();
        assert!(matches!(err, SilentPushError::ConfigParseFailed { .. }));
    }
}
