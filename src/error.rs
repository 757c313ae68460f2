//! Error module for the BioNet environment builder.
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use crate::mechanisms::remediation_command;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum EnvError {
    /// Error for invalid request parameters, e.g., non-positive time step or a clamp outlasting
    /// the run.
    InvalidParameter(String),
    /// Error for I/O operations.
    IOError(String),
    /// Error while reading or writing a JSON document.
    SerializationError(String),
    /// The configuration file already exists and overwriting was not requested.
    ConfigExists(PathBuf),
    /// The native mechanisms could not be compiled.
    MechanismCompilation {
        dir: PathBuf,
        reason: String,
    },
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnvError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            EnvError::IOError(e) => write!(f, "I/O error: {}", e),
            EnvError::SerializationError(e) => write!(f, "Serialization error: {}", e),
            EnvError::ConfigExists(path) => write!(
                f,
                "Configuration file {} already exists (use overwrite to replace it)",
                path.display()
            ),
            EnvError::MechanismCompilation { dir, reason } => write!(
                f,
                "Was unable to compile mechanism in {} ({}). To compile manually run: {}",
                dir.display(),
                reason,
                remediation_command(dir)
            ),
        }
    }
}

impl Error for EnvError {}

impl From<std::io::Error> for EnvError {
    fn from(e: std::io::Error) -> Self {
        EnvError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for EnvError {
    fn from(e: serde_json::Error) -> Self {
        EnvError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compilation_error_mentions_remediation() {
        let err = EnvError::MechanismCompilation {
            dir: PathBuf::from("sim/components/mechanisms"),
            reason: "exit status: 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Was unable to compile mechanism in sim/components/mechanisms"));
        assert!(msg.contains("nrnivmodl modfiles"));
        assert!(msg.contains("cd sim/components/mechanisms"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(EnvError::from(io), EnvError::IOError("missing".to_string()));
    }
}
