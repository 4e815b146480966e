use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Required tool '{tool}' is not installed")]
    MissingPrerequisite { tool: String },

    #[error("Environment template '{path}' not found")]
    MissingTemplate { path: String },

    #[error("Command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OpsError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OpsError::MissingPrerequisite { .. } | OpsError::MissingTemplate { .. } => {
                ErrorSeverity::Critical
            }
            OpsError::ConfigValidationError { .. }
            | OpsError::InvalidConfigValueError { .. }
            | OpsError::MissingConfigError { .. } => ErrorSeverity::High,
            OpsError::CommandFailed { .. } | OpsError::IoError(_) => ErrorSeverity::High,
            OpsError::HttpError(_) => ErrorSeverity::Medium,
            OpsError::SerializationError(_) => ErrorSeverity::Low,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OpsError::MissingPrerequisite { tool } => {
                format!("{} is not installed. Install it and run again.", tool)
            }
            OpsError::MissingTemplate { path } => {
                format!("Cannot create the environment file: template {} is missing", path)
            }
            OpsError::CommandFailed { command, .. } => format!("Command failed: {}", command),
            OpsError::ConfigValidationError { field, message } => {
                format!("Invalid configuration ({}): {}", field, message)
            }
            OpsError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration ({}): {}", field, reason)
            }
            OpsError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OpsError::MissingPrerequisite { .. } => {
                "Install Docker and Docker Compose, then make sure both are on PATH"
            }
            OpsError::MissingTemplate { .. } => {
                "Restore .env.example from the repository or create .env by hand"
            }
            OpsError::CommandFailed { .. } => {
                "Inspect the command output above; `docker-compose logs` usually shows the cause"
            }
            OpsError::ConfigValidationError { .. }
            | OpsError::InvalidConfigValueError { .. }
            | OpsError::MissingConfigError { .. } => "Check the TOML configuration file",
            OpsError::IoError(_) => "Check file permissions in the project directory",
            OpsError::HttpError(_) => "Check that the service is reachable from this host",
            OpsError::SerializationError(_) => "Re-run without --json",
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsError>;
