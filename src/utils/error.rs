use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing top-level key '{key}' in {source_name} input")]
    MissingKey { source_name: String, key: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::IoError(_) => ErrorSeverity::Critical,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingKey { .. }
            | EtlError::InvalidInput { .. } => ErrorSeverity::High,
            EtlError::TomlError(_)
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::Medium,
        }
    }

    /// Process exit status used by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::IoError(_) => "Check that the input file exists and the output directory is writable",
            EtlError::CsvError(_) => "Make sure every row of the input table has the same number of fields",
            EtlError::SerializationError(_) => "Make sure the input file is a valid JSON document",
            EtlError::MissingKey { .. } => "The export does not have the expected top-level layout for this source",
            EtlError::InvalidInput { .. } => "Check that the selected source matches the input file",
            EtlError::TomlError(_) => "Make sure the configuration file is valid TOML",
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => "Fix the configuration value and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) => format!("Could not read or write a file: {}", e),
            EtlError::CsvError(e) => format!("The input table could not be parsed: {}", e),
            EtlError::SerializationError(e) => format!("The input JSON could not be parsed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
