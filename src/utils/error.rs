use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Schema error in {table} table: {message}")]
    SchemaError { table: String, message: String },

    #[error("Malformed score '{value}' in column {column} ({tie}): {reason}")]
    MalformedScoreError {
        column: String,
        value: String,
        tie: String,
        reason: String,
    },

    #[error("Duplicate standings entry for club '{club}' in {year}")]
    DuplicateStandingsKeyError { year: i64, club: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Data,
    Io,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::ConfigError { .. }
            | PipelineError::ConfigValidationError { .. }
            | PipelineError::InvalidConfigValueError { .. }
            | PipelineError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PipelineError::CsvError(_) | PipelineError::SchemaError { .. } => ErrorCategory::Input,
            PipelineError::MalformedScoreError { .. }
            | PipelineError::DuplicateStandingsKeyError { .. }
            | PipelineError::ProcessingError { .. } => ErrorCategory::Data,
            PipelineError::IoError(_) => ErrorCategory::Io,
            PipelineError::ZipError(_) | PipelineError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Output => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PipelineError::SchemaError { .. } | PipelineError::CsvError(_) => {
                "Check that the input CSV has a header row with every required column and typed values"
            }
            PipelineError::MalformedScoreError { .. } => {
                "Scores must look like '2–1' using an en-dash (U+2013) between the two numbers"
            }
            PipelineError::DuplicateStandingsKeyError { .. } => {
                "Remove the duplicated (Year, Club) rows from the group table or set join.on_duplicate_standings = \"keep_first\""
            }
            PipelineError::IoError(_) => {
                "Verify that the data path exists and that the files are readable and writable"
            }
            PipelineError::ConfigError { .. }
            | PipelineError::ConfigValidationError { .. }
            | PipelineError::InvalidConfigValueError { .. }
            | PipelineError::MissingConfigError { .. } => {
                "Review the command line arguments or the TOML configuration file"
            }
            PipelineError::ZipError(_) | PipelineError::SerializationError(_) => {
                "Retry the run; if it persists disable compression or the json output format"
            }
            PipelineError::ProcessingError { .. } => "Inspect the input rows reported in the log",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the input tables: {}", self),
            ErrorCategory::Data => format!("Input data is inconsistent: {}", self),
            ErrorCategory::Io => format!("File system failure: {}", self),
            ErrorCategory::Output => format!("Could not produce the output files: {}", self),
        }
    }

    /// 依嚴重程度決定結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}
