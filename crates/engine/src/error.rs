use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Rules config validation error (empty dataset table, bad pattern, etc.).
    ConfigValidation(String),
    /// An input file named by the run does not exist. Fatal before any
    /// output is written.
    FileNotFound(String),
    /// CSV decode error in an input batch.
    Csv { dataset: String, message: String },
    /// A column required by a stage is missing from a batch.
    MissingColumn { dataset: String, column: String },
    /// A field exists but does not carry the type a stage requires.
    BadField { dataset: String, column: String, value: String },
    /// IO error (file read/write at the boundary).
    Io(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::FileNotFound(path) => write!(f, "file not found: {path}"),
            Self::Csv { dataset, message } => {
                write!(f, "dataset '{dataset}': CSV error: {message}")
            }
            Self::MissingColumn { dataset, column } => {
                write!(f, "dataset '{dataset}': missing column '{column}'")
            }
            Self::BadField { dataset, column, value } => {
                write!(
                    f,
                    "dataset '{dataset}': column '{column}': unusable value '{value}'"
                )
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}
