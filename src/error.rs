use thiserror::Error;

/// Result type for cyto2diagnosis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between raw measurements and a persisted
/// prediction. Errors surface to the caller as-is; nothing in this crate
/// retries or swallows them.
#[derive(Debug, Error)]
pub enum Error {
    /// A feature map or dataset cell that cannot be turned into a valid
    /// measurement (missing key, unparseable number, unknown label).
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// A model or scaler artifact is missing or cannot be decoded.
    #[error("model artifact unavailable: {0}")]
    ModelLoad(String),

    /// A loaded artifact does not match the canonical 30-measurement layout.
    #[error("feature layout mismatch: {0}")]
    ShapeMismatch(String),

    /// A tabular file whose columns do not match the expected schema.
    #[error("column schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A batch rejected wholesale before any row was scored.
    #[error("batch rejected: {0}")]
    BatchValidation(String),

    /// History store or result file could not be written or read.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl Error {
    /// Create an invalid input error.
    pub fn input_validation(msg: impl Into<String>) -> Self {
        Error::InputValidation(msg.into())
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Error::SchemaMismatch(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Error::Persistence(msg.into())
    }
}
