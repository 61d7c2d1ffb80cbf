//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// Page extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Rule configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Page source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while turning a page's lines into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The page supplied no lines at all.
    #[error("page has no lines")]
    EmptyInput,

    /// A product anchor matched but the trailing run is not a numeric triple.
    #[error("malformed product line {line} for '{anchor}': expected quantity, price and total, found {tail:?}")]
    MalformedProductLine {
        line: usize,
        anchor: String,
        tail: String,
    },

    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Failed to convert a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Errors related to rule table configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A custom field pattern did not compile.
    #[error("invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A custom field pattern has nothing to capture.
    #[error("pattern for {0} has no capture group")]
    MissingCaptureGroup(String),

    /// A product rule has an empty anchor.
    #[error("product rule {0} has an empty anchor")]
    EmptyAnchor(String),

    /// A field name is blank.
    #[error("custom field rule has an empty field name")]
    EmptyFieldName,

    /// Failed to read or write the configuration file.
    #[error("failed to access configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration JSON is malformed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors related to reading page text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The page JSON is malformed.
    #[error("invalid page JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not a known page format.
    #[error("unsupported page format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
