use thiserror::Error;

/// Errors raised by the scoring core and the known-list parser.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The requested frequency is outside the grid's band.
    #[error("frequency {freq} Hz is outside the band {hz_low}..={hz_high} Hz")]
    OutOfBand { freq: i64, hz_low: f64, hz_high: f64 },

    /// A known-frequency line could not be parsed (strict policy only).
    #[error("line {line}: malformed known-frequency entry '{content}'")]
    MalformedInput { line: usize, content: String },

    #[error("invalid sample grid: {0}")]
    InvalidGrid(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
