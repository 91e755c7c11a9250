use thiserror::Error;

/// An error produced when building or decoding a cache key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An operand was NaN or infinite.
    #[error("invalid argument: {value} is not a finite number")]
    NonFinite { value: f64 },
    /// A key's text form was not `number,number`.
    #[error("invalid argument: malformed key {text:?}")]
    MalformedKey { text: String },
}

/// The broad category of an [`Error`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed something outside the accepted domain.
    InvalidArgument,
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonFinite { .. } | Self::MalformedKey { .. } => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

/// Shorthand for results with this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
