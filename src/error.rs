use thiserror::Error;

pub use color_eyre::eyre::eyre;

use crate::protocol::fault::FaultPayload;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Server Error: {0}")]
    ServerFault(#[from] FaultPayload),

    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("{context}: {source}")]
    MalformedResponse {
        context: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Error while casting field '{field}' to the native type for its XSD type {xsd_type}")]
    Coercion {
        field: String,
        xsd_type: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Invalid cursor position {position} for a result of {row_count} rows")]
    InvalidCursorPosition { position: isize, row_count: usize },

    #[error("Bad usage error: {0}")]
    BadUsageError(String),

    #[error("Transport handle is closed")]
    HandleClosed,

    #[error("Bad config error: {0}")]
    BadConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Library bug: {0}")]
    LibraryBug(color_eyre::eyre::Report),
}

impl Error {
    /// Wraps a failure to read or parse the response document.
    pub(crate) fn malformed<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::MalformedResponse {
            context: "error creating result",
            source: source.into(),
        }
    }

    pub(crate) fn transport<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(source.into())
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
