use fro_core::{Error as CoreError, Location, Token, Type};
use thiserror::Error;

/// Failures that stop the pipeline. Runtime errors of the language are not in here: they are
/// ordinary values (`Value::Error`) that scripts can catch.
#[derive(Debug, Error, PartialEq, Clone)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("[{location}] scanner error: {source}")]
    ScannerError {
        location: Location,
        source: CoreError,
    },

    #[error("[{location}] parse error: {msg}")]
    ParserError { location: Location, msg: String },

    #[error("[{location}] stack overflow: more than {limit} nested calls")]
    StackOverflow { location: Location, limit: usize },
}

impl Error {
    pub(crate) fn parser_error(token: &Token, msg: &str) -> Self {
        Error::ParserError {
            location: token.location,
            msg: String::from(msg),
        }
    }

    pub(crate) fn unexpected_token(expected: Type, got: &Token) -> Self {
        Error::parser_error(
            got,
            &format!("Expected next token to be {}, got {} instead", expected, got.ty),
        )
    }

    pub fn location(&self) -> Location {
        match self {
            Error::ScannerError { location, .. }
            | Error::ParserError { location, .. }
            | Error::StackOverflow { location, .. } => *location,
        }
    }
}

impl From<CoreError> for Error {
    fn from(value: CoreError) -> Self {
        Error::ScannerError {
            location: value.location(),
            source: value,
        }
    }
}
