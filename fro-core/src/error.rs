use thiserror::Error;

use crate::token::Location;

#[derive(Debug, Error, PartialEq, Clone)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("unterminated string")]
    UnterminatedString { location: Location },

    #[error("unknown escape sequence '\\{ch}'")]
    UnknownEscape { ch: char, location: Location },
}

impl Error {
    pub fn location(&self) -> Location {
        match self {
            Error::UnterminatedString { location } => *location,
            Error::UnknownEscape { location, .. } => *location,
        }
    }
}
