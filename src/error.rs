//! Error enum
use oxilangtag::LanguageTagParseError;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Custom(String),
    /// Invalid configuration, detected before any I/O happens.
    Config(String),
    Serde(serde_json::Error),
    /// A source line that is not a review object.
    Record {
        chunk: usize,
        offset: usize,
        source: serde_json::Error,
    },
    /// Timestamp not matching the configured format. Fatal for the run.
    Timestamp {
        value: String,
        format: String,
        source: chrono::ParseError,
    },
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    FastText(String),
    LanguageTag(LanguageTagParseError),
    Persist(tempfile::PersistError),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<LanguageTagParseError> for Error {
    fn from(e: LanguageTagParseError) -> Error {
        Error::LanguageTag(e)
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(e: tempfile::PersistError) -> Error {
        Error::Persist(e)
    }
}
