//! Configuration errors

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure to load or validate `Settings`
#[derive(Debug)]
pub enum SettingsError {
    /// The settings file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The settings file was not valid JSON for `Settings`.
    Parse(serde_json::Error),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "could not read settings from {}: {source}", path.display())
            }
            Self::Parse(error) => write!(f, "could not parse settings: {error}"),
            Self::Invalid(reason) => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(error) => Some(error),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error)
    }
}
