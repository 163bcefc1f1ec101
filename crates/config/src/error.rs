use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{} is empty", .path.display())]
    Empty { path: PathBuf },

    #[error("Cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid config: {}", list(.0))]
    Invalid(Vec<ValidationError>),

    #[error("No config directory available on this platform")]
    NoConfigDir,
}

/// A preference outside its allowed range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must be within {expected} (got {actual})")]
pub struct ValidationError {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

fn list(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
