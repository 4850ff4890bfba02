//! Error types for cloud-seed

use std::path::PathBuf;

use thiserror::Error;

use crate::config::tree::ValueKind;

/// Main error type for cloud-seed operations
///
/// Every failure in the decode → transcode → build → emit pipeline aborts
/// the run; there is no partial-success mode.
#[derive(Error, Debug)]
pub enum SeedError {
    /// A required config key is missing or has the wrong type.
    #[error("unable to get the key `{key}` as {expected}: {cause}")]
    ConfigKey {
        key: String,
        expected: ValueKind,
        cause: String,
    },

    /// A file payload declared as base64 did not decode.
    #[error("invalid base64 payload for `{path}`: {source}")]
    PayloadDecode {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    /// The document could not be written out as YAML.
    #[error("cannot serialize document node `{path}`: {reason}")]
    Serialize { path: String, reason: String },

    /// The config file could not be read or parsed as HOCON.
    #[error("failed to load config file `{path}`: {cause}")]
    ConfigLoad { path: PathBuf, cause: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeedError {
    /// Create a config key error
    pub fn config_key(
        key: impl Into<String>,
        expected: ValueKind,
        cause: impl Into<String>,
    ) -> Self {
        Self::ConfigKey {
            key: key.into(),
            expected,
            cause: cause.into(),
        }
    }

    /// Create a serialization error
    pub fn serialize(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialize {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Re-key a `ConfigKey` error raised while decoding one element of a
    /// config list, so the report names the list path and element index.
    pub(crate) fn in_list_entry(self, list_key: &str, index: usize) -> Self {
        match self {
            Self::ConfigKey {
                key,
                expected,
                cause,
            } => Self::ConfigKey {
                key: format!("{list_key}[{index}].{key}"),
                expected,
                cause,
            },
            other => other,
        }
    }
}
