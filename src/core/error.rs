//! Typed failures surfaced at the library boundary.
//!
//! Geometry code never produces these; they come from configuration files and
//! from the translation collaborator.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanLayoutError {
    /// The translated payload is not a literal list of pairs.
    #[error("unparseable translation payload: {reason}")]
    TranslationParse { reason: String },

    /// The translation service answered with no text.
    #[error("translation service returned an empty response")]
    EmptyTranslation,

    #[error("translator program not found")]
    TranslatorUnavailable,

    #[error("gave up after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("invalid configuration file {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ScanLayoutError {
    pub fn parse(reason: impl Into<String>) -> Self {
        ScanLayoutError::TranslationParse {
            reason: reason.into(),
        }
    }
}
