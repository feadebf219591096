//! Error types for dice parsing and scenario loading

use thiserror::Error;

/// A dice-or-integer field that could not be read.
///
/// This is the only error the resolution pipeline itself can raise. Callers
/// (CLI, bindings, GUIs) are expected to report it and pick a replacement value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad entry `{0}`: expected an integer or <count>D<face>+<bonus> (e.g. 2, D3, 2D6+1)")]
    MissingDiceMarker(String),

    #[error("bad entry `{notation}`: {component} `{text}` is not a valid number")]
    InvalidComponent {
        notation: String,
        component: &'static str,
        text: String,
    },
}

/// Errors raised outside the pipeline: loading and validating scenarios.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown defender: {0}")]
    UnknownDefender(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

pub type Result<T> = std::result::Result<T, Error>;
