//! Error types for animation loading and merge analysis.

use scenedoc_api_core::ErrorCode;
use serde::{Deserialize, Serialize};

/// Structural failures that abort a load.
///
/// Data-quality problems never show up here on their own; they are reported
/// to the `ErrorSink` and only become `Aborted` when the sink's fatal level
/// says so.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LoadError {
    /// A referenced element is absent or has the wrong tag.
    #[error("Missing element: {what} ({location})")]
    MissingElement { what: String, location: String },

    /// A sampler lacks its INPUT or OUTPUT source.
    #[error("Missing {semantic} input on {location}")]
    MissingInput { semantic: String, location: String },

    /// A report met the configured fatal level.
    #[error("Load aborted: {0}")]
    Aborted(ErrorCode),
}

impl LoadError {
    pub fn missing_element(what: impl Into<String>, location: impl Into<String>) -> Self {
        LoadError::MissingElement {
            what: what.into(),
            location: location.into(),
        }
    }

    pub fn missing_input(semantic: impl Into<String>, location: impl Into<String>) -> Self {
        LoadError::MissingInput {
            semantic: semantic.into(),
            location: location.into(),
        }
    }
}

/// First rule that keeps a set of curves from merging into one MultiCurve.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeRejection {
    #[error("Curve {index} is missing")]
    MissingCurve { index: usize },

    #[error("Curve {index} has no default value")]
    MissingDefault { index: usize },

    #[error("Curve {index} has TCB keys")]
    TcbKey { index: usize },

    #[error("Curve {index} is driven")]
    Driven { index: usize },

    #[error("Curve {index} has {found} keys, expected {expected}")]
    KeyCount {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Curve {index} has different pre/post infinity")]
    Infinity { index: usize },

    #[error("Curve {index} key {key} time differs")]
    Time { index: usize, key: usize },

    #[error("Curve {index} key {key} interpolation differs")]
    Interpolation { index: usize, key: usize },
}
