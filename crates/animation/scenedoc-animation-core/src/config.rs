//! Core configuration for scenedoc-animation-core.

use scenedoc_api_core::Severity;
use serde::{Deserialize, Serialize};

/// How Bezier segments are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalMode {
    /// Treat tangents as 2D control points and solve the time component for
    /// the curve parameter before blending values.
    #[default]
    #[serde(rename = "parametric_2d")]
    Parametric2D,
    /// Use the normalized time directly as the curve parameter and rescale the
    /// tangent weights by how far their time offsets sit from the key.
    #[serde(rename = "linear_1d")]
    Linear1D,
}

/// Evaluation, merge and load settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub eval_mode: EvalMode,
    /// Absolute tolerance when comparing key times during merge analysis.
    pub merge_tolerance: f32,
    /// Clip windows shorter than this are reported as suspicious.
    pub clip_window_epsilon: f32,
    /// Reports at or above this severity abort the whole load; `None` lets
    /// every load run to completion, skipping broken channels.
    pub fatal_level: Option<Severity>,
    /// Default sampling rate for baking (Hz).
    pub bake_frame_rate: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eval_mode: EvalMode::Parametric2D,
            merge_tolerance: 1e-4,
            clip_window_epsilon: 1e-4,
            fatal_level: Some(Severity::Error),
            bake_frame_rate: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "eval_mode": "linear_1d" }"#).unwrap();
        assert_eq!(cfg.eval_mode, EvalMode::Linear1D);
        assert_eq!(cfg.merge_tolerance, 1e-4);
        assert_eq!(cfg.fatal_level, Some(Severity::Error));
    }

    #[test]
    fn roundtrip() {
        let cfg = Config {
            fatal_level: Some(Severity::Warning),
            ..Config::default()
        };
        let s = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }
}
