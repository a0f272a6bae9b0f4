//! Baking API: evenly sampled values of curves and clips over a time window.

use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::config::EvalMode;
use crate::curve::Curve;
use crate::document::Document;
use crate::ids::CurveId;
use crate::multi_curve::MultiCurve;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked samples.
    pub frame_rate: f32,
    /// Start time (seconds).
    pub start_time: f32,
    /// End time (seconds); if None, uses the last key time of what is baked.
    pub end_time: Option<f32>,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            start_time: 0.0,
            end_time: None,
        }
    }
}

impl BakingConfig {
    pub fn with_frame_rate(frame_rate: f32) -> Self {
        Self {
            frame_rate,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedCurve {
    pub curve: CurveId,
    pub frame_rate: f32,
    pub start_time: f32,
    pub end_time: f32,
    pub values: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedMultiCurve {
    pub dimension: usize,
    pub frame_rate: f32,
    pub start_time: f32,
    pub end_time: f32,
    /// One row of `dimension` values per frame.
    pub frames: Vec<Vec<f32>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedClip {
    pub clip: String,
    pub frame_rate: f32,
    pub start_time: f32,
    pub end_time: f32,
    pub curves: Vec<BakedCurve>,
}

/// Windows needing more frames than this bake to no values at all.
pub const MAX_FRAMES: usize = 1 << 22;

struct Window {
    sr: f32,
    start: f32,
    end: f32,
    frames: usize,
}

impl Window {
    fn new(cfg: &BakingConfig, start: f32, natural_end: f32) -> Self {
        let sr = if cfg.frame_rate.is_finite() && cfg.frame_rate > 0.0 {
            cfg.frame_rate
        } else {
            30.0
        };
        let start = if start.is_finite() { start } else { 0.0 };
        let end = cfg
            .end_time
            .filter(|e| e.is_finite())
            .unwrap_or(natural_end)
            .max(start);
        let span = (f64::from(end) - f64::from(start)) * f64::from(sr);
        let frames = if span.is_finite() && span.ceil() < MAX_FRAMES as f64 {
            span.ceil() as usize + 1 // inclusive of end
        } else {
            log::warn!("bake window {start}..{end} at {sr} Hz exceeds {MAX_FRAMES} frames, nothing sampled");
            0
        };
        Self {
            sr,
            start,
            end,
            frames,
        }
    }

    fn times(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.frames).map(move |f| (self.start + f as f32 / self.sr).min(self.end))
    }
}

fn last_time(times: impl Iterator<Item = f32>) -> Option<f32> {
    times.fold(None, |acc: Option<f32>, t| Some(acc.map_or(t, |a| a.max(t))))
}

/// Bake a single curve. Extrapolation applies outside the key range.
pub fn bake_curve(curve: &Curve, cfg: &BakingConfig, mode: EvalMode) -> BakedCurve {
    let natural_end = last_time(curve.keys().iter().map(|k| k.time)).unwrap_or(cfg.start_time);
    let window = Window::new(cfg, cfg.start_time, natural_end);
    let values = window.times().map(|t| curve.evaluate(t, mode)).collect();
    BakedCurve {
        curve: curve.id(),
        frame_rate: window.sr,
        start_time: window.start,
        end_time: window.end,
        values,
    }
}

pub fn bake_multi_curve(curve: &MultiCurve, cfg: &BakingConfig, mode: EvalMode) -> BakedMultiCurve {
    let natural_end = last_time(curve.keys().iter().map(|k| k.time)).unwrap_or(cfg.start_time);
    let window = Window::new(cfg, cfg.start_time, natural_end);
    let mut row = vec![0.0; curve.dimension()];
    let frames = window
        .times()
        .map(|t| {
            curve.evaluate(t, &mut row, mode);
            row.clone()
        })
        .collect();
    BakedMultiCurve {
        dimension: curve.dimension(),
        frame_rate: window.sr,
        start_time: window.start,
        end_time: window.end,
        frames,
    }
}

/// Bake every live curve of `clip` over the clip window (`cfg.start_time`
/// and `cfg.end_time` are ignored). Driven curves read their driver.
pub fn bake_clip(doc: &Document, clip: &Clip, frame_rate: f32) -> BakedClip {
    let cfg = BakingConfig {
        frame_rate,
        start_time: clip.start,
        end_time: Some(clip.end),
    };
    let window = Window::new(&cfg, clip.start, clip.end);
    let curves = clip
        .curve_ids()
        .iter()
        .filter(|id| doc.find_curve(**id).is_some())
        .map(|id| BakedCurve {
            curve: *id,
            frame_rate: window.sr,
            start_time: window.start,
            end_time: window.end,
            values: window
                .times()
                .filter_map(|t| doc.evaluate_curve(*id, t))
                .collect(),
        })
        .collect();
    BakedClip {
        clip: clip.element_id.clone(),
        frame_rate: window.sr,
        start_time: window.start,
        end_time: window.end,
        curves,
    }
}

/// Bake every clip of `doc` at the document's configured frame rate.
pub fn bake_clips(doc: &Document) -> Vec<BakedClip> {
    let rate = doc.config().bake_frame_rate;
    doc.clips.iter().map(|clip| bake_clip(doc, clip, rate)).collect()
}

/// Export baked data as serde_json::Value (stable schema for serialization).
pub fn export_baked_json<T: Serialize>(baked: &T) -> serde_json::Value {
    serde_json::to_value(baked).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::Interpolation;

    fn ramp() -> Curve {
        let mut curve = Curve::new(CurveId(7));
        curve.add_key_at(Interpolation::Linear, 0.0, 0.0);
        curve.add_key_at(Interpolation::Linear, 1.0, 10.0);
        curve
    }

    #[test]
    fn frame_count_includes_end() {
        let baked = bake_curve(&ramp(), &BakingConfig::with_frame_rate(4.0), EvalMode::default());
        assert_eq!(baked.values.len(), 5);
        assert_eq!(baked.end_time, 1.0);
        assert!((baked.values[2] - 5.0).abs() < 1e-5);
        assert!((baked.values[4] - 10.0).abs() < 1e-5);
    }

    #[test]
    fn partial_last_frame_is_clamped_to_end() {
        let cfg = BakingConfig {
            frame_rate: 3.0,
            start_time: 0.0,
            end_time: Some(0.5),
        };
        let baked = bake_curve(&ramp(), &cfg, EvalMode::default());
        // ceil(0.5 * 3) + 1
        assert_eq!(baked.values.len(), 3);
        assert!((baked.values[2] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn bad_frame_rate_falls_back() {
        let cfg = BakingConfig::with_frame_rate(f32::NAN);
        let baked = bake_curve(&ramp(), &cfg, EvalMode::default());
        assert_eq!(baked.frame_rate, 30.0);
        assert_eq!(baked.values.len(), 31);
    }

    #[test]
    fn oversized_window_samples_nothing() {
        let cfg = BakingConfig {
            frame_rate: 30.0,
            start_time: -1e30,
            end_time: Some(1e30),
        };
        let baked = bake_curve(&ramp(), &cfg, EvalMode::default());
        assert!(baked.values.is_empty());
        assert_eq!(baked.end_time, 1e30);

        let cfg = BakingConfig {
            frame_rate: 1e6,
            start_time: 0.0,
            end_time: Some(MAX_FRAMES as f32),
        };
        assert!(bake_curve(&ramp(), &cfg, EvalMode::default()).values.is_empty());
    }

    #[test]
    fn keyless_curve_bakes_one_frame() {
        let curve = Curve::new(CurveId(1));
        let baked = bake_curve(&curve, &BakingConfig::default(), EvalMode::default());
        assert_eq!(baked.values, vec![0.0]);
    }

    #[test]
    fn json_export_has_values() {
        let baked = bake_curve(&ramp(), &BakingConfig::with_frame_rate(1.0), EvalMode::default());
        let json = export_baked_json(&baked);
        assert_eq!(json["values"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["curve"], serde_json::json!(7));
    }
}
