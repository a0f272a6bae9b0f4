//! Segment interpolation shared by Curve and MultiCurve.

pub mod functions;

use crate::config::EvalMode;
use crate::data::Vec2;
use crate::keyframe::Interpolation;
use functions::{bezier_blend, find_t, lerp, reparam_ratios};

/// One component of a key as seen from a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentKey {
    pub time: f32,
    pub value: f32,
    /// Tangent leaving the key (used when the key starts a segment).
    pub out_tangent: Option<Vec2>,
    /// Tangent entering the key (used when the key ends a segment).
    pub in_tangent: Option<Vec2>,
}

/// Interpolate between two keys according to the start key's kind.
/// Step and TCB segments hold the start value.
pub fn segment_value(
    kind: Interpolation,
    start: &SegmentKey,
    end: &SegmentKey,
    input: f32,
    mode: EvalMode,
) -> f32 {
    let span = end.time - start.time;
    match kind {
        Interpolation::Linear => {
            if span <= 0.0 {
                return start.value;
            }
            lerp(start.value, end.value, (input - start.time) / span)
        }
        Interpolation::Bezier => bezier_segment(start, end, input, mode),
        Interpolation::Step | Interpolation::Tcb => start.value,
    }
}

/// Bezier segment evaluation. Missing tangents sit on their key, one third
/// of the way into the segment.
pub fn bezier_segment(start: &SegmentKey, end: &SegmentKey, input: f32, mode: EvalMode) -> f32 {
    let span = end.time - start.time;
    if span <= 0.0 {
        return start.value;
    }
    let out = start
        .out_tangent
        .unwrap_or(Vec2::new(start.time + span / 3.0, start.value));
    let inn = end
        .in_tangent
        .unwrap_or(Vec2::new(end.time - span / 3.0, end.value));

    let (br, cr) = reparam_ratios(start.time, out.x, inn.x, end.time);
    let t = match mode {
        EvalMode::Parametric2D => find_t(start.time, out.x, inn.x, end.time, input),
        EvalMode::Linear1D => ((input - start.time) / span).clamp(0.0, 1.0),
    };
    bezier_blend(start.value, out.y, inn.y, end.value, br, cr, t)
}
