//! Key search and out-of-range input mapping shared by Curve and MultiCurve.
//!
//! Model:
//! - Keys are ordered by time (non-decreasing); this is assumed, not checked.
//! - `upper_key_index` returns the first key whose time is strictly greater
//!   than the input. 0 means "before the first key", `len` means "at or past
//!   the last key".
//! - `wrap_input` folds an input outside [first, last] back into the range for
//!   the cycling extrapolation kinds.
//! - `evaluate_track` runs the full evaluation (extrapolation, bracket search,
//!   segment interpolation) over anything implementing `KeyTrack`.

use crate::config::EvalMode;
use crate::curve::Extrapolation;
use crate::interp::{segment_value, SegmentKey};
use crate::keyframe::{Interpolation, Keyframe};

/// Read-only view of one dimension of ordered keys.
pub trait KeyTrack {
    fn key_count(&self) -> usize;
    fn key(&self, i: usize) -> SegmentKey;
    fn kind(&self, i: usize) -> Interpolation;
}

impl KeyTrack for [Keyframe] {
    fn key_count(&self) -> usize {
        self.len()
    }

    fn key(&self, i: usize) -> SegmentKey {
        let k = &self[i];
        let (in_tangent, out_tangent) = match k.tangents() {
            Some((inn, out)) => (Some(inn), Some(out)),
            None => (None, None),
        };
        SegmentKey {
            time: k.time,
            value: k.value,
            out_tangent,
            in_tangent,
        }
    }

    fn kind(&self, i: usize) -> Interpolation {
        self[i].interpolation()
    }
}

/// Window size below which the binary search hands over to a linear scan.
const LINEAR_SCAN_WINDOW: usize = 3;

/// Index of the first key with `time_at(i) > input`, or `len` if none.
pub fn upper_key_index(len: usize, time_at: impl Fn(usize) -> f32, input: f32) -> usize {
    let mut lo = 0usize;
    let mut hi = len;
    while hi - lo > LINEAR_SCAN_WINDOW {
        let mid = lo + (hi - lo) / 2;
        if time_at(mid) > input {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    (lo..hi).find(|&i| time_at(i) > input).unwrap_or(hi)
}

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// Input folded into the key range, plus the signed number of whole cycles
/// that were removed (used by `CycleRelative` to offset values).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wrapped {
    pub input: f32,
    pub cycles: f32,
}

/// Fold `input` into `[first, last]` according to `kind`.
/// Returns `None` for `Constant` and `Linear`, which callers handle directly.
pub fn wrap_input(first: f32, last: f32, input: f32, kind: Extrapolation) -> Option<Wrapped> {
    let span = last - first;
    if span <= 0.0 {
        return None;
    }
    let rel = input - first;
    match kind {
        Extrapolation::Constant | Extrapolation::Linear => None,
        Extrapolation::Cycle | Extrapolation::CycleRelative => Some(Wrapped {
            input: first + fmod(rel, span),
            cycles: (rel / span).floor(),
        }),
        Extrapolation::Oscillate => {
            let period = 2.0 * span;
            let m = fmod(rel, period);
            let folded = if m <= span { m } else { period - m };
            Some(Wrapped {
                input: first + folded,
                cycles: 0.0,
            })
        }
    }
}

/// Value of `track` at `input`.
///
/// 0 keys yield 0 and a single key yields its value. Outside the key range
/// the pre/post extrapolation applies; `Constant` clamps to the boundary key.
pub fn evaluate_track<T: KeyTrack + ?Sized>(
    track: &T,
    pre: Extrapolation,
    post: Extrapolation,
    input: f32,
    mode: EvalMode,
) -> f32 {
    let n = track.key_count();
    match n {
        0 => return 0.0,
        1 => return track.key(0).value,
        _ => {}
    }
    let first = track.key(0);
    let last = track.key(n - 1);
    let kind = if input < first.time {
        pre
    } else if input > last.time {
        post
    } else {
        Extrapolation::Constant
    };
    match kind {
        Extrapolation::Constant => bracket(track, input, mode),
        Extrapolation::Linear => {
            if input < first.time {
                first.value + start_slope(track) * (input - first.time)
            } else {
                last.value + end_slope(track) * (input - last.time)
            }
        }
        other => match wrap_input(first.time, last.time, input, other) {
            Some(w) => {
                let offset = if other == Extrapolation::CycleRelative {
                    w.cycles * (last.value - first.value)
                } else {
                    0.0
                };
                bracket(track, w.input, mode) + offset
            }
            None => bracket(track, input, mode),
        },
    }
}

/// Bracket search with clamping to the boundary keys.
fn bracket<T: KeyTrack + ?Sized>(track: &T, input: f32, mode: EvalMode) -> f32 {
    let n = track.key_count();
    let i = upper_key_index(n, |i| track.key(i).time, input);
    if i == n {
        return track.key(n - 1).value;
    }
    if i == 0 {
        return track.key(0).value;
    }
    segment_value(track.kind(i - 1), &track.key(i - 1), &track.key(i), input, mode)
}

fn start_slope<T: KeyTrack + ?Sized>(track: &T) -> f32 {
    let first = track.key(0);
    if let Some(inn) = first.in_tangent {
        if inn.x < first.time {
            return (first.value - inn.y) / (first.time - inn.x);
        }
    }
    let next = track.key(1);
    let dt = next.time - first.time;
    if dt > 0.0 {
        (next.value - first.value) / dt
    } else {
        0.0
    }
}

fn end_slope<T: KeyTrack + ?Sized>(track: &T) -> f32 {
    let n = track.key_count();
    let last = track.key(n - 1);
    if let Some(out) = last.out_tangent {
        if out.x > last.time {
            return (out.y - last.value) / (out.x - last.time);
        }
    }
    let prev = track.key(n - 2);
    let dt = last.time - prev.time;
    if dt > 0.0 {
        (last.value - prev.value) / dt
    } else {
        0.0
    }
}
