//! Single-dimension animation curves.

use serde::{Deserialize, Serialize};

use crate::config::EvalMode;
use crate::ids::{AnimatedHandle, CurveId};
use crate::keyframe::{Interpolation, Keyframe};
use crate::sampling::evaluate_track;

/// Behaviour of a curve before its first key (pre) or after its last key (post).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Hold the boundary value.
    #[default]
    Constant,
    /// Continue along the boundary slope.
    Linear,
    /// Repeat the key range.
    Cycle,
    /// Repeat the key range, offsetting each repetition by the range's value delta.
    CycleRelative,
    /// Repeat the key range back and forth.
    Oscillate,
}

impl Extrapolation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "CONSTANT" => Some(Extrapolation::Constant),
            "LINEAR" => Some(Extrapolation::Linear),
            "CYCLE" => Some(Extrapolation::Cycle),
            "CYCLE_RELATIVE" => Some(Extrapolation::CycleRelative),
            "OSCILLATE" => Some(Extrapolation::Oscillate),
            _ => None,
        }
    }

    pub fn as_name(self) -> &'static str {
        match self {
            Extrapolation::Constant => "CONSTANT",
            Extrapolation::Linear => "LINEAR",
            Extrapolation::Cycle => "CYCLE",
            Extrapolation::CycleRelative => "CYCLE_RELATIVE",
            Extrapolation::Oscillate => "OSCILLATE",
        }
    }
}

/// Weak link from a driven curve to the animated value that supplies its input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveDriver {
    pub handle: AnimatedHandle,
    /// Component of the animated value read as the curve input.
    pub component: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    id: CurveId,
    keys: Vec<Keyframe>,
    pub pre_infinity: Extrapolation,
    pub post_infinity: Extrapolation,
    driver: Option<CurveDriver>,
    /// Entry of an animated array this curve targets, if any.
    pub target_element: Option<u32>,
    /// Component selector of the target property (`.X`, `(3)`, ...).
    pub target_qualifier: String,
    #[serde(skip)]
    dirty: bool,
}

impl Curve {
    pub fn new(id: CurveId) -> Self {
        Self {
            id,
            keys: Vec::new(),
            pre_infinity: Extrapolation::Constant,
            post_infinity: Extrapolation::Constant,
            driver: None,
            target_element: None,
            target_qualifier: String::new(),
            dirty: false,
        }
    }

    #[inline]
    pub fn id(&self) -> CurveId {
        self.id
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Mutable key access; marks the curve dirty.
    pub fn keys_mut(&mut self) -> &mut Vec<Keyframe> {
        self.dirty = true;
        &mut self.keys
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Append a key with a zeroed payload of the given kind.
    pub fn add_key(&mut self, kind: Interpolation) -> &mut Keyframe {
        self.add_key_at(kind, 0.0, 0.0)
    }

    pub fn add_key_at(&mut self, kind: Interpolation, time: f32, value: f32) -> &mut Keyframe {
        self.dirty = true;
        self.keys.push(Keyframe::new(kind, time, value));
        let last = self.keys.len() - 1;
        &mut self.keys[last]
    }

    pub fn push_key(&mut self, key: Keyframe) {
        self.dirty = true;
        self.keys.push(key);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn driver(&self) -> Option<CurveDriver> {
        self.driver
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub fn set_driver(&mut self, driver: Option<CurveDriver>) {
        self.dirty = true;
        self.driver = driver;
    }

    /// True if any key uses `kind`.
    pub fn uses(&self, kind: Interpolation) -> bool {
        self.keys.iter().any(|k| k.interpolation() == kind)
    }

    /// Value at `input`, applying pre/post extrapolation outside the key range.
    pub fn evaluate(&self, input: f32, mode: EvalMode) -> f32 {
        evaluate_track(
            self.keys.as_slice(),
            self.pre_infinity,
            self.post_infinity,
            input,
            mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Vec2;

    fn linear(times: &[f32], values: &[f32]) -> Curve {
        let mut c = Curve::new(CurveId(0));
        for (t, v) in times.iter().zip(values) {
            c.add_key_at(Interpolation::Linear, *t, *v);
        }
        c
    }

    #[test]
    fn add_key_marks_dirty() {
        let mut c = Curve::new(CurveId(3));
        assert!(!c.is_dirty());
        let k = c.add_key(Interpolation::Tcb);
        k.time = 1.0;
        assert!(c.is_dirty());
        assert_eq!(c.key_count(), 1);
        assert!(c.uses(Interpolation::Tcb));
        c.clear_dirty();
        assert!(!c.is_dirty());
    }

    #[test]
    fn empty_and_single_key() {
        let c = Curve::new(CurveId(0));
        assert_eq!(c.evaluate(1.0, EvalMode::default()), 0.0);
        let c = linear(&[2.0], &[7.0]);
        assert_eq!(c.evaluate(-5.0, EvalMode::default()), 7.0);
        assert_eq!(c.evaluate(5.0, EvalMode::default()), 7.0);
    }

    #[test]
    fn linear_extrapolation_follows_boundary_slope() {
        let mut c = linear(&[0.0, 1.0], &[0.0, 2.0]);
        c.pre_infinity = Extrapolation::Linear;
        c.post_infinity = Extrapolation::Linear;
        assert!((c.evaluate(-1.0, EvalMode::default()) + 2.0).abs() < 1e-6);
        assert!((c.evaluate(3.0, EvalMode::default()) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn bezier_tangent_slope_used_for_linear_extrapolation() {
        let mut c = Curve::new(CurveId(0));
        c.push_key(Keyframe::bezier(
            0.0,
            1.0,
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 2.0),
        ));
        c.push_key(Keyframe::bezier(3.0, 1.0, Vec2::new(2.0, 1.0), Vec2::new(4.0, 1.0)));
        c.pre_infinity = Extrapolation::Linear;
        assert!((c.evaluate(-2.0, EvalMode::default()) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cycle_relative_offsets_each_repetition() {
        let mut c = linear(&[0.0, 1.0], &[0.0, 1.0]);
        c.post_infinity = Extrapolation::CycleRelative;
        assert!((c.evaluate(1.5, EvalMode::default()) - 1.5).abs() < 1e-5);
        c.post_infinity = Extrapolation::Cycle;
        assert!((c.evaluate(1.5, EvalMode::default()) - 0.5).abs() < 1e-5);
        c.post_infinity = Extrapolation::Oscillate;
        assert!((c.evaluate(1.25, EvalMode::default()) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn extrapolation_names() {
        assert_eq!(
            Extrapolation::from_name("cycle_relative"),
            Some(Extrapolation::CycleRelative)
        );
        assert_eq!(Extrapolation::from_name("BOUNCE"), None);
        assert_eq!(Extrapolation::Oscillate.as_name(), "OSCILLATE");
    }
}
