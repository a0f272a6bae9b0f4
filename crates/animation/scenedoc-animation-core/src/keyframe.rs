//! Keyframes: one sample of a single-dimension curve plus the shape data its
//! interpolation kind needs.

use serde::{Deserialize, Serialize};

use crate::data::Vec2;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Step,
    Linear,
    Bezier,
    Tcb,
}

impl Interpolation {
    /// Kind used when a document gives no (or an unknown) interpolation name.
    pub const DEFAULT: Interpolation = Interpolation::Step;

    /// Parse a document interpolation name. Unknown and empty names map to [`Self::DEFAULT`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "STEP" => Interpolation::Step,
            "LINEAR" => Interpolation::Linear,
            "BEZIER" => Interpolation::Bezier,
            "TCB" => Interpolation::Tcb,
            _ => Self::DEFAULT,
        }
    }

    pub fn as_name(self) -> &'static str {
        match self {
            Interpolation::Step => "STEP",
            Interpolation::Linear => "LINEAR",
            Interpolation::Bezier => "BEZIER",
            Interpolation::Tcb => "TCB",
        }
    }
}

/// Kochanek-Bartels parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TcbParams {
    pub tension: f32,
    pub continuity: f32,
    pub bias: f32,
    pub ease_in: f32,
    pub ease_out: f32,
}

impl TcbParams {
    pub const ZERO: TcbParams = TcbParams {
        tension: 0.0,
        continuity: 0.0,
        bias: 0.0,
        ease_in: 0.0,
        ease_out: 0.0,
    };
}

/// Values assumed for TCB keys whose document carries no parameters.
impl Default for TcbParams {
    fn default() -> Self {
        Self {
            tension: 0.5,
            continuity: 0.5,
            bias: 0.5,
            ease_in: 0.0,
            ease_out: 0.0,
        }
    }
}

/// Interpolation-specific payload; the variant is the interpolation kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "interpolation", rename_all = "lowercase")]
pub enum KeyShape {
    Step,
    Linear,
    Bezier { in_tangent: Vec2, out_tangent: Vec2 },
    Tcb(TcbParams),
}

impl KeyShape {
    /// Kind-appropriate payload with every field zeroed.
    pub fn zeroed(kind: Interpolation) -> Self {
        match kind {
            Interpolation::Step => KeyShape::Step,
            Interpolation::Linear => KeyShape::Linear,
            Interpolation::Bezier => KeyShape::Bezier {
                in_tangent: Vec2::ZERO,
                out_tangent: Vec2::ZERO,
            },
            Interpolation::Tcb => KeyShape::Tcb(TcbParams::ZERO),
        }
    }

    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        match self {
            KeyShape::Step => Interpolation::Step,
            KeyShape::Linear => Interpolation::Linear,
            KeyShape::Bezier { .. } => Interpolation::Bezier,
            KeyShape::Tcb(_) => Interpolation::Tcb,
        }
    }
}

/// Flat (in, out) tangents for a key at `time` whose neighbours sit at
/// `prev` and `next`: each handle lies a third of the way towards its
/// neighbour, at the key's own value.
pub fn flat_tangents(prev: f32, time: f32, next: f32, value: f32) -> (Vec2, Vec2) {
    (
        Vec2::new((prev + 2.0 * time) / 3.0, value),
        Vec2::new((next + 2.0 * time) / 3.0, value),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(flatten)]
    pub shape: KeyShape,
}

impl Keyframe {
    pub fn new(kind: Interpolation, time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            shape: KeyShape::zeroed(kind),
        }
    }

    /// Bezier key with explicit tangents.
    pub fn bezier(time: f32, value: f32, in_tangent: Vec2, out_tangent: Vec2) -> Self {
        Self {
            time,
            value,
            shape: KeyShape::Bezier {
                in_tangent,
                out_tangent,
            },
        }
    }

    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.shape.interpolation()
    }

    /// Change the interpolation kind. The payload is kept when the kind is
    /// unchanged; otherwise Bezier keys get flat tangents sitting on the key
    /// and TCB keys get the default parameters.
    pub fn set_interpolation(&mut self, kind: Interpolation) {
        if self.interpolation() == kind {
            return;
        }
        self.shape = match kind {
            Interpolation::Bezier => {
                let on_key = Vec2::new(self.time, self.value);
                KeyShape::Bezier {
                    in_tangent: on_key,
                    out_tangent: on_key,
                }
            }
            Interpolation::Tcb => KeyShape::Tcb(TcbParams::default()),
            other => KeyShape::zeroed(other),
        };
    }

    /// (in, out) tangents of a Bezier key.
    pub fn tangents(&self) -> Option<(Vec2, Vec2)> {
        match self.shape {
            KeyShape::Bezier {
                in_tangent,
                out_tangent,
            } => Some((in_tangent, out_tangent)),
            _ => None,
        }
    }

    pub fn tangents_mut(&mut self) -> Option<(&mut Vec2, &mut Vec2)> {
        match &mut self.shape {
            KeyShape::Bezier {
                in_tangent,
                out_tangent,
            } => Some((in_tangent, out_tangent)),
            _ => None,
        }
    }

    pub fn tcb(&self) -> Option<&TcbParams> {
        match &self.shape {
            KeyShape::Tcb(p) => Some(p),
            _ => None,
        }
    }

    pub fn tcb_mut(&mut self) -> Option<&mut TcbParams> {
        match &mut self.shape {
            KeyShape::Tcb(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_with_step_fallback() {
        assert_eq!(Interpolation::from_name("BEZIER"), Interpolation::Bezier);
        assert_eq!(Interpolation::from_name("linear"), Interpolation::Linear);
        assert_eq!(Interpolation::from_name(""), Interpolation::Step);
        assert_eq!(Interpolation::from_name("HERMITE"), Interpolation::DEFAULT);
        for k in [
            Interpolation::Step,
            Interpolation::Linear,
            Interpolation::Bezier,
            Interpolation::Tcb,
        ] {
            assert_eq!(Interpolation::from_name(k.as_name()), k);
        }
    }

    #[test]
    fn new_keys_carry_zeroed_payload() {
        let k = Keyframe::new(Interpolation::Bezier, 1.0, 2.0);
        assert_eq!(k.tangents(), Some((Vec2::ZERO, Vec2::ZERO)));
        assert!(k.tcb().is_none());

        let t = Keyframe::new(Interpolation::Tcb, 0.0, 0.0);
        assert_eq!(t.tcb(), Some(&TcbParams::ZERO));
        assert!(t.tangents().is_none());
    }

    #[test]
    fn set_interpolation_reshapes_payload() {
        let mut k = Keyframe::new(Interpolation::Linear, 2.0, 5.0);
        k.set_interpolation(Interpolation::Bezier);
        assert_eq!(
            k.tangents(),
            Some((Vec2::new(2.0, 5.0), Vec2::new(2.0, 5.0)))
        );
        if let Some((i, _)) = k.tangents_mut() {
            i.x = 1.5;
        }
        // same kind keeps the payload
        k.set_interpolation(Interpolation::Bezier);
        assert_eq!(k.tangents().unwrap().0.x, 1.5);

        k.set_interpolation(Interpolation::Tcb);
        assert_eq!(k.tcb().unwrap().tension, 0.5);
        k.set_interpolation(Interpolation::Step);
        assert_eq!(k.shape, KeyShape::Step);
    }

    #[test]
    fn serde_tagged_by_interpolation() {
        let k = Keyframe::bezier(0.0, 1.0, Vec2::new(-0.3, 1.0), Vec2::new(0.3, 1.0));
        let v = serde_json::to_value(k).unwrap();
        assert_eq!(v["interpolation"], "bezier");
        let back: Keyframe = serde_json::from_value(v).unwrap();
        assert_eq!(back, k);
    }
}
