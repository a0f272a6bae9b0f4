//! N-dimension curves sharing one time axis.
//!
//! A MultiCurve is what a Channel evaluates and exports when its curves are
//! compatible: one time per key, and per-dimension outputs and shape data.

use serde::{Deserialize, Serialize};

use crate::config::EvalMode;
use crate::curve::{Curve, Extrapolation};
use crate::data::Vec2;
use crate::ids::IdAllocator;
use crate::interp::SegmentKey;
use crate::keyframe::{flat_tangents, Interpolation, KeyShape, Keyframe, TcbParams};
use crate::sampling::{evaluate_track, KeyTrack};

/// Per-dimension payload of a multi-dimension key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "interpolation", rename_all = "lowercase")]
pub enum MKeyShape {
    Step,
    Linear,
    Bezier {
        in_tangents: Vec<Vec2>,
        out_tangents: Vec<Vec2>,
    },
    Tcb {
        params: Vec<TcbParams>,
    },
}

impl MKeyShape {
    fn zeroed(kind: Interpolation, dimension: usize) -> Self {
        match kind {
            Interpolation::Step => MKeyShape::Step,
            Interpolation::Linear => MKeyShape::Linear,
            Interpolation::Bezier => MKeyShape::Bezier {
                in_tangents: vec![Vec2::ZERO; dimension],
                out_tangents: vec![Vec2::ZERO; dimension],
            },
            Interpolation::Tcb => MKeyShape::Tcb {
                params: vec![TcbParams::ZERO; dimension],
            },
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        match self {
            MKeyShape::Step => Interpolation::Step,
            MKeyShape::Linear => Interpolation::Linear,
            MKeyShape::Bezier { .. } => Interpolation::Bezier,
            MKeyShape::Tcb { .. } => Interpolation::Tcb,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MKeyframe {
    pub time: f32,
    pub outputs: Vec<f32>,
    #[serde(flatten)]
    pub shape: MKeyShape,
}

impl MKeyframe {
    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.shape.interpolation()
    }

    /// Single-dimension key for component `d`.
    pub fn component(&self, d: usize) -> Keyframe {
        let value = self.outputs.get(d).copied().unwrap_or_default();
        let shape = match &self.shape {
            MKeyShape::Step => KeyShape::Step,
            MKeyShape::Linear => KeyShape::Linear,
            MKeyShape::Bezier {
                in_tangents,
                out_tangents,
            } => KeyShape::Bezier {
                in_tangent: in_tangents.get(d).copied().unwrap_or_default(),
                out_tangent: out_tangents.get(d).copied().unwrap_or_default(),
            },
            MKeyShape::Tcb { params } => {
                KeyShape::Tcb(params.get(d).copied().unwrap_or_default())
            }
        };
        Keyframe {
            time: self.time,
            value,
            shape,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiCurve {
    dimension: usize,
    keys: Vec<MKeyframe>,
    /// One component selector per dimension.
    pub target_qualifiers: Vec<String>,
    pub pre_infinity: Extrapolation,
    pub post_infinity: Extrapolation,
}

/// One dimension of a MultiCurve, seen as a key track.
struct Component<'a> {
    keys: &'a [MKeyframe],
    d: usize,
}

impl KeyTrack for Component<'_> {
    fn key_count(&self) -> usize {
        self.keys.len()
    }

    fn key(&self, i: usize) -> SegmentKey {
        let k = &self.keys[i];
        let (in_tangent, out_tangent) = match &k.shape {
            MKeyShape::Bezier {
                in_tangents,
                out_tangents,
            } => (
                in_tangents.get(self.d).copied(),
                out_tangents.get(self.d).copied(),
            ),
            _ => (None, None),
        };
        SegmentKey {
            time: k.time,
            value: k.outputs.get(self.d).copied().unwrap_or_default(),
            out_tangent,
            in_tangent,
        }
    }

    fn kind(&self, i: usize) -> Interpolation {
        self.keys[i].interpolation()
    }
}

impl MultiCurve {
    /// Empty curve; a zero dimension is treated as 1.
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            keys: Vec::new(),
            target_qualifiers: vec![String::new(); dimension],
            pre_infinity: Extrapolation::Constant,
            post_infinity: Extrapolation::Constant,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn keys(&self) -> &[MKeyframe] {
        &self.keys
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Append a key with zeroed outputs and payload.
    pub fn add_key(&mut self, kind: Interpolation, time: f32) -> &mut MKeyframe {
        self.keys.push(MKeyframe {
            time,
            outputs: vec![0.0; self.dimension],
            shape: MKeyShape::zeroed(kind, self.dimension),
        });
        let last = self.keys.len() - 1;
        &mut self.keys[last]
    }

    /// Evaluate every dimension at `input` into `output`.
    /// Entries past `dimension` are left untouched.
    pub fn evaluate(&self, input: f32, output: &mut [f32], mode: EvalMode) {
        for (d, out) in output.iter_mut().take(self.dimension).enumerate() {
            let track = Component {
                keys: &self.keys,
                d,
            };
            *out = evaluate_track(&track, self.pre_infinity, self.post_infinity, input, mode);
        }
    }

    /// Allocating variant of [`Self::evaluate`].
    pub fn sample(&self, input: f32, mode: EvalMode) -> Vec<f32> {
        let mut out = vec![0.0; self.dimension];
        self.evaluate(input, &mut out, mode);
        out
    }

    /// One-dimension MultiCurve carrying a copy of `curve`.
    pub fn from_curve(curve: &Curve) -> Self {
        let mut mc = MultiCurve::new(1);
        mc.target_qualifiers[0] = curve.target_qualifier.clone();
        mc.pre_infinity = curve.pre_infinity;
        mc.post_infinity = curve.post_infinity;
        mc.keys = curve
            .keys()
            .iter()
            .map(|k| MKeyframe {
                time: k.time,
                outputs: vec![k.value],
                shape: match k.shape {
                    KeyShape::Step => MKeyShape::Step,
                    KeyShape::Linear => MKeyShape::Linear,
                    KeyShape::Bezier {
                        in_tangent,
                        out_tangent,
                    } => MKeyShape::Bezier {
                        in_tangents: vec![in_tangent],
                        out_tangents: vec![out_tangent],
                    },
                    KeyShape::Tcb(p) => MKeyShape::Tcb { params: vec![p] },
                },
            })
            .collect();
        mc
    }

    /// Merge single-dimension curves into one MultiCurve.
    ///
    /// Keys are placed at the union of all key times (times closer than
    /// `tolerance` collapse onto the first one seen). A dimension that has a
    /// key at that time copies it; otherwise it samples its curve, or uses
    /// `defaults[d]` when its curve is absent. Keys whose dimensions disagree
    /// on interpolation are promoted to Bezier with flat tangents.
    /// Qualifiers come from each curve; infinity from the first present curve.
    pub fn merge(
        curves: &[Option<&Curve>],
        defaults: &[f32],
        tolerance: f32,
        mode: EvalMode,
    ) -> Self {
        let mut merged = MultiCurve::new(curves.len());
        let dimension = merged.dimension;
        for (d, c) in curves.iter().enumerate() {
            if let Some(c) = c {
                merged.target_qualifiers[d] = c.target_qualifier.clone();
            }
        }
        if let Some(first) = curves.iter().flatten().next() {
            merged.pre_infinity = first.pre_infinity;
            merged.post_infinity = first.post_infinity;
        }

        let mut times: Vec<f32> = curves
            .iter()
            .flatten()
            .flat_map(|c| c.keys().iter().map(|k| k.time))
            .collect();
        times.sort_by(f32::total_cmp);
        times.dedup_by(|b, a| (*b - *a).abs() <= tolerance);

        for (ti, &time) in times.iter().enumerate() {
            let prev = if ti > 0 { times[ti - 1] } else { time - 1.0 };
            let next = times.get(ti + 1).copied().unwrap_or(time + 1.0);

            // Per dimension: the exact key if one exists, else a sampled value.
            let picks: Vec<(Option<Keyframe>, f32)> = (0..dimension)
                .map(|d| match curves.get(d).copied().flatten() {
                    Some(c) => {
                        let exact = c
                            .keys()
                            .iter()
                            .find(|k| (k.time - time).abs() <= tolerance)
                            .copied();
                        let value = exact.map_or_else(|| c.evaluate(time, mode), |k| k.value);
                        (exact, value)
                    }
                    None => (None, defaults.get(d).copied().unwrap_or_default()),
                })
                .collect();

            let mut kinds = picks.iter().filter_map(|(k, _)| k.map(|k| k.interpolation()));
            let kind = match kinds.next() {
                Some(first) if kinds.all(|k| k == first) => first,
                Some(_) => Interpolation::Bezier,
                None => Interpolation::DEFAULT,
            };

            let key = merged.add_key(kind, time);
            for (d, (exact, value)) in picks.iter().enumerate() {
                key.outputs[d] = *value;
                match &mut key.shape {
                    MKeyShape::Bezier {
                        in_tangents,
                        out_tangents,
                    } => {
                        let (inn, out) = exact
                            .and_then(|k| k.tangents())
                            .unwrap_or_else(|| flat_tangents(prev, time, next, *value));
                        in_tangents[d] = inn;
                        out_tangents[d] = out;
                    }
                    MKeyShape::Tcb { params } => {
                        params[d] = exact.and_then(|k| k.tcb().copied()).unwrap_or_default();
                    }
                    MKeyShape::Step | MKeyShape::Linear => {}
                }
            }
        }
        merged
    }

    /// Split back into one Curve per dimension, with fresh ids.
    pub fn split(&self, ids: &mut IdAllocator) -> Vec<Curve> {
        (0..self.dimension)
            .map(|d| {
                let mut curve = Curve::new(ids.alloc_curve());
                curve.pre_infinity = self.pre_infinity;
                curve.post_infinity = self.post_infinity;
                curve.target_qualifier = self.target_qualifiers[d].clone();
                for k in &self.keys {
                    curve.push_key(k.component(d));
                }
                curve.clear_dirty();
                curve
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CurveId;

    #[test]
    fn evaluate_fills_each_dimension() {
        let mut mc = MultiCurve::new(2);
        let k = mc.add_key(Interpolation::Linear, 0.0);
        k.outputs = vec![0.0, 10.0];
        let k = mc.add_key(Interpolation::Linear, 1.0);
        k.outputs = vec![1.0, 20.0];

        let mut out = [f32::NAN; 3];
        mc.evaluate(0.5, &mut out, EvalMode::default());
        assert!((out[0] - 0.5).abs() < 1e-6);
        assert!((out[1] - 15.0).abs() < 1e-6);
        assert!(out[2].is_nan());

        assert_eq!(mc.sample(-3.0, EvalMode::default()), vec![0.0, 10.0]);
        assert_eq!(MultiCurve::new(0).dimension(), 1);
    }

    #[test]
    fn empty_multicurve_outputs_zero() {
        let mc = MultiCurve::new(3);
        let mut out = [5.0; 3];
        mc.evaluate(1.0, &mut out, EvalMode::default());
        assert_eq!(out, [0.0; 3]);
    }

    #[test]
    fn merge_fills_absent_dimension_from_default() {
        let mut a = Curve::new(CurveId(0));
        a.add_key_at(Interpolation::Linear, 0.0, 1.0);
        a.add_key_at(Interpolation::Linear, 2.0, 3.0);
        a.target_qualifier = ".X".into();
        let mc = MultiCurve::merge(&[Some(&a), None], &[0.0, 7.0], 1e-4, EvalMode::default());
        assert_eq!(mc.key_count(), 2);
        assert_eq!(mc.keys()[1].outputs, vec![3.0, 7.0]);
        assert_eq!(mc.target_qualifiers, vec![".X".to_string(), String::new()]);
    }

    #[test]
    fn merge_samples_missing_times_and_promotes_mixed_kinds() {
        let mut a = Curve::new(CurveId(0));
        a.add_key_at(Interpolation::Linear, 0.0, 0.0);
        a.add_key_at(Interpolation::Linear, 2.0, 2.0);
        let mut b = Curve::new(CurveId(1));
        b.add_key_at(Interpolation::Step, 0.0, 5.0);
        b.add_key_at(Interpolation::Step, 1.0, 6.0);

        let mc = MultiCurve::merge(&[Some(&a), Some(&b)], &[0.0, 0.0], 1e-4, EvalMode::default());
        let times: Vec<f32> = mc.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
        // key 0: linear vs step -> bezier
        assert_eq!(mc.keys()[0].interpolation(), Interpolation::Bezier);
        // key 1: only b has a key, a is sampled
        assert_eq!(mc.keys()[1].interpolation(), Interpolation::Step);
        assert!((mc.keys()[1].outputs[0] - 1.0).abs() < 1e-6);
        assert_eq!(mc.keys()[2].outputs[1], 6.0);
    }

    #[test]
    fn split_restores_components() {
        let mut ids = IdAllocator::new();
        let mut a = Curve::new(ids.alloc_curve());
        let mut b = Curve::new(ids.alloc_curve());
        for (t, va, vb) in [(0.0, 1.0, -1.0), (0.5, 2.0, -2.0), (1.0, 4.0, -4.0)] {
            a.push_key(Keyframe::bezier(
                t,
                va,
                Vec2::new(t - 0.1, va),
                Vec2::new(t + 0.1, va + 1.0),
            ));
            b.push_key(Keyframe::bezier(
                t,
                vb,
                Vec2::new(t - 0.1, vb),
                Vec2::new(t + 0.1, vb - 1.0),
            ));
        }
        let mc = MultiCurve::merge(&[Some(&a), Some(&b)], &[0.0, 0.0], 1e-4, EvalMode::default());
        let split = mc.split(&mut ids);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].keys(), a.keys());
        assert_eq!(split[1].keys(), b.keys());
        assert_ne!(split[0].id(), a.id());
    }
}
