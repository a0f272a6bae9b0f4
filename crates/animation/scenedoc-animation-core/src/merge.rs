//! Merge-compatibility analysis: can N single-dimension curves be written
//! as one MultiCurve without losing information?

use crate::curve::Curve;
use crate::error::MergeRejection;
use crate::keyframe::Interpolation;

/// Check the merge rules in order, returning the first one that fails.
///
/// `curves[i]` is `None` for a hole; `defaults[i]` is the value registered for
/// that dimension (`None` when nothing was registered). An empty set passes.
pub fn check_mergeable(
    curves: &[Option<&Curve>],
    defaults: &[Option<f32>],
    tolerance: f32,
) -> Result<(), MergeRejection> {
    for (index, curve) in curves.iter().enumerate() {
        if curve.is_none() {
            return Err(MergeRejection::MissingCurve { index });
        }
        if defaults.get(index).copied().flatten().is_none() {
            return Err(MergeRejection::MissingDefault { index });
        }
    }
    let curves: Vec<&Curve> = curves.iter().flatten().copied().collect();
    let Some(first) = curves.first() else {
        return Ok(());
    };

    // TCB anywhere disqualifies the whole set.
    if let Some(index) = curves.iter().position(|c| c.uses(Interpolation::Tcb)) {
        return Err(MergeRejection::TcbKey { index });
    }
    if let Some(index) = curves.iter().position(|c| c.has_driver()) {
        return Err(MergeRejection::Driven { index });
    }

    let expected = first.key_count();
    for (index, c) in curves.iter().enumerate().skip(1) {
        if c.key_count() != expected {
            return Err(MergeRejection::KeyCount {
                index,
                expected,
                found: c.key_count(),
            });
        }
        if c.pre_infinity != first.pre_infinity || c.post_infinity != first.post_infinity {
            return Err(MergeRejection::Infinity { index });
        }
    }

    for key in 0..expected {
        let reference = &first.keys()[key];
        for (index, c) in curves.iter().enumerate().skip(1) {
            let k = &c.keys()[key];
            if (k.time - reference.time).abs() > tolerance {
                return Err(MergeRejection::Time { index, key });
            }
            if k.interpolation() != reference.interpolation() {
                return Err(MergeRejection::Interpolation { index, key });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveDriver, Extrapolation};
    use crate::ids::{AnimatedHandle, CurveId};

    fn curve(id: u32, times: &[f32], kind: Interpolation) -> Curve {
        let mut c = Curve::new(CurveId(id));
        for t in times {
            c.add_key_at(kind, *t, 1.0);
        }
        c
    }

    #[test]
    fn compatible_set_passes() {
        let a = curve(0, &[0.0, 1.0], Interpolation::Linear);
        let b = curve(1, &[0.0, 1.00001], Interpolation::Linear);
        assert_eq!(
            check_mergeable(&[Some(&a), Some(&b)], &[Some(0.0), Some(0.0)], 1e-4),
            Ok(())
        );
        assert_eq!(check_mergeable(&[], &[], 1e-4), Ok(()));
    }

    #[test]
    fn holes_and_missing_defaults() {
        let a = curve(0, &[0.0], Interpolation::Linear);
        assert_eq!(
            check_mergeable(&[Some(&a), None], &[Some(0.0), Some(0.0)], 1e-4),
            Err(MergeRejection::MissingCurve { index: 1 })
        );
        assert_eq!(
            check_mergeable(&[Some(&a), Some(&a)], &[Some(0.0)], 1e-4),
            Err(MergeRejection::MissingDefault { index: 1 })
        );
    }

    #[test]
    fn single_tcb_key_rejects_before_key_checks() {
        let a = curve(0, &[0.0, 1.0], Interpolation::Bezier);
        let mut b = curve(1, &[0.0, 1.0], Interpolation::Bezier);
        b.keys_mut()[1].set_interpolation(Interpolation::Tcb);
        let c = curve(2, &[0.0, 1.0, 2.0], Interpolation::Bezier);
        let defaults = [Some(0.0); 3];
        assert_eq!(
            check_mergeable(&[Some(&a), Some(&b), Some(&c)], &defaults, 1e-4),
            Err(MergeRejection::TcbKey { index: 1 })
        );
    }

    #[test]
    fn rule_order_after_tcb() {
        let defaults = [Some(0.0); 2];
        let a = curve(0, &[0.0, 1.0], Interpolation::Linear);

        let mut driven = curve(1, &[0.0], Interpolation::Linear);
        driven.set_driver(Some(CurveDriver {
            handle: AnimatedHandle {
                index: 0,
                generation: 0,
            },
            component: 0,
        }));
        assert_eq!(
            check_mergeable(&[Some(&a), Some(&driven)], &defaults, 1e-4),
            Err(MergeRejection::Driven { index: 1 })
        );

        let short = curve(1, &[0.0], Interpolation::Linear);
        assert!(matches!(
            check_mergeable(&[Some(&a), Some(&short)], &defaults, 1e-4),
            Err(MergeRejection::KeyCount { index: 1, expected: 2, found: 1 })
        ));

        let mut cyc = curve(1, &[0.0, 1.0], Interpolation::Linear);
        cyc.post_infinity = Extrapolation::Cycle;
        assert_eq!(
            check_mergeable(&[Some(&a), Some(&cyc)], &defaults, 1e-4),
            Err(MergeRejection::Infinity { index: 1 })
        );

        let late = curve(1, &[0.0, 1.5], Interpolation::Linear);
        assert_eq!(
            check_mergeable(&[Some(&a), Some(&late)], &defaults, 1e-4),
            Err(MergeRejection::Time { index: 1, key: 1 })
        );

        let step = curve(1, &[0.0, 1.0], Interpolation::Step);
        assert_eq!(
            check_mergeable(&[Some(&a), Some(&step)], &defaults, 1e-4),
            Err(MergeRejection::Interpolation { index: 1, key: 0 })
        );
    }
}
