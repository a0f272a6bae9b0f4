//! Scalar interpolation primitives:
//! - lerp
//! - cubic Bezier value and derivative for one component
//! - find_t: invert the time component of a Bezier segment
//! - reparametrized blend used by keyframe segments

/// Bounds applied to tangent reparametrization ratios.
pub const RATIO_MIN: f32 = 0.01;
pub const RATIO_MAX: f32 = 100.0;

const FIND_T_TOLERANCE: f32 = 1e-6;
const FIND_T_ITERATIONS: usize = 24;

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

#[inline]
pub fn cubic_bezier_derivative(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * (p1 - p0) + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
}

/// Solve `cubic_bezier(x0, x1, x2, x3, t) == input` for t in [0,1].
///
/// Newton steps starting from the linear guess; whenever a step leaves the
/// current bracket (or the slope vanishes) the solver falls back to bisection.
/// Inputs at or outside the segment ends map to exactly 0 or 1.
pub fn find_t(x0: f32, x1: f32, x2: f32, x3: f32, input: f32) -> f32 {
    if input <= x0 {
        return 0.0;
    }
    if input >= x3 {
        return 1.0;
    }
    let span = x3 - x0;
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut t = ((input - x0) / span).clamp(0.0, 1.0);
    for _ in 0..FIND_T_ITERATIONS {
        let err = cubic_bezier(x0, x1, x2, x3, t) - input;
        if err.abs() < FIND_T_TOLERANCE * span.max(1.0) {
            break;
        }
        if err < 0.0 {
            lo = t;
        } else {
            hi = t;
        }
        let slope = cubic_bezier_derivative(x0, x1, x2, x3, t);
        let newton = if slope.abs() > f32::EPSILON {
            t - err / slope
        } else {
            f32::NAN
        };
        t = if newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }
    t
}

/// Ratios that rescale the tangent weights when the tangent time offsets do
/// not sit at one third of the segment. Both are clamped to
/// `[RATIO_MIN, RATIO_MAX]`.
pub fn reparam_ratios(t0: f32, out_x: f32, in_x: f32, t1: f32) -> (f32, f32) {
    let span = t1 - t0;
    let ratio = |d: f32| {
        let r = span / d;
        if r.is_finite() {
            r.clamp(RATIO_MIN, RATIO_MAX)
        } else {
            RATIO_MAX
        }
    };
    (ratio(out_x - t0), ratio(t1 - in_x))
}

/// `p0·(1-t)³ + br·p1·(1-t)²t + cr·p2·(1-t)t² + p3·t³`
#[inline]
pub fn bezier_blend(p0: f32, p1: f32, p2: f32, p3: f32, br: f32, cr: f32, t: f32) -> f32 {
    let ti = 1.0 - t;
    p0 * ti * ti * ti + br * p1 * ti * ti * t + cr * p2 * ti * t * t + p3 * t * t * t
}
