//! scenedoc Animation Core (engine-agnostic)
//!
//! Animation curves and splines of an interchange document: keyframes with
//! step/linear/Bezier/TCB payloads, scalar and multi-dimensional curves,
//! channels decomposed from sampled inputs, merge analysis for export,
//! clips over curve subsets, and linear/Bezier/NURBS splines.

pub mod animation;
pub mod baking;
pub mod channel;
pub mod clip;
pub mod config;
pub mod context;
pub mod curve;
pub mod data;
pub mod document;
pub mod error;
pub mod ids;
pub mod interp;
pub mod keyframe;
pub mod merge;
pub mod multi_curve;
pub mod sampling;
pub mod source;
pub mod spline;

// Re-exports for consumers
pub use animation::Animation;
pub use baking::{
    bake_clip, bake_clips, bake_curve, bake_multi_curve, BakedClip, BakedCurve, BakedMultiCurve,
    BakingConfig,
};
pub use channel::Channel;
pub use clip::Clip;
pub use config::{Config, EvalMode};
pub use context::LoadContext;
pub use curve::{Curve, CurveDriver, Extrapolation};
pub use data::{Vec2, Vec3};
pub use document::{AnimatedValue, Document};
pub use error::{LoadError, MergeRejection};
pub use ids::{AnimatedHandle, ClipId, CurveId, IdAllocator};
pub use keyframe::{Interpolation, KeyShape, Keyframe, TcbParams};
pub use merge::check_mergeable;
pub use multi_curve::{MKeyframe, MultiCurve};
pub use spline::{BezierSpline, LinearSpline, NurbsSpline, Spline, SplineBase, SplineType};
pub use scenedoc_api_core::{ErrorCode, ErrorSink, Node, Severity, TargetPath};
