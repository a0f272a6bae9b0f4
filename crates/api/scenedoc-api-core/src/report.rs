//! Error facility shared by the document engines.
//!
//! Loaders never abort the process. Every recoverable problem is pushed into an
//! [`ErrorSink`] that the caller owns and threads through each call; the sink
//! answers whether the reported severity meets its fatal threshold so the
//! caller can decide to stop the current operation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Warning,
    Error,
}

impl Severity {
    fn log_level(self) -> log::Level {
        match self {
            Severity::Debug => log::Level::Debug,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Debug => "debug",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Fixed catalogue of reportable conditions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    MissingSampler = 1,
    MissingSamplerInput = 2,
    MissingSource = 3,
    InsufficientInterpolation = 4,
    InsufficientOutput = 5,
    TangentStrideMismatch = 6,
    TcbStrideMismatch = 7,
    UnknownInfinity = 8,
    DriverQualifierUnparsed = 9,
    AnimCurveDriverMissing = 10,
    ClipWindowEmpty = 11,
    ClipInstanceEmpty = 12,
    ClipEmpty = 13,
    ClipAnimationMissing = 14,
    NurbsInvalid = 15,
    UnknownSplineType = 16,
    SplineMissingPositions = 17,
    InvalidChannelTarget = 18,
    UnknownInputSemantic = 19,
}

impl ErrorCode {
    const ALL: [ErrorCode; 19] = [
        ErrorCode::MissingSampler,
        ErrorCode::MissingSamplerInput,
        ErrorCode::MissingSource,
        ErrorCode::InsufficientInterpolation,
        ErrorCode::InsufficientOutput,
        ErrorCode::TangentStrideMismatch,
        ErrorCode::TcbStrideMismatch,
        ErrorCode::UnknownInfinity,
        ErrorCode::DriverQualifierUnparsed,
        ErrorCode::AnimCurveDriverMissing,
        ErrorCode::ClipWindowEmpty,
        ErrorCode::ClipInstanceEmpty,
        ErrorCode::ClipEmpty,
        ErrorCode::ClipAnimationMissing,
        ErrorCode::NurbsInvalid,
        ErrorCode::UnknownSplineType,
        ErrorCode::SplineMissingPositions,
        ErrorCode::InvalidChannelTarget,
        ErrorCode::UnknownInputSemantic,
    ];

    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_u32(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::MissingSampler => "Unable to find the sampler referenced by an animation channel.",
            ErrorCode::MissingSamplerInput => "Animation sampler is missing its INPUT or OUTPUT source.",
            ErrorCode::MissingSource => "Unable to resolve the source referenced by a sampler input.",
            ErrorCode::InsufficientInterpolation => {
                "Not enough interpolation values for the keys: defaulting the remainder."
            }
            ErrorCode::InsufficientOutput => "Not enough output values for the keys: padding with zeros.",
            ErrorCode::TangentStrideMismatch => {
                "Tangent source stride does not match the curve count: tangents ignored."
            }
            ErrorCode::TcbStrideMismatch => {
                "TCB or ease source stride does not match the curve count: parameters ignored."
            }
            ErrorCode::UnknownInfinity => "Unknown pre/post infinity type: defaulting to constant.",
            ErrorCode::DriverQualifierUnparsed => {
                "Unable to parse the driver qualifier: driving from component 0."
            }
            ErrorCode::AnimCurveDriverMissing => "Unable to find the driver of an animation curve.",
            ErrorCode::ClipWindowEmpty => "Animation clip has a zero-length time window.",
            ErrorCode::ClipInstanceEmpty => "Animation instantiated by a clip contains no curves.",
            ErrorCode::ClipEmpty => "Animation clip contains no curves.",
            ErrorCode::ClipAnimationMissing => "Unable to find the animation instantiated by a clip.",
            ErrorCode::NurbsInvalid => {
                "Invalid NURBS spline: control vertex, weight and knot counts disagree."
            }
            ErrorCode::UnknownSplineType => "Unknown spline type: defaulting to linear.",
            ErrorCode::SplineMissingPositions => "Spline has no control vertex positions.",
            ErrorCode::InvalidChannelTarget => "Unable to parse the target of an animation channel.",
            ErrorCode::UnknownInputSemantic => "Ignoring input with an unknown semantic.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Human-readable text for a raw code number.
pub fn describe_code(code: u32) -> String {
    match ErrorCode::from_u32(code) {
        Some(c) => c.message().to_string(),
        None => format!("Unknown error code: {code}"),
    }
}

/// One recorded report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub severity: Severity,
    pub code: ErrorCode,
    /// Element id, target path or other locator; may be empty.
    pub location: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "[{}] {}", self.severity, self.code)
        } else {
            write!(f, "[{}] {} ({})", self.severity, self.code, self.location)
        }
    }
}

/// Collects reports for one load/write pass.
#[derive(Clone, Debug)]
pub struct ErrorSink {
    /// `None` never reports anything as fatal.
    fatal_level: Option<Severity>,
    reports: Vec<Report>,
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new(Severity::Error)
    }
}

impl ErrorSink {
    pub fn new(fatal_level: Severity) -> Self {
        Self {
            fatal_level: Some(fatal_level),
            reports: Vec::new(),
        }
    }

    /// A sink that collects everything and never asks the caller to stop.
    pub fn lenient() -> Self {
        Self {
            fatal_level: None,
            reports: Vec::new(),
        }
    }

    pub fn fatal_level(&self) -> Option<Severity> {
        self.fatal_level
    }

    pub fn set_fatal_level(&mut self, level: Option<Severity>) {
        self.fatal_level = level;
    }

    /// Record a report. Returns true when `severity` meets or exceeds the fatal threshold.
    pub fn report(&mut self, severity: Severity, code: ErrorCode, location: impl Into<String>) -> bool {
        let report = Report {
            severity,
            code,
            location: location.into(),
        };
        log::log!(severity.log_level(), "{report}");
        self.reports.push(report);
        self.fatal_level.is_some_and(|fatal| severity >= fatal)
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.reports.iter().filter(|r| r.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// True if any report carries `code`.
    pub fn contains(&self, code: ErrorCode) -> bool {
        self.reports.iter().any(|r| r.code == code)
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}
