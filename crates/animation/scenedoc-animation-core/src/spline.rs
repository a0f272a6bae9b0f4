//! Geometric splines over control vertices, and conversions between the
//! linear, Bezier and NURBS representations.
//!
//! Bezier CV layout:
//! - open:   [P0, out0, in1, P1, out1, in2, P2, ...]; segment i is cvs[3i..3i+4]
//! - closed: [in0, P0, out0, in1, P1, out1, ...]; segment i is cvs[3i+1..3i+5]
//!   and the last segment wraps [P_last, out_last, in0, P0]
//!
//! Document layout:
//!   <geometry id=.. name=..>
//!     <spline closed="true|false">
//!       <source id="..-positions"/> <source id="..-weights"/> <source id="..-knots"/>
//!       <control_vertices>
//!         <input semantic="POSITION"/> <input semantic="WEIGHTS"/> <input semantic="KNOTS"/>
//!       </control_vertices>
//!       <extra><technique profile="FCOLLADA"><type>NURBS</type><degree>3</degree></technique></extra>
//!     </spline>
//!   </geometry>

use scenedoc_api_core::convert::parse_bool;
use scenedoc_api_core::node::VENDOR_PROFILE;
use scenedoc_api_core::{ErrorCode, ErrorSink, Node, Severity};
use serde::{Deserialize, Serialize};

use crate::data::Vec3;
use crate::error::LoadError;
use crate::source::{read_source, write_float_source};

/// Degree of the NURBS segments produced from Bezier splines.
pub const BEZIER_DEGREE: u32 = 3;
const BEZIER_KNOTS: [f32; 8] = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplineType {
    Linear,
    Bezier,
    Nurbs,
}

impl SplineType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "LINEAR" => Some(SplineType::Linear),
            "BEZIER" => Some(SplineType::Bezier),
            "NURBS" => Some(SplineType::Nurbs),
            _ => None,
        }
    }

    pub fn as_name(self) -> &'static str {
        match self {
            SplineType::Linear => "LINEAR",
            SplineType::Bezier => "BEZIER",
            SplineType::Nurbs => "NURBS",
        }
    }
}

/// Fields shared by every spline kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SplineBase {
    pub name: String,
    pub cvs: Vec<Vec3>,
    pub closed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearSpline {
    pub base: SplineBase,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BezierSpline {
    pub base: SplineBase,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NurbsSpline {
    pub base: SplineBase,
    pub degree: u32,
    pub weights: Vec<f32>,
    pub knots: Vec<f32>,
}

impl Default for NurbsSpline {
    fn default() -> Self {
        Self {
            base: SplineBase::default(),
            degree: BEZIER_DEGREE,
            weights: Vec::new(),
            knots: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Spline {
    Linear(LinearSpline),
    Bezier(BezierSpline),
    Nurbs(NurbsSpline),
}

impl LinearSpline {
    /// Append the equivalent Bezier control sequence to `out`: on an open
    /// spline boundary CVs appear twice and interior CVs three times
    /// (3n - 2 CVs); on a closed spline every CV appears three times (3n).
    pub fn to_bezier(&self, out: &mut BezierSpline) {
        let cvs = &self.base.cvs;
        let n = cvs.len();
        out.base.closed = self.base.closed;
        if n == 1 && !self.base.closed {
            out.base.cvs.push(cvs[0]);
            return;
        }
        for (i, cv) in cvs.iter().enumerate() {
            let boundary = !self.base.closed && (i == 0 || i == n - 1);
            let copies = if boundary { 2 } else { 3 };
            out.base.cvs.extend(std::iter::repeat(*cv).take(copies));
        }
    }
}

impl BezierSpline {
    pub fn segment_count(&self) -> usize {
        let len = self.base.cvs.len();
        if self.base.closed {
            len / 3
        } else if len >= 4 {
            (len - 1) / 3
        } else {
            0
        }
    }

    /// The four control points of segment `i`.
    pub fn segment(&self, i: usize) -> Option<[Vec3; 4]> {
        let count = self.segment_count();
        if i >= count {
            return None;
        }
        let cvs = &self.base.cvs;
        let len = cvs.len();
        let indices = if !self.base.closed {
            [3 * i, 3 * i + 1, 3 * i + 2, 3 * i + 3]
        } else if i + 1 < count {
            [3 * i + 1, 3 * i + 2, 3 * i + 3, 3 * i + 4]
        } else {
            [len - 2, len - 1, 0, 1]
        };
        Some(indices.map(|j| cvs[j]))
    }

    /// Point on segment `i` at parameter `t` in [0,1].
    pub fn evaluate(&self, i: usize, t: f32) -> Option<Vec3> {
        let [p0, p1, p2, p3] = self.segment(i)?;
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        Some(p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t))
    }

    /// Append one open degree-3 NURBS per Bezier segment to `out`.
    pub fn to_nurbs(&self, out: &mut Vec<NurbsSpline>) {
        for i in 0..self.segment_count() {
            if let Some(cvs) = self.segment(i) {
                out.push(NurbsSpline {
                    base: SplineBase {
                        name: self.base.name.clone(),
                        cvs: cvs.to_vec(),
                        closed: false,
                    },
                    degree: BEZIER_DEGREE,
                    weights: vec![1.0; 4],
                    knots: BEZIER_KNOTS.to_vec(),
                });
            }
        }
    }
}

impl NurbsSpline {
    /// `cvs == knots - degree - 1` and one weight per CV.
    pub fn is_consistent(&self) -> bool {
        let order = self.degree as usize + 1;
        self.knots.len() >= order
            && self.base.cvs.len() == self.knots.len() - order
            && self.weights.len() == self.base.cvs.len()
    }

    /// Like [`Self::is_consistent`], reporting `NurbsInvalid` on failure.
    pub fn is_valid(&self, sink: &mut ErrorSink) -> bool {
        let ok = self.is_consistent();
        if !ok {
            sink.report(Severity::Error, ErrorCode::NurbsInvalid, self.base.name.as_str());
        }
        ok
    }

    /// Point at parameter `u` (rational de Boor). `u` is clamped to the
    /// valid knot range. None for inconsistent splines.
    pub fn evaluate(&self, u: f32) -> Option<Vec3> {
        if !self.is_consistent() || self.base.cvs.is_empty() {
            return None;
        }
        let p = self.degree as usize;
        let n = self.base.cvs.len();
        if n <= p {
            return None;
        }
        let knots = &self.knots;
        let u = u.clamp(knots[p], knots[n]);

        // span k with knots[k] <= u < knots[k+1], kept inside [p, n-1]
        let mut k = p;
        while k + 1 < n && knots[k + 1] <= u {
            k += 1;
        }

        let mut d: Vec<[f32; 4]> = (0..=p)
            .map(|j| {
                let cv = self.base.cvs[j + k - p];
                let w = self.weights[j + k - p];
                [cv.x * w, cv.y * w, cv.z * w, w]
            })
            .collect();
        for r in 1..=p {
            for j in (r..=p).rev() {
                let lo = knots[j + k - p];
                let hi = knots[j + 1 + k - r];
                let alpha = if hi > lo { (u - lo) / (hi - lo) } else { 0.0 };
                let prev = d[j - 1];
                for (c, pc) in d[j].iter_mut().zip(prev) {
                    *c = (1.0 - alpha) * pc + alpha * *c;
                }
            }
        }
        let [x, y, z, w] = d[p];
        if w == 0.0 {
            return None;
        }
        Some(Vec3::new(x / w, y / w, z / w))
    }
}

impl Spline {
    pub fn spline_type(&self) -> SplineType {
        match self {
            Spline::Linear(_) => SplineType::Linear,
            Spline::Bezier(_) => SplineType::Bezier,
            Spline::Nurbs(_) => SplineType::Nurbs,
        }
    }

    pub fn base(&self) -> &SplineBase {
        match self {
            Spline::Linear(s) => &s.base,
            Spline::Bezier(s) => &s.base,
            Spline::Nurbs(s) => &s.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SplineBase {
        match self {
            Spline::Linear(s) => &mut s.base,
            Spline::Bezier(s) => &mut s.base,
            Spline::Nurbs(s) => &mut s.base,
        }
    }

    /// Load a `<geometry>` holding a `<spline>` (or a bare `<spline>`).
    pub fn load(node: &Node, sink: &mut ErrorSink) -> Result<Spline, LoadError> {
        let (name, spline) = if node.tag == "geometry" {
            let name = node
                .attribute("name")
                .or_else(|| node.id())
                .unwrap_or_default();
            match node.child("spline") {
                Some(s) => (name, s),
                None => return Err(LoadError::missing_element("spline", name)),
            }
        } else {
            (node.attribute("name").unwrap_or_default(), node)
        };

        let fatal = |sink: &mut ErrorSink, severity, code| -> Result<(), LoadError> {
            if sink.report(severity, code, name) {
                Err(LoadError::Aborted(code))
            } else {
                Ok(())
            }
        };

        let technique = spline.technique(VENDOR_PROFILE);
        let kind = match technique.and_then(|t| t.child("type")).map(|n| n.text()) {
            None => SplineType::Linear,
            Some(text) => match SplineType::from_name(text) {
                Some(kind) => kind,
                None => {
                    fatal(sink, Severity::Warning, ErrorCode::UnknownSplineType)?;
                    SplineType::Linear
                }
            },
        };
        let degree = technique
            .and_then(|t| t.child("degree"))
            .and_then(|n| n.text().parse::<u32>().ok())
            .unwrap_or(BEZIER_DEGREE);
        let closed = spline
            .attribute("closed")
            .and_then(parse_bool)
            .unwrap_or(false);

        let vertices = spline.child("control_vertices");
        let read = |semantic: &str| {
            vertices
                .and_then(|v| v.input(semantic))
                .and_then(|i| read_source(spline, i.source))
        };
        let Some(positions) = read("POSITION") else {
            fatal(sink, Severity::Error, ErrorCode::SplineMissingPositions)?;
            return Err(LoadError::missing_input("POSITION", name));
        };
        let cvs: Vec<Vec3> = positions
            .floats
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();

        let base = SplineBase {
            name: name.to_string(),
            cvs,
            closed,
        };
        let spline = match kind {
            SplineType::Linear => Spline::Linear(LinearSpline { base }),
            SplineType::Bezier => Spline::Bezier(BezierSpline { base }),
            SplineType::Nurbs => {
                let weights = read("WEIGHTS")
                    .map(|s| s.floats)
                    .unwrap_or_else(|| vec![1.0; base.cvs.len()]);
                let knots = read("KNOTS").map(|s| s.floats).unwrap_or_default();
                let nurbs = NurbsSpline {
                    base,
                    degree,
                    weights,
                    knots,
                };
                if !nurbs.is_consistent() {
                    fatal(sink, Severity::Error, ErrorCode::NurbsInvalid)?;
                }
                Spline::Nurbs(nurbs)
            }
        };
        log::debug!(
            "spline {name}: {} {} cv(s)",
            spline.spline_type().as_name(),
            spline.base().cvs.len()
        );
        Ok(spline)
    }

    /// Append a `<geometry>` element holding this spline.
    pub fn write(&self, parent: &mut Node) {
        let base = self.base();
        let id = if base.name.is_empty() {
            "spline".to_string()
        } else {
            base.name.replace(char::is_whitespace, "_")
        };
        let geometry = parent.add_child("geometry");
        geometry.set_attribute("id", &id);
        if !base.name.is_empty() {
            geometry.set_attribute("name", &base.name);
        }
        let spline = geometry.add_child("spline");
        spline.set_attribute("closed", base.closed);

        let positions: Vec<f32> = base.cvs.iter().flat_map(|v| v.to_array()).collect();
        write_float_source(spline, &format!("{id}-positions"), &positions, &["X", "Y", "Z"]);
        if let Spline::Nurbs(n) = self {
            write_float_source(spline, &format!("{id}-weights"), &n.weights, &["WEIGHT"]);
            write_float_source(spline, &format!("{id}-knots"), &n.knots, &["KNOT"]);
        }

        let vertices = spline.add_child("control_vertices");
        vertices.add_input("POSITION", &format!("#{id}-positions"));
        if let Spline::Nurbs(_) = self {
            vertices.add_input("WEIGHTS", &format!("#{id}-weights"));
            vertices.add_input("KNOTS", &format!("#{id}-knots"));
        }

        let technique = spline.technique_mut(VENDOR_PROFILE);
        technique.add_child_with_text("type", self.spline_type().as_name());
        if let Spline::Nurbs(n) = self {
            technique.add_child_with_text("degree", n.degree.to_string());
        }
    }
}
