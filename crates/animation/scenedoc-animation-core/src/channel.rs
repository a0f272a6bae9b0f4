//! Channels: the curves animating one target property, and their
//! decomposition from / reconstruction into sampler elements.
//!
//! Sampler layout read and written here:
//!   <sampler id="..">
//!     <input semantic="INPUT" source="#times"/>          time array, stride 1
//!     <input semantic="OUTPUT" source="#values"/>        interleaved, stride = curve count
//!     <input semantic="INTERPOLATION" source="#names"/>  Name_array
//!     <input semantic="IN_TANGENT" .../> <input semantic="OUT_TANGENT" .../>
//!     <input semantic="TCB" .../> <input semantic="EASE_IN_OUT" .../>
//!     <extra><technique profile="FCOLLADA">
//!       <pre_infinity>..</pre_infinity> <post_infinity>..</post_infinity> <driver>..</driver>
//!     </technique></extra>
//!   </sampler>
//!   <channel source="#sampler" target="node/property.Q"/>

use scenedoc_api_core::convert::parse_matrix_element;
use scenedoc_api_core::node::VENDOR_PROFILE;
use scenedoc_api_core::{ErrorCode, ErrorSink, Node, Severity, TargetPath};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::context::LoadContext;
use crate::curve::{Curve, CurveDriver, Extrapolation};
use crate::data::Vec2;
use crate::document::AnimatedValue;
use crate::error::{LoadError, MergeRejection};
use crate::ids::{AnimatedHandle, CurveId};
use crate::keyframe::{flat_tangents, Interpolation, Keyframe, TcbParams};
use crate::merge::check_mergeable;
use crate::multi_curve::{MKeyShape, MultiCurve};
use crate::source::{read_source, write_float_source, write_name_source, SourceData};

/// Value registered for one curve before export, used to fill dimensions a
/// merged key does not carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefaultValue {
    pub curve: CurveId,
    pub value: f32,
    pub qualifier: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub curves: Vec<Curve>,
    pub target_pointer: String,
    pub target_element: Option<u32>,
    pub target_qualifier: String,
    /// Target pointer of the driving value; empty when not driven.
    pub driver_pointer: String,
    /// Component of the driving value; -1 when not driven.
    pub driver_qualifier: i32,
    #[serde(skip)]
    default_values: Vec<DefaultValue>,
}

/// Sources referenced by a sampler, classified by semantic.
#[derive(Default)]
struct SamplerInputs {
    input: Option<SourceData>,
    output: Option<SourceData>,
    interpolation: Option<SourceData>,
    in_tangent: Option<SourceData>,
    out_tangent: Option<SourceData>,
    tcb: Option<SourceData>,
    ease: Option<SourceData>,
    driver: Option<String>,
}

impl Channel {
    pub fn new(target: &TargetPath) -> Self {
        Self {
            curves: Vec::new(),
            target_pointer: target.pointer.clone(),
            target_element: target.element,
            target_qualifier: target.qualifier.clone(),
            driver_pointer: String::new(),
            driver_qualifier: -1,
            default_values: Vec::new(),
        }
    }

    pub fn target(&self) -> TargetPath {
        TargetPath::new(
            self.target_pointer.clone(),
            self.target_element,
            self.target_qualifier.clone(),
        )
    }

    pub fn is_driven(&self) -> bool {
        !self.driver_pointer.is_empty()
    }

    pub fn curve(&self, id: CurveId) -> Option<&Curve> {
        self.curves.iter().find(|c| c.id() == id)
    }

    pub fn curve_mut(&mut self, id: CurveId) -> Option<&mut Curve> {
        self.curves.iter_mut().find(|c| c.id() == id)
    }

    /// Load a `<channel>` element whose sampler and sources live in `scope`.
    pub fn load(node: &Node, scope: &Node, ctx: &mut LoadContext<'_>) -> Result<Channel, LoadError> {
        let target_text = node.attribute("target").unwrap_or_default();
        let target = match TargetPath::parse(target_text) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("channel target {target_text:?}: {e}");
                return Err(ctx.fail(
                    ErrorCode::InvalidChannelTarget,
                    target_text,
                    LoadError::missing_element("channel target", target_text),
                ));
            }
        };

        let sampler_url = node.attribute("source").unwrap_or_default();
        let Some(sampler) = scope
            .find_by_id(sampler_url)
            .filter(|n| n.tag == "sampler")
        else {
            return Err(ctx.fail(
                ErrorCode::MissingSampler,
                sampler_url,
                LoadError::missing_element("sampler", sampler_url),
            ));
        };
        let location = sampler.id().unwrap_or(sampler_url).to_string();

        let inputs = Self::classify_inputs(sampler, scope, &location, ctx)?;
        let (Some(input), Some(output)) = (inputs.input.as_ref(), inputs.output.as_ref()) else {
            let semantic = if inputs.input.is_none() { "INPUT" } else { "OUTPUT" };
            return Err(ctx.fail(
                ErrorCode::MissingSamplerInput,
                &location,
                LoadError::missing_input(semantic, location.clone()),
            ));
        };

        let mut channel = Channel::new(&target);
        let curve_count = output.stride.max(1);
        for d in 0..curve_count {
            let mut curve = Curve::new(ctx.ids.alloc_curve());
            curve.target_element = target.element;
            curve.target_qualifier = if curve_count == 1 {
                target.qualifier.clone()
            } else {
                match output.params.get(d) {
                    Some(name) if !name.is_empty() => format!(".{name}"),
                    _ => format!("({d})"),
                }
            };
            channel.curves.push(curve);
        }

        let times: Vec<f32> = input.floats.iter().step_by(input.stride).copied().collect();
        log::debug!(
            "channel {}: {} curve(s), {} key(s)",
            target,
            curve_count,
            times.len()
        );
        if times.is_empty() {
            return Ok(channel);
        }
        let key_count = times.len();

        let mut kinds: Vec<Interpolation> = inputs
            .interpolation
            .as_ref()
            .map(|s| s.names.iter().map(|n| Interpolation::from_name(n)).collect())
            .unwrap_or_default();
        if kinds.len() < key_count {
            ctx.warn(ErrorCode::InsufficientInterpolation, &location)?;
            kinds.resize(key_count, Interpolation::from_name(""));
        }

        if output.floats.len() < key_count * curve_count {
            ctx.warn(ErrorCode::InsufficientOutput, &location)?;
        }
        for (d, curve) in channel.curves.iter_mut().enumerate() {
            for (k, &time) in times.iter().enumerate() {
                let value = output
                    .floats
                    .get(k * curve_count + d)
                    .copied()
                    .unwrap_or(0.0);
                let mut key = Keyframe::new(kinds[k], time, value);
                if let Some((inn, out)) = key.tangents_mut() {
                    let prev = if k > 0 { times[k - 1] } else { time - 1.0 };
                    let next = times.get(k + 1).copied().unwrap_or(time + 1.0);
                    (*inn, *out) = flat_tangents(prev, time, next, value);
                }
                if let Some(p) = key.tcb_mut() {
                    *p = TcbParams::default();
                }
                curve.push_key(key);
            }
        }

        channel.apply_tangents(inputs.in_tangent.as_ref(), true, &location, ctx)?;
        channel.apply_tangents(inputs.out_tangent.as_ref(), false, &location, ctx)?;
        channel.apply_tcb(inputs.tcb.as_ref(), inputs.ease.as_ref(), &location, ctx)?;
        channel.apply_vendor(sampler, inputs.driver, &location, ctx)?;

        for curve in &mut channel.curves {
            curve.clear_dirty();
        }
        Ok(channel)
    }

    fn classify_inputs(
        sampler: &Node,
        scope: &Node,
        location: &str,
        ctx: &mut LoadContext<'_>,
    ) -> Result<SamplerInputs, LoadError> {
        let mut out = SamplerInputs::default();
        for input in sampler.inputs() {
            if input.semantic == "DRIVER" {
                let source = input.source.strip_prefix('#').unwrap_or(input.source);
                out.driver = Some(source.to_string());
                continue;
            }
            let slot = match input.semantic {
                "INPUT" => &mut out.input,
                "OUTPUT" => &mut out.output,
                "INTERPOLATION" => &mut out.interpolation,
                "IN_TANGENT" => &mut out.in_tangent,
                "OUT_TANGENT" => &mut out.out_tangent,
                "TCB" => &mut out.tcb,
                "EASE_IN_OUT" => &mut out.ease,
                other => {
                    ctx.debug(ErrorCode::UnknownInputSemantic, other)?;
                    continue;
                }
            };
            match read_source(scope, input.source) {
                Some(data) => *slot = Some(data),
                None => {
                    let required = matches!(input.semantic, "INPUT" | "OUTPUT");
                    let severity = if required {
                        Severity::Error
                    } else {
                        Severity::Warning
                    };
                    ctx.report(severity, ErrorCode::MissingSource, input.source)?;
                    log::debug!("{location}: unresolved {} source", input.semantic);
                }
            }
        }
        Ok(out)
    }

    fn apply_tangents(
        &mut self,
        source: Option<&SourceData>,
        incoming: bool,
        location: &str,
        ctx: &mut LoadContext<'_>,
    ) -> Result<(), LoadError> {
        let Some(source) = source else {
            return Ok(());
        };
        let cc = self.curves.len();
        let legacy = source.stride == cc;
        if !legacy && source.stride != cc * 2 {
            return ctx.warn(ErrorCode::TangentStrideMismatch, location);
        }
        for (d, curve) in self.curves.iter_mut().enumerate() {
            for (k, key) in curve.keys_mut().iter_mut().enumerate() {
                let value = key.value;
                let Some((inn, out)) = key.tangents_mut() else {
                    continue;
                };
                let tangent = if incoming { inn } else { out };
                if legacy {
                    let Some(&provided) = source.floats.get(k * cc + d) else {
                        continue;
                    };
                    tangent.y = if incoming {
                        value - provided
                    } else {
                        value + provided
                    };
                } else {
                    let base = (k * cc + d) * 2;
                    if let (Some(&x), Some(&y)) =
                        (source.floats.get(base), source.floats.get(base + 1))
                    {
                        *tangent = Vec2::new(x, y);
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_tcb(
        &mut self,
        tcb: Option<&SourceData>,
        ease: Option<&SourceData>,
        location: &str,
        ctx: &mut LoadContext<'_>,
    ) -> Result<(), LoadError> {
        let cc = self.curves.len();
        let tcb = match tcb {
            Some(s) if s.stride != cc * 3 => {
                ctx.warn(ErrorCode::TcbStrideMismatch, location)?;
                None
            }
            other => other,
        };
        let ease = match ease {
            Some(s) if s.stride != cc * 2 => {
                ctx.warn(ErrorCode::TcbStrideMismatch, location)?;
                None
            }
            other => other,
        };
        if tcb.is_none() && ease.is_none() {
            return Ok(());
        }
        for (d, curve) in self.curves.iter_mut().enumerate() {
            for (k, key) in curve.keys_mut().iter_mut().enumerate() {
                let Some(p) = key.tcb_mut() else {
                    continue;
                };
                let slot = k * cc + d;
                if let Some(v) = tcb.and_then(|s| s.floats.get(slot * 3..slot * 3 + 3)) {
                    p.tension = v[0];
                    p.continuity = v[1];
                    p.bias = v[2];
                }
                if let Some(v) = ease.and_then(|s| s.floats.get(slot * 2..slot * 2 + 2)) {
                    p.ease_in = v[0];
                    p.ease_out = v[1];
                }
            }
        }
        Ok(())
    }

    /// Vendor infinity parameters and driver reference.
    fn apply_vendor(
        &mut self,
        sampler: &Node,
        input_driver: Option<String>,
        location: &str,
        ctx: &mut LoadContext<'_>,
    ) -> Result<(), LoadError> {
        let technique = sampler.technique(VENDOR_PROFILE);
        let pre = read_infinity(technique, "pre_infinity", location, ctx)?;
        let post = read_infinity(technique, "post_infinity", location, ctx)?;
        for curve in &mut self.curves {
            curve.pre_infinity = pre;
            curve.post_infinity = post;
        }

        let driver = technique
            .and_then(|t| t.child("driver"))
            .map(|n| n.text().to_string())
            .filter(|s| !s.is_empty())
            .or(input_driver);
        if let Some(driver) = driver {
            let (pointer, qualifier) = match TargetPath::parse(&driver) {
                Ok(path) => {
                    // "(e).field" keeps the element as the selecting index
                    let qualifier = match path.element {
                        Some(e) if path.qualifier.starts_with('.') => format!("({e})"),
                        _ => path.qualifier,
                    };
                    (path.pointer, qualifier)
                }
                Err(_) => (driver.clone(), String::new()),
            };
            let index = if qualifier.is_empty() {
                0
            } else {
                match parse_matrix_element(&qualifier) {
                    Some(i) => i as i32,
                    None => {
                        ctx.warn(ErrorCode::DriverQualifierUnparsed, &driver)?;
                        0
                    }
                }
            };
            self.driver_pointer = pointer;
            self.driver_qualifier = index;
        }
        Ok(())
    }

    /// Give every curve `handle` as driver when `candidate` is the value this
    /// channel's driver pointer names and the qualifier indexes one of its
    /// components.
    pub fn link_driver(&mut self, handle: AnimatedHandle, candidate: &AnimatedValue) -> bool {
        if !self.is_driven() || candidate.pointer != self.driver_pointer {
            return false;
        }
        let Ok(component) = usize::try_from(self.driver_qualifier) else {
            return false;
        };
        if component >= candidate.values.len() {
            return false;
        }
        for curve in &mut self.curves {
            curve.set_driver(Some(CurveDriver { handle, component }));
        }
        true
    }

    /// False (and an `AnimCurveDriverMissing` error) when a driver was named
    /// but never linked.
    pub fn check_driver(&self, sink: &mut ErrorSink) -> bool {
        if !self.is_driven() {
            return true;
        }
        match self.curves.first() {
            Some(first) if !first.has_driver() => {
                sink.report(
                    Severity::Error,
                    ErrorCode::AnimCurveDriverMissing,
                    self.driver_pointer.as_str(),
                );
                false
            }
            _ => true,
        }
    }

    /// Register the value used for `curve` when filling merged keys.
    pub fn set_default_value(&mut self, curve: CurveId, value: f32, qualifier: impl Into<String>) {
        let qualifier = qualifier.into();
        match self.default_values.iter_mut().find(|d| d.curve == curve) {
            Some(existing) => {
                existing.value = value;
                existing.qualifier = qualifier;
            }
            None => self.default_values.push(DefaultValue {
                curve,
                value,
                qualifier,
            }),
        }
    }

    pub fn default_values(&self) -> &[DefaultValue] {
        &self.default_values
    }

    pub fn clear_default_values(&mut self) {
        self.default_values.clear();
    }

    fn defaults(&self) -> Vec<Option<f32>> {
        self.curves
            .iter()
            .map(|c| {
                self.default_values
                    .iter()
                    .find(|d| d.curve == c.id())
                    .map(|d| d.value)
            })
            .collect()
    }

    /// Outcome of the merge analysis for the current curves and defaults.
    pub fn check_mergeable(&self, tolerance: f32) -> Result<(), MergeRejection> {
        let curves: Vec<Option<&Curve>> = self.curves.iter().map(Some).collect();
        check_mergeable(&curves, &self.defaults(), tolerance)
    }

    /// All curves as one MultiCurve, for evaluation. Unregistered defaults are 0.
    pub fn to_multi_curve(&self, config: &Config) -> MultiCurve {
        let curves: Vec<Option<&Curve>> = self.curves.iter().map(Some).collect();
        let defaults: Vec<f32> = self.defaults().into_iter().map(Option::unwrap_or_default).collect();
        MultiCurve::merge(&curves, &defaults, config.merge_tolerance, config.eval_mode)
    }

    /// Write sources, sampler(s) and channel element(s) into `parent`.
    ///
    /// Compatible curves (see [`Self::check_mergeable`]) share one sampler;
    /// otherwise each curve gets its own. Registered default values are
    /// cleared afterwards.
    pub fn write(&mut self, parent: &mut Node, config: &Config) {
        let base = self.target_pointer.replace('/', "-");
        let driver = self
            .is_driven()
            .then(|| format!("{}({})", self.driver_pointer, self.driver_qualifier.max(0)));

        let merged = match self.curves.len() {
            0 => {
                self.default_values.clear();
                return;
            }
            1 => false,
            _ => match self.check_mergeable(config.merge_tolerance) {
                Ok(()) => true,
                Err(reason) => {
                    log::debug!("{}: writing curves separately ({reason})", self.target_pointer);
                    false
                }
            },
        };

        if merged {
            let curves: Vec<Option<&Curve>> = self.curves.iter().map(Some).collect();
            let defaults: Vec<f32> = self.defaults().into_iter().flatten().collect();
            let mc = MultiCurve::merge(&curves, &defaults, config.merge_tolerance, config.eval_mode);
            write_sampler(parent, &base, &mc, driver.as_deref());
            write_channel(parent, &base, &self.target());
        } else {
            let single = self.curves.len() == 1;
            for (i, curve) in self.curves.iter().enumerate() {
                let id = if single {
                    base.clone()
                } else {
                    curve_id(&base, curve.target_element, &curve.target_qualifier, i)
                };
                let target = TargetPath::new(
                    self.target_pointer.clone(),
                    curve.target_element,
                    curve.target_qualifier.clone(),
                );
                write_sampler(parent, &id, &MultiCurve::from_curve(curve), driver.as_deref());
                write_channel(parent, &id, &target);
            }
        }
        self.default_values.clear();
    }
}

fn read_infinity(
    technique: Option<&Node>,
    tag: &str,
    location: &str,
    ctx: &mut LoadContext<'_>,
) -> Result<Extrapolation, LoadError> {
    let Some(text) = technique.and_then(|t| t.child(tag)).map(|n| n.text()) else {
        return Ok(Extrapolation::Constant);
    };
    match Extrapolation::from_name(text) {
        Some(kind) => Ok(kind),
        None => {
            ctx.warn(ErrorCode::UnknownInfinity, location)?;
            Ok(Extrapolation::Constant)
        }
    }
}

/// Unique per-curve id built from the channel base id, the optional target
/// element and the qualifier with separators turned into '-'.
fn curve_id(base: &str, element: Option<u32>, qualifier: &str, index: usize) -> String {
    let mut id = base.to_string();
    if let Some(e) = element {
        id.push_str(&format!("-{e}"));
    }
    let parts: Vec<&str> = qualifier
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        id.push_str(&format!("-{index}"));
    } else {
        for p in parts {
            id.push('-');
            id.push_str(p);
        }
    }
    id
}

fn write_channel(parent: &mut Node, id: &str, target: &TargetPath) {
    parent
        .add_child("channel")
        .set_attribute("source", format!("#{id}-sampler"))
        .set_attribute("target", target);
}

fn write_sampler(parent: &mut Node, id: &str, mc: &MultiCurve, driver: Option<&str>) {
    let dim = mc.dimension();
    let keys = mc.keys();

    let times: Vec<f32> = keys.iter().map(|k| k.time).collect();
    write_float_source(parent, &format!("{id}-input"), &times, &["TIME"]);

    let outputs: Vec<f32> = keys.iter().flat_map(|k| k.outputs.iter().copied()).collect();
    let names: Vec<&str> = mc
        .target_qualifiers
        .iter()
        .map(|q| if dim == 1 { "" } else { q.strip_prefix('.').unwrap_or("") })
        .collect();
    let params: Vec<&str> = if dim == 1 { vec!["VALUE"] } else { names };
    write_float_source(parent, &format!("{id}-output"), &outputs, &params);

    let kinds: Vec<&str> = keys.iter().map(|k| k.interpolation().as_name()).collect();
    write_name_source(parent, &format!("{id}-interpolation"), &kinds, "INTERPOLATION");

    let has_bezier = keys.iter().any(|k| k.interpolation() == Interpolation::Bezier);
    let has_tcb = keys.iter().any(|k| k.interpolation() == Interpolation::Tcb);

    if has_bezier {
        let mut ins = Vec::with_capacity(keys.len() * dim * 2);
        let mut outs = Vec::with_capacity(keys.len() * dim * 2);
        for k in keys {
            for d in 0..dim {
                let (inn, out) = match &k.shape {
                    MKeyShape::Bezier {
                        in_tangents,
                        out_tangents,
                    } => (in_tangents[d], out_tangents[d]),
                    _ => {
                        let on_key = Vec2::new(k.time, k.outputs[d]);
                        (on_key, on_key)
                    }
                };
                ins.extend([inn.x, inn.y]);
                outs.extend([out.x, out.y]);
            }
        }
        let params: Vec<&str> = (0..dim).flat_map(|_| ["X", "Y"]).collect();
        write_float_source(parent, &format!("{id}-intangent"), &ins, &params);
        write_float_source(parent, &format!("{id}-outtangent"), &outs, &params);
    }

    if has_tcb {
        let mut tcb = Vec::with_capacity(keys.len() * dim * 3);
        let mut ease = Vec::with_capacity(keys.len() * dim * 2);
        for k in keys {
            for d in 0..dim {
                let p = match &k.shape {
                    MKeyShape::Tcb { params } => params[d],
                    _ => TcbParams::ZERO,
                };
                tcb.extend([p.tension, p.continuity, p.bias]);
                ease.extend([p.ease_in, p.ease_out]);
            }
        }
        let tcb_params: Vec<&str> = (0..dim)
            .flat_map(|_| ["TENSION", "CONTINUITY", "BIAS"])
            .collect();
        let ease_params: Vec<&str> = (0..dim).flat_map(|_| ["EASE_IN", "EASE_OUT"]).collect();
        write_float_source(parent, &format!("{id}-tcb"), &tcb, &tcb_params);
        write_float_source(parent, &format!("{id}-ease"), &ease, &ease_params);
    }

    let sampler = parent.add_child("sampler");
    sampler.set_attribute("id", format!("{id}-sampler"));
    sampler.add_input("INPUT", &format!("#{id}-input"));
    sampler.add_input("OUTPUT", &format!("#{id}-output"));
    sampler.add_input("INTERPOLATION", &format!("#{id}-interpolation"));
    if has_bezier {
        sampler.add_input("IN_TANGENT", &format!("#{id}-intangent"));
        sampler.add_input("OUT_TANGENT", &format!("#{id}-outtangent"));
    }
    if has_tcb {
        sampler.add_input("TCB", &format!("#{id}-tcb"));
        sampler.add_input("EASE_IN_OUT", &format!("#{id}-ease"));
    }

    let pre = mc.pre_infinity;
    let post = mc.post_infinity;
    if pre != Extrapolation::Constant || post != Extrapolation::Constant || driver.is_some() {
        let technique = sampler.technique_mut(VENDOR_PROFILE);
        technique.add_child_with_text("pre_infinity", pre.as_name());
        technique.add_child_with_text("post_infinity", post.as_name());
        if let Some(driver) = driver {
            technique.add_child_with_text("driver", driver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_ids_are_sanitized() {
        assert_eq!(curve_id("cube-translate", None, ".X", 0), "cube-translate-X");
        assert_eq!(curve_id("cube-transform", None, "(1)(2)", 6), "cube-transform-1-2");
        assert_eq!(curve_id("morph-w", Some(2), ".weight", 0), "morph-w-2-weight");
        assert_eq!(curve_id("light-color", None, "", 1), "light-color-1");
    }

    #[test]
    fn defaults_replace_by_curve() {
        let mut ch = Channel::new(&TargetPath::parse("cube/translate").unwrap());
        ch.set_default_value(CurveId(1), 1.0, ".X");
        ch.set_default_value(CurveId(1), 2.0, ".X");
        assert_eq!(ch.default_values().len(), 1);
        assert_eq!(ch.default_values()[0].value, 2.0);
        ch.clear_default_values();
        assert!(ch.default_values().is_empty());
    }

    #[test]
    fn check_driver_reports_unlinked() {
        let mut ch = Channel::new(&TargetPath::parse("cube/translate.X").unwrap());
        ch.curves.push(Curve::new(CurveId(0)));
        let mut sink = ErrorSink::default();
        assert!(ch.check_driver(&mut sink));

        ch.driver_pointer = "ctrl/slider".into();
        ch.driver_qualifier = 1;
        assert!(!ch.check_driver(&mut sink));
        assert!(sink.contains(ErrorCode::AnimCurveDriverMissing));

        let handle = AnimatedHandle {
            index: 0,
            generation: 0,
        };
        let short = AnimatedValue {
            pointer: "ctrl/slider".into(),
            values: vec![0.0],
        };
        assert!(!ch.link_driver(handle, &short));
        let ok = AnimatedValue {
            pointer: "ctrl/slider".into(),
            values: vec![0.0, 0.5],
        };
        assert!(ch.link_driver(handle, &ok));
        assert_eq!(ch.curves[0].driver().map(|d| d.component), Some(1));
        assert!(ch.check_driver(&mut sink));
    }
}
