//! Animation clips: named time windows over a subset of curves.
//!
//! A clip never owns curves. It keeps their ids; curves destroyed elsewhere
//! simply stop resolving.

use scenedoc_api_core::convert::{float_to_text, parse_float};
use scenedoc_api_core::{ErrorCode, Node};
use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::context::LoadContext;
use crate::curve::Curve;
use crate::document::Document;
use crate::error::LoadError;
use crate::ids::{ClipId, CurveId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    id: ClipId,
    /// Document element id.
    pub element_id: String,
    pub name: String,
    pub start: f32,
    pub end: f32,
    curves: Vec<CurveId>,
}

impl Clip {
    pub fn new(id: ClipId, element_id: impl Into<String>) -> Self {
        Self {
            id,
            element_id: element_id.into(),
            name: String::new(),
            start: 0.0,
            end: 0.0,
            curves: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn curve_ids(&self) -> &[CurveId] {
        &self.curves
    }

    pub fn contains(&self, curve: CurveId) -> bool {
        self.curves.contains(&curve)
    }

    /// Add a curve unless already present. Returns true if it was added.
    pub fn add_curve(&mut self, curve: CurveId) -> bool {
        if self.contains(curve) {
            return false;
        }
        self.curves.push(curve);
        true
    }

    pub fn remove_curve(&mut self, curve: CurveId) -> bool {
        let before = self.curves.len();
        self.curves.retain(|c| *c != curve);
        self.curves.len() != before
    }

    /// Curves that still exist in `doc`, in clip order.
    pub fn curves<'d>(&self, doc: &'d Document) -> Vec<&'d Curve> {
        self.curves
            .iter()
            .filter_map(|id| doc.find_curve(*id))
            .collect()
    }

    /// Forget ids whose curves no longer exist. Returns how many were dropped.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.curves.len();
        self.curves.retain(|id| doc.find_curve(*id).is_some());
        before - self.curves.len()
    }

    /// Load an `<animation_clip>`, resolving each `instance_animation` among
    /// `animations` (searched recursively).
    pub fn load(
        node: &Node,
        animations: &[Animation],
        ctx: &mut LoadContext<'_>,
    ) -> Result<Clip, LoadError> {
        let element_id = node.id().unwrap_or_default().to_string();
        let mut clip = Clip::new(ctx.ids.alloc_clip(), element_id.clone());
        clip.name = node.attribute("name").unwrap_or_default().to_string();
        clip.start = parse_time(node.attribute("start"));
        clip.end = parse_time(node.attribute("end"));
        if clip.end - clip.start < ctx.config.clip_window_epsilon {
            ctx.warn(ErrorCode::ClipWindowEmpty, &element_id)?;
        }

        for instance in node.children_named("instance_animation") {
            let url = instance.attribute("url").unwrap_or_default();
            let id = url.strip_prefix('#').unwrap_or(url);
            let Some(animation) = animations.iter().find_map(|a| a.find(id)) else {
                ctx.warn(ErrorCode::ClipAnimationMissing, url)?;
                continue;
            };
            let ids = animation.curve_ids();
            if ids.is_empty() {
                ctx.warn(ErrorCode::ClipInstanceEmpty, url)?;
                continue;
            }
            for curve in ids {
                clip.add_curve(curve);
            }
        }

        if clip.curves.is_empty() {
            ctx.warn(ErrorCode::ClipEmpty, &element_id)?;
        }
        log::debug!("clip {}: {} curve(s)", element_id, clip.curves.len());
        Ok(clip)
    }

    /// Append an `<animation_clip>` with one `instance_animation` per
    /// animation owning at least one of this clip's live curves.
    pub fn write(&self, parent: &mut Node, doc: &Document) {
        let mut owners: Vec<&str> = Vec::new();
        for curve in &self.curves {
            if let Some(owner) = doc.owner_of(*curve) {
                if !owners.contains(&owner.id.as_str()) {
                    owners.push(owner.id.as_str());
                }
            }
        }
        let node = parent.add_child("animation_clip");
        if !self.element_id.is_empty() {
            node.set_attribute("id", &self.element_id);
        }
        if !self.name.is_empty() {
            node.set_attribute("name", &self.name);
        }
        node.set_attribute("start", float_to_text(self.start))
            .set_attribute("end", float_to_text(self.end));
        for owner in owners {
            node.add_child("instance_animation")
                .set_attribute("url", format!("#{owner}"));
        }
    }
}

fn parse_time(text: Option<&str>) -> f32 {
    text.and_then(|t| parse_float(t.trim()))
        .unwrap_or(0.0)
}
