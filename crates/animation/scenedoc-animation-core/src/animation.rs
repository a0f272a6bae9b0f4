//! `<animation>` elements: channels plus nested child animations.

use scenedoc_api_core::Node;
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::config::Config;
use crate::context::LoadContext;
use crate::curve::Curve;
use crate::error::LoadError;
use crate::ids::CurveId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub id: String,
    pub name: String,
    pub channels: Vec<Channel>,
    pub children: Vec<Animation>,
}

impl Animation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Load an animation and its children. Channels that fail structurally are
    /// skipped unless their report met the fatal level, which aborts the load.
    pub fn load(node: &Node, ctx: &mut LoadContext<'_>) -> Result<Animation, LoadError> {
        let mut animation = Animation {
            id: node.id().unwrap_or_default().to_string(),
            name: node.attribute("name").unwrap_or_default().to_string(),
            ..Animation::default()
        };
        for channel in node.children_named("channel") {
            match Channel::load(channel, node, ctx) {
                Ok(c) => animation.channels.push(c),
                Err(e @ LoadError::Aborted(_)) => return Err(e),
                Err(e) => {
                    if let Some(code) = ctx.take_abort() {
                        return Err(LoadError::Aborted(code));
                    }
                    log::debug!("animation {}: skipping channel: {e}", animation.id);
                }
            }
        }
        for child in node.children_named("animation") {
            animation.children.push(Animation::load(child, ctx)?);
        }
        Ok(animation)
    }

    /// Curves of this animation's own channels.
    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.channels.iter().flat_map(|c| c.curves.iter())
    }

    /// Curve ids of this animation and all its descendants, in document order.
    pub fn curve_ids(&self) -> Vec<CurveId> {
        let mut out = Vec::new();
        self.collect_curve_ids(&mut out);
        out
    }

    fn collect_curve_ids(&self, out: &mut Vec<CurveId>) {
        out.extend(self.curves().map(Curve::id));
        for child in &self.children {
            child.collect_curve_ids(out);
        }
    }

    /// This animation or a descendant with the given id.
    pub fn find(&self, id: &str) -> Option<&Animation> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Animation> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn find_curve(&self, id: CurveId) -> Option<&Curve> {
        self.curves()
            .find(|c| c.id() == id)
            .or_else(|| self.children.iter().find_map(|a| a.find_curve(id)))
    }

    pub fn find_curve_mut(&mut self, id: CurveId) -> Option<&mut Curve> {
        for channel in &mut self.channels {
            if let Some(c) = channel.curve_mut(id) {
                return Some(c);
            }
        }
        self.children.iter_mut().find_map(|a| a.find_curve_mut(id))
    }

    /// The innermost animation whose own channels hold `id`.
    pub fn owner_of(&self, id: CurveId) -> Option<&Animation> {
        if self.curves().any(|c| c.id() == id) {
            return Some(self);
        }
        self.children.iter().find_map(|a| a.owner_of(id))
    }

    /// Visit every channel of this animation and its descendants.
    pub fn for_each_channel_mut(&mut self, f: &mut impl FnMut(&mut Channel)) {
        for channel in &mut self.channels {
            f(channel);
        }
        for child in &mut self.children {
            child.for_each_channel_mut(f);
        }
    }

    pub fn for_each_channel(&self, f: &mut impl FnMut(&Channel)) {
        for channel in &self.channels {
            f(channel);
        }
        for child in &self.children {
            child.for_each_channel(f);
        }
    }

    /// Append this animation under `parent`. Sources come first, then
    /// samplers, channels and child animations.
    pub fn write(&mut self, parent: &mut Node, config: &Config) {
        let node = parent.add_child("animation");
        if !self.id.is_empty() {
            node.set_attribute("id", &self.id);
        }
        if !self.name.is_empty() {
            node.set_attribute("name", &self.name);
        }
        for channel in &mut self.channels {
            channel.write(node, config);
        }
        node.children.sort_by_key(|c| match c.tag.as_str() {
            "source" => 0,
            "sampler" => 1,
            "channel" => 2,
            _ => 3,
        });
        for child in &mut self.children {
            child.write(node, config);
        }
    }
}
