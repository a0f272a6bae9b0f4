//! Document tree nodes.
//!
//! A `Node` is one element of an interchange document: a tag, ordered
//! attributes, text content and child elements. Engines read and write
//! documents exclusively through this type; raw markup is parsed elsewhere.
//!
//! JSON shape (see `json`):
//!   { "tag": "source", "attrs": { "id": "cube-input" }, "text": "0 1 2", "children": [] }
//! `attrs`, `text` and `children` are optional.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Profile name used for vendor extension techniques.
pub const VENDOR_PROFILE: &str = "FCOLLADA";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    #[serde(default, rename = "attrs", skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// A typed `<input>` reference found under a sampler, spline or similar element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input<'a> {
    pub semantic: &'a str,
    pub source: &'a str,
    pub offset: Option<u32>,
    pub set: Option<u32>,
}

/// Strip the leading `#` of a document-local URL.
/// Returns `None` for external or empty references.
pub fn local_id(url: &str) -> Option<&str> {
    match url.strip_prefix('#') {
        Some(id) if !id.is_empty() => Some(id),
        _ => None,
    }
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    // ----- reader -----

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn child_mut(&mut self, tag: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    /// Direct children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Follow a `/`-separated chain of child tags, e.g. `"technique_common/accessor"`.
    pub fn descend(&self, path: &str) -> Option<&Node> {
        path.split('/')
            .filter(|seg| !seg.is_empty())
            .try_fold(self, |node, seg| node.child(seg))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Depth-first search of this subtree (self included) for an element id.
    /// Accepts both `id` and `#id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        let id = id.strip_prefix('#').unwrap_or(id);
        if id.is_empty() {
            return None;
        }
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    /// Resolve a document-local URL (`#id`) against this scope.
    pub fn resolve_url(&self, url: &str) -> Option<&Node> {
        local_id(url).and_then(|id| self.find_by_id(id))
    }

    /// `extra/technique[@profile=profile]` below this node.
    pub fn technique(&self, profile: &str) -> Option<&Node> {
        self.children_named("extra")
            .flat_map(|extra| extra.children_named("technique"))
            .find(|t| t.attribute("profile") == Some(profile))
    }

    /// Iterate the `<input>` children.
    pub fn inputs(&self) -> impl Iterator<Item = Input<'_>> {
        self.children_named("input").map(|n| Input {
            semantic: n.attribute("semantic").unwrap_or_default(),
            source: n.attribute("source").unwrap_or_default(),
            offset: n.attribute("offset").and_then(|s| s.trim().parse().ok()),
            set: n.attribute("set").and_then(|s| s.trim().parse().ok()),
        })
    }

    /// First `<input>` with the given semantic.
    pub fn input(&self, semantic: &str) -> Option<Input<'_>> {
        self.inputs().find(|i| i.semantic == semantic)
    }

    // ----- writer -----

    /// Append a new child element and return it for further population.
    pub fn add_child(&mut self, tag: impl Into<String>) -> &mut Node {
        self.children.push(Node::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn add_child_with_text(
        &mut self,
        tag: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Node {
        self.children.push(Node::with_text(tag, text));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.attributes.insert(name.into(), value.to_string());
        self
    }

    /// Append `<input semantic=.. source=..>`.
    pub fn add_input(&mut self, semantic: &str, source: &str) -> &mut Node {
        let input = self.add_child("input");
        input.set_attribute("semantic", semantic);
        input.set_attribute("source", source);
        input
    }

    /// Get or create `extra/technique[@profile=profile]`.
    pub fn technique_mut(&mut self, profile: &str) -> &mut Node {
        let extra_idx = match self.children.iter().position(|c| c.tag == "extra") {
            Some(i) => i,
            None => {
                self.children.push(Node::new("extra"));
                self.children.len() - 1
            }
        };
        let extra = &mut self.children[extra_idx];
        let tech_idx = match extra
            .children
            .iter()
            .position(|c| c.tag == "technique" && c.attribute("profile") == Some(profile))
        {
            Some(i) => i,
            None => {
                let mut tech = Node::new("technique");
                tech.set_attribute("profile", profile);
                extra.children.push(tech);
                extra.children.len() - 1
            }
        };
        &mut extra.children[tech_idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        let mut anim = Node::new("animation");
        anim.set_attribute("id", "cube-anim");
        let src = anim.add_child("source");
        src.set_attribute("id", "cube-input");
        src.add_child_with_text("float_array", " 0 1 2 ");
        let acc = src.add_child("technique_common").add_child("accessor");
        acc.set_attribute("stride", 1);
        let sampler = anim.add_child("sampler");
        sampler.set_attribute("id", "cube-sampler");
        sampler.add_input("INPUT", "#cube-input");
        sampler
            .technique_mut(VENDOR_PROFILE)
            .add_child_with_text("pre_infinity", "CYCLE");
        anim
    }

    #[test]
    fn lookup_by_id_and_url() {
        let anim = sample();
        assert_eq!(anim.find_by_id("cube-input").map(|n| n.tag.as_str()), Some("source"));
        assert!(anim.resolve_url("#cube-sampler").is_some());
        assert!(anim.resolve_url("cube-sampler").is_none());
        assert!(anim.find_by_id("#missing").is_none());
    }

    #[test]
    fn descend_and_text_trim() {
        let anim = sample();
        let src = anim.find_by_id("cube-input").unwrap();
        assert_eq!(src.child("float_array").unwrap().text(), "0 1 2");
        assert_eq!(
            src.descend("technique_common/accessor")
                .and_then(|a| a.attribute("stride")),
            Some("1")
        );
    }

    #[test]
    fn technique_is_reused_on_write() {
        let mut anim = sample();
        let sampler = anim.child_mut("sampler").unwrap();
        sampler
            .technique_mut(VENDOR_PROFILE)
            .add_child_with_text("post_infinity", "CONSTANT");
        assert_eq!(sampler.children_named("extra").count(), 1);
        let tech = sampler.technique(VENDOR_PROFILE).unwrap();
        assert_eq!(tech.child("pre_infinity").unwrap().text(), "CYCLE");
        assert_eq!(tech.child("post_infinity").unwrap().text(), "CONSTANT");
    }

    #[test]
    fn inputs_expose_semantic_and_source() {
        let anim = sample();
        let sampler = anim.child("sampler").unwrap();
        let input = sampler.input("INPUT").unwrap();
        assert_eq!(input.source, "#cube-input");
        assert_eq!(input.offset, None);
        assert!(sampler.input("OUTPUT").is_none());
    }
}
