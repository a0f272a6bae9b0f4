//! The owning document: animations, clips and the animated-value registry.
//!
//! Animated values are raw numeric fields of scene entities (a translation,
//! a light colour, a morph weight) registered under their target pointer so
//! channels can find their defaults on export and driven curves can read
//! their input. Handles are generation-checked: once a value is
//! unregistered, every handle to it stops resolving even if its slot is
//! reused.

use hashbrown::HashMap;
use scenedoc_api_core::convert::parse_matrix_element;
use scenedoc_api_core::{ErrorSink, Node};
use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::channel::Channel;
use crate::clip::Clip;
use crate::config::Config;
use crate::context::LoadContext;
use crate::curve::Curve;
use crate::error::LoadError;
use crate::ids::{AnimatedHandle, ClipId, CurveId, IdAllocator};

/// A registered animatable value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatedValue {
    /// Target pointer (`node/property`) channels use to address this value.
    pub pointer: String,
    pub values: Vec<f32>,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    value: Option<AnimatedValue>,
}

#[derive(Clone, Debug, Default)]
pub struct Document {
    config: Config,
    ids: IdAllocator,
    pub animations: Vec<Animation>,
    pub clips: Vec<Clip>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_pointer: HashMap<String, AnimatedHandle>,
}

impl Document {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Load `library_animations` and `library_animation_clips` found directly
    /// under `root`. Clips are resolved after every animation is loaded.
    pub fn load(root: &Node, config: Config, sink: &mut ErrorSink) -> Result<Document, LoadError> {
        let mut doc = Document::new(config);
        sink.set_fatal_level(doc.config.fatal_level);
        let mut ids = IdAllocator::new();
        {
            let mut ctx = LoadContext::new(&mut ids, sink, &doc.config);
            let mut animations = Vec::new();
            for library in root.children_named("library_animations") {
                for node in library.children_named("animation") {
                    animations.push(Animation::load(node, &mut ctx)?);
                }
            }
            let mut clips = Vec::new();
            for library in root.children_named("library_animation_clips") {
                for node in library.children_named("animation_clip") {
                    clips.push(Clip::load(node, &animations, &mut ctx)?);
                }
            }
            doc.animations = animations;
            doc.clips = clips;
        }
        doc.ids = ids;
        log::debug!(
            "document: {} animation(s), {} clip(s)",
            doc.animations.len(),
            doc.clips.len()
        );
        Ok(doc)
    }

    /// Serialize into a fresh root holding the animation and clip libraries.
    ///
    /// Before writing, every channel whose target pointer names a registered
    /// animated value gets that value's components as merge defaults.
    pub fn write(&mut self) -> Node {
        let mut root = Node::new("COLLADA");
        let Document {
            config,
            animations,
            slots,
            by_pointer,
            ..
        } = &mut *self;
        if !animations.is_empty() {
            let library = root.add_child("library_animations");
            for animation in animations.iter_mut() {
                animation.for_each_channel_mut(&mut |channel: &mut Channel| {
                    register_defaults(channel, slots, by_pointer);
                });
                animation.write(library, config);
            }
        }
        if !self.clips.is_empty() {
            let library = root.add_child("library_animation_clips");
            for clip in &self.clips {
                clip.write(library, self);
            }
        }
        root
    }

    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    /// New empty clip with a fresh id.
    pub fn add_clip(&mut self, element_id: impl Into<String>) -> &mut Clip {
        let clip = Clip::new(self.ids.alloc_clip(), element_id);
        self.clips.push(clip);
        let last = self.clips.len() - 1;
        &mut self.clips[last]
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id() == id)
    }

    /// Animation with `id` at any depth.
    pub fn find_animation(&self, id: &str) -> Option<&Animation> {
        self.animations.iter().find_map(|a| a.find(id))
    }

    pub fn find_animation_mut(&mut self, id: &str) -> Option<&mut Animation> {
        self.animations.iter_mut().find_map(|a| a.find_mut(id))
    }

    /// Remove a top-level animation. Clips keep the ids of its curves, which
    /// simply stop resolving.
    pub fn remove_animation(&mut self, id: &str) -> Option<Animation> {
        let index = self.animations.iter().position(|a| a.id == id)?;
        Some(self.animations.remove(index))
    }

    pub fn find_curve(&self, id: CurveId) -> Option<&Curve> {
        self.animations.iter().find_map(|a| a.find_curve(id))
    }

    pub fn find_curve_mut(&mut self, id: CurveId) -> Option<&mut Curve> {
        self.animations.iter_mut().find_map(|a| a.find_curve_mut(id))
    }

    /// Innermost animation owning the channel that holds `id`.
    pub fn owner_of(&self, id: CurveId) -> Option<&Animation> {
        self.animations.iter().find_map(|a| a.owner_of(id))
    }

    /// Curve ids of an animation and its descendants; empty when not found.
    pub fn curves_of_animation(&self, id: &str) -> Vec<CurveId> {
        self.find_animation(id)
            .map(Animation::curve_ids)
            .unwrap_or_default()
    }

    /// Clips that list `curve`.
    pub fn clips_containing(&self, curve: CurveId) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(move |c| c.contains(curve))
    }

    // ----- animated values -----

    /// Register (or replace) the value addressed by `pointer`.
    pub fn register_animated(&mut self, pointer: impl Into<String>, values: Vec<f32>) -> AnimatedHandle {
        let pointer = pointer.into();
        if let Some(old) = self.by_pointer.get(&pointer).copied() {
            self.unregister_animated(old);
        }
        let value = AnimatedValue {
            pointer: pointer.clone(),
            values,
        };
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                AnimatedHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                AnimatedHandle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.by_pointer.insert(pointer, handle);
        handle
    }

    /// Release a value. Stale handles are ignored.
    pub fn unregister_animated(&mut self, handle: AnimatedHandle) -> Option<AnimatedValue> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        if self.by_pointer.get(&value.pointer) == Some(&handle) {
            self.by_pointer.remove(&value.pointer);
        }
        Some(value)
    }

    pub fn resolve_animated(&self, handle: AnimatedHandle) -> Option<&AnimatedValue> {
        resolve(&self.slots, handle)
    }

    pub fn animated_mut(&mut self, handle: AnimatedHandle) -> Option<&mut AnimatedValue> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn find_animated(&self, pointer: &str) -> Option<AnimatedHandle> {
        self.by_pointer.get(pointer).copied()
    }

    // ----- drivers -----

    /// Link every driven channel to the registered value its driver pointer
    /// names. Returns how many channels were linked.
    pub fn link_drivers(&mut self) -> usize {
        let Document {
            animations,
            slots,
            by_pointer,
            ..
        } = &mut *self;
        let mut linked = 0;
        for animation in animations.iter_mut() {
            animation.for_each_channel_mut(&mut |channel: &mut Channel| {
                if !channel.is_driven() {
                    return;
                }
                let Some(handle) = by_pointer.get(&channel.driver_pointer).copied() else {
                    return;
                };
                if let Some(value) = resolve(slots, handle) {
                    if channel.link_driver(handle, value) {
                        linked += 1;
                    }
                }
            });
        }
        linked
    }

    /// Report every driven channel left without a driver. True if none.
    pub fn check_drivers(&self, sink: &mut ErrorSink) -> bool {
        let mut ok = true;
        for animation in &self.animations {
            animation.for_each_channel(&mut |channel: &Channel| {
                ok &= channel.check_driver(sink);
            });
        }
        ok
    }

    /// Evaluate a curve. Driven curves take their input from the driving
    /// component instead of `time`; a dangling driver falls back to `time`.
    pub fn evaluate_curve(&self, id: CurveId, time: f32) -> Option<f32> {
        let curve = self.find_curve(id)?;
        let input = curve
            .driver()
            .and_then(|d| {
                self.resolve_animated(d.handle)
                    .and_then(|v| v.values.get(d.component).copied())
            })
            .unwrap_or(time);
        Some(curve.evaluate(input, self.config.eval_mode))
    }
}

fn resolve(slots: &[Slot], handle: AnimatedHandle) -> Option<&AnimatedValue> {
    let slot = slots.get(handle.index as usize)?;
    if slot.generation != handle.generation {
        return None;
    }
    slot.value.as_ref()
}

/// Give each curve of `channel` the component of its registered target value.
fn register_defaults(
    channel: &mut Channel,
    slots: &[Slot],
    by_pointer: &HashMap<String, AnimatedHandle>,
) {
    let Some(value) = by_pointer
        .get(&channel.target_pointer)
        .and_then(|h| resolve(slots, *h))
    else {
        return;
    };
    let single = channel.curves.len() == 1;
    let entries: Vec<(CurveId, f32, String)> = channel
        .curves
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            let index = if c.target_qualifier.is_empty() {
                if single {
                    Some(c.target_element.unwrap_or(0) as usize)
                } else {
                    Some(i)
                }
            } else {
                parse_matrix_element(&c.target_qualifier)
            }?;
            value
                .values
                .get(index)
                .map(|v| (c.id(), *v, c.target_qualifier.clone()))
        })
        .collect();
    for (curve, v, qualifier) in entries {
        channel.set_default_value(curve, v, qualifier);
    }
}
