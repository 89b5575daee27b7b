//! # Visual Surface
//!
//! The boundary between the controllers and whatever draws the particles.
//! The browser implementation creates absolutely positioned `div`s and lets
//! CSS animate them. [`MemorySurface`] keeps everything in maps so tests and
//! headless runs can inspect what would be on screen.

use std::collections::BTreeMap;

use crate::entity::EntityId;
use crate::error::{EffectError, EffectResult};

/// Where a sprite is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Horizontal position as a percentage of viewport width, entering from
    /// the top edge (falling particles).
    Column {
        /// Left edge in `vw`.
        left_vw: f32,
    },
    /// Absolute page position in pixels.
    Point {
        /// Left edge in px.
        x: f32,
        /// Top edge in px.
        y: f32,
    },
}

/// CSS animation timing for a sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    /// Primary animation (fall) in seconds.
    pub primary_s: f32,
    /// Secondary animation (sway/wobble) in seconds, if any.
    pub secondary_s: Option<f32>,
}

impl Timing {
    /// Renders as a CSS `animation-duration` value, e.g. `"10.5s, 3s"`.
    #[must_use]
    pub fn css(&self) -> String {
        match self.secondary_s {
            Some(secondary) => format!("{}s, {}s", self.primary_s, secondary),
            None => format!("{}s", self.primary_s),
        }
    }
}

/// Description of one node to create.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite<'a> {
    /// Base CSS class, e.g. `"autumn-leaf"`.
    pub class: &'a str,
    /// Text content (emoji glyph).
    pub glyph: Option<&'a str>,
    /// Extra modifier class, e.g. a leaf color.
    pub tint: Option<&'a str>,
    /// Where it goes.
    pub placement: Placement,
    /// Animation durations.
    pub timing: Option<Timing>,
    /// Travel offset in px, exposed to CSS as `--tx` / `--ty`.
    pub drift: Option<(f32, f32)>,
}

impl<'a> Sprite<'a> {
    /// A bare sprite with only a class and a placement.
    #[must_use]
    pub const fn new(class: &'a str, placement: Placement) -> Self {
        Self {
            class,
            glyph: None,
            tint: None,
            placement,
            timing: None,
            drift: None,
        }
    }
}

/// State changes applied to an existing node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Plays the crack animation (`.cracked`).
    Cracked,
    /// Fades the node out (`opacity: 0`).
    Fading,
}

/// Anything that can show and hide particles.
pub trait Surface {
    /// Handle to a node on screen.
    type Node;

    /// Creates a node.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Surface`] if the node could not be created.
    fn create(&mut self, sprite: &Sprite<'_>) -> EffectResult<Self::Node>;

    /// Moves a node to an absolute page position.
    fn place(&mut self, node: &Self::Node, x: f32, y: f32);

    /// Applies a state change.
    fn mark(&mut self, node: &Self::Node, mark: Mark);

    /// Tags a node with the entity it represents so activation events can be
    /// routed back. Surfaces without interaction can ignore it.
    fn attach(&mut self, _node: &Self::Node, _id: EntityId) {}

    /// Removes a node. Removing twice is harmless.
    fn remove(&mut self, node: Self::Node);
}

/// Handle into a [`MemorySurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// One node held by a [`MemorySurface`].
#[derive(Clone, Debug, PartialEq)]
pub struct Drawn {
    /// Base class.
    pub class: String,
    /// Text content.
    pub glyph: Option<String>,
    /// Modifier class.
    pub tint: Option<String>,
    /// Current placement.
    pub placement: Placement,
    /// Animation timing.
    pub timing: Option<Timing>,
    /// Travel offset.
    pub drift: Option<(f32, f32)>,
    /// Marks applied so far, in order.
    pub marks: Vec<Mark>,
    /// Entity tag, if attached.
    pub entity: Option<EntityId>,
}

/// In-memory surface.
#[derive(Debug, Default)]
pub struct MemorySurface {
    next_id: u64,
    live: BTreeMap<NodeId, Drawn>,
    removed: Vec<NodeId>,
    faded: Vec<NodeId>,
    failures_left: u32,
}

impl MemorySurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls to `create` fail.
    pub fn fail_next(&mut self, count: u32) {
        self.failures_left = count;
    }

    /// Number of nodes on screen.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of nodes on screen with the given class.
    #[must_use]
    pub fn count_class(&self, class: &str) -> usize {
        self.live.values().filter(|d| d.class == class).count()
    }

    /// Looks up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Drawn> {
        self.live.get(&id)
    }

    /// Iterates over nodes on screen in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Drawn)> {
        self.live.iter().map(|(id, d)| (*id, d))
    }

    /// Every removed node, in removal order.
    #[must_use]
    pub fn removed(&self) -> &[NodeId] {
        &self.removed
    }

    /// Every node marked [`Mark::Fading`], in marking order.
    #[must_use]
    pub fn faded(&self) -> &[NodeId] {
        &self.faded
    }

    /// Total nodes ever created.
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.next_id
    }
}

impl Surface for MemorySurface {
    type Node = NodeId;

    fn create(&mut self, sprite: &Sprite<'_>) -> EffectResult<NodeId> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(EffectError::Surface(format!(
                "could not create .{}",
                sprite.class
            )));
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.live.insert(
            id,
            Drawn {
                class: sprite.class.to_owned(),
                glyph: sprite.glyph.map(str::to_owned),
                tint: sprite.tint.map(str::to_owned),
                placement: sprite.placement,
                timing: sprite.timing,
                drift: sprite.drift,
                marks: Vec::new(),
                entity: None,
            },
        );
        Ok(id)
    }

    fn place(&mut self, node: &NodeId, x: f32, y: f32) {
        if let Some(drawn) = self.live.get_mut(node) {
            drawn.placement = Placement::Point { x, y };
        }
    }

    fn mark(&mut self, node: &NodeId, mark: Mark) {
        if let Some(drawn) = self.live.get_mut(node) {
            drawn.marks.push(mark);
            if mark == Mark::Fading {
                self.faded.push(*node);
            }
        }
    }

    fn attach(&mut self, node: &NodeId, id: EntityId) {
        if let Some(drawn) = self.live.get_mut(node) {
            drawn.entity = Some(id);
        }
    }

    fn remove(&mut self, node: NodeId) {
        if self.live.remove(&node).is_some() {
            self.removed.push(node);
        }
    }
}
