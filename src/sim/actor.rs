//! Actor definitions and their registry
//!
//! An [`ActorDefinition`] is the shared template behind every instance of an
//! actor kind: shape, solidity, behaviors and callbacks. Definitions are
//! immutable once registered.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::boundary::BoundaryShape;
use super::context::StepContext;
use super::event::{GameEvent, KeyboardEvent, PointerEvent, PointerPhase};
use super::hooks::{HookKind, Hooks};
use super::state::{Instance, InstanceId};
use crate::error::{Error, Result};
use crate::renderer::Renderer;

/// Per-step behaviors run around the actor's step callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Speed/direction movement that respects solid instances
    Motion,
}

/// Callback signatures for actor instances
pub struct ActorHooks;

impl HookKind for ActorHooks {
    type Lifecycle = dyn Fn(&mut StepContext<'_>, &mut Instance);
    type Draw = dyn Fn(&Instance, &mut dyn Renderer);
    type GameEvent = dyn Fn(&mut StepContext<'_>, &mut Instance, &mut GameEvent);
    type Keyboard = dyn Fn(&mut StepContext<'_>, &mut Instance, &mut KeyboardEvent);
    type Pointer = dyn Fn(&mut StepContext<'_>, &mut Instance, &mut PointerEvent);
}

/// Called with `(self, other)` when a moving instance overlaps another actor
pub type CollisionHandler = dyn Fn(&mut StepContext<'_>, &mut Instance, InstanceId);

/// Static template for a kind of entity
pub struct ActorDefinition {
    name: String,
    boundary: Option<BoundaryShape>,
    solid: bool,
    sprite: Option<String>,
    behaviors: Vec<Behavior>,
    hooks: Hooks<ActorHooks>,
    // Ordered by other-actor name so dispatch order is stable
    collisions: BTreeMap<String, Rc<CollisionHandler>>,
}

impl fmt::Debug for ActorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorDefinition")
            .field("name", &self.name)
            .field("boundary", &self.boundary)
            .field("solid", &self.solid)
            .field("sprite", &self.sprite)
            .field("behaviors", &self.behaviors)
            .field("collisions", &self.collisions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActorDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            boundary: None,
            solid: false,
            sprite: None,
            behaviors: Vec::new(),
            hooks: Hooks::default(),
            collisions: BTreeMap::new(),
        }
    }

    pub fn with_boundary(mut self, boundary: BoundaryShape) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    /// Append a behavior; duplicates are ignored
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        if !self.behaviors.contains(&behavior) {
            self.behaviors.push(behavior);
        }
        self
    }

    pub fn on_create(mut self, f: impl Fn(&mut StepContext<'_>, &mut Instance) + 'static) -> Self {
        self.hooks.set_create(Rc::new(f));
        self
    }

    pub fn on_destroy(mut self, f: impl Fn(&mut StepContext<'_>, &mut Instance) + 'static) -> Self {
        self.hooks.set_destroy(Rc::new(f));
        self
    }

    pub fn on_step(mut self, f: impl Fn(&mut StepContext<'_>, &mut Instance) + 'static) -> Self {
        self.hooks.set_step(Rc::new(f));
        self
    }

    /// Custom drawing in place of the sprite; positions are layer-local like
    /// `Instance::pos`
    pub fn on_draw(mut self, f: impl Fn(&Instance, &mut dyn Renderer) + 'static) -> Self {
        self.hooks.set_draw(Rc::new(f));
        self
    }

    pub fn on_game_event(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut StepContext<'_>, &mut Instance, &mut GameEvent) + 'static,
    ) -> Self {
        self.hooks.set_game_event(name, Rc::new(f));
        self
    }

    pub fn on_key(
        mut self,
        key: impl Into<String>,
        f: impl Fn(&mut StepContext<'_>, &mut Instance, &mut KeyboardEvent) + 'static,
    ) -> Self {
        self.hooks.set_key(key, Rc::new(f));
        self
    }

    pub fn on_pointer(
        mut self,
        phase: PointerPhase,
        f: impl Fn(&mut StepContext<'_>, &mut Instance, &mut PointerEvent) + 'static,
    ) -> Self {
        self.hooks.set_pointer(phase, Rc::new(f));
        self
    }

    /// Register a collision handler against instances of `other`
    ///
    /// A second handler for the same `other` is a configuration error.
    pub fn on_collision(
        mut self,
        other: impl Into<String>,
        f: impl Fn(&mut StepContext<'_>, &mut Instance, InstanceId) + 'static,
    ) -> Result<Self> {
        let other = other.into();
        if self.collisions.contains_key(&other) {
            return Err(Error::DuplicateCollision {
                actor: self.name.clone(),
                other,
            });
        }
        self.collisions.insert(other, Rc::new(f));
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn boundary(&self) -> Option<&BoundaryShape> {
        self.boundary.as_ref()
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn sprite(&self) -> Option<&str> {
        self.sprite.as_deref()
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn hooks(&self) -> &Hooks<ActorHooks> {
        &self.hooks
    }

    /// Collision handlers in other-actor name order
    pub fn collision_handlers(&self) -> impl Iterator<Item = (&str, &Rc<CollisionHandler>)> {
        self.collisions.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn has_collision_handler(&self, other: &str) -> bool {
        self.collisions.contains_key(other)
    }
}

/// Name-keyed store of actor definitions, read-only during simulation
#[derive(Debug, Default)]
pub struct ActorRegistry {
    actors: HashMap<String, Rc<ActorDefinition>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; names must be unique
    pub fn define(&mut self, def: ActorDefinition) -> Result<Rc<ActorDefinition>> {
        if self.actors.contains_key(def.name()) {
            return Err(Error::duplicate("actor", def.name()));
        }
        let def = Rc::new(def);
        self.actors.insert(def.name().to_string(), Rc::clone(&def));
        log::debug!("Defined actor `{}`", def.name());
        Ok(def)
    }

    pub fn get(&self, name: &str) -> Result<Rc<ActorDefinition>> {
        self.actors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found("actor", name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
