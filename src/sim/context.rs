//! Shared simulation context and the view handed to callbacks

use std::collections::HashSet;

use glam::Vec2;

use super::actor::{ActorDefinition, ActorRegistry};
use super::event::GameEvent;
use super::index::InstanceIndex;
use super::state::{IdAllocator, Instance, InstanceId, LayerId, Status};
use crate::error::Result;

/// State shared by every scene of one simulation: actor definitions and the
/// instance id counter
#[derive(Debug, Default)]
pub struct SimContext {
    pub actors: ActorRegistry,
    pub ids: IdAllocator,
}

impl SimContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor definition
    pub fn define_actor(&mut self, def: ActorDefinition) -> Result<()> {
        self.actors.define(def).map(|_| ())
    }
}

/// What a callback can reach while its layer is being processed
///
/// The instance whose callback is running is checked out of the index and
/// passed separately, so `instance(own_id)` returns `None` inside its own
/// callbacks.
pub struct StepContext<'a> {
    layer: LayerId,
    instances: &'a mut InstanceIndex,
    sim: &'a mut SimContext,
    outbox: &'a mut Vec<GameEvent>,
    current: Option<InstanceId>,
    current_destroyed: bool,
    dispatched_pairs: HashSet<(InstanceId, InstanceId)>,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(
        layer: LayerId,
        instances: &'a mut InstanceIndex,
        sim: &'a mut SimContext,
        outbox: &'a mut Vec<GameEvent>,
    ) -> Self {
        Self {
            layer,
            instances,
            sim,
            outbox,
            current: None,
            current_destroyed: false,
            dispatched_pairs: HashSet::new(),
        }
    }

    /// Layer being processed
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn instances(&self) -> &InstanceIndex {
        &*self.instances
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(id)
    }

    pub fn actors(&self) -> &ActorRegistry {
        &self.sim.actors
    }

    /// Spawn an instance in this layer
    ///
    /// It starts as `New` and is first processed on the next step.
    pub fn create_instance(&mut self, actor: &str, x: f32, y: f32) -> Result<InstanceId> {
        let def = self.sim.actors.get(actor)?;
        let id = self.sim.ids.next_id();
        self.instances
            .insert(Instance::new(id, def, self.layer, Vec2::new(x, y)));
        Ok(id)
    }

    /// Mark an instance for removal at its next processing
    pub fn destroy(&mut self, id: InstanceId) {
        if let Some(instance) = self.instances.get_mut(id) {
            instance.destroy();
        } else if self.current == Some(id) {
            self.current_destroyed = true;
        } else {
            log::warn!("destroy of unknown instance {id} ignored");
        }
    }

    /// Queue a game event for the next running step
    pub fn emit(&mut self, event: GameEvent) {
        self.outbox.push(event);
    }

    /// Take an instance out of the index for the duration of its callbacks
    pub(crate) fn check_out(&mut self, id: InstanceId) -> Option<Instance> {
        let instance = self.instances.remove(id)?;
        self.current = Some(id);
        self.current_destroyed = false;
        Some(instance)
    }

    /// Put the checked-out instance back, applying a pending destroy
    pub(crate) fn check_in(&mut self, mut instance: Instance) {
        if self.current_destroyed {
            instance.destroy();
        }
        self.release();
        self.instances.insert(instance);
    }

    /// Forget the checked-out instance without reinserting it
    pub(crate) fn release(&mut self) {
        self.current = None;
        self.current_destroyed = false;
    }

    /// Whether the checked-out instance has been destroyed by any path
    pub(crate) fn is_destroyed(&self, instance: &Instance) -> bool {
        self.current_destroyed || instance.status() == Status::Destroyed
    }

    /// Record an unordered pair; false if it was already dispatched this step
    pub(crate) fn claim_pair(&mut self, a: InstanceId, b: InstanceId) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.dispatched_pairs.insert(key)
    }
}
