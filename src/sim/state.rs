//! Instance state and the id allocator
//!
//! Everything mutable about a spawned entity lives on [`Instance`]; the
//! shared, static half lives on its [`ActorDefinition`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{ActorDefinition, Behavior};
use super::boundary::PositionedBoundary;

/// Process-unique instance identifier, assigned in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a layer within its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u32);

/// Hands out monotonically increasing instance ids
///
/// Owned by the simulation context so independent simulations never share
/// a counter.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Start counting from 1 again
    pub fn reset(&mut self) {
        self.next = 1;
    }
}

/// Lifecycle status shared by instances and layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    /// Created, not yet activated (create hook pending)
    #[default]
    New,
    /// Participating in simulation steps
    Active,
    /// Marked for removal at the start of its next processing
    Destroyed,
}

/// Value stored in a [`StateBag`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Open string-keyed store for game-specific per-instance fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateBag {
    values: HashMap<String, Value>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(Value::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Integer value (floats are not coerced)
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value; integers are widened
    pub fn float(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(Value::Float(v)) => Some(*v),
            Some(Value::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(Value::Text(v)) => Some(v),
            _ => None,
        }
    }

    /// Add to an integer counter, starting from zero
    pub fn increment(&mut self, key: &str, by: i64) -> i64 {
        let next = self.int(key).unwrap_or(0) + by;
        self.values.insert(key.to_string(), Value::Int(next));
        next
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Motion behavior state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    /// Heading in degrees (0 = +x, 90 = +y)
    pub direction: f32,
    /// Units per step
    pub speed: f32,
    /// Position at the start of the current step
    pub previous: Vec2,
}

/// One live, positioned occurrence of an actor
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) def: Rc<ActorDefinition>,
    pub(crate) layer: LayerId,
    pub pos: Vec2,
    pub(crate) status: Status,
    /// Game-specific fields
    pub state: StateBag,
    pub motion: Option<MotionState>,
    /// Sprite frame passed to the renderer
    pub frame: u32,
    pub opacity: f32,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("actor", &self.def.name())
            .field("layer", &self.layer)
            .field("pos", &self.pos)
            .field("status", &self.status)
            .field("motion", &self.motion)
            .finish()
    }
}

impl Instance {
    pub(crate) fn new(id: InstanceId, def: Rc<ActorDefinition>, layer: LayerId, pos: Vec2) -> Self {
        let motion = def
            .behaviors()
            .contains(&Behavior::Motion)
            .then(|| MotionState {
                previous: pos,
                ..Default::default()
            });
        Self {
            id,
            def,
            layer,
            pos,
            status: Status::New,
            state: StateBag::new(),
            motion,
            frame: 0,
            opacity: 1.0,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn definition(&self) -> &Rc<ActorDefinition> {
        &self.def
    }

    pub fn actor_name(&self) -> &str {
        self.def.name()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_solid(&self) -> bool {
        self.def.is_solid()
    }

    /// Active instances take part in queries, collisions and input
    pub fn is_live(&self) -> bool {
        self.status == Status::Active
    }

    /// Mark for removal; the destroy hook runs at its next processing
    pub fn destroy(&mut self) {
        self.status = Status::Destroyed;
    }

    /// World boundary at the current position
    pub fn boundary(&self) -> Option<PositionedBoundary> {
        self.boundary_at(self.pos)
    }

    /// World boundary if the instance stood at `pos`
    pub fn boundary_at(&self, pos: Vec2) -> Option<PositionedBoundary> {
        self.def.boundary().map(|shape| shape.at(pos.x, pos.y))
    }

    /// Set speed, attaching motion state if the actor lacked it
    pub fn set_speed(&mut self, speed: f32) {
        let pos = self.pos;
        self.motion
            .get_or_insert_with(|| MotionState {
                previous: pos,
                ..Default::default()
            })
            .speed = speed;
    }

    /// Set heading in degrees, attaching motion state if the actor lacked it
    pub fn set_direction(&mut self, degrees: f32) {
        let pos = self.pos;
        self.motion
            .get_or_insert_with(|| MotionState {
                previous: pos,
                ..Default::default()
            })
            .direction = degrees;
    }

    pub fn speed(&self) -> f32 {
        self.motion.map_or(0.0, |m| m.speed)
    }

    pub fn direction(&self) -> f32 {
        self.motion.map_or(0.0, |m| m.direction)
    }
}
