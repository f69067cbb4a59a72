//! Lifecycle hook table
//!
//! Actors, layers and scenes all expose the same set of callback slots. The
//! storage is shared here; each entity kind picks its callback signatures
//! through [`HookKind`] and adds typed registration methods on top.

use std::collections::HashMap;
use std::rc::Rc;

use super::event::PointerPhase;

/// Callback signatures for one entity kind
pub trait HookKind {
    /// create / destroy / step
    type Lifecycle: ?Sized;
    type Draw: ?Sized;
    type GameEvent: ?Sized;
    type Keyboard: ?Sized;
    type Pointer: ?Sized;
}

/// Callback slots; unset slots are silent no-ops
pub struct Hooks<K: HookKind> {
    create: Option<Rc<K::Lifecycle>>,
    destroy: Option<Rc<K::Lifecycle>>,
    step: Option<Rc<K::Lifecycle>>,
    draw: Option<Rc<K::Draw>>,
    game_events: HashMap<String, Rc<K::GameEvent>>,
    keys: HashMap<String, Rc<K::Keyboard>>,
    pointer: HashMap<PointerPhase, Rc<K::Pointer>>,
}

impl<K: HookKind> Default for Hooks<K> {
    fn default() -> Self {
        Self {
            create: None,
            destroy: None,
            step: None,
            draw: None,
            game_events: HashMap::new(),
            keys: HashMap::new(),
            pointer: HashMap::new(),
        }
    }
}

impl<K: HookKind> Hooks<K> {
    pub fn set_create(&mut self, f: Rc<K::Lifecycle>) {
        self.create = Some(f);
    }

    pub fn set_destroy(&mut self, f: Rc<K::Lifecycle>) {
        self.destroy = Some(f);
    }

    pub fn set_step(&mut self, f: Rc<K::Lifecycle>) {
        self.step = Some(f);
    }

    pub fn set_draw(&mut self, f: Rc<K::Draw>) {
        self.draw = Some(f);
    }

    /// Register a game event handler, replacing any previous one for `name`
    pub fn set_game_event(&mut self, name: impl Into<String>, f: Rc<K::GameEvent>) {
        self.game_events.insert(name.into(), f);
    }

    /// Register a keyboard handler, replacing any previous one for `key`
    pub fn set_key(&mut self, key: impl Into<String>, f: Rc<K::Keyboard>) {
        self.keys.insert(key.into(), f);
    }

    /// Register a pointer handler, replacing any previous one for `phase`
    pub fn set_pointer(&mut self, phase: PointerPhase, f: Rc<K::Pointer>) {
        self.pointer.insert(phase, f);
    }

    // Getters hand out clones so the caller can release its borrow of the
    // owner before invoking the callback with mutable access.

    pub fn create(&self) -> Option<Rc<K::Lifecycle>> {
        self.create.clone()
    }

    pub fn destroy(&self) -> Option<Rc<K::Lifecycle>> {
        self.destroy.clone()
    }

    pub fn step(&self) -> Option<Rc<K::Lifecycle>> {
        self.step.clone()
    }

    pub fn draw(&self) -> Option<Rc<K::Draw>> {
        self.draw.clone()
    }

    pub fn game_event(&self, name: &str) -> Option<Rc<K::GameEvent>> {
        self.game_events.get(name).cloned()
    }

    pub fn key(&self, key: &str) -> Option<Rc<K::Keyboard>> {
        self.keys.get(key).cloned()
    }

    pub fn pointer(&self, phase: PointerPhase) -> Option<Rc<K::Pointer>> {
        self.pointer.get(&phase).cloned()
    }

    pub fn has_game_event(&self, name: &str) -> bool {
        self.game_events.contains_key(name)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn has_pointer(&self, phase: PointerPhase) -> bool {
        self.pointer.contains_key(&phase)
    }
}
