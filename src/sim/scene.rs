//! Scenes: layers, cameras and the top-level lifecycle
//!
//! ```text
//! NotStarted --init--> Starting --step--> Running --suspend--> Suspended
//!                                            ^                     |
//!                                            +--step-- Resuming <--init (persistent)
//! ```
//!
//! A non-persistent scene resets its layers on every `init()`, so it always
//! goes through `Starting`. Starting and resuming each consume one step
//! without simulating.
//!
//! A scene can embed sub-scenes at an offset in its own world space. The
//! parent owns them by name, forwards its lifecycle calls, steps them after
//! its layers, draws them on top of its layers and hands them pointer input
//! translated into their coordinates.

use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boundary::Bounds;
use super::camera::Camera;
use super::context::SimContext;
use super::event::{
    Cancellable, GameEvent, InputEvent, KeyboardEvent, PointerEvent, PointerPhase,
};
use super::geometry::rect_contains_point;
use super::hooks::{HookKind, Hooks};
use super::layer::Layer;
use super::state::{Instance, InstanceId, LayerId, Status};
use crate::consts::{SCENE_HEIGHT, SCENE_WIDTH};
use crate::error::{Error, Result};
use crate::renderer::{Offset, Renderer, Viewport};

/// Scene lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SceneState {
    #[default]
    NotStarted,
    /// Start hook pending
    Starting,
    Running,
    /// Paused; steps and input are ignored
    Suspended,
    /// Resume hook pending
    Resuming,
}

/// Callback signatures for scenes
///
/// The create slot is the scene's start hook.
pub struct SceneHooks;

impl HookKind for SceneHooks {
    type Lifecycle = dyn Fn(&mut Scene, &mut SimContext);
    type Draw = dyn Fn(&Scene, &mut dyn Renderer);
    type GameEvent = dyn Fn(&mut Scene, &mut SimContext, &mut GameEvent);
    type Keyboard = dyn Fn(&mut Scene, &mut SimContext, &mut KeyboardEvent);
    type Pointer = dyn Fn(&mut Scene, &mut SimContext, &mut PointerEvent);
}

type SceneCallback = <SceneHooks as HookKind>::Lifecycle;

/// A sub-scene placed in its parent's world space
struct Embedded {
    scene: Scene,
    pos: Vec2,
}

impl Embedded {
    fn contains(&self, point: Vec2) -> bool {
        let size = self.scene.size;
        rect_contains_point(self.pos.x, self.pos.y, size.x, size.y, point.x, point.y)
    }
}

pub struct Scene {
    name: String,
    size: Vec2,
    persistent: bool,
    state: SceneState,
    started: bool,
    // Sorted by depth, ties in insertion order
    layers: Vec<Layer>,
    next_layer_id: u32,
    camera: Camera,
    cameras: Vec<Camera>,
    hooks: Hooks<SceneHooks>,
    on_resume: Option<Rc<SceneCallback>>,
    on_suspend: Option<Rc<SceneCallback>>,
    events: Vec<GameEvent>,
    input: VecDeque<InputEvent>,
    // Registration order; later embeds draw on top
    embeds: Vec<Embedded>,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("persistent", &self.persistent)
            .field("state", &self.state)
            .field("layers", &self.layers)
            .field("camera", &self.camera)
            .field("cameras", &self.cameras)
            .field("queued_events", &self.events.len())
            .field(
                "embeds",
                &self.embeds.iter().map(|e| e.scene.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Scene {
    /// Scene of the given world size with a default camera covering it
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Result<Self> {
        let camera = Camera::new("default", width, height)?;
        Ok(Self {
            name: name.into(),
            size: Vec2::new(width, height),
            persistent: false,
            state: SceneState::NotStarted,
            started: false,
            layers: Vec::new(),
            next_layer_id: 0,
            camera,
            cameras: Vec::new(),
            hooks: Hooks::default(),
            on_resume: None,
            on_suspend: None,
            events: Vec::new(),
            input: VecDeque::new(),
            embeds: Vec::new(),
        })
    }

    /// Scene with the default dimensions
    pub fn with_default_size(name: impl Into<String>) -> Result<Self> {
        Self::new(name, SCENE_WIDTH, SCENE_HEIGHT)
    }

    /// Keep layers and instances across suspension
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Replace the default camera
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn on_start(mut self, f: impl Fn(&mut Scene, &mut SimContext) + 'static) -> Self {
        self.hooks.set_create(Rc::new(f));
        self
    }

    pub fn on_resume(mut self, f: impl Fn(&mut Scene, &mut SimContext) + 'static) -> Self {
        let f: Rc<SceneCallback> = Rc::new(f);
        self.on_resume = Some(f);
        self
    }

    pub fn on_suspend(mut self, f: impl Fn(&mut Scene, &mut SimContext) + 'static) -> Self {
        let f: Rc<SceneCallback> = Rc::new(f);
        self.on_suspend = Some(f);
        self
    }

    /// Called when the scene is removed from its stage
    pub fn on_destroy(mut self, f: impl Fn(&mut Scene, &mut SimContext) + 'static) -> Self {
        self.hooks.set_destroy(Rc::new(f));
        self
    }

    pub fn on_step(mut self, f: impl Fn(&mut Scene, &mut SimContext) + 'static) -> Self {
        self.hooks.set_step(Rc::new(f));
        self
    }

    pub fn on_draw(mut self, f: impl Fn(&Scene, &mut dyn Renderer) + 'static) -> Self {
        self.hooks.set_draw(Rc::new(f));
        self
    }

    pub fn on_game_event(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Scene, &mut SimContext, &mut GameEvent) + 'static,
    ) -> Self {
        self.hooks.set_game_event(name, Rc::new(f));
        self
    }

    pub fn on_key(
        mut self,
        key: impl Into<String>,
        f: impl Fn(&mut Scene, &mut SimContext, &mut KeyboardEvent) + 'static,
    ) -> Self {
        self.hooks.set_key(key, Rc::new(f));
        self
    }

    pub fn on_pointer(
        mut self,
        phase: PointerPhase,
        f: impl Fn(&mut Scene, &mut SimContext, &mut PointerEvent) + 'static,
    ) -> Self {
        self.hooks.set_pointer(phase, Rc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    // === Layers ===

    /// Add a layer; names are unique within the scene
    pub fn add_layer(&mut self, mut layer: Layer) -> Result<LayerId> {
        if self.layers.iter().any(|l| l.name() == layer.name()) {
            return Err(Error::duplicate("layer", layer.name()));
        }
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        layer.id = id;
        let at = self.layers.partition_point(|l| l.depth() <= layer.depth());
        self.layers.insert(at, layer);
        Ok(id)
    }

    /// Layers bottom to top
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Result<&Layer> {
        self.layers
            .iter()
            .find(|l| l.name() == name)
            .ok_or_else(|| Error::not_found("layer", name))
    }

    pub fn layer_mut(&mut self, name: &str) -> Result<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.name() == name)
            .ok_or_else(|| Error::not_found("layer", name))
    }

    pub fn layer_by_id(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Spawn an instance into a named layer
    pub fn create_instance(
        &mut self,
        sim: &mut SimContext,
        layer: &str,
        actor: &str,
        x: f32,
        y: f32,
    ) -> Result<InstanceId> {
        self.layer_mut(layer)?.create_instance(sim, actor, x, y)
    }

    /// Find an instance in any layer
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.layers.iter().find_map(|l| l.instance(id))
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.layers.iter_mut().find_map(|l| l.instance_mut(id))
    }

    // === Cameras ===

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Register a secondary camera; names are unique within the scene
    pub fn add_camera(&mut self, camera: Camera) -> Result<()> {
        if camera.name() == self.camera.name()
            || self.cameras.iter().any(|c| c.name() == camera.name())
        {
            return Err(Error::duplicate("camera", camera.name()));
        }
        self.cameras.push(camera);
        Ok(())
    }

    pub fn named_camera(&self, name: &str) -> Result<&Camera> {
        if self.camera.name() == name {
            return Ok(&self.camera);
        }
        self.cameras
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::not_found("camera", name))
    }

    pub fn named_camera_mut(&mut self, name: &str) -> Result<&mut Camera> {
        if self.camera.name() == name {
            return Ok(&mut self.camera);
        }
        self.cameras
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::not_found("camera", name))
    }

    /// Secondary cameras in registration order
    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    // === Sub-scenes ===

    /// Nest `scene` with its origin at (`x`, `y`) in this scene's world;
    /// names are unique among a parent's sub-scenes
    pub fn embed(&mut self, mut scene: Scene, x: f32, y: f32) -> Result<()> {
        if self.embeds.iter().any(|e| e.scene.name() == scene.name()) {
            return Err(Error::duplicate("sub-scene", scene.name()));
        }
        // Join a parent that is already live
        if !matches!(self.state, SceneState::NotStarted | SceneState::Suspended) {
            scene.init();
        }
        self.embeds.push(Embedded {
            scene,
            pos: Vec2::new(x, y),
        });
        Ok(())
    }

    pub fn embedded(&self, name: &str) -> Result<&Scene> {
        self.embeds
            .iter()
            .find(|e| e.scene.name() == name)
            .map(|e| &e.scene)
            .ok_or_else(|| Error::not_found("sub-scene", name))
    }

    pub fn embedded_mut(&mut self, name: &str) -> Result<&mut Scene> {
        self.embedded_entry(name).map(|e| &mut e.scene)
    }

    /// Origin of a sub-scene in this scene's world
    pub fn embed_position(&self, name: &str) -> Result<Vec2> {
        self.embeds
            .iter()
            .find(|e| e.scene.name() == name)
            .map(|e| e.pos)
            .ok_or_else(|| Error::not_found("sub-scene", name))
    }

    pub fn move_embed(&mut self, name: &str, x: f32, y: f32) -> Result<()> {
        self.embedded_entry(name)?.pos = Vec2::new(x, y);
        Ok(())
    }

    /// Detach a sub-scene, running its destroy hook
    pub fn remove_embed(&mut self, sim: &mut SimContext, name: &str) -> Result<()> {
        let at = self
            .embeds
            .iter()
            .position(|e| e.scene.name() == name)
            .ok_or_else(|| Error::not_found("sub-scene", name))?;
        self.embeds.remove(at).scene.finish(sim);
        Ok(())
    }

    fn embedded_entry(&mut self, name: &str) -> Result<&mut Embedded> {
        self.embeds
            .iter_mut()
            .find(|e| e.scene.name() == name)
            .ok_or_else(|| Error::not_found("sub-scene", name))
    }

    fn step_embeds(&mut self, sim: &mut SimContext) {
        for embed in &mut self.embeds {
            embed.scene.step(sim);
        }
    }

    // === Lifecycle ===

    /// Enter (or re-enter) the scene
    pub fn init(&mut self) {
        if self.state == SceneState::Running {
            log::warn!("init() on running scene `{}` ignored", self.name);
            return;
        }
        if !self.persistent || !self.started {
            for layer in &mut self.layers {
                layer.reset();
            }
            self.events.clear();
            self.input.clear();
            self.started = false;
            self.state = SceneState::Starting;
        } else if self.state == SceneState::Suspended {
            self.state = SceneState::Resuming;
        }
        log::debug!("Scene `{}` init -> {:?}", self.name, self.state);
        for embed in &mut self.embeds {
            embed.scene.init();
        }
    }

    /// Pause the scene; pending input is dropped
    pub fn suspend(&mut self, sim: &mut SimContext) {
        if matches!(self.state, SceneState::NotStarted | SceneState::Suspended) {
            return;
        }
        self.state = SceneState::Suspended;
        self.input.clear();
        log::debug!("Scene `{}` suspended", self.name);
        if let Some(f) = self.on_suspend.clone() {
            f(self, sim);
        }
        for embed in &mut self.embeds {
            embed.scene.suspend(sim);
        }
    }

    /// Run the destroy hook of a scene being removed
    pub(crate) fn finish(mut self, sim: &mut SimContext) {
        log::debug!("Scene `{}` destroyed", self.name);
        if let Some(f) = self.hooks.destroy() {
            f(&mut self, sim);
        }
        for embed in std::mem::take(&mut self.embeds) {
            embed.scene.finish(sim);
        }
    }

    /// Advance one tick
    pub fn step(&mut self, sim: &mut SimContext) {
        match self.state {
            SceneState::NotStarted | SceneState::Suspended => return,
            SceneState::Starting => {
                self.state = SceneState::Running;
                self.started = true;
                log::debug!("Scene `{}` started", self.name);
                if let Some(f) = self.hooks.create() {
                    f(self, sim);
                }
                self.step_embeds(sim);
                return;
            }
            SceneState::Resuming => {
                self.state = SceneState::Running;
                log::debug!("Scene `{}` resumed", self.name);
                if let Some(f) = self.on_resume.clone() {
                    f(self, sim);
                }
                self.step_embeds(sim);
                return;
            }
            SceneState::Running => {}
        }

        self.track_cameras();

        if let Some(f) = self.hooks.step() {
            f(self, sim);
        }

        let mut events = std::mem::take(&mut self.events);
        let mut outbox = Vec::new();

        let mut i = 0;
        while i < self.layers.len() {
            if self.layers[i].status() == Status::Destroyed {
                let layer = self.layers.remove(i);
                layer.finish(sim, &mut outbox);
                continue;
            }
            self.layers[i].step(sim, &mut events, &mut outbox);
            if let Some(pos) = self.follow_position(&self.layers[i]) {
                self.layers[i].follow_camera(pos);
            }
            i += 1;
        }

        for event in events.iter_mut() {
            if event.is_cancelled() {
                continue;
            }
            if let Some(f) = self.hooks.game_event(&event.name) {
                f(self, sim, event);
            }
        }

        self.step_embeds(sim);

        while let Some(input) = self.input.pop_front() {
            match input {
                InputEvent::Keyboard(mut event) => {
                    self.dispatch_keyboard(sim, &mut event, &mut outbox)
                }
                InputEvent::Pointer(mut event) => {
                    self.dispatch_pointer(sim, &mut event, &mut outbox)
                }
            }
        }

        self.events.extend(outbox);
    }

    /// Queue a game event for the next running step
    pub fn queue_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn queued_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Raw keyboard input; dropped unless the scene is running
    pub fn on_keyboard_event(&mut self, event: KeyboardEvent) {
        if self.state != SceneState::Running {
            log::trace!("Scene `{}` not running, dropping key {}", self.name, event.key);
            return;
        }
        self.input.push_back(InputEvent::Keyboard(event));
    }

    /// Raw pointer input in screen coordinates; dropped unless running
    pub fn on_pointer_event(&mut self, event: PointerEvent) {
        if self.state != SceneState::Running {
            log::trace!("Scene `{}` not running, dropping pointer event", self.name);
            return;
        }
        self.input.push_back(InputEvent::Pointer(event));
    }

    /// Draw every visible layer through each camera, default first
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        if !self.started {
            return;
        }
        for camera in std::iter::once(&self.camera).chain(&self.cameras) {
            let mut viewport = Viewport::new(renderer, camera);
            self.draw_world(&mut viewport, Some(camera));
        }
    }

    /// Scene hook, layers, then sub-scenes, all in this scene's world space
    fn draw_world(&self, renderer: &mut dyn Renderer, view: Option<&Camera>) {
        if let Some(f) = self.hooks.draw() {
            f(self, renderer);
        }
        for layer in &self.layers {
            layer.draw(renderer, view);
        }
        for embed in &self.embeds {
            if embed.scene.started {
                let mut shifted = Offset::new(renderer, embed.pos);
                embed.scene.draw_world(&mut shifted, None);
            }
        }
    }

    // === Routing ===

    /// Map a screen point to world space through the first camera whose
    /// viewport contains it; secondary cameras take precedence
    pub fn route_pointer(&self, x: f32, y: f32) -> Option<Vec2> {
        self.cameras
            .iter()
            .chain(std::iter::once(&self.camera))
            .find(|c| c.port_contains_position(x, y))
            .map(|c| c.port_to_world(x, y))
    }

    fn track_cameras(&mut self) {
        let size = self.size;
        let targets: Vec<Option<Bounds>> = std::iter::once(&self.camera)
            .chain(&self.cameras)
            .map(|c| c.follow().and_then(|f| self.target_bounds(f.target)))
            .collect();
        for (camera, target) in std::iter::once(&mut self.camera)
            .chain(&mut self.cameras)
            .zip(targets)
        {
            if let Some(target) = target {
                camera.track(&target, size);
            }
        }
    }

    /// World box of an instance, including its layer offset
    fn target_bounds(&self, id: InstanceId) -> Option<Bounds> {
        self.layers.iter().find_map(|layer| {
            let inst = layer.instance(id)?;
            let world = inst.pos + layer.pos;
            Some(match inst.boundary_at(world) {
                Some(b) => b.bounds(),
                None => Bounds {
                    x: world.x,
                    y: world.y,
                    width: 0.0,
                    height: 0.0,
                },
            })
        })
    }

    fn follow_position(&self, layer: &Layer) -> Option<Vec2> {
        let follow = layer.camera_follow()?;
        match &follow.camera {
            None => Some(self.camera.pos),
            Some(name) => self.named_camera(name).ok().map(|c| c.pos),
        }
    }

    fn dispatch_keyboard(
        &mut self,
        sim: &mut SimContext,
        event: &mut KeyboardEvent,
        outbox: &mut Vec<GameEvent>,
    ) {
        if let Some(f) = self.hooks.key(&event.key) {
            f(self, sim, event);
        }
        for embed in self.embeds.iter_mut().rev() {
            if event.is_cancelled() {
                return;
            }
            if embed.scene.state == SceneState::Running {
                let mut sub_outbox = Vec::new();
                embed.scene.dispatch_keyboard(sim, event, &mut sub_outbox);
                embed.scene.events.extend(sub_outbox);
            }
        }
        for layer in self.layers.iter_mut().rev() {
            if event.is_cancelled() {
                return;
            }
            layer.dispatch_keyboard(sim, outbox, event);
        }
    }

    fn dispatch_pointer(
        &mut self,
        sim: &mut SimContext,
        event: &mut PointerEvent,
        outbox: &mut Vec<GameEvent>,
    ) {
        let Some(world) = self.route_pointer(event.x, event.y) else {
            log::trace!("Pointer ({}, {}) outside every viewport", event.x, event.y);
            return;
        };
        event.x = world.x;
        event.y = world.y;
        self.deliver_pointer(sim, event, outbox);
    }

    /// Offer a pointer event already in world coordinates to the scene hook,
    /// then sub-scenes and layers from the top down
    fn deliver_pointer(
        &mut self,
        sim: &mut SimContext,
        event: &mut PointerEvent,
        outbox: &mut Vec<GameEvent>,
    ) {
        if let Some(f) = self.hooks.pointer(event.phase) {
            f(self, sim, event);
        }
        let point = Vec2::new(event.x, event.y);
        for embed in self.embeds.iter_mut().rev() {
            if event.is_cancelled() {
                return;
            }
            if embed.scene.state != SceneState::Running || !embed.contains(point) {
                continue;
            }
            let mut local = event.clone();
            local.x -= embed.pos.x;
            local.y -= embed.pos.y;
            let mut sub_outbox = Vec::new();
            embed.scene.deliver_pointer(sim, &mut local, &mut sub_outbox);
            embed.scene.events.extend(sub_outbox);
            if local.is_cancelled() {
                event.cancel();
            }
        }
        for layer in self.layers.iter_mut().rev() {
            if event.is_cancelled() {
                return;
            }
            layer.dispatch_pointer(sim, outbox, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::ActorDefinition;
    use crate::sim::boundary::BoundaryShape;
    use crate::renderer::RecordingRenderer;
    use crate::sim::camera::Follow;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn tracing_scene(name: &str, log: &Log) -> Scene {
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        Scene::new(name, 400.0, 300.0)
            .unwrap()
            .on_start(move |_, _| a.borrow_mut().push("start".into()))
            .on_resume(move |_, _| b.borrow_mut().push("resume".into()))
            .on_suspend(move |_, _| c.borrow_mut().push("suspend".into()))
    }

    #[test]
    fn test_persistent_lifecycle() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        sim.define_actor(ActorDefinition::new("dot")).unwrap();
        let mut scene = tracing_scene("level", &log).persistent(true);
        scene.add_layer(Layer::new("world", 0)).unwrap();

        assert_eq!(scene.state(), SceneState::NotStarted);
        scene.step(&mut sim);
        assert_eq!(scene.state(), SceneState::NotStarted);

        scene.init();
        assert_eq!(scene.state(), SceneState::Starting);
        scene.step(&mut sim);
        assert_eq!(scene.state(), SceneState::Running);

        let id = scene.create_instance(&mut sim, "world", "dot", 1.0, 1.0).unwrap();
        scene.step(&mut sim);

        scene.suspend(&mut sim);
        assert_eq!(scene.state(), SceneState::Suspended);
        scene.step(&mut sim);

        scene.init();
        assert_eq!(scene.state(), SceneState::Resuming);
        scene.step(&mut sim);
        assert_eq!(scene.state(), SceneState::Running);
        assert!(scene.instance(id).is_some());
        assert_eq!(*log.borrow(), vec!["start", "suspend", "resume"]);
    }

    #[test]
    fn test_non_persistent_scene_resets_on_reentry() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        sim.define_actor(ActorDefinition::new("dot")).unwrap();
        let mut scene = tracing_scene("menu", &log);
        scene.add_layer(Layer::new("world", 0)).unwrap();

        // Placed before the first start: survives the first init
        let early = scene.create_instance(&mut sim, "world", "dot", 0.0, 0.0).unwrap();
        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);
        assert!(scene.instance(early).is_some());

        scene.suspend(&mut sim);
        scene.init();
        assert_eq!(scene.state(), SceneState::Starting);
        assert!(scene.instance(early).is_none());
        assert_eq!(scene.layer("world").unwrap().status(), Status::New);
        scene.step(&mut sim);
        assert_eq!(*log.borrow(), vec!["start", "suspend", "start"]);
    }

    #[test]
    fn test_init_while_running_is_ignored() {
        let mut sim = SimContext::new();
        let mut scene = Scene::new("s", 10.0, 10.0).unwrap();
        scene.init();
        scene.step(&mut sim);
        scene.init();
        assert_eq!(scene.state(), SceneState::Running);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut scene = Scene::new("s", 10.0, 10.0).unwrap();
        scene.add_layer(Layer::new("world", 0)).unwrap();
        assert!(matches!(
            scene.add_layer(Layer::new("world", 1)),
            Err(Error::Duplicate { kind: "layer", .. })
        ));
        scene.add_camera(Camera::new("mini", 5.0, 5.0).unwrap()).unwrap();
        assert!(scene.add_camera(Camera::new("mini", 5.0, 5.0).unwrap()).is_err());
        assert!(scene.add_camera(Camera::new("default", 5.0, 5.0).unwrap()).is_err());
        assert!(matches!(scene.layer("sky"), Err(Error::NotFound { .. })));
        assert!(scene.named_camera("nope").is_err());
    }

    #[test]
    fn test_layers_step_bottom_to_top_and_input_goes_top_down() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        let mut scene = Scene::new("s", 100.0, 100.0).unwrap();
        for (name, depth) in [("top", 5), ("bottom", -1), ("middle", 0)] {
            let (a, b) = (log.clone(), log.clone());
            let tag = name.to_string();
            let tag2 = name.to_string();
            scene
                .add_layer(
                    Layer::new(name, depth)
                        .on_step(move |_| a.borrow_mut().push(format!("step {tag}")))
                        .on_key("x", move |_, _| b.borrow_mut().push(format!("key {tag2}"))),
                )
                .unwrap();
        }
        let names: Vec<&str> = scene.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["bottom", "middle", "top"]);

        scene.init();
        scene.step(&mut sim);
        scene.on_keyboard_event(KeyboardEvent::down("x"));
        scene.step(&mut sim);
        assert_eq!(
            *log.borrow(),
            vec![
                "step bottom",
                "step middle",
                "step top",
                "key top",
                "key middle",
                "key bottom"
            ]
        );
    }

    #[test]
    fn test_input_dropped_while_suspended() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        let l = log.clone();
        let mut scene = Scene::new("s", 100.0, 100.0)
            .unwrap()
            .persistent(true)
            .on_key("p", move |_, _, _| l.borrow_mut().push("p".into()));

        scene.on_keyboard_event(KeyboardEvent::down("p"));
        scene.init();
        scene.step(&mut sim);
        scene.suspend(&mut sim);
        scene.on_keyboard_event(KeyboardEvent::down("p"));
        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);
        assert!(log.borrow().is_empty());

        scene.on_keyboard_event(KeyboardEvent::down("p"));
        scene.step(&mut sim);
        assert_eq!(*log.borrow(), vec!["p"]);
    }

    #[test]
    fn test_game_events_delivered_next_tick() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        let l = log.clone();
        let mut scene = Scene::new("s", 100.0, 100.0)
            .unwrap()
            .on_game_event("score", move |_, _, ev| {
                l.borrow_mut().push(format!("score {:?}", ev.payload))
            });
        scene
            .add_layer(
                Layer::new("world", 0)
                    .on_step(|ctx| ctx.emit(GameEvent::new("score").with_payload(1))),
            )
            .unwrap();

        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);
        assert!(log.borrow().is_empty());
        assert_eq!(scene.queued_events().len(), 1);

        scene.step(&mut sim);
        assert_eq!(*log.borrow(), vec!["score Some(Int(1))"]);
    }

    #[test]
    fn test_destroyed_layer_is_removed_after_its_hook() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        let mut scene = Scene::new("s", 100.0, 100.0).unwrap();
        let l = log.clone();
        scene
            .add_layer(
                Layer::new("fx", 0).on_destroy(move |_| l.borrow_mut().push("gone".into())),
            )
            .unwrap();
        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);
        scene.layer_mut("fx").unwrap().destroy();
        scene.step(&mut sim);
        assert!(scene.layers().is_empty());
        assert_eq!(*log.borrow(), vec!["gone"]);
    }

    #[test]
    fn test_pointer_routing_through_secondary_camera() {
        let hits: Log = Rc::default();
        let mut sim = SimContext::new();
        let h = hits.clone();
        sim.define_actor(
            ActorDefinition::new("button")
                .with_boundary(BoundaryShape::rect(20.0, 20.0).unwrap())
                .on_pointer(PointerPhase::Down, move |_, me, ev| {
                    h.borrow_mut().push(format!("{} at ({}, {})", me.id(), ev.x, ev.y));
                    ev.cancel();
                }),
        )
        .unwrap();

        let mut scene = Scene::new("s", 1000.0, 1000.0).unwrap();
        // Minimap: 100x100 screen pixels showing a 200x200 area at (500, 500)
        scene
            .add_camera(
                Camera::new("minimap", 200.0, 200.0)
                    .unwrap()
                    .with_port(0.0, 0.0, 100.0, 100.0)
                    .unwrap()
                    .at(500.0, 500.0),
            )
            .unwrap();
        scene.add_layer(Layer::new("ui", 1)).unwrap();
        scene.add_layer(Layer::new("world", 0)).unwrap();
        scene.create_instance(&mut sim, "world", "button", 590.0, 590.0).unwrap();
        scene.create_instance(&mut sim, "ui", "button", 590.0, 590.0).unwrap();
        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);

        // (50, 50) on screen is (600, 600) in the world via the minimap
        scene.on_pointer_event(PointerEvent::new(50.0, 50.0, PointerPhase::Down));
        // (300, 300) falls through to the default camera
        scene.on_pointer_event(PointerEvent::new(300.0, 300.0, PointerPhase::Down));
        scene.step(&mut sim);

        // Top layer's button cancels before the world layer sees it
        assert_eq!(*hits.borrow(), vec!["#2 at (600, 600)"]);
    }

    #[test]
    fn test_camera_follow_and_layer_pinning() {
        let mut sim = SimContext::new();
        let hero_box = BoundaryShape::rect(10.0, 10.0).unwrap();
        sim.define_actor(ActorDefinition::new("hero").with_boundary(hero_box))
            .unwrap();
        let mut scene = Scene::new("s", 1000.0, 1000.0)
            .unwrap()
            .with_camera(Camera::new("default", 100.0, 100.0).unwrap());
        scene.add_layer(Layer::new("world", 0)).unwrap();
        scene
            .add_layer(Layer::new("hud", 10).following_camera(None, Vec2::new(4.0, 4.0)))
            .unwrap();
        let hero = scene.create_instance(&mut sim, "world", "hero", 495.0, 495.0).unwrap();
        scene.camera_mut().set_follow(Some(Follow::new(hero)));

        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);
        assert_eq!(scene.camera().pos, Vec2::new(450.0, 450.0));
        assert_eq!(scene.layer("hud").unwrap().pos, Vec2::new(454.0, 454.0));
    }

    fn panel(log: &Log) -> Scene {
        let (a, b) = (log.clone(), log.clone());
        let mut panel = Scene::new("panel", 100.0, 100.0)
            .unwrap()
            .on_step(move |_, _| a.borrow_mut().push("panel step".into()))
            .on_game_event("pressed", move |_, _, _| {
                b.borrow_mut().push("panel pressed".into())
            });
        panel.add_layer(Layer::new("ui", 0)).unwrap();
        panel
    }

    #[test]
    fn test_embedded_scene_follows_parent_lifecycle() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        let mut scene = Scene::new("level", 400.0, 400.0).unwrap().persistent(true);
        scene.embed(panel(&log), 200.0, 50.0).unwrap();
        assert_eq!(scene.embedded("panel").unwrap().state(), SceneState::NotStarted);

        scene.init();
        assert_eq!(scene.embedded("panel").unwrap().state(), SceneState::Starting);
        scene.step(&mut sim);
        assert_eq!(scene.embedded("panel").unwrap().state(), SceneState::Running);
        scene.step(&mut sim);
        scene.step(&mut sim);
        assert_eq!(*log.borrow(), vec!["panel step", "panel step"]);

        scene.suspend(&mut sim);
        assert_eq!(scene.embedded("panel").unwrap().state(), SceneState::Suspended);
        scene.step(&mut sim);
        assert_eq!(log.borrow().len(), 2);

        scene.init();
        scene.step(&mut sim);
        assert_eq!(scene.embedded("panel").unwrap().state(), SceneState::Running);

        // Joining a live parent starts right away
        let late = Scene::new("late", 10.0, 10.0).unwrap();
        scene.embed(late, 0.0, 0.0).unwrap();
        assert_eq!(scene.embedded("late").unwrap().state(), SceneState::Starting);
    }

    #[test]
    fn test_embedded_scene_draws_at_its_offset() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        sim.define_actor(ActorDefinition::new("pip").with_sprite("pip")).unwrap();
        let mut scene = Scene::new("level", 400.0, 400.0).unwrap();
        scene.add_layer(Layer::new("world", 0)).unwrap();
        scene.create_instance(&mut sim, "world", "pip", 5.0, 5.0).unwrap();
        let mut sub = panel(&log);
        sub.create_instance(&mut sim, "ui", "pip", 10.0, 20.0).unwrap();
        scene.embed(sub, 200.0, 50.0).unwrap();

        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);
        let mut out = RecordingRenderer::new();
        scene.draw(&mut out);
        let positions: Vec<Vec2> = out.commands().iter().map(|c| c.pos).collect();
        assert_eq!(positions, vec![Vec2::new(5.0, 5.0), Vec2::new(210.0, 70.0)]);

        scene.move_embed("panel", 0.0, 0.0).unwrap();
        assert_eq!(scene.embed_position("panel").unwrap(), Vec2::ZERO);
        out.clear();
        scene.draw(&mut out);
        assert_eq!(out.commands()[1].pos, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_pointer_is_translated_into_embedded_scene() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        let h = log.clone();
        sim.define_actor(
            ActorDefinition::new("button")
                .with_boundary(BoundaryShape::rect(20.0, 20.0).unwrap())
                .on_pointer(PointerPhase::Down, move |ctx, _, ev| {
                    h.borrow_mut().push(format!("hit at ({}, {})", ev.x, ev.y));
                    ctx.emit(GameEvent::new("pressed"));
                    ev.cancel();
                }),
        )
        .unwrap();

        let mut scene = Scene::new("level", 400.0, 400.0).unwrap();
        scene.add_layer(Layer::new("world", 0)).unwrap();
        // Under the panel: only reached if the panel does not cancel
        scene.create_instance(&mut sim, "world", "button", 205.0, 55.0).unwrap();
        let mut sub = panel(&Rc::default());
        sub.create_instance(&mut sim, "ui", "button", 10.0, 10.0).unwrap();
        let sub = sub.on_game_event("pressed", {
            let l = log.clone();
            move |_, _, _| l.borrow_mut().push("panel pressed".into())
        });
        scene.embed(sub, 200.0, 50.0).unwrap();

        scene.init();
        scene.step(&mut sim);
        scene.step(&mut sim);

        scene.on_pointer_event(PointerEvent::new(215.0, 65.0, PointerPhase::Down));
        scene.step(&mut sim);
        assert_eq!(*log.borrow(), vec!["hit at (15, 15)"]);
        assert_eq!(scene.embedded("panel").unwrap().queued_events().len(), 1);
        assert!(scene.queued_events().is_empty());

        scene.step(&mut sim);
        assert_eq!(*log.borrow(), vec!["hit at (15, 15)", "panel pressed"]);

        // Missing the panel's button falls through to the parent's layers
        log.borrow_mut().clear();
        scene.on_pointer_event(PointerEvent::new(206.0, 56.0, PointerPhase::Down));
        scene.step(&mut sim);
        assert_eq!(*log.borrow(), vec!["hit at (206, 56)"]);
    }

    #[test]
    fn test_embed_names_are_unique_and_removal_runs_destroy() {
        let log: Log = Rc::default();
        let mut sim = SimContext::new();
        let mut scene = Scene::new("level", 400.0, 400.0).unwrap();
        let l = log.clone();
        let sub = Scene::new("panel", 10.0, 10.0)
            .unwrap()
            .on_destroy(move |s, _| l.borrow_mut().push(format!("{} destroyed", s.name())));
        scene.embed(sub, 0.0, 0.0).unwrap();
        assert!(matches!(
            scene.embed(Scene::new("panel", 5.0, 5.0).unwrap(), 1.0, 1.0),
            Err(Error::Duplicate { kind: "sub-scene", .. })
        ));

        scene.remove_embed(&mut sim, "panel").unwrap();
        assert_eq!(*log.borrow(), vec!["panel destroyed"]);
        assert!(matches!(scene.embedded("panel"), Err(Error::NotFound { .. })));
        assert!(scene.remove_embed(&mut sim, "panel").is_err());
    }
}
