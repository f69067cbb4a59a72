//! Layers: depth-ordered groups of instances
//!
//! A layer drives the per-step instance lifecycle:
//!
//! - `Destroyed`: removed from the index, destroy hook runs, nothing else
//! - `New`: becomes `Active`, create hook runs, no step this time
//! - `Active`: before-step behaviors, step hook, after-step behaviors, then
//!   the game events drained for this tick
//!
//! Ids are snapshotted before the pass, so instances created by callbacks
//! wait for the next step and removals never disturb the walk.

use std::rc::Rc;

use glam::Vec2;

use super::camera::Camera;
use super::context::{SimContext, StepContext};
use super::event::{Cancellable, GameEvent, KeyboardEvent, PointerEvent, PointerPhase};
use super::hooks::{HookKind, Hooks};
use super::index::InstanceIndex;
use super::motion;
use super::state::{Instance, InstanceId, LayerId, Status};
use crate::error::Result;
use crate::renderer::{Offset, Renderer};

/// Callback signatures for layers
pub struct LayerHooks;

impl HookKind for LayerHooks {
    type Lifecycle = dyn Fn(&mut StepContext<'_>);
    type Draw = dyn Fn(&Layer, &mut dyn Renderer);
    type GameEvent = dyn Fn(&mut StepContext<'_>, &mut GameEvent);
    type Keyboard = dyn Fn(&mut StepContext<'_>, &mut KeyboardEvent);
    type Pointer = dyn Fn(&mut StepContext<'_>, &mut PointerEvent);
}

/// Keeps a layer pinned to a camera (HUDs, parallax backdrops)
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFollow {
    pub camera: Option<String>,
    pub offset: Vec2,
}

pub struct Layer {
    pub(crate) id: LayerId,
    name: String,
    depth: i32,
    active: bool,
    visible: bool,
    status: Status,
    /// Offset added to instance positions when drawing and hit-testing
    pub pos: Vec2,
    follow: Option<CameraFollow>,
    instances: InstanceIndex,
    hooks: Hooks<LayerHooks>,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("depth", &self.depth)
            .field("active", &self.active)
            .field("visible", &self.visible)
            .field("status", &self.status)
            .field("instances", &self.instances.len())
            .finish()
    }
}

impl Layer {
    /// Lower depth is further back: stepped first, drawn first, offered
    /// input last
    pub fn new(name: impl Into<String>, depth: i32) -> Self {
        Self {
            id: LayerId(0),
            name: name.into(),
            depth,
            active: true,
            visible: true,
            status: Status::New,
            pos: Vec2::ZERO,
            follow: None,
            instances: InstanceIndex::new(),
            hooks: Hooks::default(),
        }
    }

    pub fn on_create(mut self, f: impl Fn(&mut StepContext<'_>) + 'static) -> Self {
        self.hooks.set_create(Rc::new(f));
        self
    }

    pub fn on_destroy(mut self, f: impl Fn(&mut StepContext<'_>) + 'static) -> Self {
        self.hooks.set_destroy(Rc::new(f));
        self
    }

    pub fn on_step(mut self, f: impl Fn(&mut StepContext<'_>) + 'static) -> Self {
        self.hooks.set_step(Rc::new(f));
        self
    }

    pub fn on_draw(mut self, f: impl Fn(&Layer, &mut dyn Renderer) + 'static) -> Self {
        self.hooks.set_draw(Rc::new(f));
        self
    }

    pub fn on_game_event(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut StepContext<'_>, &mut GameEvent) + 'static,
    ) -> Self {
        self.hooks.set_game_event(name, Rc::new(f));
        self
    }

    pub fn on_key(
        mut self,
        key: impl Into<String>,
        f: impl Fn(&mut StepContext<'_>, &mut KeyboardEvent) + 'static,
    ) -> Self {
        self.hooks.set_key(key, Rc::new(f));
        self
    }

    pub fn on_pointer(
        mut self,
        phase: PointerPhase,
        f: impl Fn(&mut StepContext<'_>, &mut PointerEvent) + 'static,
    ) -> Self {
        self.hooks.set_pointer(phase, Rc::new(f));
        self
    }

    /// Pin the layer to a camera (`None` = the scene's default camera)
    pub fn following_camera(mut self, camera: Option<&str>, offset: Vec2) -> Self {
        self.follow = Some(CameraFollow {
            camera: camera.map(str::to_string),
            offset,
        });
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn camera_follow(&self) -> Option<&CameraFollow> {
        self.follow.as_ref()
    }

    /// Mark for removal; the scene drops it before its next step
    pub fn destroy(&mut self) {
        self.status = Status::Destroyed;
    }

    pub fn instances(&self) -> &InstanceIndex {
        &self.instances
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(id)
    }

    /// Spawn an instance from outside any callback
    pub fn create_instance(
        &mut self,
        sim: &mut SimContext,
        actor: &str,
        x: f32,
        y: f32,
    ) -> Result<InstanceId> {
        let mut outbox = Vec::new();
        let mut ctx = StepContext::new(self.id, &mut self.instances, sim, &mut outbox);
        ctx.create_instance(actor, x, y)
    }

    /// Back to `New`; instances are dropped only if the layer ran since its
    /// last reset, so content placed before the first start survives
    pub(crate) fn reset(&mut self) {
        if self.status != Status::New {
            self.instances.clear();
        }
        self.status = Status::New;
    }

    /// Run the destroy hook of a layer being removed
    pub(crate) fn finish(mut self, sim: &mut SimContext, outbox: &mut Vec<GameEvent>) {
        log::debug!("Layer `{}` destroyed", self.name);
        if let Some(f) = self.hooks.destroy() {
            f(&mut StepContext::new(self.id, &mut self.instances, sim, outbox));
        }
    }

    /// Place the layer relative to the camera it follows
    pub(crate) fn follow_camera(&mut self, camera_pos: Vec2) {
        if let Some(follow) = &self.follow {
            self.pos = camera_pos + follow.offset;
        }
    }

    /// One simulation step
    ///
    /// `events` are this tick's drained game events, shared with sibling
    /// layers; events emitted by callbacks go to `outbox`.
    pub(crate) fn step(
        &mut self,
        sim: &mut SimContext,
        events: &mut [GameEvent],
        outbox: &mut Vec<GameEvent>,
    ) {
        if !self.active || self.status == Status::Destroyed {
            return;
        }

        let mut ctx = StepContext::new(self.id, &mut self.instances, sim, outbox);

        if self.status == Status::New {
            self.status = Status::Active;
            log::debug!("Layer `{}` created", self.name);
            if let Some(f) = self.hooks.create() {
                f(&mut ctx);
            }
        }

        if let Some(f) = self.hooks.step() {
            f(&mut ctx);
        }

        let pass: Vec<(InstanceId, Status)> =
            ctx.instances().iter().map(|i| (i.id(), i.status())).collect();
        for (id, status) in pass {
            process_instance(&mut ctx, id, status, events);
        }

        for event in events.iter_mut() {
            if event.is_cancelled() {
                continue;
            }
            if let Some(f) = self.hooks.game_event(&event.name) {
                f(&mut ctx, event);
            }
        }
    }

    pub(crate) fn dispatch_keyboard(
        &mut self,
        sim: &mut SimContext,
        outbox: &mut Vec<GameEvent>,
        event: &mut KeyboardEvent,
    ) {
        if !self.active || self.status != Status::Active {
            return;
        }
        let mut ctx = StepContext::new(self.id, &mut self.instances, sim, outbox);

        if let Some(f) = self.hooks.key(&event.key) {
            f(&mut ctx, event);
        }

        for id in ctx.instances().ids() {
            if event.is_cancelled() {
                return;
            }
            let wants = ctx
                .instance(id)
                .is_some_and(|i| i.is_live() && i.definition().hooks().has_key(&event.key));
            if !wants {
                continue;
            }
            if let Some(mut inst) = ctx.check_out(id) {
                if let Some(f) = inst.definition().hooks().key(&event.key) {
                    f(&mut ctx, &mut inst, event);
                }
                ctx.check_in(inst);
            }
        }
    }

    /// Offer a pointer event in scene coordinates to the layer and to each
    /// instance containing the point
    pub(crate) fn dispatch_pointer(
        &mut self,
        sim: &mut SimContext,
        outbox: &mut Vec<GameEvent>,
        event: &mut PointerEvent,
    ) {
        if !self.active || self.status != Status::Active {
            return;
        }
        let local = Vec2::new(event.x, event.y) - self.pos;
        let mut ctx = StepContext::new(self.id, &mut self.instances, sim, outbox);

        if let Some(f) = self.hooks.pointer(event.phase) {
            f(&mut ctx, event);
        }

        let hits: Vec<InstanceId> = ctx
            .instances()
            .at_position(local.x, local.y)
            .filter(|i| i.definition().hooks().has_pointer(event.phase))
            .map(|i| i.id())
            .collect();

        for id in hits {
            if event.is_cancelled() {
                return;
            }
            if let Some(mut inst) = ctx.check_out(id) {
                if let Some(f) = inst.definition().hooks().pointer(event.phase) {
                    f(&mut ctx, &mut inst, event);
                }
                ctx.check_in(inst);
            }
        }
    }

    /// Draw the layer in its own coordinates, shifted by `pos`
    ///
    /// Instances with a boundary that `view` cannot see are culled; with no
    /// view everything is drawn.
    pub(crate) fn draw(&self, renderer: &mut dyn Renderer, view: Option<&Camera>) {
        if !self.visible || self.status != Status::Active {
            return;
        }
        let mut local = Offset::new(renderer, self.pos);
        if let Some(f) = self.hooks.draw() {
            f(self, &mut local);
        }
        for inst in self.instances.live() {
            let culled = view.is_some_and(|camera| {
                inst.boundary_at(inst.pos + self.pos)
                    .is_some_and(|b| !camera.sees(&b.bounds()))
            });
            if culled {
                continue;
            }
            if let Some(f) = inst.definition().hooks().draw() {
                f(inst, &mut local);
            } else if let Some(sprite) = inst.definition().sprite() {
                local.draw_at(sprite, inst.pos.x, inst.pos.y, inst.frame, inst.opacity);
            }
        }
    }
}

/// Lifecycle transition for one instance
///
/// `status` is the status it had when the pass began. Instances destroyed
/// since then are skipped and removed on the next pass.
fn process_instance(
    ctx: &mut StepContext<'_>,
    id: InstanceId,
    status: Status,
    events: &mut [GameEvent],
) {
    let Some(mut inst) = ctx.check_out(id) else {
        return;
    };
    let def = Rc::clone(inst.definition());

    if status != Status::Destroyed && inst.status() == Status::Destroyed {
        ctx.check_in(inst);
        return;
    }

    match status {
        Status::Destroyed => {
            if let Some(f) = def.hooks().destroy() {
                f(ctx, &mut inst);
            }
            ctx.release();
            return;
        }
        Status::New => {
            inst.status = Status::Active;
            if let Some(f) = def.hooks().create() {
                f(ctx, &mut inst);
            }
        }
        Status::Active => 'active: {
            // Any instance with motion state moves, whether it came from the
            // actor's behaviors or a later `set_speed`
            motion::before_step(&mut inst, ctx.instances());
            if let Some(f) = def.hooks().step() {
                f(ctx, &mut inst);
            }
            if ctx.is_destroyed(&inst) {
                break 'active;
            }
            motion::after_step(&mut inst, ctx);
            for event in events.iter_mut() {
                if ctx.is_destroyed(&inst) {
                    break;
                }
                if event.is_cancelled() {
                    continue;
                }
                if let Some(f) = def.hooks().game_event(&event.name) {
                    f(ctx, &mut inst, event);
                }
            }
        }
    }
    ctx.check_in(inst);
}
