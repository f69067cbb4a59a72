//! Draw surface consumed by the simulation
//!
//! The simulation never touches pixels. It hands sprite name, position,
//! frame and opacity to a [`Renderer`]; hosts provide the real backend.

use glam::Vec2;

use crate::sim::camera::Camera;

/// Anything that can draw a sprite frame at a position
pub trait Renderer {
    fn draw_at(&mut self, sprite: &str, x: f32, y: f32, frame: u32, opacity: f32);
}

/// Maps world coordinates to screen coordinates through a camera
///
/// Draws outside the camera's world rectangle are still forwarded; clipping
/// is left to the backend.
pub struct Viewport<'a> {
    inner: &'a mut dyn Renderer,
    camera: &'a Camera,
}

impl<'a> Viewport<'a> {
    pub fn new(inner: &'a mut dyn Renderer, camera: &'a Camera) -> Self {
        Self { inner, camera }
    }

    pub fn camera(&self) -> &Camera {
        self.camera
    }
}

impl Renderer for Viewport<'_> {
    fn draw_at(&mut self, sprite: &str, x: f32, y: f32, frame: u32, opacity: f32) {
        let screen = self.camera.world_to_port(x, y);
        self.inner.draw_at(sprite, screen.x, screen.y, frame, opacity);
    }
}

/// Shifts every draw by a fixed offset
///
/// Used to move layer-local and sub-scene coordinates into the parent's
/// world space.
pub struct Offset<'a> {
    inner: &'a mut dyn Renderer,
    offset: Vec2,
}

impl<'a> Offset<'a> {
    pub fn new(inner: &'a mut dyn Renderer, offset: Vec2) -> Self {
        Self { inner, offset }
    }
}

impl Renderer for Offset<'_> {
    fn draw_at(&mut self, sprite: &str, x: f32, y: f32, frame: u32, opacity: f32) {
        self.inner
            .draw_at(sprite, x + self.offset.x, y + self.offset.y, frame, opacity);
    }
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub sprite: String,
    pub pos: Vec2,
    pub frame: u32,
    pub opacity: f32,
}

/// Headless backend that keeps every draw call of the current frame
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Start a new frame
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn draw_at(&mut self, sprite: &str, x: f32, y: f32, frame: u32, opacity: f32) {
        self.commands.push(DrawCommand {
            sprite: sprite.to_string(),
            pos: Vec2::new(x, y),
            frame,
            opacity,
        });
    }
}
