//! Cameras map a world rectangle onto a viewport rectangle
//!
//! The mapping is used in both directions: world to screen when drawing and
//! screen to world when routing pointer input.

use glam::Vec2;

use super::boundary::Bounds;
use super::geometry::{rect_contains_point, rect_intersects_rect};
use super::state::InstanceId;
use crate::error::{Error, Result};

/// Follow settings for a camera tracking an instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Follow {
    pub target: InstanceId,
    /// Keep the target in the middle of the view instead of the top-left
    pub centered: bool,
    /// Subtracted from the computed position
    pub offset: Vec2,
    /// Keep the view inside the scene bounds
    pub clamp: bool,
}

impl Follow {
    pub fn new(target: InstanceId) -> Self {
        Self {
            target,
            centered: true,
            offset: Vec2::ZERO,
            clamp: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    name: String,
    /// World position of the view's top-left corner
    pub pos: Vec2,
    size: Vec2,
    port_pos: Vec2,
    port_size: Vec2,
    follow: Option<Follow>,
}

fn positive(width: f32, height: f32) -> Result<Vec2> {
    if width > 0.0 && height > 0.0 {
        Ok(Vec2::new(width, height))
    } else {
        Err(Error::InvalidRect { width, height })
    }
}

impl Camera {
    /// Camera at the world origin whose viewport matches its size
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Result<Self> {
        let size = positive(width, height)?;
        Ok(Self {
            name: name.into(),
            pos: Vec2::ZERO,
            size,
            port_pos: Vec2::ZERO,
            port_size: size,
            follow: None,
        })
    }

    /// Place the viewport on screen
    pub fn with_port(mut self, x: f32, y: f32, width: f32, height: f32) -> Result<Self> {
        self.port_size = positive(width, height)?;
        self.port_pos = Vec2::new(x, y);
        Ok(self)
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.pos = Vec2::new(x, y);
        self
    }

    pub fn with_follow(mut self, follow: Follow) -> Self {
        self.follow = Some(follow);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn port_pos(&self) -> Vec2 {
        self.port_pos
    }

    pub fn port_size(&self) -> Vec2 {
        self.port_size
    }

    pub fn follow(&self) -> Option<&Follow> {
        self.follow.as_ref()
    }

    pub fn set_follow(&mut self, follow: Option<Follow>) {
        self.follow = follow;
    }

    /// Whether a screen point falls inside the viewport (edges included)
    pub fn port_contains_position(&self, x: f32, y: f32) -> bool {
        rect_contains_point(
            self.port_pos.x,
            self.port_pos.y,
            self.port_size.x,
            self.port_size.y,
            x,
            y,
        )
    }

    /// World units per screen unit on each axis
    fn scale(&self) -> Vec2 {
        self.size / self.port_size
    }

    /// Screen point to world point
    pub fn port_to_world(&self, x: f32, y: f32) -> Vec2 {
        (Vec2::new(x, y) - self.port_pos) * self.scale() + self.pos
    }

    /// World point to screen point
    pub fn world_to_port(&self, x: f32, y: f32) -> Vec2 {
        (Vec2::new(x, y) - self.pos) / self.scale() + self.port_pos
    }

    /// Whether a world box is at least partly in view
    pub fn sees(&self, bounds: &Bounds) -> bool {
        rect_intersects_rect(
            self.pos.x,
            self.pos.y,
            self.size.x,
            self.size.y,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
        )
    }

    /// Move toward the follow target inside a scene of `scene_size`
    pub fn track(&mut self, target: &Bounds, scene_size: Vec2) {
        let Some(follow) = self.follow else {
            return;
        };
        let mut pos = Vec2::new(target.x, target.y);
        if follow.centered {
            pos += Vec2::new(target.width, target.height) / 2.0 - self.size / 2.0;
        }
        pos -= follow.offset;
        if follow.clamp {
            let max = (scene_size - self.size).max(Vec2::ZERO);
            pos = pos.clamp(Vec2::ZERO, max);
        }
        self.pos = pos;
    }
}
