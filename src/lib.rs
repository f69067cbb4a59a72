//! Stagehand - a 2D actor/layer/scene simulation core
//!
//! Core modules:
//! - `sim`: Step-driven simulation (boundaries, motion, lifecycles, event routing)
//! - `renderer`: Draw surface consumed by the simulation
//! - `settings`: Data-driven driver configuration
//! - `error`: Configuration and lookup failures

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::Settings;

use glam::Vec2;

/// Driver configuration constants
pub mod consts {
    /// Fixed simulation step rate (Hz)
    pub const STEP_HZ: u32 = 120;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / STEP_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the driver will accumulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default scene dimensions
    pub const SCENE_WIDTH: f32 = 800.0;
    pub const SCENE_HEIGHT: f32 = 600.0;
}

/// Horizontal component of a vector of `length` pointing at `degrees`
///
/// 0° is +x, 90° is +y (down in screen space).
#[inline]
pub fn length_direction_x(length: f32, degrees: f32) -> f32 {
    length * degrees.to_radians().cos()
}

/// Vertical component of a vector of `length` pointing at `degrees`
#[inline]
pub fn length_direction_y(length: f32, degrees: f32) -> f32 {
    length * degrees.to_radians().sin()
}

/// Both components of [`length_direction_x`] / [`length_direction_y`]
#[inline]
pub fn length_direction(length: f32, degrees: f32) -> Vec2 {
    Vec2::new(
        length_direction_x(length, degrees),
        length_direction_y(length, degrees),
    )
}
