//! Fixed timestep driver
//!
//! Converts variable frame times into a whole number of simulation steps.

use crate::consts::MAX_FRAME_DT;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(settings: &Settings) -> Self {
        Self {
            dt: settings.step_dt(),
            max_substeps: settings.max_substeps,
            accumulator: 0.0,
        }
    }

    /// Seconds per step
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Unconsumed time carried into the next frame
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Account for `elapsed` seconds of wall time and run `step` once per
    /// whole timestep, at most `max_substeps` times; returns the step count
    pub fn advance(&mut self, elapsed: f32, mut step: impl FnMut()) -> u32 {
        // Clamp to avoid a spiral of death after a stall
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            step();
            self.accumulator -= self.dt;
            substeps += 1;
        }
        substeps
    }
}
