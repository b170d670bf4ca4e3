//! Simulation space <-> window space mapping
//!
//! Simulation space is meters, origin bottom-left, y-up.
//! Window space is pixels, origin top-left, y-down.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Length of the debug velocity line, as a fraction of velocity in px/s
pub const VELOCITY_INDICATOR_SCALE: f64 = 0.1;

/// Window dimensions plus the board they display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub sim_width: f64,
    pub sim_height: f64,
    pub window_width: f64,
    pub window_height: f64,
}

impl Viewport {
    pub fn new(sim_width: f64, sim_height: f64, window_width: f64, window_height: f64) -> Self {
        Self {
            sim_width,
            sim_height,
            window_width,
            window_height,
        }
    }

    /// Update window dimensions (simulation dimensions never change)
    pub fn resize(&mut self, window_width: f64, window_height: f64) {
        self.window_width = window_width;
        self.window_height = window_height;
    }

    /// Resize from a new window height, keeping the board's aspect ratio
    pub fn resize_to_height(&mut self, window_height: f64) {
        let width = window_height * self.sim_width / self.sim_height;
        self.resize(width, window_height);
    }

    /// Horizontal pixels per meter
    #[inline]
    pub fn px_per_meter_x(&self) -> f64 {
        self.window_width / self.sim_width
    }

    /// Vertical pixels per meter
    #[inline]
    pub fn px_per_meter_y(&self) -> f64 {
        self.window_height / self.sim_height
    }

    #[inline]
    pub fn sim_to_window(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            (p.x / self.sim_width) * self.window_width,
            self.window_height - (p.y / self.sim_height) * self.window_height,
        )
    }

    #[inline]
    pub fn window_to_sim(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            (p.x / self.window_width) * self.sim_width,
            ((self.window_height - p.y) / self.window_height) * self.sim_height,
        )
    }

    /// Circle radius in pixels (circles scale with window width)
    #[inline]
    pub fn radius_px(&self, radius: f64) -> f64 {
        radius * self.px_per_meter_x()
    }

    /// Window-space line for a goal divider, from the floor up to the goal zone top
    pub fn divider_segment(&self, divider_x: f64, goal_zone_height: f64) -> (DVec2, DVec2) {
        (
            self.sim_to_window(DVec2::new(divider_x, 0.0)),
            self.sim_to_window(DVec2::new(divider_x, goal_zone_height)),
        )
    }

    /// Window-space debug line showing a ball's velocity
    pub fn velocity_indicator(&self, pos: DVec2, vel: DVec2) -> (DVec2, DVec2) {
        let start = self.sim_to_window(pos);
        let offset = DVec2::new(
            vel.x * self.px_per_meter_x() * VELOCITY_INDICATOR_SCALE,
            -vel.y * self.px_per_meter_y() * VELOCITY_INDICATOR_SCALE,
        );
        (start, start + offset)
    }
}
