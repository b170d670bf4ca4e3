//! Plinko Sim - A fixed-timestep Plinko board simulator
//!
//! Core modules:
//! - `sim`: Deterministic simulation (layout, collisions, integration, scoring)
//! - `config`: Board parameters and validation
//! - `viewport`: Simulation space <-> window space mapping
//! - `runtime`: Simulation thread with rate governor and shared board

pub mod config;
pub mod error;
pub mod runtime;
pub mod sim;
pub mod viewport;

pub use config::{BallCollisionMode, BoardConfig, BoardParams};
pub use error::{ConfigError, SpawnError};
pub use runtime::SimulationHandle;
pub use sim::Board;
pub use viewport::Viewport;

use glam::DVec2;

/// Board defaults
pub mod consts {
    /// Simulation width in meters
    pub const SIM_WIDTH: f64 = 100.0;
    /// Board aspect ratio (width : height), tall so the playing field is vertical
    pub const ASPECT_RATIO: (f64, f64) = (9.0, 16.0);
    /// Initial window height in pixels
    pub const WINDOW_HEIGHT: f64 = 1050.0;

    /// Ball and pin radius (meters)
    pub const BALL_RADIUS: f64 = 1.5;
    pub const PIN_RADIUS: f64 = 1.5;

    /// Downward acceleration (m/s²), 25x earth gravity so drops feel snappy
    pub const GRAVITY: f64 = 25.0 * 9.8;
    /// Fraction of velocity kept after one second of air drag
    pub const AIR_DAMPING_PER_SECOND: f64 = 0.9999;
    /// Fraction of velocity kept after any collision response
    pub const BOUNCE_DAMPING: f64 = 0.9;
    pub const MAX_VELOCITY: f64 = 300.0;

    /// Simulation rate (Hz)
    pub const TICK_RATE_HZ: u32 = 128;
    /// Balls older than this are reclaimed without scoring
    pub const BALL_TIMEOUT_SECS: f64 = 30.0;
    pub const MAX_ACTIVE_BALLS: usize = 16;

    /// Requested goal count (coerced to odd)
    pub const GOAL_COUNT: u32 = 10;
    /// Goal zone height as a fraction of board height
    pub const GOAL_ZONE_FRACTION: f64 = 0.05;

    pub const PIN_ROWS: u32 = 9;
    /// First pin row height as a fraction of board height
    pub const PIN_START_FRACTION: f64 = 0.10;

    /// Extra separation after a circle contact (keeps contacts strictly apart)
    pub const CONTACT_EPSILON: f64 = 1e-10;
    /// Extra separation after a wall/ceiling/divider contact
    pub const BOUNDARY_NUDGE: f64 = 0.01;

    /// Undrained tick events kept before the oldest are discarded
    pub const MAX_PENDING_EVENTS: usize = 4096;

    /// Points for the center slot; outer slots fall off by 10^(distance/5)
    pub const CENTER_SLOT_POINTS: f64 = 1000.0;
}

/// Unit normal pointing from `from` to `to`, or `None` when the points coincide
#[inline]
pub fn contact_normal(to: DVec2, from: DVec2) -> Option<(DVec2, f64)> {
    let delta = to - from;
    let dist = delta.length();
    if dist == 0.0 || !dist.is_finite() {
        return None;
    }
    Some((delta / dist, dist))
}

/// Rescale `vel` down to `max_speed` if it exceeds it
#[inline]
pub fn clamp_speed(vel: DVec2, max_speed: f64) -> DVec2 {
    let speed = vel.length();
    if speed > max_speed {
        vel * (max_speed / speed)
    } else {
        vel
    }
}
