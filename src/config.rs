//! Board configuration
//!
//! `BoardConfig` is the user-facing, serde-loadable form. `validate()` checks
//! every invariant once, before the first tick, and produces the read-only
//! `BoardParams` the simulation runs on.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// How two overlapping balls respond to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BallCollisionMode {
    /// Each ball reflects off its partner as if the partner were a fixed pin.
    /// Only the iterated ball is corrected, so every pair is visited twice.
    #[default]
    Reflect,
    /// Each unordered pair is resolved once: equal-mass exchange of the
    /// normal velocity component, both balls pushed apart.
    Elastic,
}

impl BallCollisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallCollisionMode::Reflect => "reflect",
            BallCollisionMode::Elastic => "elastic",
        }
    }
}

impl FromStr for BallCollisionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reflect" | "asymmetric" => Ok(BallCollisionMode::Reflect),
            "elastic" | "symmetric" => Ok(BallCollisionMode::Elastic),
            other => Err(ConfigError::invalid(
                "ball_collisions",
                format!("unknown mode `{other}` (expected reflect or elastic)"),
            )),
        }
    }
}

/// Board configuration as written by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    // === Board geometry (meters) ===
    pub sim_width: f64,
    pub sim_height: f64,
    pub ball_radius: f64,
    pub pin_radius: f64,
    pub pin_rows: u32,
    /// Height of the first pin row as a fraction of `sim_height`
    pub pin_start_fraction: f64,
    /// Requested number of goal slots (even counts are bumped to odd)
    pub goal_count: u32,
    /// Goal zone height as a fraction of `sim_height`
    pub goal_zone_fraction: f64,

    // === Physics ===
    pub gravity: f64,
    /// Fraction of velocity kept after one second of drag
    pub air_damping_per_second: f64,
    /// Fraction of velocity kept after a collision (0 - 1)
    pub bounce_damping: f64,
    pub max_velocity: f64,
    pub ball_collisions: BallCollisionMode,
    pub contact_epsilon: f64,
    pub boundary_nudge: f64,

    // === Timing / capacity ===
    pub tick_rate_hz: u32,
    pub ball_timeout_secs: f64,
    pub max_active_balls: usize,
    /// Inactive slots created at startup (the rest are appended on demand)
    pub initial_pool: usize,

    // === Window (pixels) ===
    pub window_width: f64,
    pub window_height: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let (aspect_w, aspect_h) = ASPECT_RATIO;
        Self {
            sim_width: SIM_WIDTH,
            sim_height: SIM_WIDTH / aspect_w * aspect_h,
            ball_radius: BALL_RADIUS,
            pin_radius: PIN_RADIUS,
            pin_rows: PIN_ROWS,
            pin_start_fraction: PIN_START_FRACTION,
            goal_count: GOAL_COUNT,
            goal_zone_fraction: GOAL_ZONE_FRACTION,

            gravity: GRAVITY,
            air_damping_per_second: AIR_DAMPING_PER_SECOND,
            bounce_damping: BOUNCE_DAMPING,
            max_velocity: MAX_VELOCITY,
            ball_collisions: BallCollisionMode::Reflect,
            contact_epsilon: CONTACT_EPSILON,
            boundary_nudge: BOUNDARY_NUDGE,

            tick_rate_hz: TICK_RATE_HZ,
            ball_timeout_secs: BALL_TIMEOUT_SECS,
            max_active_balls: MAX_ACTIVE_BALLS,
            initial_pool: 1,

            window_width: WINDOW_HEIGHT * aspect_w / aspect_h,
            window_height: WINDOW_HEIGHT,
        }
    }
}

/// Validated, read-only board parameters with derived quantities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardParams {
    pub sim_width: f64,
    pub sim_height: f64,
    pub ball_radius: f64,
    pub pin_radius: f64,
    pub pin_rows: u32,
    pub pin_start_fraction: f64,
    /// Always odd
    pub goal_count: u32,
    pub goal_width: f64,
    pub goal_zone_height: f64,

    pub gravity: f64,
    /// Per-tick multiplier (`air_damping_per_second ^ dt`)
    pub air_damping: f64,
    pub bounce_damping: f64,
    pub max_velocity: f64,
    pub ball_collisions: BallCollisionMode,
    pub contact_epsilon: f64,
    pub boundary_nudge: f64,

    pub tick_rate_hz: u32,
    pub dt: f64,
    pub max_age_ticks: u32,
    pub max_active_balls: usize,
    pub initial_pool: usize,

    pub window_width: f64,
    pub window_height: f64,
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::invalid(field, format!("must be finite and > 0, got {value}")))
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::invalid(field, format!("must be within [0, 1], got {value}")))
    }
}

impl BoardConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded board config from {}", path.display());
        Ok(config)
    }

    /// Check every invariant and derive the per-tick parameters
    pub fn validate(&self) -> Result<BoardParams, ConfigError> {
        let sim_width = positive("sim_width", self.sim_width)?;
        let sim_height = positive("sim_height", self.sim_height)?;
        let ball_radius = positive("ball_radius", self.ball_radius)?;
        let pin_radius = positive("pin_radius", self.pin_radius)?;
        let pin_start_fraction = unit_interval("pin_start_fraction", self.pin_start_fraction)?;
        let goal_zone_fraction = unit_interval("goal_zone_fraction", self.goal_zone_fraction)?;

        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(ConfigError::invalid(
                "gravity",
                format!("must be a finite magnitude >= 0, got {}", self.gravity),
            ));
        }
        let air_per_second = positive("air_damping_per_second", self.air_damping_per_second)?;
        if air_per_second > 1.0 {
            return Err(ConfigError::invalid(
                "air_damping_per_second",
                format!("must be within (0, 1], got {air_per_second}"),
            ));
        }
        let bounce_damping = unit_interval("bounce_damping", self.bounce_damping)?;
        let max_velocity = positive("max_velocity", self.max_velocity)?;
        let contact_epsilon = positive("contact_epsilon", self.contact_epsilon)?;
        // Pin spacing is 3(rb + rp) - eps; keep it above one contact distance
        if contact_epsilon >= ball_radius + pin_radius {
            return Err(ConfigError::invalid(
                "contact_epsilon",
                format!(
                    "must be below ball_radius + pin_radius ({}), got {contact_epsilon}",
                    ball_radius + pin_radius
                ),
            ));
        }
        let boundary_nudge = positive("boundary_nudge", self.boundary_nudge)?;
        if boundary_nudge >= ball_radius {
            return Err(ConfigError::invalid(
                "boundary_nudge",
                format!("must be below ball_radius ({ball_radius}), got {boundary_nudge}"),
            ));
        }
        let ball_timeout_secs = positive("ball_timeout_secs", self.ball_timeout_secs)?;
        let window_width = positive("window_width", self.window_width)?;
        let window_height = positive("window_height", self.window_height)?;

        if self.tick_rate_hz == 0 {
            return Err(ConfigError::invalid("tick_rate_hz", "timestep must be non-zero"));
        }
        if self.max_active_balls == 0 {
            return Err(ConfigError::invalid("max_active_balls", "must be at least 1"));
        }
        if self.initial_pool > self.max_active_balls {
            return Err(ConfigError::invalid(
                "initial_pool",
                format!(
                    "{} exceeds max_active_balls ({})",
                    self.initial_pool, self.max_active_balls
                ),
            ));
        }
        if self.goal_count == 0 {
            return Err(ConfigError::invalid("goal_count", "must be at least 1"));
        }

        // A center slot must exist
        let goal_count = if self.goal_count % 2 == 0 {
            log::warn!(
                "goal_count {} is even, using {} so a center slot exists",
                self.goal_count,
                self.goal_count + 1
            );
            self.goal_count + 1
        } else {
            self.goal_count
        };

        let dt = 1.0 / self.tick_rate_hz as f64;
        let max_age_ticks = ((ball_timeout_secs * self.tick_rate_hz as f64).round() as u32).max(1);

        Ok(BoardParams {
            sim_width,
            sim_height,
            ball_radius,
            pin_radius,
            pin_rows: self.pin_rows,
            pin_start_fraction,
            goal_count,
            goal_width: sim_width / goal_count as f64,
            goal_zone_height: sim_height * goal_zone_fraction,

            gravity: self.gravity,
            air_damping: air_per_second.powf(dt),
            bounce_damping,
            max_velocity,
            ball_collisions: self.ball_collisions,
            contact_epsilon,
            boundary_nudge,

            tick_rate_hz: self.tick_rate_hz,
            dt,
            max_age_ticks,
            max_active_balls: self.max_active_balls,
            initial_pool: self.initial_pool,

            window_width,
            window_height,
        })
    }
}
