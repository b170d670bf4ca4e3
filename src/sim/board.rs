//! The board: owns the layout, the ball pool and the running score
//!
//! Lifecycle is `Board::new(params)`, then any number of `step()` calls.
//! Everything the presentation layer needs goes through the methods here.

use glam::DVec2;
use serde::Serialize;

use super::layout::BoardLayout;
use super::state::{Ball, BallPool, BallView, Pin, SimEvent};
use super::tick::{TickStats, tick};
use crate::config::{BoardConfig, BoardParams};
use crate::consts::MAX_PENDING_EVENTS;
use crate::error::{ConfigError, SpawnError};
use crate::viewport::Viewport;

/// Read-only copy of the board between ticks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: u64,
    pub debug: bool,
    pub balls: Vec<BallView>,
    /// Per-ball position readout, only filled in debug mode
    pub debug_lines: Vec<String>,
}

/// A Plinko board and everything on it
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) params: BoardParams,
    pub(crate) layout: BoardLayout,
    pub(crate) pool: BallPool,
    pub(crate) viewport: Viewport,
    /// Bounded by `MAX_PENDING_EVENTS`; callers should drain it regularly
    pub(crate) events: Vec<SimEvent>,
    pub(crate) score: u64,
    pub(crate) ticks: u64,
    debug: bool,
    last_stats: TickStats,
    dropped_events: u64,
}

impl Board {
    /// Build a board from validated parameters
    pub fn new(params: BoardParams) -> Self {
        let layout = BoardLayout::generate(&params);
        let pool = BallPool::new(params.max_active_balls, params.initial_pool, params.ball_radius);
        let viewport = Viewport::new(
            params.sim_width,
            params.sim_height,
            params.window_width,
            params.window_height,
        );

        log::info!(
            "Board {:.1}x{:.1} m: {} pins, {} goals, {} Hz, up to {} balls ({} collisions)",
            params.sim_width,
            params.sim_height,
            layout.pins.len(),
            params.goal_count,
            params.tick_rate_hz,
            params.max_active_balls,
            params.ball_collisions.as_str()
        );

        let mut board = Self {
            params,
            layout,
            pool,
            viewport,
            events: Vec::new(),
            score: 0,
            ticks: 0,
            debug: false,
            last_stats: TickStats::default(),
            dropped_events: 0,
        };
        board.refresh_render_cache();
        board
    }

    /// Validate `config` and build a board from it
    pub fn from_config(config: &BoardConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.validate()?))
    }

    /// Advance the simulation by exactly one fixed timestep
    pub fn step(&mut self) {
        self.last_stats = tick(self);
    }

    /// Drop a ball at rest from the top of the board at `x`
    pub fn spawn_ball(&mut self, x: f64) -> Result<usize, SpawnError> {
        if !x.is_finite() || !(0.0..=self.params.sim_width).contains(&x) {
            return Err(SpawnError::OutOfBounds {
                x,
                width: self.params.sim_width,
            });
        }
        let slot = self.pool.spawn(DVec2::new(x, self.params.sim_height))?;
        if let Some(ball) = self.pool.get_mut(slot) {
            ball.window_pos = self.viewport.sim_to_window(ball.pos);
        }
        log::debug!("Spawned ball {} at x={:.2}", slot, x);
        Ok(slot)
    }

    /// Spawn from a window-space click position
    pub fn spawn_ball_at_window(&mut self, window_x: f64) -> Result<usize, SpawnError> {
        let x = self.viewport.window_to_sim(DVec2::new(window_x, 0.0)).x;
        self.spawn_ball(x)
    }

    /// Flip debug mode, returning the new state
    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        log::info!("Debug mode {}", if self.debug { "on" } else { "off" });
        self.debug
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Ticks run since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    pub fn params(&self) -> &BoardParams {
        &self.params
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn pins(&self) -> &[Pin] {
        &self.layout.pins
    }

    pub fn dividers(&self) -> &[f64] {
        &self.layout.dividers
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Every pool slot, active or not
    pub fn balls(&self) -> &[Ball] {
        self.pool.as_slice()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Copies of the active balls
    pub fn active_balls(&self) -> Vec<BallView> {
        self.pool
            .iter_active()
            .map(|(slot, ball)| BallView::of(slot, ball))
            .collect()
    }

    /// Take the events recorded since the last drain
    ///
    /// Only the newest `MAX_PENDING_EVENTS` are kept between drains.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events discarded because nobody drained them in time
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Discard the oldest events beyond `MAX_PENDING_EVENTS`
    pub(crate) fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(MAX_PENDING_EVENTS);
        if excess == 0 {
            return;
        }
        if self.dropped_events == 0 {
            log::warn!(
                "Event list full ({} pending), discarding oldest; call drain_events()",
                MAX_PENDING_EVENTS
            );
        }
        self.events.drain(..excess);
        self.dropped_events += excess as u64;
    }

    /// Window resized: rescale render positions, simulation state untouched
    pub fn resize(&mut self, window_width: f64, window_height: f64) {
        self.viewport.resize(window_width, window_height);
        self.refresh_render_cache();
        log::debug!("Resized to {:.0}x{:.0}", window_width, window_height);
    }

    /// Position readout for each active ball, as shown by the debug overlay
    pub fn debug_lines(&self) -> Vec<String> {
        self.pool
            .iter_active()
            .map(|(slot, ball)| format!("{}: ({:.5}, {:.5})", slot, ball.pos.x, ball.pos.y))
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            score: self.score,
            debug: self.debug,
            balls: self.active_balls(),
            debug_lines: if self.debug {
                self.debug_lines()
            } else {
                Vec::new()
            },
        }
    }

    /// Recompute cached window positions for pins and active balls
    pub(crate) fn refresh_render_cache(&mut self) {
        let viewport = self.viewport;
        for (_, ball) in self.pool.iter_active_mut() {
            ball.window_pos = viewport.sim_to_window(ball.pos);
        }
        for pin in &mut self.layout.pins {
            pin.window_pos = viewport.sim_to_window(pin.pos);
        }
    }
}
