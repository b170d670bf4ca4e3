//! Fixed timestep simulation tick
//!
//! One tick runs every stage unconditionally, in this order:
//! render cache refresh, age sweep, integration, pin collisions, ball-ball
//! collisions, floor/ceiling (scoring), walls, goal dividers.

use serde::Serialize;

use super::board::Board;
use super::collision::{
    resolve_ball_collisions, resolve_dividers, resolve_floor_ceiling, resolve_pin_collisions,
    resolve_walls,
};
use super::integrate::{age_sweep, integrate};

/// Counters for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub timeouts: usize,
    pub pin_contacts: usize,
    pub ball_contacts: usize,
    pub wall_contacts: usize,
    pub divider_contacts: usize,
    pub landed: usize,
    pub points: u64,
}

/// Advance the board by one fixed timestep
pub fn tick(board: &mut Board) -> TickStats {
    let mut stats = TickStats::default();
    board.refresh_render_cache();

    let events_before = board.events.len();
    let params = &board.params;
    let balls = board.pool.as_mut_slice();
    stats.timeouts = age_sweep(balls, params.max_age_ticks, &mut board.events);
    integrate(balls, params);
    stats.pin_contacts = resolve_pin_collisions(balls, &board.layout.pins, params);
    stats.ball_contacts = resolve_ball_collisions(balls, params);
    stats.points = resolve_floor_ceiling(balls, params, &mut board.events);
    stats.wall_contacts = resolve_walls(balls, params);
    stats.divider_contacts = resolve_dividers(balls, &board.layout.dividers, params);

    stats.landed = board.events.len() - events_before - stats.timeouts;
    board.score += stats.points;
    board.ticks += 1;
    board.trim_events();

    log::trace!("Tick {}: {:?}", board.ticks, stats);
    stats
}
