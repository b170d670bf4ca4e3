//! Landing-slot scoring
//!
//! The center slot is worth 1000 points and every slot further out is worth
//! 10^(1/5) times less: `round(1000 / 10^(distance / 5))`.

use crate::consts::CENTER_SLOT_POINTS;

/// Goal slot under `x`, clamped to the board
pub fn goal_index(x: f64, goal_width: f64, goal_count: u32) -> u32 {
    let last = goal_count.saturating_sub(1);
    let raw = (x / goal_width).floor();
    if raw.is_nan() || raw < 0.0 {
        0
    } else if raw >= last as f64 {
        last
    } else {
        raw as u32
    }
}

/// Points awarded for landing in `goal`
pub fn points_for_goal(goal: u32, goal_count: u32) -> u64 {
    let center = goal_count / 2;
    let distance = goal.abs_diff(center);
    (CENTER_SLOT_POINTS / 10f64.powf(distance as f64 / 5.0)).round() as u64
}

/// Slot and points for a ball landing at `x`
pub fn score_landing(x: f64, goal_width: f64, goal_count: u32) -> (u32, u64) {
    let goal = goal_index(x, goal_width, goal_count);
    (goal, points_for_goal(goal, goal_count))
}
