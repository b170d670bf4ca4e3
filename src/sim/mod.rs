//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by pool slot)
//! - No rendering, threading or platform dependencies

pub mod board;
pub mod collision;
pub mod integrate;
pub mod layout;
pub mod scoring;
pub mod state;
pub mod tick;

pub use board::{Board, Snapshot};
pub use collision::{bounce_off_circle, reflect_velocity};
pub use layout::BoardLayout;
pub use scoring::{goal_index, points_for_goal};
pub use state::{Ball, BallPool, BallView, Pin, SimEvent};
pub use tick::{TickStats, tick};
