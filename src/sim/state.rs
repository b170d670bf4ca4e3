//! Entity state: balls, pins and the ball pool
//!
//! Balls live in a fixed-capacity pool indexed by slot. A slot is reused
//! when its ball is inactive, so the hot path never reallocates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::SpawnError;

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    /// Inactive balls are skipped by physics and rendering
    pub active: bool,
    /// Ticks since (re)spawn
    pub age: u32,
    /// Cached render-space position, refreshed at the start of each tick
    #[serde(skip)]
    pub window_pos: DVec2,
}

impl Ball {
    /// An inactive, reusable slot
    pub fn inactive(radius: f64) -> Self {
        Self {
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            radius,
            active: false,
            age: 0,
            window_pos: DVec2::ZERO,
        }
    }

    /// Put the ball at rest at `pos` with a fresh age
    pub fn activate(&mut self, pos: DVec2) {
        self.pos = pos;
        self.vel = DVec2::ZERO;
        self.window_pos = DVec2::ZERO;
        self.active = true;
        self.age = 0;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }
}

/// A fixed pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub pos: DVec2,
    pub radius: f64,
    /// Cached render-space position
    #[serde(skip)]
    pub window_pos: DVec2,
}

impl Pin {
    pub fn new(pos: DVec2, radius: f64) -> Self {
        Self {
            pos,
            radius,
            window_pos: DVec2::ZERO,
        }
    }
}

/// Read-only copy of an active ball for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub slot: usize,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub window_pos: DVec2,
}

impl BallView {
    pub fn of(slot: usize, ball: &Ball) -> Self {
        Self {
            slot,
            pos: ball.pos,
            vel: ball.vel,
            radius: ball.radius,
            window_pos: ball.window_pos,
        }
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SimEvent {
    /// Ball crossed the floor and landed in `goal`
    Scored { slot: usize, goal: u32, points: u64 },
    /// Ball exceeded its maximum age and was reclaimed without scoring
    TimedOut { slot: usize },
}

/// Fixed-capacity ball arena with slot reuse
#[derive(Debug, Clone)]
pub struct BallPool {
    balls: Vec<Ball>,
    capacity: usize,
    radius: f64,
}

impl BallPool {
    /// Pool with room for `capacity` balls, `prefill` of them created inactive
    pub fn new(capacity: usize, prefill: usize, radius: f64) -> Self {
        let mut balls = Vec::with_capacity(capacity);
        balls.extend((0..prefill.min(capacity)).map(|_| Ball::inactive(radius)));
        Self {
            balls,
            capacity,
            radius,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots created so far (active or not)
    #[inline]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.balls.iter().filter(|b| b.active).count()
    }

    pub fn get(&self, slot: usize) -> Option<&Ball> {
        self.balls.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Ball> {
        self.balls.get_mut(slot)
    }

    pub fn as_slice(&self) -> &[Ball] {
        &self.balls
    }

    pub fn as_mut_slice(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    /// Active balls with their slot index
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Ball)> {
        self.balls.iter().enumerate().filter(|(_, b)| b.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut Ball)> {
        self.balls.iter_mut().enumerate().filter(|(_, b)| b.active)
    }

    /// Activate a free slot (or append one) at `pos`, returning its index
    pub fn spawn(&mut self, pos: DVec2) -> Result<usize, SpawnError> {
        let full = SpawnError::Capacity { max: self.capacity };
        if self.active_count() >= self.capacity {
            return Err(full);
        }

        if let Some(slot) = self.balls.iter().position(|b| !b.active) {
            self.balls[slot].activate(pos);
            return Ok(slot);
        }

        if self.balls.len() < self.capacity {
            let mut ball = Ball::inactive(self.radius);
            ball.activate(pos);
            self.balls.push(ball);
            return Ok(self.balls.len() - 1);
        }

        Err(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_reuses_free_slot() {
        let mut pool = BallPool::new(4, 1, 1.5);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.active_count(), 0);

        let slot = pool.spawn(DVec2::new(10.0, 50.0)).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(pool.len(), 1);

        // Second spawn appends
        let slot = pool.spawn(DVec2::new(20.0, 50.0)).unwrap();
        assert_eq!(slot, 1);
        assert_eq!(pool.len(), 2);

        // Free slot 0, next spawn reuses it
        pool.get_mut(0).unwrap().deactivate();
        let slot = pool.spawn(DVec2::new(30.0, 50.0)).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).unwrap().pos, DVec2::new(30.0, 50.0));
    }

    #[test]
    fn test_spawn_resets_ball() {
        let mut pool = BallPool::new(2, 0, 1.5);
        let slot = pool.spawn(DVec2::new(10.0, 50.0)).unwrap();
        {
            let ball = pool.get_mut(slot).unwrap();
            ball.vel = DVec2::new(5.0, -5.0);
            ball.age = 77;
            ball.deactivate();
        }
        let slot = pool.spawn(DVec2::new(12.0, 50.0)).unwrap();
        let ball = pool.get(slot).unwrap();
        assert!(ball.active);
        assert_eq!(ball.vel, DVec2::ZERO);
        assert_eq!(ball.age, 0);
    }

    #[test]
    fn test_spawn_at_capacity_rejected() {
        let mut pool = BallPool::new(2, 2, 1.5);
        pool.spawn(DVec2::new(1.0, 1.0)).unwrap();
        pool.spawn(DVec2::new(2.0, 1.0)).unwrap();
        assert_eq!(
            pool.spawn(DVec2::new(3.0, 1.0)),
            Err(SpawnError::Capacity { max: 2 })
        );
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_iter_active_skips_inactive() {
        let mut pool = BallPool::new(3, 3, 1.5);
        pool.spawn(DVec2::new(1.0, 1.0)).unwrap();
        pool.spawn(DVec2::new(2.0, 1.0)).unwrap();
        pool.get_mut(0).unwrap().deactivate();
        let slots: Vec<usize> = pool.iter_active().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![1]);
    }
}
