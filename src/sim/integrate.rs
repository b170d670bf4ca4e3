//! Motion integration and ball lifecycle
//!
//! Semi-implicit Euler: velocity is updated (drag, gravity, speed cap) before
//! it moves the ball.

use super::state::{Ball, SimEvent};
use crate::clamp_speed;
use crate::config::BoardParams;

/// Age every active ball by one tick and reclaim those past their lifetime.
///
/// Timed-out balls are deactivated without scoring.
pub fn age_sweep(balls: &mut [Ball], max_age_ticks: u32, events: &mut Vec<SimEvent>) -> usize {
    let mut reclaimed = 0;
    for (slot, ball) in balls.iter_mut().enumerate().filter(|(_, b)| b.active) {
        ball.age = ball.age.saturating_add(1);
        if ball.age >= max_age_ticks {
            ball.deactivate();
            events.push(SimEvent::TimedOut { slot });
            log::debug!("Ball {} timed out at ({:.2}, {:.2})", slot, ball.pos.x, ball.pos.y);
            reclaimed += 1;
        }
    }
    reclaimed
}

/// Advance one ball by `dt`
#[inline]
pub fn integrate_ball(ball: &mut Ball, params: &BoardParams) {
    ball.vel *= params.air_damping;
    // Gravity is a magnitude; down is -y
    ball.vel.y -= params.gravity * params.dt;
    ball.vel = clamp_speed(ball.vel, params.max_velocity);
    ball.pos += ball.vel * params.dt;
}

/// Advance every active ball by `dt`
pub fn integrate(balls: &mut [Ball], params: &BoardParams) {
    for ball in balls.iter_mut().filter(|b| b.active) {
        integrate_ball(ball, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use glam::DVec2;

    fn params() -> BoardParams {
        BoardConfig::default().validate().unwrap()
    }

    fn ball_at(x: f64, y: f64) -> Ball {
        let mut ball = Ball::inactive(1.5);
        ball.activate(DVec2::new(x, y));
        ball
    }

    #[test]
    fn test_gravity_accumulates() {
        let p = params();
        let mut ball = ball_at(50.0, 100.0);

        integrate_ball(&mut ball, &p);
        let v1 = ball.vel.y;
        assert!((v1 - (-p.gravity * p.dt)).abs() < 1e-12);
        assert!(ball.pos.y < 100.0);

        integrate_ball(&mut ball, &p);
        // Second tick adds another g*dt on top of the damped first one
        let expected = v1 * p.air_damping - p.gravity * p.dt;
        assert!((ball.vel.y - expected).abs() < 1e-12);
        assert_eq!(ball.pos.x, 50.0);
    }

    #[test]
    fn test_air_damping_applied() {
        let mut config = BoardConfig::default();
        config.gravity = 0.0;
        config.air_damping_per_second = 0.5;
        config.tick_rate_hz = 1;
        let p = config.validate().unwrap();

        let mut ball = ball_at(50.0, 100.0);
        ball.vel = DVec2::new(10.0, 0.0);
        integrate_ball(&mut ball, &p);
        assert!((ball.vel.x - 5.0).abs() < 1e-12);
        assert!((ball.pos.x - 55.0).abs() < 1e-12);
    }

    #[test]
    fn test_speed_capped() {
        let p = params();
        let mut ball = ball_at(50.0, 100.0);
        ball.vel = DVec2::new(1000.0, -1000.0);
        integrate_ball(&mut ball, &p);
        assert!(ball.speed() <= p.max_velocity + 1e-9);
    }

    #[test]
    fn test_inactive_not_integrated() {
        let p = params();
        let mut balls = vec![ball_at(50.0, 100.0)];
        balls[0].deactivate();
        integrate(&mut balls, &p);
        assert_eq!(balls[0].pos, DVec2::new(50.0, 100.0));
        assert_eq!(balls[0].vel, DVec2::ZERO);
    }

    #[test]
    fn test_age_sweep_times_out_exactly() {
        let mut events = Vec::new();
        let mut balls = vec![ball_at(50.0, 100.0), ball_at(20.0, 100.0)];
        balls[1].age = 5;

        assert_eq!(age_sweep(&mut balls, 7, &mut events), 0);
        assert_eq!(balls[1].age, 6);
        // Ball 1 reaches 7 on this sweep
        assert_eq!(age_sweep(&mut balls, 7, &mut events), 1);
        assert!(balls[0].active);
        assert!(!balls[1].active);
        assert_eq!(events, vec![SimEvent::TimedOut { slot: 1 }]);
    }
}
