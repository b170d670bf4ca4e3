//! Collision detection and response
//!
//! Every check runs against the post-integration position, in a fixed order
//! per tick: pins, other balls, floor/ceiling, walls, goal dividers.
//! Detection is brute force; boards hold tens of balls and a few hundred pins.

use glam::DVec2;

use super::scoring::score_landing;
use super::state::{Ball, Pin, SimEvent};
use crate::config::{BallCollisionMode, BoardParams};
use crate::contact_normal;

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce a ball off a fixed circle centered at `center`
///
/// When the centers are closer than `contact_dist`, the velocity is reflected
/// about the contact normal, the ball is placed exactly `contact_dist +
/// epsilon` from `center`, and both velocity components are damped.
/// Coincident centers have no normal and are skipped.
/// Returns whether a contact was resolved.
pub fn bounce_off_circle(
    ball: &mut Ball,
    center: DVec2,
    contact_dist: f64,
    epsilon: f64,
    damping: f64,
) -> bool {
    let Some((normal, dist)) = contact_normal(ball.pos, center) else {
        return false;
    };
    if dist >= contact_dist {
        return false;
    }

    ball.vel = reflect_velocity(ball.vel, normal);
    ball.pos = center + normal * (contact_dist + epsilon);
    ball.vel *= damping;
    true
}

/// Resolve ball-pin contacts. Pins never move.
pub fn resolve_pin_collisions(balls: &mut [Ball], pins: &[Pin], params: &BoardParams) -> usize {
    let mut contacts = 0;
    for ball in balls.iter_mut().filter(|b| b.active) {
        for pin in pins {
            if bounce_off_circle(
                ball,
                pin.pos,
                ball.radius + pin.radius,
                params.contact_epsilon,
                params.bounce_damping,
            ) {
                contacts += 1;
            }
        }
    }
    contacts
}

/// Resolve ball-ball contacts using the configured mode
pub fn resolve_ball_collisions(balls: &mut [Ball], params: &BoardParams) -> usize {
    match params.ball_collisions {
        BallCollisionMode::Reflect => reflect_ball_pairs(balls, params),
        BallCollisionMode::Elastic => elastic_ball_pairs(balls, params),
    }
}

/// Each ball treats every other ball as a fixed circle.
///
/// Only the iterated ball is corrected, and each pair is visited twice (once
/// from each side), so the outcome depends on slot order.
fn reflect_ball_pairs(balls: &mut [Ball], params: &BoardParams) -> usize {
    let mut contacts = 0;
    for n in 0..balls.len() {
        if !balls[n].active {
            continue;
        }
        for i in 0..balls.len() {
            if i == n || !balls[i].active {
                continue;
            }
            let (other_pos, other_radius) = (balls[i].pos, balls[i].radius);
            let ball = &mut balls[n];
            let contact_dist = ball.radius + other_radius;
            if bounce_off_circle(
                ball,
                other_pos,
                contact_dist,
                params.contact_epsilon,
                params.bounce_damping,
            ) {
                contacts += 1;
            }
        }
    }
    contacts
}

/// Each unordered pair is resolved once with an equal-mass elastic exchange
fn elastic_ball_pairs(balls: &mut [Ball], params: &BoardParams) -> usize {
    let mut contacts = 0;
    for i in 0..balls.len() {
        let (head, tail) = balls.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.active {
            continue;
        }
        for b in tail.iter_mut().filter(|b| b.active) {
            let Some((normal, dist)) = contact_normal(a.pos, b.pos) else {
                continue;
            };
            let contact_dist = a.radius + b.radius;
            if dist >= contact_dist {
                continue;
            }

            // Swap the normal components only while approaching
            let approach = (a.vel - b.vel).dot(normal);
            if approach < 0.0 {
                a.vel -= approach * normal;
                b.vel += approach * normal;
            }

            let half_push = (contact_dist + params.contact_epsilon - dist) / 2.0;
            a.pos += normal * half_push;
            b.pos -= normal * half_push;

            a.vel *= params.bounce_damping;
            b.vel *= params.bounce_damping;
            contacts += 1;
        }
    }
    contacts
}

/// Floor hits retire the ball and score it; ceiling hits bounce it back down.
///
/// Returns the points scored this call.
pub fn resolve_floor_ceiling(
    balls: &mut [Ball],
    params: &BoardParams,
    events: &mut Vec<SimEvent>,
) -> u64 {
    let floor = 0.0;
    let ceiling = params.sim_height;
    let mut points_total = 0;

    for (slot, ball) in balls.iter_mut().enumerate().filter(|(_, b)| b.active) {
        if ball.pos.y < floor + ball.radius {
            ball.deactivate();
            let (goal, points) = score_landing(ball.pos.x, params.goal_width, params.goal_count);
            points_total += points;
            events.push(SimEvent::Scored { slot, goal, points });
            log::debug!("Ball {} landed in goal {} for {} points", slot, goal, points);
        } else if ball.pos.y > ceiling {
            ball.vel.y = -ball.vel.y;
            ball.pos.y = ceiling - ball.radius - params.boundary_nudge;
            ball.vel *= params.bounce_damping;
        }
    }
    points_total
}

/// Bounce balls whose center crossed a side wall back inside
pub fn resolve_walls(balls: &mut [Ball], params: &BoardParams) -> usize {
    let left = 0.0;
    let right = params.sim_width;
    let mut contacts = 0;

    for ball in balls.iter_mut().filter(|b| b.active) {
        if ball.pos.x < left {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = left + ball.radius + params.boundary_nudge;
        } else if ball.pos.x > right {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = right - ball.radius - params.boundary_nudge;
        } else {
            continue;
        }
        ball.vel *= params.bounce_damping;
        contacts += 1;
    }
    contacts
}

/// Bounce balls off the goal dividers. Only applies inside the goal zone.
pub fn resolve_dividers(balls: &mut [Ball], dividers: &[f64], params: &BoardParams) -> usize {
    let mut contacts = 0;

    for ball in balls.iter_mut().filter(|b| b.active) {
        if ball.pos.y > params.goal_zone_height {
            continue;
        }
        for &divider_x in dividers {
            let dx = ball.pos.x - divider_x;
            if dx.abs() >= ball.radius {
                continue;
            }
            // Push back out on the side the ball came from
            ball.pos.x = if dx < 0.0 {
                divider_x - ball.radius - params.boundary_nudge
            } else {
                divider_x + ball.radius + params.boundary_nudge
            };
            ball.vel.x = -ball.vel.x;
            ball.vel *= params.bounce_damping;
            contacts += 1;
        }
    }
    contacts
}
