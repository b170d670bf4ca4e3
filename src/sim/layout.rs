//! Board layout generation
//!
//! Pins are packed in a triangular (hexagonal) grid: every odd row is shifted
//! by half a spacing and gets one extra pin on each side, so a falling ball
//! can never drop straight through several rows.

use glam::DVec2;
use serde::Serialize;

use super::state::Pin;
use crate::config::BoardParams;

/// Static board geometry: pins and goal dividers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardLayout {
    pub pins: Vec<Pin>,
    /// Divider x positions, left to right (the side walls are not dividers)
    pub dividers: Vec<f64>,
    /// Horizontal pin spacing
    pub spacing: f64,
    /// Vertical row spacing
    pub row_spacing: f64,
}

impl BoardLayout {
    /// Generate the layout for `params`. Pure: same input, same output.
    pub fn generate(params: &BoardParams) -> Self {
        // Slightly under the sum of diameters-and-a-half so circles can
        // actually overlap instead of exactly touching
        let spacing = 3.0 * params.ball_radius + 3.0 * params.pin_radius - params.contact_epsilon;
        let row_spacing = spacing * 60f64.to_radians().sin();

        let pins = generate_pins(params, spacing, row_spacing);
        let dividers = generate_dividers(params.goal_count, params.goal_width);

        log::debug!(
            "Layout: {} pins in {} rows (spacing {:.3}), {} dividers",
            pins.len(),
            params.pin_rows,
            spacing,
            dividers.len()
        );

        Self {
            pins,
            dividers,
            spacing,
            row_spacing,
        }
    }
}

fn generate_pins(params: &BoardParams, spacing: f64, row_spacing: f64) -> Vec<Pin> {
    let width = params.sim_width;
    let y_start = params.sim_height * params.pin_start_fraction;

    // Largest odd pin count that fits an unstaggered row
    let mut row_pins = (width / spacing).floor() as i64;
    if row_pins % 2 == 0 {
        row_pins -= 1;
    }
    // Floor division: a board narrower than one spacing gets half = -1, which
    // empties plain rows and leaves staggered rows a single off-board candidate
    let half = row_pins.div_euclid(2);

    let mut pins = Vec::new();
    for row in 0..params.pin_rows {
        let y = y_start + row as f64 * row_spacing;
        let staggered = row % 2 == 1;

        let (range, offset) = if staggered {
            (-half - 1..=half + 1, spacing / 2.0)
        } else {
            (-half..=half, 0.0)
        };

        for i in range {
            let x = width / 2.0 + i as f64 * spacing + offset;
            if (0.0..=width).contains(&x) {
                pins.push(Pin::new(DVec2::new(x, y), params.pin_radius));
            }
        }
    }
    pins
}

fn generate_dividers(goal_count: u32, goal_width: f64) -> Vec<f64> {
    (1..goal_count).map(|i| i as f64 * goal_width).collect()
}
