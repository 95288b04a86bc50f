// One-dimensional collision resolution along the vertical axis.
//
// Adjacent labels closer than `min_spacing` are pushed apart
// symmetrically, then every label is clamped into the vertical bounds.
// The loop stops on the first pass that neither detects a collision nor
// moves a label while clamping, or when the iteration budget runs out.
// Stopping on "no collision" alone would accept a pass whose clamping
// pushed two labels back into overlap (e.g. [0, 14] clamps to [7, 14]);
// this resolver deliberately keeps going until clamping is stable too.

use serde::{Deserialize, Serialize};

/// Anything with an adjustable vertical position.
pub trait VerticalSlot {
    fn y(&self) -> f32;
    fn set_y(&mut self, y: f32);
}

impl VerticalSlot for f32 {
    fn y(&self) -> f32 {
        *self
    }

    fn set_y(&mut self, y: f32) {
        *self = y;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionConfig {
    pub min_spacing: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub max_iterations: usize,
    pub margin: f32,
}

/// Outcome of a resolution run. `converged == false` means labels may
/// still overlap: the bounds could not fit them or the budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollisionReport {
    pub passes: usize,
    pub converged: bool,
}

/// Push overlapping slots apart and clamp them into
/// `[min_y + min_spacing / 2, max_y - min_spacing / 2]`.
///
/// Unlike a plain "stop when no pair collides" loop, a pass that had to
/// clamp is never final: convergence requires a pass with no collision
/// and no clamping change.
///
/// On return the slots are sorted by ascending `y`.
pub fn resolve_vertical_collisions<T: VerticalSlot>(
    slots: &mut [T],
    config: &CollisionConfig,
) -> CollisionReport {
    let spacing = config.min_spacing;
    let lower = config.min_y + spacing / 2.0;
    let upper = config.max_y - spacing / 2.0;

    let mut report = CollisionReport {
        passes: 0,
        converged: false,
    };

    for _ in 0..config.max_iterations {
        report.passes += 1;
        sort_slots(slots);

        let mut collided = false;
        for idx in 1..slots.len() {
            let overlap = slots[idx - 1].y() + spacing - slots[idx].y();
            if overlap > 0.0 {
                collided = true;
                let shift = overlap / 2.0 + config.margin;
                let above = slots[idx - 1].y() - shift;
                let below = slots[idx].y() + shift;
                slots[idx - 1].set_y(above);
                slots[idx].set_y(below);
            }
        }

        let mut clamped = false;
        for slot in slots.iter_mut() {
            let y = slot.y();
            let bounded = y.max(lower).min(upper);
            if bounded != y {
                clamped = true;
                slot.set_y(bounded);
            }
        }

        tracing::trace!(pass = report.passes, collided, clamped, "collision pass");
        if !collided && !clamped {
            report.converged = true;
            break;
        }
    }

    sort_slots(slots);
    report
}

fn sort_slots<T: VerticalSlot>(slots: &mut [T]) {
    slots.sort_by(|a, b| a.y().total_cmp(&b.y()));
}
