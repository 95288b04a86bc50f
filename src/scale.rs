//! Data-to-pixel mapping.
//!
//! Placement never computes scales itself; it calls whatever
//! [`CoordinateMapper`] the host chart hands it. [`LinearScale`] is the
//! mapper used by this crate's own chart frame and CLI.

use serde::{Deserialize, Serialize};

/// Maps a data value to a pixel position along one axis.
///
/// Implementations must be side-effect free; placers call them repeatedly.
pub trait CoordinateMapper {
    fn map(&self, value: f32) -> f32;
}

impl<F> CoordinateMapper for F
where
    F: Fn(f32) -> f32,
{
    fn map(&self, value: f32) -> f32 {
        self(value)
    }
}

/// The x and y mappers of one chart.
#[derive(Debug, Clone, Copy)]
pub struct Scales<X, Y> {
    pub x: X,
    pub y: Y,
}

impl<X: CoordinateMapper, Y: CoordinateMapper> Scales<X, Y> {
    pub fn new(x: X, y: Y) -> Self {
        Self { x, y }
    }

    pub fn project(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x.map(x), self.y.map(y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain: (f32, f32),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f32, f32) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    /// Extend the domain outward so both ends land on a round tick step
    /// for roughly `count` ticks.
    pub fn nice(mut self, count: usize) -> Self {
        let (mut d0, mut d1) = self.domain;
        let reversed = d1 < d0;
        if reversed {
            std::mem::swap(&mut d0, &mut d1);
        }
        let mut previous_step = None;
        for _ in 0..10 {
            let step = tick_increment(d0, d1, count);
            if step <= 0.0 || !step.is_finite() || previous_step == Some(step) {
                break;
            }
            d0 = (d0 / step).floor() * step;
            d1 = (d1 / step).ceil() * step;
            previous_step = Some(step);
        }
        self.domain = if reversed { (d1, d0) } else { (d0, d1) };
        self
    }
}

impl CoordinateMapper for LinearScale {
    fn map(&self, value: f32) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() <= f32::EPSILON {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }
}

/// Round step size (1, 2 or 5 times a power of ten) splitting
/// `[start, stop]` into about `count` intervals.
fn tick_increment(start: f32, stop: f32, count: usize) -> f32 {
    let count = count.max(1) as f32;
    let step = (stop - start) / count;
    if step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let magnitude = 10f32.powf(power);
    let error = step / magnitude;
    let factor = if error >= 50f32.sqrt() {
        10.0
    } else if error >= 10f32.sqrt() {
        5.0
    } else if error >= 2f32.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}
