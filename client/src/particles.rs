//! Damage sparkles: client-only markers that fade out on the frame clock.

use log::trace;
use macroquad::color::Color;

pub const SPARKLE_SIZE: f32 = 50.0;
pub const ALPHA_DECAY: f32 = 0.02;
pub const SIZE_DECAY: f32 = 0.5;

// Absorbs the rounding left over after repeated f32 subtraction.
const DECAY_EPSILON: f32 = 1e-4;

/// Where to spawn a sparkle and what color to stroke it with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkleSeed {
    pub x: f32,
    pub y: f32,
    pub color: Color,
}

/// Drawing surface for sparkles.
pub trait SparkleCanvas {
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
struct Sparkle {
    x: f32,
    y: f32,
    alpha: f32,
    size: f32,
    color: Color,
}

impl Sparkle {
    fn decay(&mut self) {
        self.alpha -= ALPHA_DECAY;
        self.size -= SIZE_DECAY;
    }

    fn is_spent(&self) -> bool {
        self.alpha <= DECAY_EPSILON || self.size <= DECAY_EPSILON
    }

    fn stroke_color(&self) -> Color {
        Color {
            a: self.color.a * self.alpha.clamp(0.0, 1.0),
            ..self.color
        }
    }
}

/// Cursor of an in-progress decay pass. Walks from the end of the collection toward
/// the start, so sparkles appended while the pass is running sit above the cursor
/// and are left for the next pass.
#[derive(Debug)]
pub(crate) struct DecayScan {
    next: usize,
}

impl DecayScan {
    pub(crate) fn is_finished(&self) -> bool {
        self.next == 0
    }
}

/// Owns every live sparkle.
#[derive(Debug, Default)]
pub struct ParticleSystem {
    sparkles: Vec<Sparkle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, seeds: &[SparkleSeed]) {
        self.sparkles.extend(seeds.iter().map(|seed| Sparkle {
            x: seed.x,
            y: seed.y,
            alpha: 1.0,
            size: SPARKLE_SIZE,
            color: seed.color,
        }));
    }

    /// Runs one full decay pass: fades every sparkle, drops the spent ones and draws
    /// the rest.
    pub fn tick(&mut self, canvas: &mut impl SparkleCanvas) {
        let mut scan = self.begin_scan();
        while self.step_scan(&mut scan, canvas) {}
        trace!("{} sparkles live", self.sparkles.len());
    }

    pub(crate) fn begin_scan(&self) -> DecayScan {
        DecayScan {
            next: self.sparkles.len(),
        }
    }

    /// Processes the next sparkle of `scan`. Returns `false` once the pass is done.
    /// A cursor left past the end by removals elsewhere resumes from the last sparkle.
    pub(crate) fn step_scan(
        &mut self,
        scan: &mut DecayScan,
        canvas: &mut impl SparkleCanvas,
    ) -> bool {
        scan.next = scan.next.min(self.sparkles.len());
        if scan.is_finished() {
            return false;
        }
        scan.next -= 1;
        let index = scan.next;

        let sparkle = &mut self.sparkles[index];
        sparkle.decay();
        if sparkle.is_spent() {
            self.sparkles.remove(index);
        } else {
            canvas.stroke_circle(sparkle.x, sparkle.y, sparkle.size, sparkle.stroke_color());
        }
        true
    }

    pub fn len(&self) -> usize {
        self.sparkles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparkles.is_empty()
    }
}
