//! A single confetti piece

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// Piece colours (CSS colour strings)
pub const PALETTE: [&str; 6] = [
    "#FF7AA2", "#FFD1DC", "#FFB6C1", "#FF9FB5", "#FFE1E8", "#FAD6E2",
];

/// One paper rectangle of a burst
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Centre position (px)
    pub pos: Vec2,
    /// Width and height (px)
    pub size: Vec2,
    pub color: &'static str,
    /// Rotation in degrees, never normalized
    pub rotation_deg: f32,
    /// Velocity (px/frame), +y is down
    pub vel: Vec2,
    /// Spin (degrees/frame)
    pub angular_vel: f32,
}

impl Particle {
    /// Sample a fresh piece above the top edge of a `width` x `height` surface
    pub fn spawn<R: Rng>(rng: &mut R, width: f32, height: f32) -> Self {
        let top = -SPAWN_OFFSET;
        let band_top = top - height.max(0.0) * SPAWN_BAND;

        Self {
            pos: Vec2::new(
                sample(rng, 0.0, width),
                sample(rng, band_top, top),
            ),
            size: Vec2::new(
                sample(rng, MIN_PIECE_SIZE, MAX_PIECE_SIZE),
                sample(rng, MIN_PIECE_SIZE, MAX_PIECE_SIZE),
            ),
            color: PALETTE[rng.random_range(0..PALETTE.len())],
            rotation_deg: sample(rng, 0.0, 360.0),
            vel: Vec2::new(
                rng.random_range(-MAX_DRIFT..=MAX_DRIFT),
                rng.random_range(MIN_FALL_SPEED..=MAX_FALL_SPEED),
            ),
            angular_vel: rng.random_range(-MAX_SPIN..=MAX_SPIN),
        }
    }

    /// Advance one frame: move, then let gravity act on the fall speed
    #[inline]
    pub fn step(&mut self) {
        self.pos += self.vel;
        self.vel.y += GRAVITY;
        self.rotation_deg += self.angular_vel;
    }

    #[inline]
    pub fn rotation_radians(&self) -> f32 {
        self.rotation_deg.to_radians()
    }
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty
#[inline]
fn sample<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}
