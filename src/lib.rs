//! Proposal Page - a Yes/No question with a confetti celebration
//!
//! Core modules:
//! - `confetti`: Particle burst simulation and its frame loop
//! - `flow`: Yes/No handling, celebration, countdown and redirect
//! - `theme`: Persisted light/dark preference
//! - `config`: Page timings and options
//! - `platform`: Browser implementations of the collaborator traits (wasm only)
//! - `audio`: Synthesized cheer cue (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod confetti;
pub mod flow;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod theme;

pub use config::PageConfig;
pub use confetti::{BurstHandle, BurstPhase, ParticleBurst, trigger};
pub use flow::{ConvertStage, PageHost, ProposalFlow};
pub use theme::Theme;

/// Confetti configuration constants
pub mod consts {
    /// Burst duration when the caller gives none (ms)
    pub const DEFAULT_BURST_MS: f64 = 4200.0;
    /// Delay between the last animated frame and the final clear (ms)
    pub const CLEAR_GRACE_MS: f64 = 300.0;

    /// Particle density: one particle per this many square pixels
    pub const AREA_PER_PARTICLE: f64 = 5000.0;
    /// Floor on particle count so tiny surfaces still get a visible burst
    pub const MIN_PARTICLES: usize = 18;

    /// Downward acceleration added to vy every frame (px/frame²)
    pub const GRAVITY: f32 = 0.06;

    /// Particle edge length range (px)
    pub const MIN_PIECE_SIZE: f32 = 6.0;
    pub const MAX_PIECE_SIZE: f32 = 16.0;

    /// Horizontal speed magnitude (px/frame)
    pub const MAX_DRIFT: f32 = 4.0;
    /// Initial fall speed range (px/frame)
    pub const MIN_FALL_SPEED: f32 = 2.0;
    pub const MAX_FALL_SPEED: f32 = 10.0;
    /// Spin magnitude (degrees/frame)
    pub const MAX_SPIN: f32 = 6.0;

    /// Spawn band above the top edge, as a fraction of surface height
    pub const SPAWN_BAND: f32 = 0.15;
    /// Spawn offset above the top edge (px)
    pub const SPAWN_OFFSET: f32 = 10.0;
}
