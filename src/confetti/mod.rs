//! Confetti burst simulation
//!
//! A burst owns a set of falling paper pieces and animates them onto a shared
//! drawing surface until its duration runs out, then clears the surface.
//! Drawing and frame timing are collaborators behind traits so the whole
//! lifecycle runs headless in tests:
//! - `DrawSurface` / `SurfaceSource`: where pieces are painted
//! - `FrameScheduler`: "call me before the next repaint" and timeouts
//! - `Rng`: injected, seedable sampling

pub mod burst;
pub mod particle;
pub mod scheduler;
pub mod surface;

pub use burst::{BurstHandle, BurstPhase, FrameOutcome, ParticleBurst, resolve_duration, trigger};
pub use particle::{PALETTE, Particle};
pub use scheduler::{FrameCallback, FrameScheduler, ManualScheduler, TimeoutCallback};
pub use surface::{DrawOp, DrawSurface, RecordingSource, RecordingSurface, SurfaceSource};
