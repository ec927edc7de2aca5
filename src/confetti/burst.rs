//! Burst lifecycle: populate, animate frame by frame, settle, clear
//!
//! One burst per trigger. Bursts sharing a surface are not coordinated: each
//! clears the whole region every frame, so overlapping bursts flicker over
//! each other. That is accepted behaviour.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::Rng;

use super::particle::Particle;
use super::scheduler::FrameScheduler;
use super::surface::{DrawSurface, SurfaceSource};
use crate::consts::*;

/// Where a burst is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstPhase {
    /// Drawing a frame per display refresh
    Animating,
    /// Duration elapsed, waiting out the grace delay before the final clear
    Settling,
    /// Surface cleared, particles dropped
    Finished,
}

/// What the host should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Request another frame
    Continue,
    /// Stop requesting frames; clear after the grace delay
    Settle,
}

/// Normalize a caller-supplied duration (ms).
///
/// Missing, NaN or infinite values use the default; negative values clamp to zero.
pub fn resolve_duration(duration_ms: Option<f64>) -> f64 {
    match duration_ms {
        Some(ms) if ms.is_finite() => ms.max(0.0),
        _ => DEFAULT_BURST_MS,
    }
}

/// A set of confetti pieces with a fixed lifetime
#[derive(Debug, Clone)]
pub struct ParticleBurst {
    particles: Vec<Particle>,
    /// Region cleared each frame, captured at trigger time
    width: f64,
    height: f64,
    start: f64,
    duration_ms: f64,
    phase: BurstPhase,
    frames: u32,
}

impl ParticleBurst {
    /// Piece count for a surface: proportional to area, never below the floor
    pub fn particle_count(width: f64, height: f64) -> usize {
        let area = (width * height).max(1.0);
        ((area / AREA_PER_PARTICLE).floor() as usize).max(MIN_PARTICLES)
    }

    /// Populate a burst for a `width` x `height` surface starting at `start` (ms)
    pub fn new<R: Rng>(rng: &mut R, width: f64, height: f64, start: f64, duration_ms: f64) -> Self {
        let count = Self::particle_count(width, height);
        let particles = (0..count)
            .map(|_| Particle::spawn(rng, width as f32, height as f32))
            .collect();

        Self {
            particles,
            width,
            height,
            start,
            duration_ms,
            phase: BurstPhase::Animating,
            frames: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn phase(&self) -> BurstPhase {
        self.phase
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Advance every piece one frame
    pub fn step(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.step();
        }
    }

    /// Paint every piece, in spawn order
    pub fn draw<D: DrawSurface + ?Sized>(&self, surface: &mut D) {
        for p in &self.particles {
            surface.fill_rotated_rect(p.pos, p.size, p.rotation_radians(), p.color);
        }
    }

    /// One animation frame at timestamp `now` (ms): clear, step, draw, then
    /// decide whether the burst keeps going.
    pub fn frame<D: DrawSurface + ?Sized>(&mut self, now: f64, surface: &mut D) -> FrameOutcome {
        if self.phase != BurstPhase::Animating {
            return FrameOutcome::Settle;
        }

        surface.clear_rect(0.0, 0.0, self.width, self.height);
        self.step();
        self.draw(surface);
        self.frames += 1;

        if now - self.start < self.duration_ms {
            FrameOutcome::Continue
        } else {
            self.phase = BurstPhase::Settling;
            FrameOutcome::Settle
        }
    }

    /// Final clear after the grace delay
    pub fn finish<D: DrawSurface + ?Sized>(&mut self, surface: &mut D) {
        surface.clear_rect(0.0, 0.0, self.width, self.height);
        self.particles.clear();
        self.phase = BurstPhase::Finished;
    }
}

/// Observer for a running burst. Dropping it does not stop the burst.
#[derive(Debug, Clone)]
pub struct BurstHandle {
    phase: Rc<Cell<BurstPhase>>,
    particle_count: usize,
}

impl BurstHandle {
    pub fn phase(&self) -> BurstPhase {
        self.phase.get()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.get() == BurstPhase::Finished
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }
}

/// A burst bound to the surface it paints on
struct Running<D> {
    burst: ParticleBurst,
    surface: D,
    phase: Rc<Cell<BurstPhase>>,
}

/// Start a confetti burst on `source`.
///
/// Returns `None` without scheduling anything when the source has no drawing
/// context. `duration_ms` goes through [`resolve_duration`].
pub fn trigger<C, S, R>(
    source: &C,
    scheduler: &S,
    duration_ms: Option<f64>,
    rng: &mut R,
) -> Option<BurstHandle>
where
    C: SurfaceSource,
    S: FrameScheduler + Clone + 'static,
    R: Rng,
{
    let Some(surface) = source.acquire() else {
        log::warn!("Confetti skipped: no drawing context");
        return None;
    };

    let (width, height) = surface.size();
    let burst = ParticleBurst::new(
        rng,
        width,
        height,
        scheduler.now(),
        resolve_duration(duration_ms),
    );
    log::debug!(
        "Confetti burst: {} pieces on {}x{} for {}ms",
        burst.particles().len(),
        width,
        height,
        burst.duration_ms()
    );

    let phase = Rc::new(Cell::new(BurstPhase::Animating));
    let handle = BurstHandle {
        phase: phase.clone(),
        particle_count: burst.particles().len(),
    };

    let running = Rc::new(RefCell::new(Running {
        burst,
        surface,
        phase,
    }));
    request_frame(running, scheduler.clone());

    Some(handle)
}

fn request_frame<D, S>(running: Rc<RefCell<Running<D>>>, scheduler: S)
where
    D: DrawSurface + 'static,
    S: FrameScheduler + Clone + 'static,
{
    let next = scheduler.clone();
    scheduler.request_frame(Box::new(move |now| burst_loop(running, next, now)));
}

fn burst_loop<D, S>(running: Rc<RefCell<Running<D>>>, scheduler: S, now: f64)
where
    D: DrawSurface + 'static,
    S: FrameScheduler + Clone + 'static,
{
    let outcome = {
        let mut guard = running.borrow_mut();
        let r = &mut *guard;
        let outcome = r.burst.frame(now, &mut r.surface);
        r.phase.set(r.burst.phase());
        outcome
    };

    match outcome {
        FrameOutcome::Continue => request_frame(running, scheduler),
        FrameOutcome::Settle => {
            scheduler.set_timeout(
                CLEAR_GRACE_MS,
                Box::new(move || {
                    let mut guard = running.borrow_mut();
                    let r = &mut *guard;
                    r.burst.finish(&mut r.surface);
                    r.phase.set(BurstPhase::Finished);
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confetti::scheduler::ManualScheduler;
    use crate::confetti::surface::{DrawOp, RecordingSource, RecordingSurface};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    // Exactly representable, so timer deadlines compare cleanly
    const FRAME_MS: f64 = 16.0;

    #[test]
    fn test_particle_count_scenarios() {
        assert_eq!(ParticleBurst::particle_count(800.0, 600.0), 96);
        assert_eq!(ParticleBurst::particle_count(100.0, 100.0), 18);
        assert_eq!(ParticleBurst::particle_count(0.0, 0.0), 18);
        assert_eq!(ParticleBurst::particle_count(1920.0, 1080.0), 414);
    }

    #[test]
    fn test_resolve_duration() {
        assert_eq!(resolve_duration(None), 4200.0);
        assert_eq!(resolve_duration(Some(f64::NAN)), 4200.0);
        assert_eq!(resolve_duration(Some(f64::INFINITY)), 4200.0);
        assert_eq!(resolve_duration(Some(-50.0)), 0.0);
        assert_eq!(resolve_duration(Some(1400.0)), 1400.0);
    }

    #[test]
    fn test_vy_never_decreases() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut burst = ParticleBurst::new(&mut rng, 640.0, 480.0, 0.0, 1000.0);
        let mut surface = RecordingSurface::new(640.0, 480.0);

        let mut prev: Vec<f32> = burst.particles().iter().map(|p| p.vel.y).collect();
        for i in 1..=30 {
            burst.frame(i as f64 * FRAME_MS, &mut surface);
            for (p, before) in burst.particles().iter().zip(&prev) {
                assert!(p.vel.y >= *before);
            }
            prev = burst.particles().iter().map(|p| p.vel.y).collect();
        }
    }

    #[test]
    fn test_frame_clears_then_draws_each_piece() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut burst = ParticleBurst::new(&mut rng, 100.0, 100.0, 0.0, 1000.0);
        let mut surface = RecordingSurface::new(100.0, 100.0);

        assert_eq!(burst.frame(FRAME_MS, &mut surface), FrameOutcome::Continue);
        let ops = surface.ops();
        assert_eq!(ops.len(), 1 + 18);
        assert!(matches!(ops[0], DrawOp::Clear { w, h, .. } if w == 100.0 && h == 100.0));
        for (op, p) in ops[1..].iter().zip(burst.particles()) {
            let DrawOp::Fill { center, size, radians, color } = op else {
                panic!("expected fill, got {:?}", op);
            };
            assert_eq!(*center, p.pos);
            assert_eq!(*size, p.size);
            assert_eq!(*radians, p.rotation_radians());
            assert_eq!(color, p.color);
        }
    }

    #[test]
    fn test_trigger_runs_to_completion_and_clears() {
        let source = RecordingSource::new(800.0, 600.0);
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg32::seed_from_u64(99);

        let handle = trigger(&source, &scheduler, Some(500.0), &mut rng).expect("burst");
        assert_eq!(handle.particle_count(), 96);
        assert_eq!(handle.phase(), BurstPhase::Animating);
        assert_eq!(scheduler.pending_frames(), 1);

        // Mid-animation something is on screen
        for _ in 0..10 {
            scheduler.step_frame(FRAME_MS);
        }
        assert!(!source.surface.borrow().visible().is_empty());

        scheduler.run_until_idle(FRAME_MS, 1000);
        assert!(handle.is_finished());
        assert!(scheduler.is_idle());
        assert!(source.surface.borrow().visible().is_empty());
        assert!(matches!(
            source.surface.borrow().ops().last(),
            Some(DrawOp::Clear { .. })
        ));
    }

    #[test]
    fn test_zero_duration_single_frame_then_grace_clear() {
        let source = RecordingSource::new(100.0, 100.0);
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg32::seed_from_u64(1);

        let handle = trigger(&source, &scheduler, Some(0.0), &mut rng).expect("burst");
        scheduler.step_frame(FRAME_MS);
        assert_eq!(handle.phase(), BurstPhase::Settling);
        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(scheduler.pending_timers(), 1);
        assert_eq!(source.surface.borrow().clear_count(), 1);

        scheduler.advance(299.0);
        assert_eq!(handle.phase(), BurstPhase::Settling);
        scheduler.advance(1.0);
        assert!(handle.is_finished());
        assert_eq!(source.surface.borrow().clear_count(), 2);
        assert_eq!(scheduler.frames_run(), 1);
    }

    #[test]
    fn test_missing_context_is_a_no_op() {
        let source = RecordingSource::unavailable(800.0, 600.0);
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg32::seed_from_u64(1);

        assert!(trigger(&source, &scheduler, None, &mut rng).is_none());
        assert!(scheduler.is_idle());
        assert!(source.surface.borrow().ops().is_empty());
    }

    #[test]
    fn test_overlapping_bursts_are_independent() {
        let source = RecordingSource::new(200.0, 200.0);
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg32::seed_from_u64(8);

        let first = trigger(&source, &scheduler, Some(100.0), &mut rng).expect("first");
        scheduler.step_frame(FRAME_MS);
        let second = trigger(&source, &scheduler, Some(300.0), &mut rng).expect("second");
        assert_eq!(scheduler.pending_frames(), 2);

        scheduler.run_until_idle(FRAME_MS, 1000);
        assert!(first.is_finished());
        assert!(second.is_finished());
        assert!(source.surface.borrow().visible().is_empty());
    }

    proptest! {
        #[test]
        fn prop_count_formula(w in 0u32..4000, h in 0u32..3000) {
            let area = ((w as f64) * (h as f64)).max(1.0);
            let expected = ((area / 5000.0).floor() as usize).max(18);
            prop_assert_eq!(ParticleBurst::particle_count(w as f64, h as f64), expected);
        }

        #[test]
        fn prop_sampled_ranges(seed in any::<u64>(), w in 1.0f64..2500.0, h in 1.0f64..1500.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let burst = ParticleBurst::new(&mut rng, w, h, 0.0, 100.0);
            prop_assert_eq!(burst.particles().len(), ParticleBurst::particle_count(w, h));
            for p in burst.particles() {
                prop_assert!(p.pos.x >= 0.0 && p.pos.x <= w as f32);
                prop_assert!(p.vel.x >= -4.0 && p.vel.x <= 4.0);
                prop_assert!(p.vel.y >= 2.0 && p.vel.y <= 10.0);
                prop_assert!(p.angular_vel >= -6.0 && p.angular_vel <= 6.0);
                prop_assert!(p.rotation_deg >= 0.0 && p.rotation_deg < 360.0);
                prop_assert!(p.size.x >= 6.0 && p.size.x < 16.0);
                prop_assert!(p.size.y >= 6.0 && p.size.y < 16.0);
            }
        }
    }
}
