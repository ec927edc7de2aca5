//! Frame scheduling abstraction
//!
//! In the browser this is `requestAnimationFrame` + `setTimeout` + `performance.now()`.
//! `ManualScheduler` is a deterministic stand-in whose clock only moves when told to.

use std::cell::RefCell;
use std::rc::Rc;

/// Called once with the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;
/// Called once when a timeout expires
pub type TimeoutCallback = Box<dyn FnOnce()>;

/// Host mechanism for "run this before the next repaint" and delayed callbacks
pub trait FrameScheduler {
    /// Current timestamp (ms), same clock as frame timestamps
    fn now(&self) -> f64;

    /// Invoke `callback` once, close to the next display refresh
    fn request_frame(&self, callback: FrameCallback);

    /// Invoke `callback` once after `delay_ms`
    fn set_timeout(&self, delay_ms: f64, callback: TimeoutCallback);
}

struct Timer {
    due: f64,
    id: u64,
    callback: TimeoutCallback,
}

#[derive(Default)]
struct Clock {
    now: f64,
    frames: Vec<FrameCallback>,
    timers: Vec<Timer>,
    next_timer_id: u64,
    frames_run: usize,
}

/// Deterministic scheduler driven by explicit clock steps.
///
/// Cloning shares the same clock and queues.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame callbacks waiting for the next repaint
    pub fn pending_frames(&self) -> usize {
        self.clock.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Total frame callbacks invoked so far
    pub fn frames_run(&self) -> usize {
        self.clock.borrow().frames_run
    }

    pub fn is_idle(&self) -> bool {
        let clock = self.clock.borrow();
        clock.frames.is_empty() && clock.timers.is_empty()
    }

    /// Move the clock forward by `ms`, firing due timers in deadline order.
    ///
    /// Timers armed by a firing timer also fire if they fall inside the step.
    pub fn advance(&self, ms: f64) {
        let target = self.now() + ms.max(0.0);

        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let due = clock
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
                    .map(|(i, _)| i);
                due.map(|i| {
                    let timer = clock.timers.remove(i);
                    clock.now = clock.now.max(timer.due);
                    timer
                })
            };

            match next {
                Some(timer) => (timer.callback)(),
                None => break,
            }
        }

        self.clock.borrow_mut().now = target;
    }

    /// Advance by `frame_ms`, then run every frame callback that was waiting.
    ///
    /// Callbacks registered during this frame wait for the next one.
    /// Returns how many callbacks ran.
    pub fn step_frame(&self, frame_ms: f64) -> usize {
        self.advance(frame_ms);

        let (now, frames) = {
            let mut clock = self.clock.borrow_mut();
            (clock.now, std::mem::take(&mut clock.frames))
        };
        let count = frames.len();
        for callback in frames {
            callback(now);
        }
        self.clock.borrow_mut().frames_run += count;
        count
    }

    /// Step frames until nothing is pending or `max_frames` is reached.
    /// Returns the number of frames stepped.
    pub fn run_until_idle(&self, frame_ms: f64, max_frames: usize) -> usize {
        let mut stepped = 0;
        while !self.is_idle() && stepped < max_frames {
            self.step_frame(frame_ms);
            stepped += 1;
        }
        stepped
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.clock.borrow().now
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.clock.borrow_mut().frames.push(callback);
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimeoutCallback) {
        let mut clock = self.clock.borrow_mut();
        let id = clock.next_timer_id;
        clock.next_timer_id += 1;
        let due = clock.now + delay_ms.max(0.0);
        clock.timers.push(Timer { due, id, callback });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(300.0, "c"), (100.0, "a"), (200.0, "b"), (100.0, "a2")] {
            let log = log.clone();
            scheduler.set_timeout(delay, Box::new(move || log.borrow_mut().push(tag)));
        }

        scheduler.advance(150.0);
        assert_eq!(*log.borrow(), vec!["a", "a2"]);
        scheduler.advance(1000.0);
        assert_eq!(*log.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(scheduler.now(), 1150.0);
    }

    #[test]
    fn test_chained_timer_inside_step() {
        let scheduler = ManualScheduler::new();
        let fired_at = Rc::new(Cell::new(0.0));

        let inner = scheduler.clone();
        let fired = fired_at.clone();
        scheduler.set_timeout(
            100.0,
            Box::new(move || {
                let clock = inner.clone();
                inner.set_timeout(50.0, Box::new(move || fired.set(clock.now())));
            }),
        );

        scheduler.advance(200.0);
        assert_eq!(fired_at.get(), 150.0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_frame_reregistration_waits_for_next_frame() {
        let scheduler = ManualScheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let again = scheduler.clone();
        let seen_outer = seen.clone();
        scheduler.request_frame(Box::new(move |t| {
            seen_outer.borrow_mut().push(t);
            let seen_inner = seen_outer.clone();
            again.request_frame(Box::new(move |t| seen_inner.borrow_mut().push(t)));
        }));

        assert_eq!(scheduler.step_frame(16.0), 1);
        assert_eq!(*seen.borrow(), vec![16.0]);
        assert_eq!(scheduler.pending_frames(), 1);

        assert_eq!(scheduler.run_until_idle(16.0, 10), 1);
        assert_eq!(*seen.borrow(), vec![16.0, 32.0]);
        assert_eq!(scheduler.frames_run(), 2);
    }
}
