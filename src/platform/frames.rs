//! Browser frame scheduler

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::confetti::{FrameCallback, FrameScheduler, TimeoutCallback};

/// `requestAnimationFrame` + `setTimeout`, timed by `performance.now()`
#[derive(Debug, Clone)]
pub struct RafScheduler {
    window: Window,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for RafScheduler {
    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn request_frame(&self, callback: FrameCallback) {
        let closure = Closure::once_into_js(move |time: f64| callback(time));
        if self
            .window
            .request_animation_frame(closure.unchecked_ref())
            .is_err()
        {
            log::warn!("requestAnimationFrame failed");
        }
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimeoutCallback) {
        let closure = Closure::once_into_js(move || callback());
        if self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.unchecked_ref(),
                delay_ms.max(0.0).round() as i32,
            )
            .is_err()
        {
            log::warn!("setTimeout failed");
        }
    }
}
