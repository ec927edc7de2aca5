//! Proposal Page entry point
//!
//! On the web: wires the DOM to the proposal flow. Natively: runs a headless
//! confetti burst and the celebration sequence on a manual clock.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, EventTarget, KeyboardEvent, MouseEvent};

    use proposal_page::platform::{DomPage, RafScheduler, apply_theme, fit_canvas};
    use proposal_page::{PageConfig, ProposalFlow, Theme};

    type Flow = ProposalFlow<DomPage, RafScheduler>;

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        let config = PageConfig::from_json_or_default(
            document
                .get_element_by_id("pageRoot")
                .and_then(|el| el.get_attribute("data-config"))
                .as_deref(),
        );

        let Some(page) = DomPage::from_document(&window, &document, &config) else {
            log::warn!("Missing required DOM elements, page script not started");
            return;
        };

        setup_theme_toggle(&document);

        // Canvas fills its container; backing store follows DPR
        let canvas = page.canvas().clone();
        let _ = canvas.style().set_property("width", "100%");
        let _ = canvas.style().set_property("height", "100%");
        fit_canvas(&window, &canvas);
        {
            let window_clone = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                fit_canvas(&window_clone, &canvas);
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let yes_btn = page.yes_button().clone();
        let no_btn = page.no_button().clone();
        let scheduler = page.scheduler().clone();
        let flow: Flow = ProposalFlow::new(Rc::new(page), scheduler, config);

        {
            let flow = flow.clone();
            on_activate(&yes_btn, move || flow.press_yes());
        }
        {
            let flow = flow.clone();
            on_activate(&no_btn, move || flow.press_no());
        }

        let _ = no_btn.class_list().add_1("wiggle");
        let _ = yes_btn.focus();

        log::info!("Proposal page ready");
    }

    /// Run `action` on click, Enter or Space
    fn on_activate(target: &EventTarget, action: impl Fn() + 'static) {
        let action = Rc::new(action);

        {
            let action = action.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                (*action)();
            });
            let _ = target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.key().as_str(), "Enter" | " ") {
                    event.prevent_default();
                    (*action)();
                }
            });
            let _ = target
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_theme_toggle(document: &Document) {
        let Some(toggle) = document.get_element_by_id("themeToggle") else {
            return;
        };

        apply_theme(document, Theme::load());

        let document = document.clone();
        on_activate(&toggle, move || {
            let is_dark = document
                .body()
                .is_some_and(|body| body.class_list().contains("dark"));
            let next = if is_dark { Theme::Light } else { Theme::Dark };
            apply_theme(&document, next);
            next.save();
            log::info!("Theme switched to {}", next.as_str());
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_page::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Proposal Page (native) starting...");
    log::info!("The page itself runs in the browser - build for wasm32 and serve index.html");

    let config = std::env::args()
        .nth(1)
        .and_then(|path| match std::fs::read_to_string(&path) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Could not read config {}: {}", path, e);
                None
            }
        });
    let config = proposal_page::PageConfig::from_json_or_default(config.as_deref());

    headless::run_burst(800.0, 600.0, config.burst_ms);
    headless::run_celebration(config);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proposal_page::confetti::{FrameScheduler, ManualScheduler, RecordingSource};
    use proposal_page::{ConvertStage, PageConfig, PageHost, ProposalFlow, trigger};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Animate one burst to completion and report what it drew
    pub fn run_burst(width: f64, height: f64, duration_ms: f64) {
        let source = RecordingSource::new(width, height);
        let scheduler = ManualScheduler::new();
        let mut rng = Pcg32::seed_from_u64(0x5EED);

        let Some(handle) = trigger(&source, &scheduler, Some(duration_ms), &mut rng) else {
            return;
        };
        let frames = scheduler.run_until_idle(FRAME_MS, 10_000);
        let surface = source.surface.borrow();
        log::info!(
            "Burst: {} pieces, {} frames, {} fills, {} clears, {} visible after finish ({:?})",
            handle.particle_count(),
            frames,
            surface.fill_count(),
            surface.clear_count(),
            surface.visible().len(),
            handle.phase()
        );
    }

    /// Logs every page effect, bursts confetti onto a recording surface
    struct LogHost {
        scheduler: ManualScheduler,
        canvas: RecordingSource,
        rng: RefCell<Pcg32>,
    }

    impl PageHost for LogHost {
        fn announce(&self, message: &str) {
            log::info!("[{:>6.0}ms] announce: {}", self.scheduler.now(), message);
        }
        fn convert_no_button(&self, stage: ConvertStage) {
            log::info!("[{:>6.0}ms] no button: {:?}", self.scheduler.now(), stage);
        }
        fn focus_no_button(&self) {}
        fn show_celebration(&self) {
            log::info!("[{:>6.0}ms] celebration shown", self.scheduler.now());
        }
        fn focus_celebration_text(&self) {}
        fn play_cheer(&self) {
            log::info!("[{:>6.0}ms] cheer", self.scheduler.now());
        }
        fn burst_confetti(&self, duration_ms: f64) {
            let mut rng = self.rng.borrow_mut();
            trigger(&self.canvas, &self.scheduler, Some(duration_ms), &mut *rng);
        }
        fn show_countdown(&self, start: u32) -> bool {
            log::info!("[{:>6.0}ms] countdown from {}", self.scheduler.now(), start);
            true
        }
        fn show_count(&self, count: u32) {
            log::info!("[{:>6.0}ms] {}", self.scheduler.now(), count);
        }
        fn reset_heart(&self) {}
        fn set_heart_grown(&self, _grown: bool) {}
        fn pop_heart(&self) {}
        fn navigate(&self, url: &str) {
            log::info!("[{:>6.0}ms] navigate to {}", self.scheduler.now(), url);
        }
    }

    /// Press No, press the converted button, and let the countdown run out
    pub fn run_celebration(config: PageConfig) {
        let scheduler = ManualScheduler::new();
        let canvas = RecordingSource::new(390.0, 844.0);
        let host = Rc::new(LogHost {
            scheduler: scheduler.clone(),
            canvas: canvas.clone(),
            rng: RefCell::new(Pcg32::seed_from_u64(0xC0FFEE)),
        });
        let flow = ProposalFlow::new(host, scheduler.clone(), config);

        flow.press_no();
        scheduler.advance(flow.config().convert_settle_ms);
        flow.press_no();
        let frames = scheduler.run_until_idle(FRAME_MS, 100_000);

        log::info!(
            "Celebration done after {} frames, navigated: {}, surface clean: {}",
            frames,
            flow.has_navigated(),
            canvas.surface.borrow().visible().is_empty()
        );
    }
}
