//! DOM-backed page host

use std::cell::RefCell;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, FocusOptions, HtmlButtonElement, HtmlCanvasElement, HtmlElement, Window,
};

use super::canvas::CanvasSource;
use super::frames::RafScheduler;
use crate::audio::CheerPlayer;
use crate::config::PageConfig;
use crate::confetti::trigger;
use crate::flow::{ConvertStage, PageHost};
use crate::theme::Theme;

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

/// The proposal page's elements plus the effects that act on them
pub struct DomPage {
    window: Window,
    body: HtmlElement,
    yes_btn: HtmlElement,
    no_btn: HtmlButtonElement,
    announce: Element,
    overlay: Element,
    celebrate_text: Option<HtmlElement>,

    countdown: Option<Element>,
    count_display: Option<Element>,
    count_announce: Option<Element>,
    heart: Option<Element>,

    confetti: CanvasSource,
    scheduler: RafScheduler,
    rng: RefCell<Pcg32>,
    cheer: CheerPlayer,
}

impl DomPage {
    /// Look up the page's elements; `None` if a required one is missing
    pub fn from_document(window: &Window, document: &Document, config: &PageConfig) -> Option<Self> {
        let body = document.body()?;
        let yes_btn = by_id::<HtmlElement>(document, "yesBtn")?;
        let no_btn = by_id::<HtmlButtonElement>(document, "noBtn")?;
        let announce = document.get_element_by_id("announce")?;
        let overlay = document.get_element_by_id("celebration")?;
        let canvas = by_id::<HtmlCanvasElement>(document, "confetti-canvas")?;
        document.get_element_by_id("pageRoot")?;

        let seed = js_sys::Date::now() as u64;
        log::info!("Confetti seed: {}", seed);

        Some(Self {
            window: window.clone(),
            body,
            yes_btn,
            no_btn,
            announce,
            overlay,
            celebrate_text: by_id::<HtmlElement>(document, "celebrateText"),
            countdown: document.get_element_by_id("countdown"),
            count_display: document.get_element_by_id("countDisplay"),
            count_announce: document.get_element_by_id("countAnnounce"),
            heart: document.get_element_by_id("popHeart"),
            confetti: CanvasSource::new(canvas),
            scheduler: RafScheduler::new(window.clone()),
            rng: RefCell::new(Pcg32::seed_from_u64(seed)),
            cheer: CheerPlayer::new(config.effective_volume()),
        })
    }

    pub fn yes_button(&self) -> &HtmlElement {
        &self.yes_btn
    }

    pub fn no_button(&self) -> &HtmlButtonElement {
        &self.no_btn
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        self.confetti.canvas()
    }

    pub fn scheduler(&self) -> &RafScheduler {
        &self.scheduler
    }

    fn set_count_text(&self, count: u32) {
        let text = count.to_string();
        for el in [&self.count_display, &self.count_announce].into_iter().flatten() {
            el.set_text_content(Some(&text));
        }
    }
}

impl PageHost for DomPage {
    fn announce(&self, message: &str) {
        self.announce.set_text_content(Some(message));
    }

    fn convert_no_button(&self, stage: ConvertStage) {
        let btn = &self.no_btn;
        let style = btn.style();
        match stage {
            ConvertStage::Begin => {
                let _ = btn.class_list().remove_1("wiggle");
                let _ = btn.class_list().add_1("converted");
                btn.set_disabled(true);
            }
            ConvertStage::Relabel => {
                btn.set_text_content(Some("Yes"));
                let _ = style.set_property("transition", "transform .22s ease");
                let _ = style.set_property("transform", "scale(1.06)");
            }
            ConvertStage::Settle => {
                let _ = style.set_property("transform", "");
                btn.set_disabled(false);
            }
        }
    }

    fn focus_no_button(&self) {
        let _ = self.no_btn.focus();
    }

    fn show_celebration(&self) {
        let _ = self.body.class_list().add_1("body-celebrate");
        let _ = self.overlay.class_list().add_1("show");
        let _ = self.overlay.set_attribute("aria-hidden", "false");
    }

    fn focus_celebration_text(&self) {
        let Some(text) = &self.celebrate_text else { return };
        let _ = text.set_attribute("tabindex", "-1");
        let options = FocusOptions::new();
        options.set_prevent_scroll(true);
        if text.focus_with_options(&options).is_err() {
            let _ = text.focus();
        }
    }

    fn play_cheer(&self) {
        self.cheer.play_cheer();
    }

    fn burst_confetti(&self, duration_ms: f64) {
        let mut rng = self.rng.borrow_mut();
        trigger(&self.confetti, &self.scheduler, Some(duration_ms), &mut *rng);
    }

    fn show_countdown(&self, start: u32) -> bool {
        let Some(countdown) = &self.countdown else {
            return false;
        };
        self.set_count_text(start);
        let _ = countdown.set_attribute("aria-hidden", "false");
        true
    }

    fn show_count(&self, count: u32) {
        self.set_count_text(count);
    }

    fn reset_heart(&self) {
        if let Some(heart) = &self.heart {
            let _ = heart.class_list().remove_2("pop", "grow");
        }
    }

    fn set_heart_grown(&self, grown: bool) {
        if let Some(heart) = &self.heart {
            let _ = if grown {
                heart.class_list().add_1("grow")
            } else {
                heart.class_list().remove_1("grow")
            };
        }
    }

    fn pop_heart(&self) {
        if let Some(heart) = &self.heart {
            let _ = heart.class_list().add_1("pop");
        }
    }

    fn navigate(&self, url: &str) {
        if let Err(e) = self.window.location().set_href(url) {
            log::warn!("Navigation to {} failed: {:?}", url, e);
        }
    }
}

/// Reflect `theme` on the body class and the toggle's pressed state
pub fn apply_theme(document: &Document, theme: Theme) {
    if let Some(body) = document.body() {
        let _ = if theme.is_dark() {
            body.class_list().add_1("dark")
        } else {
            body.class_list().remove_1("dark")
        };
    }
    if let Some(toggle) = document.get_element_by_id("themeToggle") {
        let pressed = if theme.is_dark() { "true" } else { "false" };
        let _ = toggle.set_attribute("aria-pressed", pressed);
    }
}
