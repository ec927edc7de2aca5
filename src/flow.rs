//! Proposal page flow
//!
//! Owns the page's small amount of state (has "No" been converted, are we
//! celebrating, have we left the page) and sequences the celebration in
//! time through a [`FrameScheduler`]. Everything visible goes through the
//! [`PageHost`] trait, so the flow runs the same against the DOM and against
//! a recording host in tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::PageConfig;
use crate::confetti::FrameScheduler;

pub const CELEBRATE_MESSAGE: &str = "Yippieeee! She said yes!";
pub const CONVERTED_MESSAGE: &str = "The No button turned into Yes — click it to confirm!";
pub const FINALE_MESSAGE: &str = "Opening the letter now";

/// Steps of the No -> Yes button transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStage {
    /// Stop wiggling, mark converted, disable
    Begin,
    /// Relabel "Yes" with a small scale pop
    Relabel,
    /// Reset scale and enable again
    Settle,
}

/// State of the second button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoButton {
    /// Still says "No"
    #[default]
    Original,
    /// Mid-transformation, presses ignored
    Converting,
    /// Now a second "Yes"
    Converted,
}

/// Everything the flow needs from the page
pub trait PageHost {
    /// Put a message in the live region
    fn announce(&self, message: &str);

    fn convert_no_button(&self, stage: ConvertStage);
    fn focus_no_button(&self);

    /// Reveal the celebration overlay
    fn show_celebration(&self);
    fn focus_celebration_text(&self);

    fn play_cheer(&self);
    fn burst_confetti(&self, duration_ms: f64);

    /// Reveal the countdown at `start`; `false` if the page has no countdown
    fn show_countdown(&self, start: u32) -> bool;
    fn show_count(&self, count: u32);

    /// Clear any heart animation state
    fn reset_heart(&self);
    fn set_heart_grown(&self, grown: bool);
    fn pop_heart(&self);

    /// Leave the page
    fn navigate(&self, url: &str);
}

#[derive(Debug, Default)]
struct FlowState {
    no_button: NoButton,
    celebrating: bool,
    navigated: bool,
    /// Last number shown, can reach -1 when counting from 0
    count: Option<i64>,
}

/// The page's Yes/No/celebrate/countdown/redirect sequence.
///
/// Cloning shares the same state.
pub struct ProposalFlow<H, S> {
    host: Rc<H>,
    scheduler: S,
    config: Rc<PageConfig>,
    state: Rc<RefCell<FlowState>>,
}

impl<H, S: Clone> Clone for ProposalFlow<H, S> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            scheduler: self.scheduler.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
        }
    }
}

impl<H, S> ProposalFlow<H, S>
where
    H: PageHost + 'static,
    S: FrameScheduler + Clone + 'static,
{
    pub fn new(host: Rc<H>, scheduler: S, config: PageConfig) -> Self {
        Self {
            host,
            scheduler,
            config: Rc::new(config),
            state: Rc::new(RefCell::new(FlowState::default())),
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn no_button(&self) -> NoButton {
        self.state.borrow().no_button
    }

    pub fn is_celebrating(&self) -> bool {
        self.state.borrow().celebrating
    }

    pub fn has_navigated(&self) -> bool {
        self.state.borrow().navigated
    }

    /// Number currently on the countdown, if it has started
    pub fn current_count(&self) -> Option<i64> {
        self.state.borrow().count
    }

    /// Run `f` on this flow after `delay_ms`
    fn after(&self, delay_ms: f64, f: impl FnOnce(&Self) + 'static) {
        let flow = self.clone();
        self.scheduler
            .set_timeout(delay_ms, Box::new(move || f(&flow)));
    }

    pub fn press_yes(&self) {
        self.celebrate();
    }

    /// First press turns "No" into a second "Yes"; after that it celebrates
    pub fn press_no(&self) {
        let current = self.no_button();
        match current {
            NoButton::Original => self.convert_no(),
            NoButton::Converting => log::debug!("No button still converting, press ignored"),
            NoButton::Converted => self.celebrate(),
        }
    }

    fn convert_no(&self) {
        self.state.borrow_mut().no_button = NoButton::Converting;
        self.host.convert_no_button(ConvertStage::Begin);

        self.after(self.config.convert_relabel_ms, |flow| {
            flow.host.convert_no_button(ConvertStage::Relabel);
        });
        self.after(self.config.convert_settle_ms, |flow| {
            flow.state.borrow_mut().no_button = NoButton::Converted;
            flow.host.convert_no_button(ConvertStage::Settle);
            flow.host.announce(CONVERTED_MESSAGE);
            flow.host.focus_no_button();
        });
    }

    /// Show the celebration, or leave for the letter if it is already showing
    pub fn celebrate(&self) {
        if self.is_celebrating() {
            self.navigate_to_letter();
            return;
        }
        self.state.borrow_mut().celebrating = true;
        log::info!("Celebrating");

        self.host.show_celebration();
        self.host.announce(CELEBRATE_MESSAGE);
        self.host.focus_celebration_text();
        self.host.play_cheer();
        self.host.burst_confetti(self.config.celebrate_burst_ms);

        let seconds = self.config.countdown_start();
        self.after(self.config.countdown_delay_ms, move |flow| {
            flow.start_countdown(seconds);
        });
    }

    /// Count down from `seconds`, one number per tick, then run the finale
    pub fn start_countdown(&self, seconds: u32) {
        if !self.host.show_countdown(seconds) {
            log::warn!("No countdown on this page");
            return;
        }
        self.host.reset_heart();
        self.state.borrow_mut().count = Some(seconds as i64);
        self.schedule_count(seconds as i64);
    }

    fn schedule_count(&self, shown: i64) {
        self.after(self.config.countdown_tick_ms, move |flow| {
            flow.count_down(shown - 1);
        });
    }

    fn count_down(&self, current: i64) {
        self.state.borrow_mut().count = Some(current);

        if current >= 0 {
            self.host.show_count(current as u32);
            self.host.set_heart_grown(true);
            self.after(self.config.heart_grow_ms, |flow| {
                flow.host.set_heart_grown(false);
            });
        }

        if current <= 0 {
            self.finale();
        } else {
            self.schedule_count(current);
        }
    }

    fn finale(&self) {
        log::info!("Countdown finished");
        self.host.pop_heart();
        self.host.play_cheer();
        self.host.burst_confetti(self.config.finale_burst_ms);
        self.host.announce(FINALE_MESSAGE);
        self.after(self.config.navigate_after_finale_ms, |flow| {
            flow.navigate_to_letter();
        });
    }

    /// Leave for the letter page, at most once
    pub fn navigate_to_letter(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.navigated {
                return;
            }
            state.navigated = true;
        }
        self.after(self.config.navigate_delay_ms, |flow| {
            log::info!("Navigating to {}", flow.config.letter_url);
            flow.host.navigate(&flow.config.letter_url);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confetti::ManualScheduler;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Announce(String),
        Convert(ConvertStage),
        FocusNo,
        ShowCelebration,
        FocusCelebration,
        Cheer,
        Confetti(f64),
        ShowCountdown(u32),
        Count(u32),
        ResetHeart,
        HeartGrown(bool),
        PopHeart,
        Navigate(String),
    }

    #[derive(Default)]
    struct RecordingHost {
        calls: RefCell<Vec<Call>>,
        no_countdown: bool,
    }

    impl RecordingHost {
        fn push(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }

        fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.borrow_mut())
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.borrow().iter().filter(|c| pred(*c)).count()
        }
    }

    impl PageHost for RecordingHost {
        fn announce(&self, message: &str) {
            self.push(Call::Announce(message.to_string()));
        }
        fn convert_no_button(&self, stage: ConvertStage) {
            self.push(Call::Convert(stage));
        }
        fn focus_no_button(&self) {
            self.push(Call::FocusNo);
        }
        fn show_celebration(&self) {
            self.push(Call::ShowCelebration);
        }
        fn focus_celebration_text(&self) {
            self.push(Call::FocusCelebration);
        }
        fn play_cheer(&self) {
            self.push(Call::Cheer);
        }
        fn burst_confetti(&self, duration_ms: f64) {
            self.push(Call::Confetti(duration_ms));
        }
        fn show_countdown(&self, start: u32) -> bool {
            if self.no_countdown {
                return false;
            }
            self.push(Call::ShowCountdown(start));
            true
        }
        fn show_count(&self, count: u32) {
            self.push(Call::Count(count));
        }
        fn reset_heart(&self) {
            self.push(Call::ResetHeart);
        }
        fn set_heart_grown(&self, grown: bool) {
            self.push(Call::HeartGrown(grown));
        }
        fn pop_heart(&self) {
            self.push(Call::PopHeart);
        }
        fn navigate(&self, url: &str) {
            self.push(Call::Navigate(url.to_string()));
        }
    }

    fn setup(host: RecordingHost) -> (Rc<RecordingHost>, ManualScheduler, ProposalFlow<RecordingHost, ManualScheduler>) {
        let host = Rc::new(host);
        let scheduler = ManualScheduler::new();
        let flow = ProposalFlow::new(host.clone(), scheduler.clone(), PageConfig::default());
        (host, scheduler, flow)
    }

    #[test]
    fn test_yes_runs_full_sequence() {
        let (host, scheduler, flow) = setup(RecordingHost::default());

        flow.press_yes();
        assert_eq!(
            host.take(),
            vec![
                Call::ShowCelebration,
                Call::Announce(CELEBRATE_MESSAGE.to_string()),
                Call::FocusCelebration,
                Call::Cheer,
                Call::Confetti(2000.0),
            ]
        );

        scheduler.advance(700.0);
        assert_eq!(host.take(), vec![Call::ShowCountdown(3), Call::ResetHeart]);
        assert_eq!(flow.current_count(), Some(3));

        scheduler.advance(1000.0);
        assert_eq!(host.take(), vec![Call::Count(2), Call::HeartGrown(true)]);
        scheduler.advance(350.0);
        assert_eq!(host.take(), vec![Call::HeartGrown(false)]);

        scheduler.advance(650.0 + 1000.0);
        assert_eq!(
            host.take(),
            vec![
                Call::Count(1),
                Call::HeartGrown(true),
                Call::HeartGrown(false),
                Call::Count(0),
                Call::HeartGrown(true),
                Call::PopHeart,
                Call::Cheer,
                Call::Confetti(1400.0),
                Call::Announce(FINALE_MESSAGE.to_string()),
            ]
        );
        assert!(!flow.has_navigated());

        scheduler.advance(700.0);
        assert!(flow.has_navigated());
        assert_eq!(host.take(), vec![Call::HeartGrown(false)]);

        scheduler.advance(200.0);
        assert_eq!(host.take(), vec![Call::Navigate("letter.html".to_string())]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_no_converts_then_celebrates() {
        let (host, scheduler, flow) = setup(RecordingHost::default());

        flow.press_no();
        assert_eq!(flow.no_button(), NoButton::Converting);
        assert_eq!(host.take(), vec![Call::Convert(ConvertStage::Begin)]);

        // Presses mid-conversion do nothing
        flow.press_no();
        assert!(host.take().is_empty());

        scheduler.advance(120.0);
        assert_eq!(host.take(), vec![Call::Convert(ConvertStage::Relabel)]);
        scheduler.advance(240.0);
        assert_eq!(
            host.take(),
            vec![
                Call::Convert(ConvertStage::Settle),
                Call::Announce(CONVERTED_MESSAGE.to_string()),
                Call::FocusNo,
            ]
        );
        assert_eq!(flow.no_button(), NoButton::Converted);
        assert!(!flow.is_celebrating());

        flow.press_no();
        assert!(flow.is_celebrating());
        assert_eq!(host.take()[0], Call::ShowCelebration);
    }

    #[test]
    fn test_second_celebrate_navigates_once() {
        let (host, scheduler, flow) = setup(RecordingHost::default());

        flow.press_yes();
        flow.press_yes();
        flow.press_yes();
        assert!(flow.has_navigated());

        scheduler.run_until_idle(100.0, 1000);
        let navigations = host.count(|c| matches!(c, Call::Navigate(_)));
        assert_eq!(navigations, 1);
        assert_eq!(host.count(|c| *c == Call::ShowCelebration), 1);
    }

    #[test]
    fn test_countdown_from_zero_goes_straight_to_finale() {
        let (host, scheduler, flow) = setup(RecordingHost::default());

        flow.start_countdown(0);
        assert_eq!(host.take(), vec![Call::ShowCountdown(0), Call::ResetHeart]);

        scheduler.advance(1000.0);
        let calls = host.take();
        assert!(!calls.iter().any(|c| matches!(c, Call::Count(_))));
        assert_eq!(calls[0], Call::PopHeart);
        assert_eq!(flow.current_count(), Some(-1));
    }

    #[test]
    fn test_page_without_countdown_never_leaves() {
        let (host, scheduler, flow) = setup(RecordingHost {
            no_countdown: true,
            ..Default::default()
        });

        flow.press_yes();
        scheduler.run_until_idle(100.0, 1000);
        assert!(!flow.has_navigated());
        assert_eq!(host.count(|c| matches!(c, Call::Confetti(_))), 1);
    }

    #[test]
    fn test_custom_letter_url() {
        let host = Rc::new(RecordingHost::default());
        let scheduler = ManualScheduler::new();
        let config = PageConfig {
            letter_url: "us.html".to_string(),
            ..Default::default()
        };
        let flow = ProposalFlow::new(host.clone(), scheduler.clone(), config);

        flow.navigate_to_letter();
        scheduler.advance(200.0);
        assert_eq!(host.take(), vec![Call::Navigate("us.html".to_string())]);
    }
}
