//! Page timings and options
//!
//! Every field has a default, so a partial JSON object (or none at all) is a
//! valid configuration. On the web the JSON comes from the `data-config`
//! attribute of `#pageRoot`; nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_BURST_MS;

/// Page configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    // === Confetti ===
    /// Burst length when a caller asks for the default (ms)
    pub burst_ms: f64,
    /// Burst when the answer is yes (ms)
    pub celebrate_burst_ms: f64,
    /// Burst when the countdown reaches zero (ms)
    pub finale_burst_ms: f64,

    // === Countdown ===
    /// Delay between the celebration and the countdown start (ms)
    pub countdown_delay_ms: f64,
    /// Starting number; negative or non-finite values fall back to 3
    pub countdown_seconds: f64,
    /// Interval between counts (ms)
    pub countdown_tick_ms: f64,
    /// How long the heart stays enlarged on each count (ms)
    pub heart_grow_ms: f64,

    // === Navigation ===
    /// Delay between the finale and leaving the page (ms)
    pub navigate_after_finale_ms: f64,
    /// Delay inside the navigation guard before the location changes (ms)
    pub navigate_delay_ms: f64,
    /// Where the letter lives
    pub letter_url: String,

    // === No button conversion ===
    /// When the converting button is relabelled "Yes" (ms)
    pub convert_relabel_ms: f64,
    /// When the converted button becomes clickable again (ms)
    pub convert_settle_ms: f64,

    // === Audio ===
    /// Cheer volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            burst_ms: DEFAULT_BURST_MS,
            celebrate_burst_ms: 2000.0,
            finale_burst_ms: 1400.0,

            countdown_delay_ms: 700.0,
            countdown_seconds: 3.0,
            countdown_tick_ms: 1000.0,
            heart_grow_ms: 350.0,

            navigate_after_finale_ms: 700.0,
            navigate_delay_ms: 200.0,
            letter_url: "letter.html".to_string(),

            convert_relabel_ms: 120.0,
            convert_settle_ms: 360.0,

            volume: 1.0,
        }
    }
}

impl PageConfig {
    /// Parse a (possibly partial) JSON object, `None` if it is malformed
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(json) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring page config: {}", e);
                None
            }
        }
    }

    /// Parse JSON, falling back to defaults when absent or malformed
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        let config = json.and_then(Self::from_json).unwrap_or_default();
        log::info!(
            "Page config: countdown {}s, letter '{}'",
            config.countdown_start(),
            config.letter_url
        );
        config
    }

    /// Countdown start as a whole number of seconds
    pub fn countdown_start(&self) -> u32 {
        countdown_start(self.countdown_seconds)
    }

    /// Effective volume, clamped to 0.0 - 1.0
    pub fn effective_volume(&self) -> f32 {
        if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Whole-second countdown start: floors non-negative numbers, otherwise 3
pub fn countdown_start(seconds: f64) -> u32 {
    if seconds.is_finite() && seconds >= 0.0 {
        seconds.floor().min(u32::MAX as f64) as u32
    } else {
        3
    }
}
