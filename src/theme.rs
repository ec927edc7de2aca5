//! Light/dark theme preference
//!
//! Persisted in LocalStorage as a single flag. Without a saved value the
//! system colour-scheme preference decides.

use serde::{Deserialize, Serialize};

/// Page colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "pref-theme";

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Exact match on the stored values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Saved preference wins; anything unrecognized defers to the system
    pub fn resolve(saved: Option<&str>, system_prefers_dark: bool) -> Self {
        match saved.and_then(Self::parse) {
            Some(theme) => theme,
            None if system_prefers_dark => Theme::Dark,
            None => Theme::Light,
        }
    }

    /// Read the saved value (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load_saved() -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok()??;
        storage.get_item(Self::STORAGE_KEY).ok()?
    }

    /// Whether the system asks for a dark scheme (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn system_prefers_dark() -> bool {
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .is_some_and(|mq| mq.matches())
    }

    /// Resolve the initial theme from storage and system preference (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let saved = Self::load_saved();
        let theme = Self::resolve(saved.as_deref(), Self::system_prefers_dark());
        log::info!(
            "Theme: {} ({})",
            theme.as_str(),
            if saved.is_some() { "saved" } else { "system" }
        );
        theme
    }

    /// Save to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if storage.set_item(Self::STORAGE_KEY, self.as_str()).is_err() {
                log::warn!("Theme preference not saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
