//! Names, selectors and timings the enhancements operate on.
//!
//! Every field has a default matching the site's markup, so a page needs no
//! configuration at all. A page may embed a partial JSON override; missing
//! keys keep their defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::error::EnhanceError;

pub const DEFAULT_STORAGE_KEY: &str = "site:theme";
pub const DEFAULT_ICON_ANIMATION_MS: u32 = 400;
pub const DEFAULT_FOCUS_DELAY_MS: u32 = 600;
pub const DEFAULT_CARD_NAVIGATE_MS: u32 = 160;
pub const DEFAULT_SCROLL_RESET_MS: u32 = 50;
pub const DEFAULT_REVEAL_THRESHOLD: f64 = 0.15;

/// Id of the optional inline `<script type="application/json">` override.
pub const CONFIG_ELEMENT_ID: &str = "site-enhance-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_key: String,
    pub selectors: Selectors,
    pub classes: Classes,
    pub timings: Timings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            selectors: Selectors::default(),
            classes: Classes::default(),
            timings: Timings::default(),
        }
    }
}

/// Where to find the elements each enhancement attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub theme_toggle_id: String,
    pub year_id: String,
    pub nav_toggle: String,
    pub nav: String,
    pub nav_link: String,
    pub anchor: String,
    pub reveal: String,
    pub card: String,
    pub card_target_attr: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            theme_toggle_id: "theme-toggle".to_owned(),
            year_id: "year".to_owned(),
            nav_toggle: ".nav-toggle".to_owned(),
            nav: ".nav".to_owned(),
            nav_link: ".nav-link".to_owned(),
            anchor: "a[href^=\"#\"]".to_owned(),
            reveal: ".reveal".to_owned(),
            card: ".card.clickable".to_owned(),
            card_target_attr: "data-href".to_owned(),
        }
    }
}

/// Class names written onto elements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Classes {
    pub light: String,
    pub icon_animate: String,
    pub nav_open: String,
    pub visible: String,
    pub animating: String,
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            light: "light".to_owned(),
            icon_animate: "theme-icon-animate".to_owned(),
            nav_open: "open".to_owned(),
            visible: "visible".to_owned(),
            animating: "animating".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub icon_animation_ms: u32,
    pub focus_delay_ms: u32,
    pub card_navigate_ms: u32,
    pub scroll_reset_ms: u32,
    /// Fraction of an element that must be on screen before it reveals.
    pub reveal_threshold: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            icon_animation_ms: DEFAULT_ICON_ANIMATION_MS,
            focus_delay_ms: DEFAULT_FOCUS_DELAY_MS,
            card_navigate_ms: DEFAULT_CARD_NAVIGATE_MS,
            scroll_reset_ms: DEFAULT_SCROLL_RESET_MS,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(raw: &str) -> Result<Self, EnhanceError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration from the page's optional inline JSON block. Absent,
    /// malformed or out-of-range input falls back to the defaults.
    pub fn from_inline(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        Self::from_json(raw).unwrap_or_else(|err| {
            log::warn!("ignoring inline config: {err}");
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), EnhanceError> {
        let threshold = self.timings.reveal_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(EnhanceError::InvalidConfig(format!("reveal_threshold {threshold} outside 0..=1")));
        }
        if self.storage_key.is_empty() {
            return Err(EnhanceError::InvalidConfig("storage_key is empty".into()));
        }
        Ok(())
    }
}
