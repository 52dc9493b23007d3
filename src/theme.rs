//! Light/dark theme with a persisted preference.
//!
//! The body carries the light-mode class; its absence means dark. The toggle
//! control mirrors the mode through `aria-pressed` and a sun/moon glyph whose
//! entry animation class is stripped again after a short delay.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::rc::Rc;

use crate::config::Config;
use crate::error::EnhanceError;
use crate::host::{ClickEvent, Document, Element, EventOutcome, Services};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Interpret a stored preference. Only the literal `light` selects light;
    /// anything else, including nothing, is dark.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some("light") => Self::Light,
            _ => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            Self::Light => "fa-sun",
            Self::Dark => "fa-moon",
        }
    }
}

pub struct ThemeManager<E: Element> {
    body: E,
    toggle: Option<E>,
    services: Services,
    storage_key: String,
    light_class: String,
    icon_animate_class: String,
    icon_animation_ms: u32,
}

impl<E: Element> ThemeManager<E> {
    /// Locate the body and the (optional) toggle control.
    pub fn locate<D>(doc: &D, services: Services, config: &Config) -> Result<Self, EnhanceError>
    where
        D: Document<Element = E>,
    {
        let body = doc.body().ok_or(EnhanceError::MissingBody)?;
        Ok(Self {
            body,
            toggle: doc.element_by_id(&config.selectors.theme_toggle_id),
            services,
            storage_key: config.storage_key.clone(),
            light_class: config.classes.light.clone(),
            icon_animate_class: config.classes.icon_animate.clone(),
            icon_animation_ms: config.timings.icon_animation_ms,
        })
    }

    pub fn toggle(&self) -> Option<&E> {
        self.toggle.as_ref()
    }

    /// Apply the stored preference without writing it back.
    pub fn initialize(&self) -> Theme {
        let stored = self.services.store.get(&self.storage_key);
        let theme = Theme::from_stored(stored.as_deref());
        self.apply(theme, false);
        theme
    }

    /// The mode currently shown, read from the body marker.
    pub fn current(&self) -> Theme {
        if self.body.has_class(&self.light_class) { Theme::Light } else { Theme::Dark }
    }

    pub fn apply(&self, theme: Theme, persist: bool) {
        let is_light = theme == Theme::Light;
        self.body.set_class(&self.light_class, is_light);

        if let Some(toggle) = &self.toggle {
            toggle.set_attribute("aria-pressed", if is_light { "true" } else { "false" });
            toggle.set_inner_html(&format!(
                "<i class=\"fa-solid {} {}\"></i>",
                theme.glyph(),
                self.icon_animate_class
            ));

            let toggle = toggle.clone();
            let class = self.icon_animate_class.clone();
            self.services.scheduler.after_ms(
                self.icon_animation_ms,
                Box::new(move || {
                    if let Some(icon) = toggle.query("i") {
                        icon.remove_class(&class);
                    }
                }),
            );
        }

        if persist {
            if let Err(err) = self.services.store.set(&self.storage_key, theme.as_str()) {
                log::warn!("theme preference not saved: {err}");
            }
        }
    }

    /// Flip the current mode and persist it.
    pub fn on_toggle_activated(&self) -> EventOutcome {
        let next = self.current().inverted();
        log::debug!("theme toggled to {}", next.as_str());
        self.apply(next, true);
        EventOutcome::Default
    }
}

/// Apply the saved theme and wire the toggle control, if present.
pub fn install<D: Document + 'static>(doc: &D, services: &Services, config: &Config) -> Result<(), EnhanceError> {
    let manager = Rc::new(ThemeManager::locate(doc, services.clone(), config)?);
    manager.initialize();

    if let Some(toggle) = manager.toggle().cloned() {
        let handler = Rc::clone(&manager);
        toggle.on_click(Box::new(move |_: &ClickEvent| handler.on_toggle_activated()))?;
    }
    Ok(())
}
