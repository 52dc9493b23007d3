//! Whole-surface navigation for clickable cards.
//!
//! A card carries its destination in an attribute. Click or Enter/Space adds
//! the animating class, then navigates after a short delay so the animation
//! is visible. Clicks on a real link inside the card are left alone.

#[cfg(test)]
#[path = "card_test.rs"]
mod card_test;

use std::rc::Rc;

use crate::config::Config;
use crate::error::EnhanceError;
use crate::host::{ClickEvent, Document, Element, EventOutcome, KeyEvent, Services};

pub struct CardNavigator<E: Element> {
    card: E,
    href: Option<String>,
    services: Services,
    animating_class: String,
    delay_ms: u32,
}

impl<E: Element> CardNavigator<E> {
    /// The target is read once, when the card is wired.
    pub fn new(card: E, services: Services, config: &Config) -> Self {
        let href = card.attribute(&config.selectors.card_target_attr).filter(|h| !h.is_empty());
        Self {
            card,
            href,
            services,
            animating_class: config.classes.animating.clone(),
            delay_ms: config.timings.card_navigate_ms,
        }
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn navigate(&self) {
        let Some(href) = self.href.clone() else {
            return;
        };
        self.card.add_class(&self.animating_class);
        let page = Rc::clone(&self.services.page);
        self.services.scheduler.after_ms(
            self.delay_ms,
            Box::new(move || {
                log::info!("navigating to {href}");
                page.assign_location(&href);
            }),
        );
    }

    pub fn on_click(&self, event: &ClickEvent) -> EventOutcome {
        if !event.from_link {
            self.navigate();
        }
        EventOutcome::Default
    }

    pub fn on_keydown(&self, event: &KeyEvent) -> EventOutcome {
        match event.key.as_str() {
            "Enter" | " " => {
                self.navigate();
                EventOutcome::PreventDefault
            }
            _ => EventOutcome::Default,
        }
    }
}

pub fn install<D: Document + 'static>(doc: &D, services: &Services, config: &Config) -> Result<(), EnhanceError> {
    for card in doc.query_all(&config.selectors.card) {
        let navigator = Rc::new(CardNavigator::new(card.clone(), services.clone(), config));
        if navigator.href().is_none() {
            log::debug!("clickable card without a target");
        }

        let handler = Rc::clone(&navigator);
        card.on_click(Box::new(move |event: &ClickEvent| handler.on_click(event)))?;
        let handler = navigator;
        card.on_keydown(Box::new(move |event: &KeyEvent| handler.on_keydown(event)))?;
    }
    Ok(())
}
