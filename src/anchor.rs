//! Smooth scrolling for same-page `#fragment` links.
//!
//! The jump is always suppressed. When the fragment names an element, it is
//! scrolled to smoothly, made programmatically focusable, and receives focus
//! once the scroll has mostly settled.

#[cfg(test)]
#[path = "anchor_test.rs"]
mod anchor_test;

use std::rc::Rc;

use crate::config::Config;
use crate::error::EnhanceError;
use crate::host::{ClickEvent, Document, Element, EventOutcome, Services};

pub struct SmoothScroll<D> {
    doc: Rc<D>,
    services: Services,
    focus_delay_ms: u32,
}

impl<D: Document + 'static> SmoothScroll<D> {
    pub fn new(doc: Rc<D>, services: Services, config: &Config) -> Self {
        Self { doc, services, focus_delay_ms: config.timings.focus_delay_ms }
    }

    /// Handle activation of a link whose `href` is `href`.
    pub fn on_anchor_activated(&self, href: Option<&str>) -> EventOutcome {
        let Some(fragment) = href.and_then(|h| h.strip_prefix('#')).filter(|f| !f.is_empty()) else {
            return EventOutcome::PreventDefault;
        };
        let Some(target) = self.doc.element_by_id(fragment) else {
            log::debug!("no element for fragment #{fragment}");
            return EventOutcome::PreventDefault;
        };

        target.scroll_into_view();
        target.set_attribute("tabindex", "-1");
        self.services.scheduler.after_ms(
            self.focus_delay_ms,
            Box::new(move || {
                if let Err(err) = target.focus_without_scroll() {
                    log::debug!("focus after scroll skipped: {err}");
                }
            }),
        );
        EventOutcome::PreventDefault
    }
}

pub fn install<D: Document + 'static>(doc: &Rc<D>, services: &Services, config: &Config) -> Result<(), EnhanceError> {
    let scroller = Rc::new(SmoothScroll::new(Rc::clone(doc), services.clone(), config));
    for link in doc.query_all(&config.selectors.anchor) {
        let handler = Rc::clone(&scroller);
        let source = link.clone();
        link.on_click(Box::new(move |_: &ClickEvent| {
            let href = source.attribute("href");
            handler.on_anchor_activated(href.as_deref())
        }))?;
    }
    Ok(())
}
