//! Mobile navigation drawer.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::rc::Rc;

use crate::config::Config;
use crate::error::EnhanceError;
use crate::host::{ClickEvent, Document, Element, EventOutcome};

const EXPANDED: &str = "aria-expanded";

/// The toggle button and the panel it opens. `aria-expanded` on the toggle
/// and the open class on the panel always agree after any handler runs.
pub struct NavDrawer<E: Element> {
    toggle: E,
    panel: E,
    open_class: String,
}

impl<E: Element> NavDrawer<E> {
    /// `None` unless both the toggle and the panel exist.
    pub fn locate<D>(doc: &D, config: &Config) -> Option<Self>
    where
        D: Document<Element = E>,
    {
        let toggle = doc.query(&config.selectors.nav_toggle)?;
        let panel = doc.query(&config.selectors.nav)?;
        Some(Self { toggle, panel, open_class: config.classes.nav_open.clone() })
    }

    pub fn is_open(&self) -> bool {
        self.panel.has_class(&self.open_class)
    }

    pub fn on_toggle_activated(&self) -> EventOutcome {
        let expanded = self.toggle.attribute(EXPANDED).as_deref() == Some("true");
        self.set_open(!expanded);
        EventOutcome::Default
    }

    /// Close the drawer if it is open; links keep their own navigation.
    pub fn on_link_activated(&self) -> EventOutcome {
        if self.is_open() {
            self.set_open(false);
        }
        EventOutcome::Default
    }

    fn set_open(&self, open: bool) {
        self.toggle.set_attribute(EXPANDED, if open { "true" } else { "false" });
        self.panel.set_class(&self.open_class, open);
    }
}

pub fn install<D: Document + 'static>(doc: &D, config: &Config) -> Result<(), EnhanceError> {
    let Some(drawer) = NavDrawer::locate(doc, config) else {
        log::debug!("nav drawer not present");
        return Ok(());
    };
    let drawer = Rc::new(drawer);

    let handler = Rc::clone(&drawer);
    drawer.toggle.on_click(Box::new(move |_: &ClickEvent| handler.on_toggle_activated()))?;

    for link in doc.query_all(&config.selectors.nav_link) {
        let handler = Rc::clone(&drawer);
        link.on_click(Box::new(move |_: &ClickEvent| handler.on_link_activated()))?;
    }
    Ok(())
}
