//! Boot sequencing for the page enhancements.
//!
//! Three host milestones drive everything:
//!
//! | Milestone | Work |
//! |-----------|------|
//! | script evaluated | scroll restoration switched to manual |
//! | content ready | year, theme, nav drawer, anchors, reveal, cards |
//! | page loaded | scroll reset to the origin after a short delay |
//!
//! Hosts report the document's ready state once at startup through
//! [`Enhancer::start`], which runs the milestones already passed and returns
//! the ones the host still has to wait for.
//!
//! Content-ready setup stops at the first failure; the failure is logged and
//! whatever was already wired stays wired.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::rc::Rc;

use crate::config::Config;
use crate::error::EnhanceError;
use crate::host::{Document, Restoration, Services};
use crate::{anchor, card, nav, reveal, scroll, theme, year};

/// Document loading progress as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Milestones still ahead after [`Enhancer::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub content_ready: bool,
    pub page_loaded: bool,
}

/// Script-evaluation milestone. Runs before configuration is read or any
/// element is touched.
pub fn on_script_loaded(services: &Services) -> Restoration {
    scroll::disable_restoration(services.page.as_ref())
}

pub struct Enhancer<D: Document> {
    doc: Rc<D>,
    services: Services,
    config: Rc<Config>,
}

impl<D: Document + 'static> Enhancer<D> {
    pub fn new(doc: Rc<D>, services: Services, config: Config) -> Self {
        Self { doc, services, config: Rc::new(config) }
    }

    /// Run every milestone the document has already passed.
    pub fn start(&self, ready: ReadyState) -> Pending {
        let pending = Pending {
            content_ready: ready == ReadyState::Loading,
            page_loaded: ready != ReadyState::Complete,
        };
        if !pending.content_ready {
            self.on_content_ready();
        }
        if !pending.page_loaded {
            self.on_page_loaded();
        }
        pending
    }

    /// Wire every content enhancement. Never fails outward.
    pub fn on_content_ready(&self) {
        match self.init() {
            Ok(()) => log::debug!("page enhancements ready"),
            Err(err) => log::error!("page enhancement setup failed: {err}"),
        }
    }

    pub fn on_page_loaded(&self) {
        scroll::schedule_reset(
            self.services.scheduler.as_ref(),
            &self.services.page,
            self.config.timings.scroll_reset_ms,
        );
    }

    fn init(&self) -> Result<(), EnhanceError> {
        let doc = self.doc.as_ref();
        year::install(doc, self.services.page.as_ref(), &self.config);
        theme::install(doc, &self.services, &self.config)?;
        nav::install(doc, &self.config)?;
        anchor::install(&self.doc, &self.services, &self.config)?;
        // The host keeps a live observer reachable while it still has targets.
        let _observer = reveal::install(doc, &self.config)?;
        card::install(doc, &self.services, &self.config)?;
        Ok(())
    }
}
