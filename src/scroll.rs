//! Page-level scroll behavior: no restored offsets, and a reset to the top
//! shortly after the page finishes loading.

#[cfg(test)]
#[path = "scroll_test.rs"]
mod scroll_test;

use std::rc::Rc;

use crate::host::{Page, Restoration, Scheduler};

/// Opt out of the host's scroll restoration. Safe to call repeatedly.
pub fn disable_restoration(page: &dyn Page) -> Restoration {
    let outcome = page.disable_scroll_restoration();
    if outcome == Restoration::Unsupported {
        log::debug!("scroll restoration control not available");
    }
    outcome
}

/// Schedule the post-load jump back to the origin.
pub fn schedule_reset(scheduler: &dyn Scheduler, page: &Rc<dyn Page>, delay_ms: u32) {
    let page = Rc::clone(page);
    scheduler.after_ms(delay_ms, Box::new(move || page.scroll_to_origin()));
}
