//! Footer copyright year.

#[cfg(test)]
#[path = "year_test.rs"]
mod year_test;

use crate::config::Config;
use crate::host::{Document, Element, Page};

/// Write the current year into the year placeholder, if the page has one.
pub fn install<D: Document>(doc: &D, page: &dyn Page, config: &Config) {
    if let Some(el) = doc.element_by_id(&config.selectors.year_id) {
        el.set_text(&page.current_year().to_string());
    }
}
