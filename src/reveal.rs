//! One-shot reveal of elements as they scroll into view.
//!
//! With intersection support, each marked element gains the visible class the
//! first time enough of it is on screen and is then dropped from observation.
//! Without it, everything is marked visible straight away.

#[cfg(test)]
#[path = "reveal_test.rs"]
mod reveal_test;

use crate::config::Config;
use crate::error::EnhanceError;
use crate::host::{Document, Element, Intersection, Observer};

/// How reveals are delivered, chosen once at startup.
pub enum RevealMode<O> {
    /// Nothing on the page is marked for reveal.
    Idle,
    Observed(O),
    /// No intersection support; everything was revealed at once.
    Immediate,
}

/// Reveal every intersecting target and stop watching it.
pub fn reveal_entries<E: Element>(entries: &[Intersection<E>], observer: &dyn Observer<E>, visible_class: &str) {
    for entry in entries.iter().filter(|e| e.is_intersecting) {
        entry.target.add_class(visible_class);
        observer.unobserve(&entry.target);
    }
}

pub fn install<D: Document + 'static>(doc: &D, config: &Config) -> Result<RevealMode<D::Observer>, EnhanceError> {
    let targets = doc.query_all(&config.selectors.reveal);
    if targets.is_empty() {
        return Ok(RevealMode::Idle);
    }

    let visible = config.classes.visible.clone();
    let callback = Box::new(move |entries: &[Intersection<D::Element>], observer: &dyn Observer<D::Element>| {
        reveal_entries(entries, observer, &visible);
    });

    match doc.intersection_observer(config.timings.reveal_threshold, callback)? {
        Some(observer) => {
            for target in &targets {
                observer.observe(target);
            }
            log::debug!("observing {} reveal targets", targets.len());
            Ok(RevealMode::Observed(observer))
        }
        None => {
            for target in &targets {
                target.add_class(&config.classes.visible);
            }
            Ok(RevealMode::Immediate)
        }
    }
}
