//! Host environment seams.
//!
//! SYSTEM CONTEXT
//! ==============
//! Enhancements never touch the browser directly. They talk to a
//! [`Document`] of [`Element`] handles plus a [`Services`] bundle (storage,
//! timers, page-level calls). The `browser` feature supplies `web-sys`
//! implementations; tests use the in-memory host in `fake`.

#[cfg(feature = "browser")]
pub mod browser;
#[cfg(test)]
pub mod fake;

use std::rc::Rc;

use crate::error::EnhanceError;

/// Whether the default action of a DOM event must be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Default,
    PreventDefault,
}

/// A pointer activation on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickEvent {
    /// The click started on (or inside) a real `<a>` element.
    pub from_link: bool,
}

/// A key press on a focused element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The `KeyboardEvent.key` value, e.g. `"Enter"` or `" "`.
    pub key: String,
}

pub type ClickHandler = Box<dyn Fn(&ClickEvent) -> EventOutcome>;
pub type KeyHandler = Box<dyn Fn(&KeyEvent) -> EventOutcome>;

/// A cheap, clonable handle onto one DOM element.
///
/// Handles share the underlying node, so mutation goes through `&self`.
pub trait Element: Clone + 'static {
    fn has_class(&self, class: &str) -> bool;

    /// Add `class` when `on`, remove it otherwise.
    fn set_class(&self, class: &str, on: bool);

    fn add_class(&self, class: &str) {
        self.set_class(class, true);
    }

    fn remove_class(&self, class: &str) {
        self.set_class(class, false);
    }

    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    fn set_inner_html(&self, html: &str);
    fn set_text(&self, text: &str);

    /// First descendant matching `selector`.
    fn query(&self, selector: &str) -> Option<Self>;

    /// Smoothly scroll so the element's top meets the viewport top.
    fn scroll_into_view(&self);

    /// Move keyboard focus here without scrolling.
    fn focus_without_scroll(&self) -> Result<(), EnhanceError>;

    fn on_click(&self, handler: ClickHandler) -> Result<(), EnhanceError>;
    fn on_keydown(&self, handler: KeyHandler) -> Result<(), EnhanceError>;
}

/// One visibility change reported by an intersection observer.
#[derive(Debug, Clone)]
pub struct Intersection<E> {
    pub target: E,
    pub is_intersecting: bool,
}

/// A live intersection observer.
pub trait Observer<E> {
    fn observe(&self, target: &E);
    fn unobserve(&self, target: &E);
}

pub type IntersectionCallback<E> = Box<dyn Fn(&[Intersection<E>], &dyn Observer<E>)>;

pub trait Document {
    type Element: Element;
    type Observer: Observer<Self::Element> + 'static;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn body(&self) -> Option<Self::Element>;

    /// Build an intersection observer, or `Ok(None)` when the host has no
    /// intersection support.
    fn intersection_observer(
        &self,
        threshold: f64,
        callback: IntersectionCallback<Self::Element>,
    ) -> Result<Option<Self::Observer>, EnhanceError>;
}

/// Origin-scoped string key/value persistence.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), EnhanceError>;
}

pub type Task = Box<dyn FnOnce()>;

/// Deferred one-shot callbacks on the host event loop. Nothing is cancellable.
pub trait Scheduler {
    fn after_ms(&self, delay_ms: u32, task: Task);
}

/// Result of asking the host to stop restoring scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restoration {
    Manual,
    Unsupported,
}

/// Window-level operations.
pub trait Page {
    fn disable_scroll_restoration(&self) -> Restoration;
    fn scroll_to_origin(&self);
    /// Full browser navigation to `href`.
    fn assign_location(&self, href: &str);
    fn current_year(&self) -> i32;
}

/// Injected collaborators shared by all enhancements.
#[derive(Clone)]
pub struct Services {
    pub store: Rc<dyn PreferenceStore>,
    pub scheduler: Rc<dyn Scheduler>,
    pub page: Rc<dyn Page>,
}
