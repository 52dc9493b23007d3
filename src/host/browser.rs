//! `web-sys` implementations of the host seams.
//!
//! Listener and observer closures are leaked with `forget`: they live as long
//! as the page, which is exactly as long as the elements they serve.

use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    DocumentReadyState, FocusOptions, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
    ScrollRestoration,
};

use super::{
    ClickEvent, ClickHandler, Document, Element, EventOutcome, Intersection, IntersectionCallback, KeyEvent,
    KeyHandler, Observer, Page, PreferenceStore, Restoration, Scheduler, Services, Task,
};
use crate::app::{self, Enhancer, ReadyState};
use crate::config::{CONFIG_ELEMENT_ID, Config};
use crate::error::EnhanceError;

fn js_error(err: &JsValue) -> EnhanceError {
    EnhanceError::Js(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Log a failed DOM mutation; mutations have no caller to report to.
fn report(result: Result<(), JsValue>, what: &str) {
    if let Err(err) = result {
        log::warn!("{what} failed: {}", js_error(&err));
    }
}

pub fn window() -> Result<web_sys::Window, EnhanceError> {
    web_sys::window().ok_or(EnhanceError::NoWindow)
}

// =============================================================
// Elements
// =============================================================

#[derive(Clone, Debug)]
pub struct DomElement(web_sys::Element);

impl DomElement {
    fn listen<F>(&self, event: &str, callback: F) -> Result<(), EnhanceError>
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(callback);
        self.0
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|err| js_error(&err))?;
        closure.forget();
        Ok(())
    }
}

/// Whether the event target is, or sits inside, an `<a>` element.
fn from_link(event: &web_sys::Event) -> bool {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok_or_log()) else {
        return false;
    };
    matches!(target.closest("a"), Ok(Some(_)))
}

/// `Result::ok` with the error logged at debug level.
trait OkOrLog<T> {
    fn ok_or_log(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> OkOrLog<T> for Result<T, E> {
    fn ok_or_log(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!("ignored host value: {err:?}");
                None
            }
        }
    }
}

impl Element for DomElement {
    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn set_class(&self, class: &str, on: bool) {
        let result = self.0.class_list().toggle_with_force(class, on).map(|_| ());
        report(result, "class toggle");
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        report(self.0.set_attribute(name, value), "set attribute");
    }

    fn set_inner_html(&self, html: &str) {
        self.0.set_inner_html(html);
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn query(&self, selector: &str) -> Option<Self> {
        self.0.query_selector(selector).ok_or_log().flatten().map(DomElement)
    }

    fn scroll_into_view(&self) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        self.0.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn focus_without_scroll(&self) -> Result<(), EnhanceError> {
        let el = self.0.dyn_ref::<HtmlElement>().ok_or_else(|| EnhanceError::Js("element is not focusable".into()))?;
        let options = FocusOptions::new();
        options.set_prevent_scroll(true);
        el.focus_with_options(&options).map_err(|err| js_error(&err))
    }

    fn on_click(&self, handler: ClickHandler) -> Result<(), EnhanceError> {
        self.listen("click", move |event: web_sys::Event| {
            let click = ClickEvent { from_link: from_link(&event) };
            if handler(&click) == EventOutcome::PreventDefault {
                event.prevent_default();
            }
        })
    }

    fn on_keydown(&self, handler: KeyHandler) -> Result<(), EnhanceError> {
        self.listen("keydown", move |event: web_sys::Event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = KeyEvent { key: key_event.key() };
            if handler(&key) == EventOutcome::PreventDefault {
                event.prevent_default();
            }
        })
    }
}

// =============================================================
// Document
// =============================================================

pub struct DomObserver(IntersectionObserver);

impl Observer<DomElement> for DomObserver {
    fn observe(&self, target: &DomElement) {
        self.0.observe(&target.0);
    }

    fn unobserve(&self, target: &DomElement) {
        self.0.unobserve(&target.0);
    }
}

pub struct DomDocument {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl DomDocument {
    pub fn new(window: web_sys::Window) -> Result<Self, EnhanceError> {
        let document = window.document().ok_or(EnhanceError::NoDocument)?;
        Ok(Self { window, document })
    }

    pub fn ready_state(&self) -> web_sys::DocumentReadyState {
        self.document.ready_state()
    }

    /// Text of the inline JSON configuration block, if the page has one.
    pub fn inline_config(&self, id: &str) -> Option<String> {
        self.document.get_element_by_id(id).and_then(|el| el.text_content())
    }
}

impl Document for DomDocument {
    type Element = DomElement;
    type Observer = DomObserver;

    fn element_by_id(&self, id: &str) -> Option<DomElement> {
        self.document.get_element_by_id(id).map(DomElement)
    }

    fn query(&self, selector: &str) -> Option<DomElement> {
        self.document.query_selector(selector).ok_or_log().flatten().map(DomElement)
    }

    fn query_all(&self, selector: &str) -> Vec<DomElement> {
        let Some(list) = self.document.query_selector_all(selector).ok_or_log() else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok_or_log())
            .map(DomElement)
            .collect()
    }

    fn body(&self) -> Option<DomElement> {
        self.document.body().map(|body| DomElement(body.into()))
    }

    fn intersection_observer(
        &self,
        threshold: f64,
        callback: IntersectionCallback<DomElement>,
    ) -> Result<Option<DomObserver>, EnhanceError> {
        let supported =
            Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).map_err(|err| js_error(&err))?;
        if !supported {
            return Ok(None);
        }

        let closure = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                let batch: Vec<Intersection<DomElement>> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok_or_log())
                    .map(|entry| Intersection {
                        target: DomElement(entry.target()),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect();
                callback(&batch, &DomObserver(observer));
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        let observer = IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &options)
            .map_err(|err| js_error(&err))?;
        closure.forget();
        Ok(Some(DomObserver(observer)))
    }
}

// =============================================================
// Services
// =============================================================

pub struct LocalStorage(Option<web_sys::Storage>);

impl LocalStorage {
    pub fn new(window: &web_sys::Window) -> Self {
        Self(window.local_storage().ok_or_log().flatten())
    }
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok_or_log().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnhanceError> {
        let storage = self.0.as_ref().ok_or(EnhanceError::StorageUnavailable)?;
        storage.set_item(key, value).map_err(|err| js_error(&err))
    }
}

pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn after_ms(&self, delay_ms: u32, task: Task) {
        Timeout::new(delay_ms, task).forget();
    }
}

pub struct WindowPage(web_sys::Window);

impl Page for WindowPage {
    fn disable_scroll_restoration(&self) -> Restoration {
        let Some(history) = self.0.history().ok_or_log() else {
            return Restoration::Unsupported;
        };
        if !matches!(Reflect::has(&history, &JsValue::from_str("scrollRestoration")), Ok(true)) {
            return Restoration::Unsupported;
        }
        match history.set_scroll_restoration(ScrollRestoration::Manual) {
            Ok(()) => Restoration::Manual,
            Err(err) => {
                log::debug!("scroll restoration unchanged: {}", js_error(&err));
                Restoration::Unsupported
            }
        }
    }

    fn scroll_to_origin(&self) {
        self.0.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn assign_location(&self, href: &str) {
        report(self.0.location().set_href(href), "navigation");
    }

    fn current_year(&self) -> i32 {
        let year = js_sys::Date::new_0().get_full_year();
        i32::try_from(year).unwrap_or(i32::MAX)
    }
}

/// Services backed by the live browser window.
pub fn services(window: &web_sys::Window) -> Services {
    Services {
        store: Rc::new(LocalStorage::new(window)),
        scheduler: Rc::new(TimeoutScheduler),
        page: Rc::new(WindowPage(window.clone())),
    }
}

// =============================================================
// Boot
// =============================================================

/// Install logging, then hand the host milestones to an [`Enhancer`].
pub fn boot() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("logger not installed: {err}")));
    }
    if let Err(err) = run() {
        log::error!("page enhancements disabled: {err}");
    }
}

fn run() -> Result<(), EnhanceError> {
    let window = window()?;
    let services = services(&window);
    app::on_script_loaded(&services);

    let doc = Rc::new(DomDocument::new(window.clone())?);
    let config = Config::from_inline(doc.inline_config(CONFIG_ELEMENT_ID).as_deref());
    let ready = match doc.ready_state() {
        DocumentReadyState::Loading => ReadyState::Loading,
        DocumentReadyState::Complete => ReadyState::Complete,
        _ => ReadyState::Interactive,
    };
    let enhancer = Rc::new(Enhancer::new(Rc::clone(&doc), services, config));
    let pending = enhancer.start(ready);

    if pending.content_ready {
        let ready = Rc::clone(&enhancer);
        listen_once(&doc.document, "DOMContentLoaded", move || ready.on_content_ready())?;
    }
    if pending.page_loaded {
        listen_once(&window, "load", move || enhancer.on_page_loaded())?;
    }
    Ok(())
}

fn listen_once<F>(target: &web_sys::EventTarget, event: &str, callback: F) -> Result<(), EnhanceError>
where
    F: FnOnce() + 'static,
{
    let callback = Closure::once_into_js(callback);
    target.add_event_listener_with_callback(event, callback.unchecked_ref()).map_err(|err| js_error(&err))
}
