//! In-memory host used by unit tests.
//!
//! Models just enough of a DOM for the enhancements: class lists,
//! attributes, single-element `innerHTML`, focus, listeners and a manually
//! fired intersection observer. Time only moves through [`ManualClock::advance`].

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::{
    ClickEvent, ClickHandler, Document, Element, EventOutcome, Intersection, IntersectionCallback, KeyEvent,
    KeyHandler, Observer, Page, PreferenceStore, Restoration, Scheduler, Services, Task,
};
use crate::error::EnhanceError;

type SharedClick = Rc<dyn Fn(&ClickEvent) -> EventOutcome>;
type SharedKey = Rc<dyn Fn(&KeyEvent) -> EventOutcome>;

// =============================================================
// Elements
// =============================================================

#[derive(Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    inner_html: String,
    text: String,
    children: Vec<FakeElement>,
    scrolled_into_view: usize,
    refuse_focus: bool,
}

#[derive(Clone)]
pub struct FakeElement {
    node: Rc<RefCell<Node>>,
    click: Rc<RefCell<Vec<SharedClick>>>,
    keydown: Rc<RefCell<Vec<SharedKey>>>,
    focused: Rc<RefCell<Option<FakeElement>>>,
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.node.borrow();
        f.debug_struct("FakeElement")
            .field("tag", &node.tag)
            .field("classes", &node.classes)
            .field("attrs", &node.attrs)
            .finish_non_exhaustive()
    }
}

impl FakeElement {
    fn new(tag: &str, focused: Rc<RefCell<Option<FakeElement>>>) -> Self {
        Self {
            node: Rc::new(RefCell::new(Node { tag: tag.to_owned(), ..Node::default() })),
            click: Rc::new(RefCell::new(Vec::new())),
            keydown: Rc::new(RefCell::new(Vec::new())),
            focused,
        }
    }

    // --- Builders ---

    pub fn with_id(self, id: &str) -> Self {
        self.set_attribute("id", id);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn refusing_focus(self) -> Self {
        self.node.borrow_mut().refuse_focus = true;
        self
    }

    pub fn append_child(&self, tag: &str) -> FakeElement {
        let child = FakeElement::new(tag, Rc::clone(&self.focused));
        self.node.borrow_mut().children.push(child.clone());
        child
    }

    // --- Event dispatch ---

    /// Fire a click; `PreventDefault` if any listener suppressed it.
    pub fn click(&self, event: ClickEvent) -> EventOutcome {
        let handlers: Vec<SharedClick> = self.click.borrow().clone();
        combine(handlers.iter().map(|h| h(&event)))
    }

    pub fn key_down(&self, key: &str) -> EventOutcome {
        let event = KeyEvent { key: key.to_owned() };
        let handlers: Vec<SharedKey> = self.keydown.borrow().clone();
        combine(handlers.iter().map(|h| h(&event)))
    }

    // --- Inspection ---

    pub fn inner_html(&self) -> String {
        self.node.borrow().inner_html.clone()
    }

    pub fn text(&self) -> String {
        self.node.borrow().text.clone()
    }

    pub fn scroll_count(&self) -> usize {
        self.node.borrow().scrolled_into_view
    }

    pub fn is_focused(&self) -> bool {
        self.focused.borrow().as_ref() == Some(self)
    }

    pub fn listener_count(&self) -> usize {
        self.click.borrow().len() + self.keydown.borrow().len()
    }

    fn matches(&self, selector: &Compound) -> bool {
        let node = self.node.borrow();
        if selector.tag.as_deref().is_some_and(|tag| tag != node.tag) {
            return false;
        }
        if let Some(id) = &selector.id {
            if node.attrs.get("id") != Some(id) {
                return false;
            }
        }
        if !selector.classes.iter().all(|c| node.classes.contains(c)) {
            return false;
        }
        if let Some((name, prefix)) = &selector.attr_prefix {
            return node.attrs.get(name).is_some_and(|v| v.starts_with(prefix.as_str()));
        }
        true
    }

    fn collect(&self, selector: &Compound, out: &mut Vec<FakeElement>) {
        let children = self.node.borrow().children.clone();
        for child in children {
            if child.matches(selector) {
                out.push(child.clone());
            }
            child.collect(selector, out);
        }
    }
}

fn combine(outcomes: impl Iterator<Item = EventOutcome>) -> EventOutcome {
    outcomes.fold(EventOutcome::Default, |acc, o| {
        if o == EventOutcome::PreventDefault { o } else { acc }
    })
}

impl Element for FakeElement {
    fn has_class(&self, class: &str) -> bool {
        self.node.borrow().classes.iter().any(|c| c == class)
    }

    fn set_class(&self, class: &str, on: bool) {
        let mut node = self.node.borrow_mut();
        let present = node.classes.iter().any(|c| c == class);
        if on && !present {
            node.classes.push(class.to_owned());
        } else if !on {
            node.classes.retain(|c| c != class);
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.node.borrow().attrs.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.node.borrow_mut().attrs.insert(name.to_owned(), value.to_owned());
    }

    fn set_inner_html(&self, html: &str) {
        let child = parse_single_tag(html, &self.focused);
        let mut node = self.node.borrow_mut();
        node.inner_html = html.to_owned();
        node.children = child.into_iter().collect();
    }

    fn set_text(&self, text: &str) {
        let mut node = self.node.borrow_mut();
        node.text = text.to_owned();
        node.children.clear();
    }

    fn query(&self, selector: &str) -> Option<Self> {
        let mut found = Vec::new();
        self.collect(&Compound::parse(selector), &mut found);
        found.into_iter().next()
    }

    fn scroll_into_view(&self) {
        self.node.borrow_mut().scrolled_into_view += 1;
    }

    fn focus_without_scroll(&self) -> Result<(), EnhanceError> {
        if self.node.borrow().refuse_focus {
            return Err(EnhanceError::Js("focus refused".into()));
        }
        *self.focused.borrow_mut() = Some(self.clone());
        Ok(())
    }

    fn on_click(&self, handler: ClickHandler) -> Result<(), EnhanceError> {
        self.click.borrow_mut().push(Rc::from(handler));
        Ok(())
    }

    fn on_keydown(&self, handler: KeyHandler) -> Result<(), EnhanceError> {
        self.keydown.borrow_mut().push(Rc::from(handler));
        Ok(())
    }
}

/// Parse markup of the form `<tag class="a b">...</tag>` into one element.
fn parse_single_tag(html: &str, focused: &Rc<RefCell<Option<FakeElement>>>) -> Option<FakeElement> {
    let rest = html.trim().strip_prefix('<')?;
    let tag_end = rest.find([' ', '>'])?;
    let element = FakeElement::new(&rest[..tag_end], Rc::clone(focused));
    if let Some(start) = rest.find("class=\"") {
        let after = &rest[start + "class=\"".len()..];
        let classes = after.split('"').next().unwrap_or_default();
        for class in classes.split_whitespace() {
            element.add_class(class);
        }
    }
    Some(element)
}

/// A single compound selector: `tag#id.a.b[attr^="prefix"]`.
#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attr_prefix: Option<(String, String)>,
}

impl Compound {
    fn parse(selector: &str) -> Self {
        let mut out = Self::default();
        let (head, attr) = match selector.split_once('[') {
            Some((head, attr)) => (head, Some(attr.trim_end_matches(']'))),
            None => (selector, None),
        };
        if let Some(attr) = attr {
            if let Some((name, value)) = attr.split_once("^=") {
                out.attr_prefix = Some((name.to_owned(), value.trim_matches('"').to_owned()));
            }
        }

        let mut token = String::new();
        let mut kind = ' ';
        for ch in head.chars().chain(std::iter::once('\0')) {
            if ch == '.' || ch == '#' || ch == '\0' {
                if !token.is_empty() {
                    match kind {
                        '.' => out.classes.push(std::mem::take(&mut token)),
                        '#' => out.id = Some(std::mem::take(&mut token)),
                        _ => out.tag = Some(std::mem::take(&mut token)),
                    }
                }
                kind = ch;
            } else {
                token.push(ch);
            }
        }
        out
    }
}

// =============================================================
// Document
// =============================================================

struct ObserverState {
    threshold: f64,
    observed: RefCell<Vec<FakeElement>>,
    callback: IntersectionCallback<FakeElement>,
}

#[derive(Clone)]
pub struct FakeObserver {
    state: Rc<ObserverState>,
}

impl FakeObserver {
    pub fn threshold(&self) -> f64 {
        self.state.threshold
    }

    pub fn observed(&self) -> Vec<FakeElement> {
        self.state.observed.borrow().clone()
    }

    /// Deliver one batch of visibility changes to the callback.
    pub fn fire(&self, entries: &[(FakeElement, bool)]) {
        let batch: Vec<Intersection<FakeElement>> = entries
            .iter()
            .map(|(target, is_intersecting)| Intersection { target: target.clone(), is_intersecting: *is_intersecting })
            .collect();
        (self.state.callback)(&batch, self);
    }
}

impl Observer<FakeElement> for FakeObserver {
    fn observe(&self, target: &FakeElement) {
        self.state.observed.borrow_mut().push(target.clone());
    }

    fn unobserve(&self, target: &FakeElement) {
        self.state.observed.borrow_mut().retain(|e| e != target);
    }
}

pub struct FakeDocument {
    root: FakeElement,
    supports_intersection: Cell<bool>,
    has_body: Cell<bool>,
    observers: RefCell<Vec<FakeObserver>>,
}

impl Default for FakeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDocument {
    pub fn new() -> Self {
        Self {
            root: FakeElement::new("body", Rc::new(RefCell::new(None))),
            supports_intersection: Cell::new(true),
            has_body: Cell::new(true),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Append an element directly under `<body>`.
    pub fn append(&self, tag: &str) -> FakeElement {
        self.root.append_child(tag)
    }

    pub fn without_intersection_support(self) -> Self {
        self.supports_intersection.set(false);
        self
    }

    /// Report no `<body>`, as a document mid-teardown might.
    pub fn without_body(self) -> Self {
        self.has_body.set(false);
        self
    }

    pub fn observers(&self) -> Vec<FakeObserver> {
        self.observers.borrow().clone()
    }

    pub fn focused(&self) -> Option<FakeElement> {
        self.root.focused.borrow().clone()
    }
}

impl Document for FakeDocument {
    type Element = FakeElement;
    type Observer = FakeObserver;

    fn element_by_id(&self, id: &str) -> Option<FakeElement> {
        let selector = Compound { id: Some(id.to_owned()), ..Compound::default() };
        let mut found = Vec::new();
        self.root.collect(&selector, &mut found);
        found.into_iter().next()
    }

    fn query(&self, selector: &str) -> Option<FakeElement> {
        self.root.query(selector)
    }

    fn query_all(&self, selector: &str) -> Vec<FakeElement> {
        let mut found = Vec::new();
        self.root.collect(&Compound::parse(selector), &mut found);
        found
    }

    fn body(&self) -> Option<FakeElement> {
        self.has_body.get().then(|| self.root.clone())
    }

    fn intersection_observer(
        &self,
        threshold: f64,
        callback: IntersectionCallback<FakeElement>,
    ) -> Result<Option<FakeObserver>, EnhanceError> {
        if !self.supports_intersection.get() {
            return Ok(None);
        }
        let observer =
            FakeObserver { state: Rc::new(ObserverState { threshold, observed: RefCell::new(Vec::new()), callback }) };
        self.observers.borrow_mut().push(observer.clone());
        Ok(Some(observer))
    }
}

// =============================================================
// Services
// =============================================================

#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.values.borrow_mut().insert(key.to_owned(), value.to_owned());
        store
    }

    pub fn read_only(self) -> Self {
        self.read_only.set(true);
        self
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnhanceError> {
        if self.read_only.get() {
            return Err(EnhanceError::StorageUnavailable);
        }
        self.writes.set(self.writes.get() + 1);
        self.values.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Deterministic timer queue. Tasks run in due order, ties in schedule order.
#[derive(Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
    seq: Cell<u64>,
    queue: RefCell<Vec<(u64, u64, Task)>>,
}

impl ManualClock {
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move time forward, running every task that comes due on the way,
    /// including tasks scheduled by earlier tasks.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms.get() + ms;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let idx = queue
                    .iter()
                    .enumerate()
                    .filter(|(_, (due, _, _))| *due <= target)
                    .min_by_key(|(_, (due, seq, _))| (*due, *seq))
                    .map(|(idx, _)| idx);
                idx.map(|idx| queue.remove(idx))
            };
            let Some((due, _, task)) = next else {
                break;
            };
            self.now_ms.set(due);
            task();
        }
        self.now_ms.set(target);
    }
}

impl Scheduler for ManualClock {
    fn after_ms(&self, delay_ms: u32, task: Task) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        let due = self.now_ms.get() + u64::from(delay_ms);
        self.queue.borrow_mut().push((due, seq, task));
    }
}

pub struct RecordingPage {
    restoration_supported: bool,
    restoration_manual: Cell<bool>,
    scroll_resets: Cell<usize>,
    navigations: RefCell<Vec<String>>,
    year: i32,
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self {
            restoration_supported: true,
            restoration_manual: Cell::new(false),
            scroll_resets: Cell::new(0),
            navigations: RefCell::new(Vec::new()),
            year: 2026,
        }
    }
}

impl RecordingPage {
    pub fn without_scroll_restoration() -> Self {
        Self { restoration_supported: false, ..Self::default() }
    }

    pub fn restoration_manual(&self) -> bool {
        self.restoration_manual.get()
    }

    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets.get()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }
}

impl Page for RecordingPage {
    fn disable_scroll_restoration(&self) -> Restoration {
        if !self.restoration_supported {
            return Restoration::Unsupported;
        }
        self.restoration_manual.set(true);
        Restoration::Manual
    }

    fn scroll_to_origin(&self) {
        self.scroll_resets.set(self.scroll_resets.get() + 1);
    }

    fn assign_location(&self, href: &str) {
        self.navigations.borrow_mut().push(href.to_owned());
    }

    fn current_year(&self) -> i32 {
        self.year
    }
}

/// A fake document plus the services wired to it.
pub struct Harness {
    pub doc: FakeDocument,
    pub store: Rc<MemoryStore>,
    pub clock: Rc<ManualClock>,
    pub page: Rc<RecordingPage>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::with_store(Rc::new(MemoryStore::default()))
    }
}

impl Harness {
    pub fn with_store(store: Rc<MemoryStore>) -> Self {
        Self {
            doc: FakeDocument::new(),
            store,
            clock: Rc::new(ManualClock::default()),
            page: Rc::new(RecordingPage::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            store: Rc::clone(&self.store) as Rc<dyn PreferenceStore>,
            scheduler: Rc::clone(&self.clock) as Rc<dyn Scheduler>,
            page: Rc::clone(&self.page) as Rc<dyn Page>,
        }
    }
}
