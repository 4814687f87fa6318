use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use kuchiki::traits::*;
use kuchiki::NodeRef;
use tracing::warn;
use url::Url;

use super::window::{Window, WindowInner};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

/// How nested frames of a document finish loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameLoading {
    /// The embedded document stays `loading` until `FrameElement::finish_load`.
    #[default]
    Deferred,
    /// The embedded document completes, and fires `load`, while it is being
    /// inserted, before anyone could subscribe.
    Immediate,
}

#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

struct DocumentInner {
    id: u64,
    url: Url,
    tree: NodeRef,
    ready_state: Cell<ReadyState>,
    default_view: RefCell<Weak<WindowInner>>,
    parent_view: RefCell<Weak<WindowInner>>,
    frame_loading: Cell<FrameLoading>,
}

impl Document {
    /// Parse `html` into a new document. The document starts out `loading`
    /// and detached from any window.
    pub fn parse(html: &str, url: Url) -> Self {
        let tree = kuchiki::parse_html().one(html);
        Self {
            inner: Rc::new(DocumentInner {
                id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
                url,
                tree,
                ready_state: Cell::new(ReadyState::Loading),
                default_view: RefCell::new(Weak::new()),
                parent_view: RefCell::new(Weak::new()),
                frame_loading: Cell::new(FrameLoading::default()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn ready_state(&self) -> ReadyState {
        self.inner.ready_state.get()
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        self.inner.ready_state.set(state);
    }

    pub fn default_view(&self) -> Option<Window> {
        self.inner.default_view.borrow().upgrade().map(Window::from_inner)
    }

    /// Pre-standard name for the associated window, still exposed by some
    /// engines that lack `defaultView`.
    pub fn parent_view(&self) -> Option<Window> {
        self.inner.parent_view.borrow().upgrade().map(Window::from_inner)
    }

    pub fn set_default_view(&self, window: Option<&Window>) {
        *self.inner.default_view.borrow_mut() = window.map(Window::downgrade).unwrap_or_default();
    }

    pub fn set_parent_view(&self, window: Option<&Window>) {
        *self.inner.parent_view.borrow_mut() = window.map(Window::downgrade).unwrap_or_default();
    }

    /// The window of this document, preferring `defaultView`.
    pub fn window(&self) -> Option<Window> {
        self.default_view().or_else(|| self.parent_view())
    }

    pub fn frame_loading(&self) -> FrameLoading {
        self.inner.frame_loading.get()
    }

    pub fn set_frame_loading(&self, loading: FrameLoading) {
        self.inner.frame_loading.set(loading);
    }

    pub fn head(&self) -> Option<NodeRef> {
        self.first_match("head")
    }

    pub fn body(&self) -> Option<NodeRef> {
        self.first_match("body")
    }

    /// First element matching `selector` in document order.
    ///
    /// A selector that fails to parse matches nothing.
    pub fn query_selector(&self, selector: &str) -> Option<NodeRef> {
        match self.inner.tree.select(selector) {
            Ok(mut matches) => matches.next().map(|found| found.as_node().clone()),
            Err(()) => {
                warn!(target = "frame", %selector, "ignoring selector that failed to parse");
                None
            }
        }
    }

    pub fn serialize(&self) -> String {
        self.inner.tree.to_string()
    }

    fn first_match(&self, selector: &str) -> Option<NodeRef> {
        self.inner
            .tree
            .select_first(selector)
            .ok()
            .map(|found| found.as_node().clone())
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.inner.id)
            .field("url", &self.inner.url.as_str())
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srcdoc(html: &str) -> Document {
        Document::parse(html, Url::parse("about:srcdoc").unwrap())
    }

    #[test]
    fn new_documents_are_loading() {
        let document = srcdoc("<p>hi</p>");
        assert_eq!(document.ready_state(), ReadyState::Loading);
        assert_eq!(document.default_view(), None);
    }

    #[test]
    fn query_selector_returns_first_match() {
        let document = srcdoc(r#"<div class="a" id="one"></div><div class="a" id="two"></div>"#);
        let found = document.query_selector(".a").expect("match");
        assert_eq!(super::super::attribute(&found, "id").as_deref(), Some("one"));
        assert!(document.query_selector("#missing").is_none());
    }

    #[test]
    fn malformed_selector_matches_nothing() {
        let document = srcdoc("<div></div>");
        assert!(document.query_selector("div[").is_none());
    }

    #[test]
    fn parser_synthesizes_head_and_body() {
        let document = srcdoc("<p>bare</p>");
        assert!(document.head().is_some());
        assert!(document.body().is_some());
    }

    #[test]
    fn window_falls_back_to_legacy_accessor() {
        let document = srcdoc("");
        let window = Window::new("legacy");
        document.set_parent_view(Some(&window));
        assert_eq!(document.default_view(), None);
        assert_eq!(document.window(), Some(window));
    }
}
