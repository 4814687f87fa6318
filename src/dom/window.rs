use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use url::Url;

use super::document::{Document, ReadyState};

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// A browsing context. Equality is identity.
#[derive(Clone)]
pub struct Window {
    inner: Rc<WindowInner>,
}

pub(super) struct WindowInner {
    id: u64,
    name: String,
    document: RefCell<Option<Document>>,
}

impl Window {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(WindowInner {
                id: NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed),
                name: name.into(),
                document: RefCell::new(None),
            }),
        }
    }

    /// A top-level page that has already finished loading `html`.
    pub fn host(html: &str, url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url)?;
        let window = Self::new("host");
        let document = Document::parse(html, url);
        document.set_ready_state(ReadyState::Complete);
        window.navigate(document);
        Ok(window)
    }

    pub(super) fn from_inner(inner: Rc<WindowInner>) -> Self {
        Self { inner }
    }

    pub(super) fn downgrade(&self) -> Weak<WindowInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn document(&self) -> Option<Document> {
        self.inner.document.borrow().clone()
    }

    /// Replace the active document; the new one reports this window as its view.
    pub fn navigate(&self, document: Document) {
        document.set_default_view(Some(self));
        let previous = self.inner.document.borrow_mut().replace(document);
        if let Some(previous) = previous {
            previous.set_default_view(None);
        }
    }

    /// Drop the active document, as when a frame is removed from its parent.
    pub fn discard(&self) {
        if let Some(previous) = self.inner.document.borrow_mut().take() {
            previous.set_default_view(None);
        }
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Window {}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .finish()
    }
}
