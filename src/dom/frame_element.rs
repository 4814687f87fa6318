use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use kuchiki::NodeRef;
use tracing::{debug, error};
use url::Url;

use super::document::{Document, FrameLoading, ReadyState};
use super::window::Window;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

pub type LoadListener = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An `<iframe>` element living in a host document.
#[derive(Clone)]
pub struct FrameElement {
    inner: Rc<FrameElementInner>,
}

struct FrameElementInner {
    id: u64,
    owner: Document,
    node: NodeRef,
    content_window: RefCell<Option<Window>>,
    access_blocked: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, LoadListener)>>,
    next_listener: Cell<u64>,
}

impl FrameElement {
    pub fn new(owner: &Document) -> Self {
        Self {
            inner: Rc::new(FrameElementInner {
                id: NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
                owner: owner.clone(),
                node: super::create_element("iframe", []),
                content_window: RefCell::new(None),
                access_blocked: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The `<iframe>` node in the host tree.
    pub fn node(&self) -> &NodeRef {
        &self.inner.node
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        super::attribute(&self.inner.node, name)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if let Some(element) = self.inner.node.as_element() {
            element
                .attributes
                .borrow_mut()
                .insert(name, value.to_string());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(element) = self.inner.node.as_element() {
            element.attributes.borrow_mut().remove(name);
        }
    }

    pub fn srcdoc(&self) -> Option<String> {
        self.attribute("srcdoc")
    }

    pub fn is_connected(&self) -> bool {
        self.inner.node.parent().is_some()
    }

    /// Insert into `parent` and start loading the frame's source.
    pub fn connect(&self, parent: &NodeRef) {
        parent.append(self.inner.node.clone());
        self.reload();
    }

    /// Remove from the host tree, discarding the nested browsing context.
    pub fn disconnect(&self) {
        self.inner.node.detach();
        if let Some(window) = self.inner.content_window.borrow_mut().take() {
            window.discard();
        }
    }

    /// Begin a fresh navigation to the current `srcdoc`. Once parsed the new
    /// document is `interactive` until [`FrameElement::finish_load`] runs,
    /// unless the owner document loads frames immediately.
    pub fn reload(&self) {
        let (html, url) = match self.srcdoc() {
            Some(html) => (html, "about:srcdoc"),
            None => (String::new(), "about:blank"),
        };
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(err) => {
                error!(target = "frame", error = %err, "failed to build embedded document url");
                return;
            }
        };
        let document = Document::parse(&html, url);
        document.set_ready_state(ReadyState::Interactive);

        let window = {
            let mut slot = self.inner.content_window.borrow_mut();
            slot.get_or_insert_with(|| Window::new(format!("frame-{}", self.inner.id)))
                .clone()
        };
        window.navigate(document);
        debug!(target = "frame", frame = self.inner.id, "embedded document loading");

        if self.inner.owner.frame_loading() == FrameLoading::Immediate {
            self.finish_load();
        }
    }

    /// Mark the embedded document complete and fire `load`.
    pub fn finish_load(&self) {
        let Some(document) = self.context_document() else {
            return;
        };
        document.set_ready_state(ReadyState::Complete);

        let listeners: Vec<LoadListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        debug!(
            target = "frame",
            frame = self.inner.id,
            listeners = listeners.len(),
            "dispatching load"
        );
        for listener in listeners {
            listener();
        }
    }

    /// Simulate a cross-origin or sandbox policy that hides the nested
    /// document from the host.
    pub fn block_content_access(&self) {
        self.inner.access_blocked.set(true);
    }

    pub fn allow_content_access(&self) {
        self.inner.access_blocked.set(false);
    }

    pub fn content_window(&self) -> Option<Window> {
        if self.inner.access_blocked.get() {
            return None;
        }
        self.inner.content_window.borrow().clone()
    }

    pub fn content_document(&self) -> Option<Document> {
        self.content_window()?.document()
    }

    pub fn add_load_listener(&self, listener: LoadListener) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Returns whether a listener was removed. Unknown ids are ignored.
    pub fn remove_load_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn load_listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn context_document(&self) -> Option<Document> {
        self.inner.content_window.borrow().as_ref()?.document()
    }
}

impl PartialEq for FrameElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for FrameElement {}

impl fmt::Debug for FrameElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameElement")
            .field("id", &self.inner.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
