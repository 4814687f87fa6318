//! The `<iframe>` controller: owns the frame element, tracks whether its
//! document is ready, and projects head and body content into it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use kuchiki::iter::NodeIterator;
use kuchiki::NodeRef;
use tracing::{debug, error, trace};

use crate::content::{noop, Callback, Content, ContentLifecycle, ContentProps};
use crate::context::FrameEnvironment;
use crate::dom::{Document, FrameElement, ListenerId, LoadListener, ReadyState};
use crate::error::FrameError;
use crate::portal::Portal;
use crate::scheduler::RenderQueue;
use crate::vdom::{el, VNode};

pub const DEFAULT_INITIAL_CONTENT: &str =
    r#"<!DOCTYPE html><html><head></head><body><div class="frame-root"></div></body></html>"#;

const CONTROLLED_ATTRIBUTES: &[&str] = &["srcdoc"];

#[derive(Clone)]
pub struct FrameProps {
    /// Projected into the embedded `<head>`.
    pub head: Option<VNode>,
    /// Written to `srcdoc`; defaults to [`DEFAULT_INITIAL_CONTENT`].
    pub initial_content: Option<String>,
    /// Selector for the node receiving `children`; defaults to the first
    /// element child of the embedded `<body>`.
    pub mount_target: Option<String>,
    pub content_did_mount: Option<Callback>,
    pub content_did_update: Option<Callback>,
    /// Passed through to the `<iframe>` element.
    pub attributes: Vec<(String, String)>,
    pub children: VNode,
}

impl FrameProps {
    pub fn new(children: impl Into<VNode>) -> Self {
        Self {
            head: None,
            initial_content: None,
            mount_target: None,
            content_did_mount: None,
            content_did_update: None,
            attributes: Vec::new(),
            children: children.into(),
        }
    }

    pub fn head(mut self, head: impl Into<VNode>) -> Self {
        self.head = Some(head.into());
        self
    }

    pub fn initial_content(mut self, html: impl Into<String>) -> Self {
        self.initial_content = Some(html.into());
        self
    }

    pub fn mount_target(mut self, selector: impl Into<String>) -> Self {
        self.mount_target = Some(selector.into());
        self
    }

    pub fn content_did_mount(mut self, callback: impl Fn() + 'static) -> Self {
        self.content_did_mount = Some(Rc::new(callback));
        self
    }

    pub fn content_did_update(mut self, callback: impl Fn() + 'static) -> Self {
        self.content_did_update = Some(Rc::new(callback));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn style(self, style: impl Into<String>) -> Self {
        self.attr("style", style)
    }

    pub fn children(mut self, children: impl Into<VNode>) -> Self {
        self.children = children.into();
        self
    }

    fn source(&self) -> &str {
        self.initial_content
            .as_deref()
            .unwrap_or(DEFAULT_INITIAL_CONTENT)
    }
}

impl fmt::Debug for FrameProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameProps")
            .field("head", &self.head)
            .field("initial_content", &self.initial_content)
            .field("mount_target", &self.mount_target)
            .field("attributes", &self.attributes)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Box-style holder of the frame element, read through [`RefObject::current`].
#[derive(Debug, Clone, Default)]
pub struct RefObject {
    current: Rc<RefCell<Option<FrameElement>>>,
}

impl RefObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<FrameElement> {
        self.current.borrow().clone()
    }

    pub fn set_current(&self, node: Option<FrameElement>) {
        *self.current.borrow_mut() = node;
    }
}

/// The host's handle on the frame element.
#[derive(Clone, Default)]
pub enum ForwardedRef {
    #[default]
    None,
    Callback(Rc<dyn Fn(Option<&FrameElement>)>),
    Object(RefObject),
}

impl ForwardedRef {
    pub fn callback(callback: impl Fn(Option<&FrameElement>) + 'static) -> Self {
        Self::Callback(Rc::new(callback))
    }

    fn assign(&self, node: Option<&FrameElement>) {
        match self {
            Self::None => {}
            Self::Callback(callback) => callback(node),
            Self::Object(object) => object.set_current(node.cloned()),
        }
    }
}

impl From<RefObject> for ForwardedRef {
    fn from(object: RefObject) -> Self {
        Self::Object(object)
    }
}

impl fmt::Debug for ForwardedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Object(object) => f.debug_tuple("Object").field(object).finish(),
        }
    }
}

/// Observable lifecycle of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Unmounted,
    NotLoaded,
    Loaded,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unmounted,
    Mounted,
    TornDown,
}

/// A mounted frame component.
///
/// Dropping the handle tears the frame down.
pub struct Frame {
    shared: Rc<FrameShared>,
}

struct FrameShared {
    phase: Cell<Phase>,
    loaded: Cell<bool>,
    queue: RenderQueue,
    inner: RefCell<FrameInner>,
}

struct FrameInner {
    owner: Document,
    parent: NodeRef,
    props: FrameProps,
    forwarded_ref: ForwardedRef,
    node: Option<FrameElement>,
    listener: Option<ListenerId>,
    applied_attributes: Vec<String>,
    relay: Content,
    head_portal: Portal,
    body_portal: Portal,
}

/// Work deferred until the controller's state is no longer borrowed, so
/// host callbacks may call back into the frame.
#[derive(Default)]
struct Effects {
    forwarded_ref: ForwardedRef,
    refs: Vec<Option<FrameElement>>,
    content: Option<(ContentProps, ContentLifecycle)>,
}

impl Effects {
    fn fire(self) {
        for node in &self.refs {
            self.forwarded_ref.assign(node.as_ref());
        }
        if let Some((props, lifecycle)) = self.content {
            props.notify(lifecycle);
        }
    }
}

impl Frame {
    /// Render a frame element into `parent` (a node of `owner`) and start
    /// watching it for readiness.
    pub fn mount(
        owner: &Document,
        parent: &NodeRef,
        props: FrameProps,
        forwarded_ref: ForwardedRef,
        queue: &RenderQueue,
    ) -> Result<Self, FrameError> {
        let shared = Rc::new(FrameShared {
            phase: Cell::new(Phase::Unmounted),
            loaded: Cell::new(false),
            queue: queue.clone(),
            inner: RefCell::new(FrameInner {
                owner: owner.clone(),
                parent: parent.clone(),
                props,
                forwarded_ref,
                node: None,
                listener: None,
                applied_attributes: Vec::new(),
                relay: Content::new(),
                head_portal: Portal::new(),
                body_portal: Portal::new(),
            }),
        });

        shared.render()?;
        shared.phase.set(Phase::Mounted);
        debug!(target = "frame", "frame mounted");
        shared.observe_readiness();
        Ok(Self { shared })
    }

    /// Re-render with new props.
    pub fn update(&self, props: FrameProps) -> Result<(), FrameError> {
        self.ensure_mounted()?;
        self.shared.inner.borrow_mut().props = props;
        self.shared.render()
    }

    /// Re-render with the current props.
    pub fn render(&self) -> Result<(), FrameError> {
        self.ensure_mounted()?;
        self.shared.render()
    }

    /// Replace the frame element with a new instance. The forwarded ref sees
    /// the old element released before the new one is assigned, and the new
    /// element starts out not loaded.
    pub fn remount_element(&self) -> Result<(), FrameError> {
        self.ensure_mounted()?;
        let mut effects = Effects::default();
        {
            let mut inner = self.shared.inner.borrow_mut();
            effects.forwarded_ref = inner.forwarded_ref.clone();
            inner.release_element(&mut effects);
        }
        self.shared.loaded.set(false);
        effects.fire();
        debug!(target = "frame", "frame element replaced");

        self.shared.render()?;
        self.shared.observe_readiness();
        Ok(())
    }

    /// Remove the frame from the host tree. Later calls are no-ops, and any
    /// render already queued for this frame is skipped.
    pub fn unmount(&self) {
        if self.shared.phase.replace(Phase::TornDown) == Phase::TornDown {
            return;
        }
        let mut effects = Effects::default();
        {
            let mut inner = self.shared.inner.borrow_mut();
            effects.forwarded_ref = inner.forwarded_ref.clone();
            inner.release_element(&mut effects);
        }
        effects.fire();
        debug!(target = "frame", "frame torn down");
    }

    pub fn state(&self) -> FrameState {
        match self.shared.phase.get() {
            Phase::Unmounted => FrameState::Unmounted,
            Phase::TornDown => FrameState::TornDown,
            Phase::Mounted if self.shared.loaded.get() => FrameState::Loaded,
            Phase::Mounted => FrameState::NotLoaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.shared.loaded.get()
    }

    pub fn element(&self) -> Option<FrameElement> {
        self.shared.inner.borrow().node.clone()
    }

    /// Environment handed to projected content, once the frame is loaded and
    /// its document reachable.
    pub fn environment(&self) -> Option<FrameEnvironment> {
        if self.state() != FrameState::Loaded {
            return None;
        }
        let document = self.element()?.content_document()?;
        Some(environment_for(document))
    }

    /// Where body content goes right now, resolved against the live document.
    pub fn mount_target(&self) -> Option<NodeRef> {
        let inner = self.shared.inner.borrow();
        let document = inner.node.as_ref()?.content_document()?;
        inner.resolve_mount_target(&document)
    }

    fn ensure_mounted(&self) -> Result<(), FrameError> {
        match self.shared.phase.get() {
            Phase::TornDown => Err(FrameError::NotMounted),
            _ => Ok(()),
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("state", &self.state())
            .field("element", &self.element())
            .finish()
    }
}

impl FrameShared {
    fn is_active(&self) -> bool {
        self.phase.get() == Phase::Mounted
    }

    fn render(&self) -> Result<(), FrameError> {
        let mut effects = Effects::default();
        let result = {
            let mut inner = self.inner.borrow_mut();
            effects.forwarded_ref = inner.forwarded_ref.clone();
            inner.render(self, &mut effects)
        };
        effects.fire();
        result
    }

    /// Mount-time half of readiness: catch documents that finished before we
    /// could listen, then listen for the ones that have not.
    fn observe_readiness(self: &Rc<Self>) {
        let Some(element) = self.inner.borrow().node.clone() else {
            return;
        };

        let complete = element
            .content_document()
            .is_some_and(|document| document.ready_state() == ReadyState::Complete);
        if complete {
            trace!(target = "frame", frame = element.id(), "embedded document already complete");
            self.mark_loaded();
        }

        let id = element.add_load_listener(self.load_listener());
        self.inner.borrow_mut().listener = Some(id);
    }

    fn load_listener(self: &Rc<Self>) -> LoadListener {
        let shared = Rc::downgrade(self);
        Rc::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.mark_loaded();
            }
        })
    }

    fn mark_loaded(self: &Rc<Self>) {
        if self.loaded.replace(true) {
            return;
        }
        debug!(target = "frame", "frame loaded");
        let shared: Weak<Self> = Rc::downgrade(self);
        self.queue.schedule(move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            if !shared.is_active() {
                trace!(target = "frame", "skipping render queued before teardown");
                return;
            }
            if let Err(err) = shared.render() {
                error!(target = "frame", error = %err, "scheduled frame render failed");
            }
        });
    }
}

impl FrameInner {
    fn render(&mut self, shared: &FrameShared, effects: &mut Effects) -> Result<(), FrameError> {
        let element = match &self.node {
            Some(element) => element.clone(),
            None => self.create_element(effects),
        };
        self.apply_attributes(&element);
        self.sync_source(&element, shared);

        if shared.loaded.get() && shared.is_active() {
            self.render_frame_contents(&element, effects)
        } else {
            Ok(())
        }
    }

    fn create_element(&mut self, effects: &mut Effects) -> FrameElement {
        let element = FrameElement::new(&self.owner);
        self.apply_attributes(&element);
        element.set_attribute("srcdoc", self.props.source());
        element.connect(&self.parent);
        trace!(target = "frame", frame = element.id(), "frame element created");
        self.node = Some(element.clone());
        effects.refs.push(Some(element.clone()));
        element
    }

    fn apply_attributes(&mut self, element: &FrameElement) {
        let wanted: Vec<&(String, String)> = self
            .props
            .attributes
            .iter()
            .filter(|(name, _)| !CONTROLLED_ATTRIBUTES.contains(&name.as_str()))
            .collect();

        for stale in &self.applied_attributes {
            if !wanted.iter().any(|(name, _)| name == stale) {
                element.remove_attribute(stale);
            }
        }
        for (name, value) in &wanted {
            element.set_attribute(name, value);
        }
        self.applied_attributes = wanted.into_iter().map(|(name, _)| name.clone()).collect();
    }

    /// A changed `initial_content` reloads the frame, so readiness starts over
    /// and nothing is projected into the discarded document.
    fn sync_source(&mut self, element: &FrameElement, shared: &FrameShared) {
        let source = self.props.source();
        if element.srcdoc().as_deref() == Some(source) {
            return;
        }
        element.set_attribute("srcdoc", source);
        shared.loaded.set(false);
        self.clear_projections();
        debug!(target = "frame", frame = element.id(), "initial content changed; reloading");
        element.reload();
    }

    fn render_frame_contents(
        &mut self,
        element: &FrameElement,
        effects: &mut Effects,
    ) -> Result<(), FrameError> {
        let Some(document) = element.content_document() else {
            trace!(target = "frame", frame = element.id(), "embedded document unreachable");
            self.clear_projections();
            return Ok(());
        };

        let body = VNode::provider(
            environment_for(document.clone()),
            el("div")
                .attr("class", "frame-content")
                .child(self.props.children.clone()),
        );
        let content_props = ContentProps::new(
            vec![body],
            self.props.content_did_mount.clone().unwrap_or_else(noop),
            self.props.content_did_update.clone().unwrap_or_else(noop),
        );
        let projected = self.relay.render(&content_props)?;

        let Some(target) = self.resolve_mount_target(&document) else {
            trace!(target = "frame", frame = element.id(), "no mount target; skipping projection");
            self.clear_projections();
            return Ok(());
        };

        match (&self.props.head, document.head()) {
            (Some(head), Some(container)) => self.head_portal.render(head, &container),
            _ => self.head_portal.unmount(),
        }
        self.body_portal.render(&projected, &target);
        effects.content = Some((content_props, self.relay.commit()));
        Ok(())
    }

    fn resolve_mount_target(&self, document: &Document) -> Option<NodeRef> {
        match &self.props.mount_target {
            Some(selector) => document.query_selector(selector),
            None => document
                .body()?
                .children()
                .elements()
                .next()
                .map(|element| element.as_node().clone()),
        }
    }

    fn clear_projections(&mut self) {
        self.head_portal.unmount();
        self.body_portal.unmount();
        self.relay.reset();
    }

    fn release_element(&mut self, effects: &mut Effects) {
        self.clear_projections();
        let Some(element) = self.node.take() else {
            return;
        };
        if let Some(id) = self.listener.take() {
            element.remove_load_listener(id);
        }
        element.disconnect();
        self.applied_attributes.clear();
        effects.refs.push(None);
    }
}

fn environment_for(document: Document) -> FrameEnvironment {
    let window = document.window();
    FrameEnvironment::new(document, window)
}
