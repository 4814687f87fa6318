use std::fmt;
use std::rc::Rc;

use crate::error::FrameError;
use crate::vdom::VNode;

pub type Callback = Rc<dyn Fn()>;

pub fn noop() -> Callback {
    Rc::new(|| {})
}

/// Which lifecycle notification a commit produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLifecycle {
    Mounted,
    Updated,
}

#[derive(Clone)]
pub struct ContentProps {
    pub children: Vec<VNode>,
    pub content_did_mount: Callback,
    pub content_did_update: Callback,
}

impl ContentProps {
    pub fn new(children: Vec<VNode>, content_did_mount: Callback, content_did_update: Callback) -> Self {
        Self {
            children,
            content_did_mount,
            content_did_update,
        }
    }

    pub fn notify(&self, lifecycle: ContentLifecycle) {
        match lifecycle {
            ContentLifecycle::Mounted => (self.content_did_mount)(),
            ContentLifecycle::Updated => (self.content_did_update)(),
        }
    }
}

impl fmt::Debug for ContentProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentProps")
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Pass-through wrapper that turns its own commits into mount/update
/// callbacks.
#[derive(Debug, Default)]
pub struct Content {
    has_mounted: bool,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single child, unchanged.
    pub fn render(&self, props: &ContentProps) -> Result<VNode, FrameError> {
        match props.children.as_slice() {
            [only] => Ok(only.clone()),
            children => Err(FrameError::ChildrenOnly {
                count: children.len(),
            }),
        }
    }

    /// Record that the rendered child reached the document.
    pub fn commit(&mut self) -> ContentLifecycle {
        if std::mem::replace(&mut self.has_mounted, true) {
            ContentLifecycle::Updated
        } else {
            ContentLifecycle::Mounted
        }
    }

    /// Forget a previous mount; the next commit reports `Mounted` again.
    pub fn reset(&mut self) {
        self.has_mounted = false;
    }

    pub fn has_mounted(&self) -> bool {
        self.has_mounted
    }
}
