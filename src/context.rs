//! Ambient `(document, window)` binding for content rendered inside a frame.
//!
//! Values are provided for the extent of a render call and resolved by the
//! nearest enclosing provider. Reads outside any provider see the host page,
//! captured the first time the channel is read on a thread.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use crate::dom::{self, Document, Window};
use crate::vdom::VNode;

/// The browsing context that content is rendered into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameEnvironment {
    pub document: Option<Document>,
    pub window: Option<Window>,
}

impl FrameEnvironment {
    pub fn new(document: Document, window: Option<Window>) -> Self {
        Self {
            document: Some(document),
            window,
        }
    }

    /// Environment of the page this thread runs in; empty in non-browser
    /// execution.
    fn from_host() -> Self {
        match dom::host_window() {
            Some(window) => Self {
                document: window.document(),
                window: Some(window),
            },
            None => Self::default(),
        }
    }
}

thread_local! {
    static DEFAULT_ENVIRONMENT: OnceCell<FrameEnvironment> = const { OnceCell::new() };
    static PROVIDED: RefCell<Vec<FrameEnvironment>> = const { RefCell::new(Vec::new()) };
}

pub struct FrameContext;

impl FrameContext {
    /// Run `f` with `value` visible to every [`use_frame`] call it makes.
    pub fn provide<R>(value: FrameEnvironment, f: impl FnOnce() -> R) -> R {
        PROVIDED.with(|stack| stack.borrow_mut().push(value));
        struct Guard;
        impl Drop for Guard {
            fn drop(&mut self) {
                PROVIDED.with(|stack| {
                    stack.borrow_mut().pop();
                });
            }
        }
        let _guard = Guard;
        f()
    }

    pub fn default_value() -> FrameEnvironment {
        DEFAULT_ENVIRONMENT.with(|default| default.get_or_init(FrameEnvironment::from_host).clone())
    }

    #[cfg(test)]
    pub(crate) fn depth() -> usize {
        PROVIDED.with(|stack| stack.borrow().len())
    }

    /// Subscriber form of [`use_frame`]: `render` receives the environment in
    /// effect where the returned node is rendered.
    pub fn consumer(render: impl Fn(&FrameEnvironment) -> VNode + 'static) -> VNode {
        VNode::Consumer(Rc::new(render))
    }
}

/// The nearest provided environment, or the host page's.
pub fn use_frame() -> FrameEnvironment {
    PROVIDED
        .with(|stack| stack.borrow().last().cloned())
        .unwrap_or_else(FrameContext::default_value)
}
