//! Minimal browsing-context model the frame controller talks to.
//!
//! Trees are `kuchiki` nodes. A [`Window`] owns the current [`Document`] of a
//! browsing context, and a [`FrameElement`] is the `<iframe>` node in a host
//! document that hosts a nested context.

mod document;
mod frame_element;
mod window;

use std::cell::RefCell;

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::{Attribute, ExpandedName, NodeRef};

pub use document::{Document, FrameLoading, ReadyState};
pub use frame_element::{FrameElement, ListenerId, LoadListener};
pub use window::Window;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

thread_local! {
    static HOST_WINDOW: RefCell<Option<Window>> = const { RefCell::new(None) };
}

/// Register the host page's window for the current thread.
pub fn install_host_window(window: &Window) {
    HOST_WINDOW.with(|slot| *slot.borrow_mut() = Some(window.clone()));
}

/// The host page's window, if this thread runs inside one.
pub fn host_window() -> Option<Window> {
    HOST_WINDOW.with(|slot| slot.borrow().clone())
}

/// Create a detached HTML element with the given attributes.
pub fn create_element<'a, I>(tag: &str, attributes: I) -> NodeRef
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let name = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag));
    let attributes = attributes.into_iter().map(|(name, value)| {
        (
            ExpandedName::new(Namespace::from(""), LocalName::from(name)),
            Attribute {
                prefix: None,
                value: value.to_string(),
            },
        )
    });
    NodeRef::new_element(name, attributes)
}

/// Read an attribute off an element node. Non-elements have none.
pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    attributes.get(name).map(str::to_string)
}

/// Serialize the children of `node` as HTML.
pub fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}
