mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{settle, Host};
use frame_portal::dom::FrameElement;
use frame_portal::{el, ForwardedRef, FrameProps, RefObject};

fn props() -> FrameProps {
    FrameProps::new(el("p").child("content"))
}

#[test]
fn object_ref_tracks_current_element() {
    let host = Host::new();
    let object = RefObject::new();
    let frame = host.mount_with_ref(props(), object.clone().into());

    let first = object.current().expect("assigned on mount");
    assert_eq!(Some(first.clone()), frame.element());

    frame.remount_element().expect("remount");
    let second = object.current().expect("reassigned");
    assert_ne!(first, second);
    assert_eq!(Some(second), frame.element());
    assert!(!first.is_connected());

    frame.unmount();
    assert!(object.current().is_none());
}

#[test]
fn callback_ref_sees_every_transition() {
    let host = Host::new();
    let log: Rc<RefCell<Vec<Option<FrameElement>>>> = Rc::default();
    let sink = Rc::clone(&log);
    let frame = host.mount_with_ref(
        props(),
        ForwardedRef::callback(move |node| sink.borrow_mut().push(node.cloned())),
    );
    let first = frame.element().expect("first");
    frame.remount_element().expect("remount");
    let second = frame.element().expect("second");
    frame.unmount();

    assert_eq!(
        *log.borrow(),
        vec![Some(first), None, Some(second), None]
    );
}

#[test]
fn remounted_element_loads_from_scratch() {
    let host = Host::new();
    let frame = host.mount(props());
    settle(&frame, &host);
    assert!(frame.is_loaded());

    frame.remount_element().expect("remount");
    assert!(!frame.is_loaded(), "readiness belongs to one element instance");

    settle(&frame, &host);
    assert!(frame.is_loaded());
    let document = frame
        .element()
        .and_then(|element| element.content_document())
        .expect("document");
    assert!(document.query_selector(".frame-content > p").is_some());
}

#[test]
fn callback_ref_receives_live_element() {
    let host = Host::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let frame = host.mount_with_ref(
        props(),
        ForwardedRef::callback(move |node| {
            if let Some(node) = node {
                node.set_attribute("data-seen", "yes");
                sink.borrow_mut().push(node.id());
            }
        }),
    );
    let element = frame.element().expect("element");
    assert_eq!(element.attribute("data-seen").as_deref(), Some("yes"));
    assert_eq!(*seen.borrow(), vec![element.id()]);
}
