#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use frame_portal::dom::{Document, FrameLoading, Window};
use frame_portal::{ForwardedRef, Frame, FrameProps, RenderQueue};
use kuchiki::NodeRef;

pub const HOST_PAGE: &str =
    "<!DOCTYPE html><html><head></head><body><div id=\"app\"></div></body></html>";

pub struct Host {
    pub window: Window,
    pub document: Document,
    pub parent: NodeRef,
    pub queue: RenderQueue,
}

impl Host {
    pub fn new() -> Self {
        let window = Window::host(HOST_PAGE, "https://host.test/").expect("host window");
        let document = window.document().expect("host document");
        let parent = document.query_selector("#app").expect("app container");
        Self {
            window,
            document,
            parent,
            queue: RenderQueue::new(),
        }
    }

    pub fn immediate() -> Self {
        let host = Self::new();
        host.document.set_frame_loading(FrameLoading::Immediate);
        host
    }

    pub fn mount(&self, props: FrameProps) -> Frame {
        self.mount_with_ref(props, ForwardedRef::None)
    }

    pub fn mount_with_ref(&self, props: FrameProps, forwarded_ref: ForwardedRef) -> Frame {
        Frame::mount(&self.document, &self.parent, props, forwarded_ref, &self.queue)
            .expect("mount frame")
    }
}

#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }

    pub fn hook(&self) -> impl Fn() + 'static {
        let cell = Rc::clone(&self.0);
        move || cell.set(cell.get() + 1)
    }
}

/// Load the frame's document and let the queued render run.
pub fn settle(frame: &Frame, host: &Host) {
    frame.element().expect("frame element").finish_load();
    host.queue.run_pending();
}

pub fn embedded(frame: &Frame) -> Document {
    frame
        .element()
        .expect("frame element")
        .content_document()
        .expect("embedded document")
}
