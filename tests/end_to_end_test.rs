mod common;

use common::{Counter, Host};
use frame_portal::{el, FrameProps, FrameState};

#[test]
fn marker_appears_in_frame_root_after_load() {
    let host = Host::new();
    let recorder = Counter::new();
    let frame = host.mount(
        FrameProps::new(el("div").attr("id", "e2e-marker").child("embedded"))
            .content_did_mount(recorder.hook()),
    );
    let element = frame.element().expect("frame element");

    assert!(
        host.document.query_selector("iframe").is_some(),
        "the frame element lives in the host document"
    );
    assert!(host.document.query_selector("#e2e-marker").is_none());

    element.finish_load();
    host.queue.run_pending();

    let document = element.content_document().expect("embedded document");
    let marker = document
        .query_selector(".frame-root #e2e-marker")
        .expect("marker projected into .frame-root");
    assert_eq!(marker.text_contents(), "embedded");
    assert!(
        host.document.query_selector("#e2e-marker").is_none(),
        "content is projected into the embedded document, not under the iframe"
    );
    assert_eq!(recorder.get(), 1);
    assert_eq!(frame.state(), FrameState::Loaded);

    let html = document.serialize();
    assert!(html.contains(r#"<div class="frame-root"><div class="frame-content"><div id="e2e-marker">embedded</div></div></div>"#));
}
