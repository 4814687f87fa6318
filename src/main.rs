use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use frame_portal::dom::{self, Window};
use frame_portal::{
    el, text, ForwardedRef, Frame, FrameConfig, FrameContext, RenderQueue, VNode,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HOST_PAGE: &str =
    "<!DOCTYPE html><html><head><title>host</title></head><body><main></main></body></html>";

fn main() {
    let marker = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("Hello from inside the frame"));

    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    if let Err(err) = run(&marker) {
        eprintln!("frame-portal: {err:#}");
        std::process::exit(1);
    }
}

fn config_path() -> Option<PathBuf> {
    std::env::var("FRAME_PORTAL_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            ProjectDirs::from("", "", "frame-portal")
                .map(|dirs| dirs.config_dir().join("frame.yaml"))
        })
}

fn run(marker: &str) -> Result<()> {
    let config = FrameConfig::load(config_path()).context("failed to load frame config")?;

    let host = Window::host(HOST_PAGE, "https://host.invalid/").context("invalid host url")?;
    dom::install_host_window(&host);
    let document = host
        .document()
        .ok_or_else(|| anyhow!("host window has no document"))?;
    let parent = document
        .query_selector("main")
        .ok_or_else(|| anyhow!("host page has no <main>"))?;

    let children = VNode::Fragment(vec![
        el("p").attr("id", "marker").child(marker).into(),
        FrameContext::consumer(|env| {
            let url = env
                .document
                .as_ref()
                .map(|document| document.url().to_string())
                .unwrap_or_default();
            el("small").child(text(format!("rendered into {url}"))).into()
        }),
    ]);
    let props = config
        .props(children)
        .head(el("title").child("embedded"))
        .style("border: 0; width: 100%")
        .content_did_mount(|| info!("content mounted"))
        .content_did_update(|| info!("content updated"));

    let queue = RenderQueue::new();
    let frame = Frame::mount(&document, &parent, props, ForwardedRef::None, &queue)?;
    let element = frame
        .element()
        .ok_or_else(|| anyhow!("frame did not create its element"))?;

    element.finish_load();
    let ran = queue.run_pending();
    info!(tasks = ran, state = ?frame.state(), "frame settled");

    let embedded = element
        .content_document()
        .ok_or_else(|| anyhow!("embedded document is not reachable"))?;
    println!("{}", embedded.serialize());
    Ok(())
}
