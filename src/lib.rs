// Render host content inside an embedded `<iframe>` document while keeping it
// part of the host's component tree.

pub mod config;
pub mod content;
pub mod context;
pub mod dom;
pub mod error;
pub mod frame;
pub mod portal;
pub mod scheduler;
pub mod vdom;

pub use config::FrameConfig;
pub use content::{Callback, Content, ContentLifecycle, ContentProps};
pub use context::{use_frame, FrameContext, FrameEnvironment};
pub use error::{ConfigError, FrameError};
pub use frame::{
    ForwardedRef, Frame, FrameProps, FrameState, RefObject, DEFAULT_INITIAL_CONTENT,
};
pub use portal::Portal;
pub use scheduler::RenderQueue;
pub use vdom::{el, text, Element, VNode};
