use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::trace;

pub type RenderTask = Box<dyn FnOnce()>;

/// Deferred re-render queue shared by everything mounted in one host tree.
///
/// Tasks run in the order they were scheduled, on the thread that calls
/// [`RenderQueue::run_pending`].
#[derive(Clone)]
pub struct RenderQueue {
    inner: Rc<QueueInner>,
}

struct QueueInner {
    tx: UnboundedSender<RenderTask>,
    rx: RefCell<UnboundedReceiver<RenderTask>>,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            inner: Rc::new(QueueInner {
                tx,
                rx: RefCell::new(rx),
            }),
        }
    }

    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        // The receiver lives as long as the sender, so this cannot fail.
        let _ = self.inner.tx.send(Box::new(task));
    }

    pub fn is_empty(&self) -> bool {
        self.inner.rx.borrow().is_empty()
    }

    /// Run queued tasks until none remain, including tasks scheduled by the
    /// tasks themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.rx.borrow_mut().try_recv().ok();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        if ran > 0 {
            trace!(target = "frame", tasks = ran, "drained render queue");
        }
        ran
    }
}
