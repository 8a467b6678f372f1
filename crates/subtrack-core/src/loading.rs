//! Loading-state display timing
//!
//! Screens that fetch data flash their skeleton placeholder when the fetch
//! finishes quickly. [`LoadingGate`] suppresses that flash: while loading it
//! renders blank until a minimum loading time has elapsed, and only then
//! switches to the skeleton. When loading ends the gate snaps to content
//! immediately, whatever state it was in.
//!
//! The gate is a pure presentation-timing state machine; it performs no I/O.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Skeleton threshold used when none is configured
pub const DEFAULT_MIN_LOADING_TIME: Duration = Duration::from_millis(300);

/// What the consumer should render right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Not loading: render the real content
    Content,
    /// Loading, threshold not yet reached: render nothing
    Blank,
    /// Loading long enough that the skeleton should show
    Skeleton,
}

/// State shared with the pending threshold timer
struct GateInner {
    loading: bool,
    show_skeleton: bool,
    /// Bumped on every loading transition; a timer firing for an older epoch
    /// is stale and must not mutate state
    epoch: u64,
}

/// Skeleton display controller
///
/// Each loading session owns exactly one threshold timer. The timer is
/// aborted when loading ends early and when the gate is dropped, so no
/// callback can fire after its consumer is gone.
pub struct LoadingGate {
    min_loading_time: Duration,
    inner: Arc<Mutex<GateInner>>,
    tx: Arc<watch::Sender<GateState>>,
    timer: Option<JoinHandle<()>>,
}

impl LoadingGate {
    /// Create a gate with a custom skeleton threshold
    pub fn new(min_loading_time: Duration) -> Self {
        let (tx, _rx) = watch::channel(GateState::Content);
        Self {
            min_loading_time,
            inner: Arc::new(Mutex::new(GateInner {
                loading: false,
                show_skeleton: false,
                epoch: 0,
            })),
            tx: Arc::new(tx),
            timer: None,
        }
    }

    /// Drive the gate from the consumer's loading flag
    ///
    /// Calls that repeat the current value are no-ops and do not restart the
    /// threshold timer.
    pub fn set_loading(&mut self, loading: bool) {
        if loading {
            self.begin_loading();
        } else {
            self.finish_loading();
        }
    }

    /// What the consumer should render
    pub fn state(&self) -> GateState {
        let inner = Self::lock(&self.inner);
        if !inner.loading {
            GateState::Content
        } else if inner.show_skeleton {
            GateState::Skeleton
        } else {
            GateState::Blank
        }
    }

    /// Whether a loading session is in progress
    pub fn is_loading(&self) -> bool {
        Self::lock(&self.inner).loading
    }

    /// Subscribe to render-state changes
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.tx.subscribe()
    }

    fn begin_loading(&mut self) {
        let epoch = {
            let mut inner = Self::lock(&self.inner);
            if inner.loading {
                return;
            }
            inner.loading = true;
            inner.show_skeleton = false;
            inner.epoch += 1;
            inner.epoch
        };
        self.tx.send_replace(GateState::Blank);

        self.cancel_timer();
        let inner = self.inner.clone();
        let tx = self.tx.clone();
        let delay = self.min_loading_time;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut inner = Self::lock(&inner);
            if inner.epoch == epoch && inner.loading && !inner.show_skeleton {
                inner.show_skeleton = true;
                drop(inner);
                debug!("Loading exceeded threshold, showing skeleton");
                tx.send_replace(GateState::Skeleton);
            }
        }));
    }

    fn finish_loading(&mut self) {
        {
            let mut inner = Self::lock(&self.inner);
            if !inner.loading {
                return;
            }
            inner.loading = false;
            inner.show_skeleton = false;
            inner.epoch += 1;
        }
        self.cancel_timer();
        self.tx.send_replace(GateState::Content);
    }

    /// Abort the pending threshold timer, if any
    ///
    /// Aborting an already-finished timer is a no-op.
    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    fn lock(inner: &Arc<Mutex<GateInner>>) -> MutexGuard<'_, GateInner> {
        inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoadingGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LOADING_TIME)
    }
}

impl Drop for LoadingGate {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
