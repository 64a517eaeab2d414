// Stepper state machine for walking a discovery path
//
// The presentation layer subscribes to a watch channel and receives the
// current location whenever the step changes. Auto-play is a single spawned
// task holding the only timer; cancellation aborts that one handle, on
// explicit stop, on starting a new path, and on drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::Event;

pub const AUTO_PLAY_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperStatus {
    Idle,
    Active,
}

struct StepperState {
    path: Vec<Event>,
    step: usize,
    status: StepperStatus,
    auto_play: Option<JoinHandle<()>>,
}

struct Inner {
    state: RwLock<StepperState>,
    tx: watch::Sender<Option<Event>>,
}

pub struct DiscoveryStepper {
    inner: Arc<Inner>,
}

impl DiscoveryStepper {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(StepperState {
                    path: Vec::new(),
                    step: 0,
                    status: StepperStatus::Idle,
                    auto_play: None,
                }),
                tx,
            }),
        }
    }

    /// Receiver for the current location; holds `None` until a path starts.
    pub fn subscribe(&self) -> watch::Receiver<Option<Event>> {
        self.inner.tx.subscribe()
    }

    /// Starts walking a new path, discarding any previous path and pending
    /// auto-play timer. Returns false (and stays Idle) for an empty path.
    pub async fn start(&self, path: Vec<Event>) -> bool {
        let mut state = self.inner.state.write().await;
        if let Some(handle) = state.auto_play.take() {
            handle.abort();
        }

        if path.is_empty() {
            state.path.clear();
            state.step = 0;
            state.status = StepperStatus::Idle;
            self.inner.tx.send_replace(None);
            return false;
        }

        state.path = path;
        state.step = 0;
        state.status = StepperStatus::Active;
        self.inner.tx.send_replace(Some(state.path[0].clone()));
        true
    }

    /// Leaves the tour and returns to Idle, canceling any pending timer.
    pub async fn stop(&self) {
        let mut state = self.inner.state.write().await;
        if let Some(handle) = state.auto_play.take() {
            handle.abort();
        }
        state.path.clear();
        state.step = 0;
        state.status = StepperStatus::Idle;
        self.inner.tx.send_replace(None);
    }

    pub async fn status(&self) -> StepperStatus {
        self.inner.state.read().await.status
    }

    pub async fn step(&self) -> usize {
        self.inner.state.read().await.step
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.path.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.state.read().await.path.is_empty()
    }

    pub async fn current(&self) -> Option<Event> {
        let state = self.inner.state.read().await;
        if state.status != StepperStatus::Active {
            return None;
        }
        state.path.get(state.step).cloned()
    }

    pub async fn next(&self) -> usize {
        let mut state = self.inner.state.write().await;
        if state.status == StepperStatus::Active && state.step + 1 < state.path.len() {
            state.step += 1;
            self.inner.tx.send_replace(Some(state.path[state.step].clone()));
        }
        state.step
    }

    pub async fn back(&self) -> usize {
        let mut state = self.inner.state.write().await;
        if state.status == StepperStatus::Active && state.step > 0 {
            state.step -= 1;
            self.inner.tx.send_replace(Some(state.path[state.step].clone()));
        }
        state.step
    }

    pub async fn reset(&self) {
        let mut state = self.inner.state.write().await;
        if state.status == StepperStatus::Active {
            state.step = 0;
            self.inner.tx.send_replace(Some(state.path[0].clone()));
        }
    }

    pub async fn start_auto_play(&self) {
        self.start_auto_play_with_period(AUTO_PLAY_PERIOD).await;
    }

    /// Advances one step per `period` until the last step, then stops.
    /// Restarting replaces any previously scheduled timer.
    pub async fn start_auto_play_with_period(&self, period: Duration) {
        let mut state = self.inner.state.write().await;
        if state.status != StepperStatus::Active {
            return;
        }
        if let Some(handle) = state.auto_play.take() {
            handle.abort();
        }

        let inner = Arc::clone(&self.inner);
        state.auto_play = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                let mut state = inner.state.write().await;
                if state.status != StepperStatus::Active || state.step + 1 >= state.path.len() {
                    break;
                }
                state.step += 1;
                inner.tx.send_replace(Some(state.path[state.step].clone()));
                debug!("auto-play advanced to step {}", state.step);
                if state.step + 1 >= state.path.len() {
                    break;
                }
            }
        }));
    }

    /// Cancels the pending timer; a tick that has not fired yet never will.
    pub async fn stop_auto_play(&self) {
        let mut state = self.inner.state.write().await;
        if let Some(handle) = state.auto_play.take() {
            handle.abort();
        }
    }
}

impl Default for DiscoveryStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().auto_play.take() {
            handle.abort();
        }
    }
}
