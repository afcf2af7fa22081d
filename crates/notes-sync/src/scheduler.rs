use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::AbortHandle;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Runs an effect after a delay unless it is cancelled first.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, effect: BoxFuture<'static, ()>) -> TaskHandle;
}

/// Handle to a scheduled effect.
///
/// Firing and cancelling race on a single flag: whichever wins, the other is
/// a no-op. A cancelled effect never starts; an effect that already started
/// runs to completion.
#[derive(Debug)]
pub struct TaskHandle {
    state: Arc<AtomicU8>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    /// Returns `true` if the effect had not fired yet.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            if let Some(abort) = &self.abort {
                abort.abort();
            }
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }
}

/// Claims the right to run. Called by a scheduler when the delay has elapsed.
fn try_fire(state: &AtomicU8) -> bool {
    state
        .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

/// Spawns each effect on the tokio runtime behind a `sleep`.
///
/// Under a paused clock (`tokio::time::pause`) delays elapse on virtual time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, effect: BoxFuture<'static, ()>) -> TaskHandle {
        let state = Arc::new(AtomicU8::new(PENDING));
        let task_state = state.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if try_fire(&task_state) {
                effect.await;
            }
        });
        TaskHandle {
            state,
            abort: Some(handle.abort_handle()),
        }
    }
}
