//! Trigger channel and the hourly tick source feeding it

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};
use std::time::Duration;

use thiserror::Error;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why the scheduler is being woken up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Generate now, whatever the hour.
    ManualForce,
    /// Hourly wake-up; generates only at the configured hour.
    PeriodicTick,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Trigger queue is full")]
    Full,

    #[error("Trigger channel is closed")]
    Closed,

    #[error("Scheduler is not listening")]
    Disconnected,
}

/// Producer side of the trigger queue.
///
/// Every producer goes through [`TriggerChannel::send`], which never waits for
/// capacity. The only sender lives behind a mutex so [`TriggerChannel::close`]
/// cannot interleave with a send: once it returns, every later send is
/// rejected with [`TriggerError::Closed`].
#[derive(Debug)]
pub struct TriggerChannel {
    tx: Mutex<Option<mpsc::Sender<Trigger>>>,
    rejected_after_close: AtomicUsize,
}

impl TriggerChannel {
    #[must_use]
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<Trigger>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let channel = Self {
            tx: Mutex::new(Some(tx)),
            rejected_after_close: AtomicUsize::new(0),
        };
        (Arc::new(channel), rx)
    }

    pub fn send(&self, trigger: Trigger) -> Result<(), TriggerError> {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = guard.as_ref() else {
            self.rejected_after_close.fetch_add(1, Ordering::Relaxed);
            return Err(TriggerError::Closed);
        };

        tx.try_send(trigger).map_err(|e| match e {
            TrySendError::Full(_) => TriggerError::Full,
            TrySendError::Closed(_) => TriggerError::Disconnected,
        })
    }

    /// Drops the sender so the scheduler drains what is buffered and exits.
    /// Returns `false` if the channel was already closed.
    pub fn close(&self) -> bool {
        let closed = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if closed {
            info!("Trigger channel closed");
        }
        closed
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Number of sends attempted after [`TriggerChannel::close`].
    #[must_use]
    pub fn rejected_after_close(&self) -> usize {
        self.rejected_after_close.load(Ordering::Relaxed)
    }
}

/// Posts a [`Trigger::PeriodicTick`] every `period`, first one a full period
/// after start.
#[derive(Debug)]
pub struct TickSource {
    token: CancellationToken,
    handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl TickSource {
    #[must_use]
    pub fn spawn(period: Duration, channel: Arc<TriggerChannel>) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    _ = ticker.tick() => match channel.send(Trigger::PeriodicTick) {
                        Ok(()) => debug!("Posted periodic tick"),
                        Err(TriggerError::Full) => {
                            info!("Trigger queue busy, periodic tick dropped; scheduled check skipped");
                        }
                        Err(e) => {
                            warn!("Tick source stopping: {e}");
                            break;
                        }
                    },
                }
            }
        });

        Self {
            token,
            handle: tokio::sync::Mutex::new(Some(handle)),
        }
    }

    /// Stops the ticker and waits for its task to exit. Safe to call more
    /// than once; every call returns only after the task is gone.
    pub async fn stop(&self) {
        self.token.cancel();

        let mut handle = self.handle.lock().await;
        if let Some(h) = handle.take() {
            if let Err(e) = h.await {
                warn!("Tick source task ended abnormally: {e}");
            }
            info!("Tick source stopped");
        }
    }

    #[cfg(test)]
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}
