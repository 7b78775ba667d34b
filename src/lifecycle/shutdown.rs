//! Ordered, deadline-bounded teardown.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info};

use crate::{
    lifecycle::server::ServerHandle,
    services::{
        inbox::{EmailInbox, InboxError},
        radar_items::{RadarItemsError, RadarItemsService},
        triggers::{TickSource, TriggerChannel},
    },
};

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("{0}")]
    Failed(String),
}

/// A stateful component torn down during shutdown.
pub trait Subsystem: Send + Sync {
    fn name(&self) -> &'static str;

    /// Releases the component, giving up at `deadline`.
    fn shutdown(&self, deadline: Instant) -> impl Future<Output = Result<(), ShutdownError>> + Send;
}

impl Subsystem for RadarItemsService {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn shutdown(&self, deadline: Instant) -> Result<(), ShutdownError> {
        info!("Closing database connection...");
        Self::shutdown(self, deadline).await.map_err(|e| match e {
            RadarItemsError::ShutdownTimedOut => ShutdownError::DeadlineExceeded,
            e => ShutdownError::Failed(e.to_string()),
        })
    }
}

impl Subsystem for EmailInbox {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn shutdown(&self, deadline: Instant) -> Result<(), ShutdownError> {
        info!("Stopping email handler...");
        Self::shutdown(self, deadline).await.map_err(|e| match e {
            InboxError::ShutdownTimedOut => ShutdownError::DeadlineExceeded,
            e => ShutdownError::Failed(e.to_string()),
        })
    }
}

impl Subsystem for ServerHandle {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn shutdown(&self, deadline: Instant) -> Result<(), ShutdownError> {
        info!("Telling server to shutdown...");
        if self.stop(deadline).await {
            Ok(())
        } else {
            Err(ShutdownError::DeadlineExceeded)
        }
    }
}

/// Result of one teardown step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Failed(String),
    DeadlineExceeded,
}

#[derive(Clone, Debug, Default)]
pub struct ShutdownReport {
    pub steps: Vec<(&'static str, StepOutcome)>,
}

impl ShutdownReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|(_, o)| *o == StepOutcome::Completed)
    }

    #[cfg(test)]
    pub fn outcome(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|(n, _)| *n == name).map(|(_, o)| o)
    }
}

/// Components torn down by [`ShutdownSequence::run`], in teardown order.
pub struct ShutdownSequence<'a, D, E, H> {
    pub ticks: &'a TickSource,
    pub triggers: &'a TriggerChannel,
    pub data: &'a D,
    pub email: &'a E,
    pub http: &'a H,
}

impl<D, E, H> ShutdownSequence<'_, D, E, H>
where
    D: Subsystem,
    E: Subsystem,
    H: Subsystem,
{
    /// Runs the teardown once, sharing a single `budget` across every step.
    ///
    /// The tick source is stopped before the trigger channel closes, so no
    /// tick can race the close. The HTTP server is stopped last; requests
    /// still in flight at that point may hit an already closed database or
    /// inbox.
    pub async fn run(self, budget: Duration) -> ShutdownReport {
        let mut report = ShutdownReport::default();

        self.ticks.stop().await;
        report.steps.push(("ticker", StepOutcome::Completed));

        self.triggers.close();
        report.steps.push(("triggers", StepOutcome::Completed));

        let deadline = Instant::now() + budget;

        report.steps.push(run_step(self.data, deadline).await);
        report.steps.push(run_step(self.email, deadline).await);
        report.steps.push(run_step(self.http, deadline).await);

        if report.is_clean() {
            info!("Done with graceful shutdown.");
        } else {
            error!("Shutdown finished with errors: {:?}", report.steps);
        }
        report
    }
}

async fn run_step<S: Subsystem>(subsystem: &S, deadline: Instant) -> (&'static str, StepOutcome) {
    let name = subsystem.name();
    let outcome = match tokio::time::timeout_at(deadline, subsystem.shutdown(deadline)).await {
        Ok(Ok(())) => StepOutcome::Completed,
        Ok(Err(ShutdownError::DeadlineExceeded)) | Err(_) => {
            error!("Shutdown of {name} exceeded the deadline");
            StepOutcome::DeadlineExceeded
        }
        Ok(Err(e)) => {
            error!("Shutdown of {name} failed: {e}");
            StepOutcome::Failed(e.to_string())
        }
    };
    (name, outcome)
}
