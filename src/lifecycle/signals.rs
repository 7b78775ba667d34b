//! OS signal handling.
//!
//! SIGUSR2 asks for an immediate radar; SIGINT starts the graceful shutdown.
//! A second SIGINT while shutting down exits right away.

use std::sync::Arc;

use tracing::{info, warn};

use crate::services::triggers::{Trigger, TriggerChannel, TriggerError};

/// Exit status used when a second interrupt cuts shutdown short.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Posts a [`Trigger::ManualForce`] without waiting for queue capacity.
pub fn forward_force(channel: &TriggerChannel) -> Result<(), TriggerError> {
    match channel.send(Trigger::ManualForce) {
        Ok(()) => {
            info!("Received force signal, radar generation requested");
            Ok(())
        }
        Err(e) => {
            warn!("Force signal ignored: {e}");
            Err(e)
        }
    }
}

/// Installed signal streams.
pub struct SignalSource {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
}

impl SignalSource {
    /// Registers the handlers and starts forwarding force signals into
    /// `channel`.
    #[cfg(unix)]
    pub fn install(channel: Arc<TriggerChannel>) -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut force = signal(SignalKind::user_defined2())?;
        let interrupt = signal(SignalKind::interrupt())?;

        tokio::spawn(async move {
            while force.recv().await.is_some() {
                let _ = forward_force(&channel);
            }
        });

        Ok(Self { interrupt })
    }

    #[cfg(not(unix))]
    pub fn install(channel: Arc<TriggerChannel>) -> std::io::Result<Self> {
        warn!("Force signal is not supported on this platform");
        drop(channel);
        Ok(Self {})
    }

    /// Resolves on the next interrupt.
    pub async fn interrupted(&mut self) {
        #[cfg(unix)]
        {
            if self.interrupt.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    }

    /// Makes the next interrupt exit the process immediately.
    pub fn escalate_next_interrupt(mut self) {
        tokio::spawn(async move {
            self.interrupted().await;
            warn!("Second interrupt received, forcing exit");
            std::process::exit(FORCED_EXIT_CODE);
        });
    }
}
