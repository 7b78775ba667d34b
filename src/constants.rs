//! Common constants used across the application

use std::time::Duration;

/// One budget shared by every shutdown step.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

/// How often the scheduler is woken up to check the hour.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Trigger queue capacity.
pub const TRIGGER_CHANNEL_CAPACITY: usize = 1;
