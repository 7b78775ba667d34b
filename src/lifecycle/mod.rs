//! Process lifecycle: signals, HTTP server task and shutdown.

pub mod server;
pub mod shutdown;
pub mod signals;
