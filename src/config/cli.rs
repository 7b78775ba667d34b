//! Command line flags.

use clap::Parser;

/// Link radar server.
#[derive(Debug, Clone, Parser)]
#[command(name = "radar", version, about)]
pub struct Cli {
    /// The IP/PORT to bind this server to.
    #[arg(long, env = "RADAR_HTTP", default_value = ":8291")]
    pub http: String,

    /// Whether to print debugging messages.
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Hour of day (00-23) to generate the radar issue.
    #[arg(long, env = "RADAR_HOUR", default_value = "03")]
    pub hour: String,
}

/// Turns a `:port` binding into an all-interfaces socket address.
#[must_use]
pub fn normalize_binding(binding: &str) -> String {
    if binding.starts_with(':') {
        format!("0.0.0.0{binding}")
    } else {
        binding.to_owned()
    }
}
