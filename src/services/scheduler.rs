//! Daily radar scheduler

use chrono::Local;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::services::{radar::RadarGenerator, triggers::Trigger};

/// Reasons scheduled generation stays off for the life of the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Hour to generate must be two characters: '{0}'")]
    InvalidHour(String),

    #[error("GITHUB_ACCESS_TOKEN not set")]
    MissingAccessToken,

    #[error("RADAR_REPO not set")]
    MissingRepo,
}

/// Validated schedule: the hour to fire plus the publishing target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadarSchedule {
    hour: String,
    repo: String,
    mention: String,
}

impl RadarSchedule {
    pub fn new(
        hour: &str,
        access_token: &str,
        repo: &str,
        mention: &str,
    ) -> Result<Self, ScheduleError> {
        if !is_valid_hour(hour) {
            return Err(ScheduleError::InvalidHour(hour.to_owned()));
        }
        if access_token.trim().is_empty() {
            return Err(ScheduleError::MissingAccessToken);
        }
        if repo.trim().is_empty() {
            return Err(ScheduleError::MissingRepo);
        }

        Ok(Self {
            hour: hour.to_owned(),
            repo: repo.trim().to_owned(),
            mention: mention.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn hour(&self) -> &str {
        &self.hour
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    #[must_use]
    pub fn mention(&self) -> &str {
        &self.mention
    }
}

/// Exactly two bytes long. An hour the clock never reports, such as `24`,
/// keeps the loop running for force triggers but never matches a tick.
fn is_valid_hour(hour: &str) -> bool {
    hour.len() == 2
}

/// Source of the current wall-clock hour.
pub trait Clock: Send + Sync {
    /// Current hour as a two-digit 24-hour string.
    fn current_hour(&self) -> String;
}

/// Local time zone wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn current_hour(&self) -> String {
        Local::now().format("%H").to_string()
    }
}

/// Whether a trigger received at `current_hour` should generate.
#[must_use]
pub fn should_generate(trigger: Trigger, current_hour: &str, target_hour: &str) -> bool {
    trigger == Trigger::ManualForce || current_hour == target_hour
}

/// How [`run_scheduler`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerExit {
    /// Configuration was unusable; no trigger was ever read.
    Disabled,
    /// The trigger channel closed.
    Closed,
}

/// Consumes triggers until the channel closes, generating the radar at the
/// scheduled hour or on demand. Generation runs inline, so triggers that
/// arrive meanwhile wait in the queue.
pub async fn run_scheduler<G, C>(
    mut rx: mpsc::Receiver<Trigger>,
    schedule: Result<RadarSchedule, ScheduleError>,
    generator: G,
    clock: C,
) -> SchedulerExit
where
    G: RadarGenerator,
    C: Clock,
{
    let schedule = match schedule {
        Ok(s) => s,
        Err(e) => {
            warn!("NOT generating radar. {e}");
            return SchedulerExit::Disabled;
        }
    };

    if schedule.mention().is_empty() {
        info!("RADAR_MENTION is empty. Just so you know.");
    }
    info!("Will generate radar at {}:00 every day.", schedule.hour());

    while let Some(trigger) = rx.recv().await {
        let this_hour = clock.current_hour();
        if should_generate(trigger, &this_hour, schedule.hour()) {
            info!("The time has come: let's generate the radar! ({trigger:?})");
            generate_radar(&generator).await;
        } else {
            info!("Wrong hour to generate! {this_hour} != {}", schedule.hour());
        }
    }

    info!("Trigger channel closed, radar scheduler stopped");
    SchedulerExit::Closed
}

/// Runs the generator once and logs the outcome. Returns the artifact
/// location on success.
pub async fn generate_radar<G: RadarGenerator>(generator: &G) -> Option<String> {
    match generator.generate().await {
        Ok(url) => {
            info!("Generated new radar issue: {url}");
            Some(url)
        }
        Err(e) => {
            error!("Couldn't generate new radar issue: {e}");
            None
        }
    }
}
