//! Radar issue generation

use std::fmt::Write as _;
use std::future::Future;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::radar_item::RadarItem,
    services::{
        github::{GitHubClient, GitHubError},
        radar_items::{RadarItemsError, RadarItemsService},
    },
};

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("Failed to load radar items: {0}")]
    Items(#[from] RadarItemsError),

    #[error("Failed to publish radar issue: {0}")]
    GitHub(#[from] GitHubError),
}

/// The background task run by the scheduler.
///
/// Produces one artifact and returns where it can be found.
pub trait RadarGenerator: Send + Sync {
    fn generate(&self) -> impl Future<Output = Result<String, RadarError>> + Send;
}

/// Publishes open radar items as a GitHub issue.
#[derive(Clone, Debug)]
pub struct GitHubRadarGenerator {
    radar_items: RadarItemsService,
    github: GitHubClient,
    repo: String,
    mention: String,
}

impl GitHubRadarGenerator {
    #[must_use]
    pub const fn new(
        radar_items: RadarItemsService,
        github: GitHubClient,
        repo: String,
        mention: String,
    ) -> Self {
        Self {
            radar_items,
            github,
            repo,
            mention,
        }
    }
}

impl RadarGenerator for GitHubRadarGenerator {
    async fn generate(&self) -> Result<String, RadarError> {
        let items = self.radar_items.list_open().await?;
        let (title, body) = compose_radar(Local::now().date_naive(), &items, &self.mention);

        let issue = self.github.create_issue(&self.repo, &title, &body).await?;
        info!("Created radar issue #{} with {} items", issue.number, items.len());

        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        if let Err(e) = self.radar_items.archive(&ids).await {
            warn!("Radar issue published but items were not archived: {e}");
        }

        Ok(issue.html_url)
    }
}

/// Builds the issue title and markdown body.
#[must_use]
pub fn compose_radar(date: NaiveDate, items: &[RadarItem], mention: &str) -> (String, String) {
    let title = format!("Radar for {}", date.format("%Y-%m-%d"));

    let mut body = String::new();
    if items.is_empty() {
        body.push_str("Nothing new on the radar today.\n");
    } else {
        for item in items {
            if item.title.is_empty() || item.title == item.url {
                let _ = writeln!(body, "- [ ] {}", item.url);
            } else {
                let _ = writeln!(body, "- [ ] [{}]({})", item.title, item.url);
            }
        }
    }

    let mention = mention.trim().trim_start_matches('@');
    if !mention.is_empty() {
        let _ = write!(body, "\n/cc @{mention}\n");
    }

    (title, body)
}
