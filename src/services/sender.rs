//! AWS SES email sending service

use aws_config::{meta::region::RegionProviderChain, BehaviorVersion};
use aws_sdk_sesv2::{
    config::Region,
    types::{Body, Content, Destination, EmailContent, Message},
    Client,
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SendEmailError {
    #[error("Mail service not configured")]
    NotConfigured,

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SES SDK error: {0}")]
    Sdk(String),
}

/// Outbound mail client.
///
/// Built once at startup and cloned into every consumer. Without a sender
/// address the service stays unconfigured and every send fails with
/// [`SendEmailError::NotConfigured`].
#[derive(Clone, Debug)]
pub struct MailService {
    client: Option<Client>,
    from: String,
}

impl MailService {
    /// Loads AWS credentials from the environment for `region`.
    pub async fn from_env(region: &str, from: &str) -> Self {
        if from.is_empty() {
            warn!("unable to configure outbound mail: RADAR_FROM_EMAIL not set");
            return Self::unconfigured();
        }

        let region_provider = RegionProviderChain::first_try(Region::new(region.to_owned()))
            .or_default_provider()
            .or_else(Region::new(region.to_owned()));

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        info!("Outbound mail configured: from={from}, region={region}");
        Self {
            client: Some(Client::new(&config)),
            from: from.to_owned(),
        }
    }

    #[must_use]
    pub const fn unconfigured() -> Self {
        Self {
            client: None,
            from: String::new(),
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Sends a plain text email. Returns the SES message ID on success.
    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, SendEmailError> {
        let client = self.client.as_ref().ok_or(SendEmailError::NotConfigured)?;

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| SendEmailError::Build(format!("subject: {e:?}")))?;

        let body_content = Content::builder()
            .data(body)
            .charset("UTF-8")
            .build()
            .map_err(|e| SendEmailError::Build(format!("body: {e:?}")))?;

        let message = Message::builder()
            .subject(subject_content)
            .body(Body::builder().text(body_content).build())
            .build();

        let resp = client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(recipient).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| SendEmailError::Sdk(format!("{e:?}")))?;

        Ok(resp.message_id().unwrap_or_default().to_string())
    }
}
