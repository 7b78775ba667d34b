//! Inbound email queue and worker

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    models::{inbound_email::InboundEmail, radar_item::NewRadarItem},
    services::{radar_items::RadarItemsService, sender::MailService},
};

#[derive(Debug, Error)]
pub enum InboxError {
    #[error("Inbox queue is full")]
    Full,

    #[error("Inbox is shut down")]
    Closed,

    #[error("Timed out waiting for inbox worker")]
    ShutdownTimedOut,

    #[error("Inbox worker failed: {0}")]
    Worker(String),
}

struct Inner {
    tx: mpsc::Sender<InboundEmail>,
    rx: Mutex<Option<mpsc::Receiver<InboundEmail>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    token: CancellationToken,
    radar_items: RadarItemsService,
    mail: MailService,
    allowed_senders: Vec<String>,
    debug: bool,
}

/// The email subsystem: accepts parsed webhook payloads and turns their
/// links into radar items on a background worker.
#[derive(Clone)]
pub struct EmailInbox {
    inner: Arc<Inner>,
}

impl EmailInbox {
    #[must_use]
    pub fn new(
        radar_items: RadarItemsService,
        mail: MailService,
        allowed_senders: Vec<String>,
        buffer: usize,
        debug: bool,
    ) -> Self {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        if allowed_senders.is_empty() {
            warn!("RADAR_ALLOWED_SENDERS is empty, all inbound email will be rejected");
        }
        Self {
            inner: Arc::new(Inner {
                tx,
                rx: Mutex::new(Some(rx)),
                worker: Mutex::new(None),
                token: CancellationToken::new(),
                radar_items,
                mail,
                allowed_senders,
                debug,
            }),
        }
    }

    #[must_use]
    pub fn is_allowed(&self, email: &InboundEmail) -> bool {
        email.is_from_allowed_sender(&self.inner.allowed_senders)
    }

    /// Queues an email for processing without waiting for capacity.
    pub fn enqueue(&self, email: InboundEmail) -> Result<(), InboxError> {
        if self.inner.token.is_cancelled() {
            return Err(InboxError::Closed);
        }
        self.inner.tx.try_send(email).map_err(|e| match e {
            TrySendError::Full(_) => InboxError::Full,
            TrySendError::Closed(_) => InboxError::Closed,
        })
    }

    /// Spawns the worker. Calling it again is a no-op.
    pub fn start(&self) {
        let Some(rx) = lock(&self.inner.rx).take() else {
            warn!("Inbox worker already started");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            run_worker(rx, &inner).await;
        });
        *lock(&self.inner.worker) = Some(handle);
    }

    /// Stops accepting mail, drains what is queued and waits for the worker
    /// until `deadline`.
    pub async fn shutdown(&self, deadline: Instant) -> Result<(), InboxError> {
        self.inner.token.cancel();

        let Some(handle) = lock(&self.inner.worker).take() else {
            debug!("Inbox worker not running");
            return Ok(());
        };

        match tokio::time::timeout_at(deadline, handle).await {
            Ok(Ok(())) => {
                info!("Inbox worker stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(InboxError::Worker(e.to_string())),
            Err(_) => Err(InboxError::ShutdownTimedOut),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

async fn run_worker(mut rx: mpsc::Receiver<InboundEmail>, inner: &Inner) {
    info!("Inbox worker started");

    loop {
        tokio::select! {
            biased;
            () = inner.token.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(email) => {
                    process_inbound_email(&email, &inner.radar_items, &inner.mail, inner.debug).await;
                }
                None => break,
            },
        }
    }

    rx.close();
    let mut drained = 0usize;
    while let Ok(email) = rx.try_recv() {
        process_inbound_email(&email, &inner.radar_items, &inner.mail, inner.debug).await;
        drained += 1;
    }
    if drained > 0 {
        info!("Inbox drained {drained} queued emails");
    }
}

/// Stores every link of `email` and replies to the sender. Returns the number
/// of items saved.
pub async fn process_inbound_email(
    email: &InboundEmail,
    radar_items: &RadarItemsService,
    mail: &MailService,
    debug_mode: bool,
) -> usize {
    let sender = email.sender_address();
    let links = email.links();
    if debug_mode {
        debug!("Inbound email from {sender}: subject={:?}, links={links:?}", email.subject);
    }

    let single = links.len() == 1;
    let mut saved = Vec::with_capacity(links.len());
    for url in links {
        let item = NewRadarItem {
            title: single.then(|| email.subject.clone()),
            url,
        };
        match radar_items.create(&item).await {
            Ok(created) => saved.push(created.url),
            Err(e) => error!("Failed to save radar item {}: {e}", item.url),
        }
    }

    let (subject, body) = reply_for(&saved);
    if debug_mode {
        info!("Debug mode, not replying to {sender}: {subject}");
    } else {
        match mail.send_email(&sender, &subject, &body).await {
            Ok(id) => debug!("Replied to {sender}: {id}"),
            Err(e) => error!("Failed to reply to {sender}: {e}"),
        }
    }

    saved.len()
}

fn reply_for(saved: &[String]) -> (String, String) {
    if saved.is_empty() {
        return (
            "Radar: no links added".to_owned(),
            "I couldn't find any links to add to the radar.".to_owned(),
        );
    }

    let mut body = format!("Added {} link(s) to the radar:\n\n", saved.len());
    for url in saved {
        let _ = writeln!(body, "- {url}");
    }
    (format!("Radar: added {} link(s)", saved.len()), body)
}
