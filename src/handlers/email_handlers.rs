//! Inbound email webhook handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, AppResult},
    models::inbound_email::InboundEmail,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct ReceiveEmailResponse {
    pub status: &'static str,
    pub links: usize,
}

/// Accepts an email from the inbound mail provider and queues it.
///
/// Only allowed senders are accepted. The links are stored by the inbox
/// worker, not during the request.
pub async fn receive_email(
    State(state): State<AppState>,
    Form(email): Form<InboundEmail>,
) -> AppResult<impl IntoResponse> {
    if state.debug {
        debug!("Inbound email payload: {email:?}");
    }

    if !state.inbox.is_allowed(&email) {
        warn!("Rejected email from {:?}", email.sender_address());
        return Err(AppError::Forbidden("Sender not allowed".to_string()));
    }

    if email.text().trim().is_empty() {
        return Err(AppError::BadRequest("Email body is empty".to_string()));
    }

    let links = email.links().len();
    let sender = email.sender_address();
    state.inbox.enqueue(email)?;
    info!("Queued email from {sender} with {links} link(s)");

    Ok((
        StatusCode::ACCEPTED,
        Json(ReceiveEmailResponse {
            status: "queued",
            links,
        }),
    ))
}
