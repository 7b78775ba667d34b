//! API key authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

const API_KEY_HEADER: &str = "X-API-KEY";

/// Validates the `X-API-KEY` header when an API key is configured.
pub async fn api_key_auth(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    if state.api_key.is_empty() {
        return next.run(req).await;
    }

    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let Some(key) = api_key else {
        return AppError::Unauthorized("Missing X-API-KEY header".to_string()).into_response();
    };

    if key != &*state.api_key {
        return AppError::Unauthorized("Invalid API Key".to_string()).into_response();
    }

    next.run(req).await
}
