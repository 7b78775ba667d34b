//! HTTP routing configuration

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{api_handlers, email_handlers, health_handlers},
    middlewares, state,
};

/// Creates the Axum router with all routes configured.
pub fn app(state: state::AppState) -> Router {
    let auth = from_fn_with_state(state.clone(), middlewares::auth_middlewares::api_key_auth);

    let api = Router::new()
        .route(
            "/radar_items",
            get(api_handlers::list_items).post(api_handlers::create_item),
        )
        .route(
            "/radar_items/{id}",
            get(api_handlers::get_item).delete(api_handlers::delete_item),
        )
        .fallback(api_handlers::not_found)
        .layer(auth);

    Router::new()
        // Inbound email webhook, reachable under both names
        .route("/emails", post(email_handlers::receive_email))
        .route("/email", post(email_handlers::receive_email))
        .route("/health", get(health_handlers::health))
        .nest("/api", api)
        .with_state(state)
        .layer(from_fn(middlewares::logging_middlewares::log_requests))
        .layer(TraceLayer::new_for_http())
}
