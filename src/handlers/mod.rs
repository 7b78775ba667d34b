//! HTTP handlers

pub mod api_handlers;
pub mod email_handlers;
pub mod health_handlers;
