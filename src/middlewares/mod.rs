//! HTTP middlewares

pub mod auth_middlewares;
pub mod logging_middlewares;
