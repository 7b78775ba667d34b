//! 설정 모듈.

mod cli;
mod db;
mod env;

pub use cli::{normalize_binding, Cli};
pub use db::{init_db, run_migrations};
pub use env::AppConfig;
