//! Background services and collaborators

pub mod github;
pub mod inbox;
pub mod radar;
pub mod radar_items;
pub mod scheduler;
pub mod sender;
pub mod triggers;
