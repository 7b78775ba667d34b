//! Data models

pub mod inbound_email;
pub mod radar_item;
