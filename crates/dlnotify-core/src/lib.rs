pub mod config;
pub mod logging;

pub mod host;
pub mod permission;
pub mod service;
pub mod tracker;
