pub mod catalog;
pub mod config;
pub mod core_api;
pub mod document;
pub mod reserved;
