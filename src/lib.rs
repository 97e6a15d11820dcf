pub mod citations;
pub mod client;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod files;
pub mod models;
