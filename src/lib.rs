pub mod api;
pub mod config;
pub mod engine;
pub mod net;
