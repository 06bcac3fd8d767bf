pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod monte_carlo;
pub mod session;
