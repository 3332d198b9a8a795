pub mod aggregator;
pub mod config;
pub mod error;
pub mod models;
pub mod pacing;
pub mod probe;
pub mod runner;
pub mod session;
