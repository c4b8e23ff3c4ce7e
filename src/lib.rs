pub mod config;
pub mod display;
pub mod errors;
pub mod progress;
pub mod runner;
pub mod stats;
pub mod types;
