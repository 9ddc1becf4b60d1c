pub mod analysis;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod output;
pub mod prompt;
pub mod stats;
pub mod trip;
