pub mod chain;
pub mod classifier;
pub mod clerk;
pub mod errors;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod parsers;
pub mod providers;
pub mod registry;
pub mod synthesizer;
