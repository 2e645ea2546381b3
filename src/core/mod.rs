// src/core/mod.rs
mod analyzer;
mod engine;
mod languages;
mod manifest;
mod project_type;
mod sample;
mod scanner;
mod structure;

pub mod llm;

pub use analyzer::ProjectReport;
pub use project_type::ProjectType;

// Export the main engine
pub use engine::Engine;
