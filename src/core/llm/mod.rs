//! LLM integration for README generation
//!
//! The backend is consumed through the `TextGenerator` trait so the gateway
//! and the direct CLI mode can share one prompt and swap providers (or test
//! doubles) freely.

mod documenter;
mod prompt;
mod providers;

pub use documenter::TextGenerator;
pub use providers::create_generator;

/// Documenter over a boxed, runtime-selected backend
pub type DynDocumenter = documenter::ReadmeDocumenter<dyn TextGenerator>;
