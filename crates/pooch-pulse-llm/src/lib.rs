//! Vision-model access for stool-photo analysis.
//!
//! This crate owns everything that touches the remote model: the veterinary
//! instruction prompt, the two provider integrations behind one trait, and the
//! recovery chain that turns loosely structured output into a complete record.

pub mod config;
pub mod extraction;
pub mod prompts;
pub mod providers;

pub use config::*;
pub use extraction::*;
pub use prompts::*;
pub use providers::{
    build as build_provider, AnalysisProvider, AnalysisRequest, ProviderError, ProviderResult,
    StructuredProvider, TextPromptProvider,
};
