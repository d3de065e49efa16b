//! Async analysis pipeline for trustlens.
//!
//! Wraps the synchronous scoring core with the parts that talk to the
//! outside world: runtime configuration, the summarization provider seam,
//! and the orchestrator that turns one review into a complete report.
//! Genuine reviews get a pharmacist-persona summary; advertisement reviews
//! and every downstream failure get error-shaped placeholder outcomes, so
//! the pipeline itself never errors past the initial length gate.

pub mod config;
pub mod orchestrator;
pub mod provider;

pub use config::{ConfigError, RuntimeConfig, SummarizerConfig};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOrchestratorBuilder, AnalysisOutcome, AnalysisReport};
pub use provider::{
    PharmacistSummarizer, ReviewAnalysis, SummaryError, SummaryProvider, DISCLAIMER,
};
