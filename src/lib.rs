//! Context budget management for RAG front ends on local LLMs.
//!
//! Given ranked document chunks from retrieval, a question, a prompt template
//! and a target model, picks the largest prefix of chunks that fits the
//! model's usable context window and explains the decision.
//!
//! ```no_run
//! use context_budget::context::{ContextBudgetAnalyzer, DocumentChunk, DocumentSelector};
//!
//! let selector = DocumentSelector::new(ContextBudgetAnalyzer::with_defaults());
//! let chunks = vec![DocumentChunk::new("Rust ownership rules...")];
//! let selection = selector
//!     .select(&chunks, "What is ownership?", "{context}\n\n{question}", "llama3:8b", None)
//!     .expect("non-empty candidate list");
//! assert!(!selection.documents.is_empty());
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{ContextError, Result};
