//! Context budget management for retrieval-augmented prompts
//!
//! Decides, before every model call, how many ranked document chunks fit in
//! the model's context window after reserving headroom for the response.

pub mod budget_manager;
pub mod model_limits;
pub mod models;
pub mod selector;
pub mod token_budget;
pub mod token_estimator;
pub mod warning;

pub use budget_manager::{ContextBudgetManager, PlanRequest};
pub use model_limits::{normalize_model_name, ModelLimitRegistry, DEFAULT_CONTEXT_LIMIT};
pub use models::{BudgetAnalysis, ContextPlan, DocumentChunk, ModelProfile};
pub use selector::{DocumentSelector, Selection};
pub use token_budget::{
    recommend_max_docs, usable_limit, BudgetError, ContextBudgetAnalyzer, AVG_TOKENS_PER_CHUNK,
    CONTEXT_SEPARATOR, PROMPT_FORMATTING_OVERHEAD,
};
pub use token_estimator::{
    heuristic_estimate, CharHeuristicEstimator, EstimatorMode, TiktokenEstimator, TokenEstimator,
};
pub use warning::format_warning;
