//! Context budget analysis for retrieved documents
//!
//! Prompt budget per request:
//! - Response headroom: 25% of the model limit, never given to input
//! - Prompt overhead: template tokens + 100 formatting tokens
//! - Question: estimated question tokens
//! - Retrieved context: whatever is left, documents joined by blank lines

use super::model_limits::ModelLimitRegistry;
use super::models::BudgetAnalysis;
use super::token_estimator::{EstimatorMode, TiktokenEstimator, TokenEstimator};
use std::sync::Arc;
use thiserror::Error;

/// Usable share of the model limit, as a fraction (3/4)
pub const RESPONSE_RESERVE_NUMERATOR: usize = 3;
pub const RESPONSE_RESERVE_DENOMINATOR: usize = 4;

/// Instruction and formatting tokens not visible in the raw template
pub const PROMPT_FORMATTING_OVERHEAD: usize = 100;

/// Assumed chunk size when recommending a document count
pub const AVG_TOKENS_PER_CHUNK: usize = 200;

/// Separator used when documents are assembled into the prompt
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Token budget errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("No documents provided")]
    NoDocuments,

    #[error("Budget exceeded: {used} tokens used, {max} tokens allowed")]
    BudgetExceeded { used: usize, max: usize },

    #[error("Configuration invalid: {reason}")]
    ConfigurationInvalid { reason: String },
}

/// Input budget left after withholding response headroom
pub fn usable_limit(model_limit: usize) -> usize {
    // Split before multiplying so huge configured limits cannot overflow
    model_limit / RESPONSE_RESERVE_DENOMINATOR * RESPONSE_RESERVE_NUMERATOR
        + model_limit % RESPONSE_RESERVE_DENOMINATOR * RESPONSE_RESERVE_NUMERATOR
            / RESPONSE_RESERVE_DENOMINATOR
}

/// How many average-sized chunks fit after overhead and question; never below 1
pub fn recommend_max_docs(usable_limit: usize, prompt_overhead: usize, question_tokens: usize) -> usize {
    let available = usable_limit
        .saturating_sub(prompt_overhead)
        .saturating_sub(question_tokens);
    (available / AVG_TOKENS_PER_CHUNK).max(1)
}

fn utilization_percent(total_tokens: usize, usable_limit: usize) -> f64 {
    if usable_limit == 0 {
        return if total_tokens == 0 { 0.0 } else { f64::MAX };
    }
    total_tokens as f64 / usable_limit as f64 * 100.0
}

/// Cost oracle: estimates whether a document set fits a model's context window
#[derive(Clone)]
pub struct ContextBudgetAnalyzer {
    estimator: Arc<dyn TokenEstimator>,
    registry: ModelLimitRegistry,
}

impl ContextBudgetAnalyzer {
    /// Create an analyzer from an estimator and a limit registry
    pub fn new(estimator: Arc<dyn TokenEstimator>, registry: ModelLimitRegistry) -> Self {
        Self {
            estimator,
            registry,
        }
    }

    /// Create with the tiktoken estimator and the built-in limit table
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(TiktokenEstimator::new()), ModelLimitRegistry::new())
    }

    /// Analyze the token load of `documents` for `model_name`
    pub fn analyze<D: AsRef<str>>(
        &self,
        documents: &[D],
        question: &str,
        prompt_template: &str,
        model_name: &str,
    ) -> BudgetAnalysis {
        let question_tokens = self.estimator.estimate(question);

        let context_text = documents
            .iter()
            .map(|doc| doc.as_ref())
            .collect::<Vec<&str>>()
            .join(CONTEXT_SEPARATOR);
        let context_tokens = self.estimator.estimate(&context_text);

        let prompt_overhead_tokens =
            self.estimator.estimate(prompt_template) + PROMPT_FORMATTING_OVERHEAD;

        let total_tokens = question_tokens + context_tokens + prompt_overhead_tokens;

        let model_limit = self.registry.limit_for(model_name);
        let usable_limit = usable_limit(model_limit);

        BudgetAnalysis {
            total_tokens,
            context_tokens,
            question_tokens,
            prompt_overhead_tokens,
            model_limit,
            usable_limit,
            will_fit: total_tokens <= usable_limit,
            utilization_percent: utilization_percent(total_tokens, usable_limit),
            documents_count: documents.len(),
            recommended_max_docs: recommend_max_docs(
                usable_limit,
                prompt_overhead_tokens,
                question_tokens,
            ),
        }
    }

    /// Estimate tokens for arbitrary text with this analyzer's estimator
    pub fn estimate_tokens(&self, text: &str) -> usize {
        self.estimator.estimate(text)
    }

    pub fn estimator_mode(&self) -> EstimatorMode {
        self.estimator.mode()
    }

    pub fn registry(&self) -> &ModelLimitRegistry {
        &self.registry
    }
}
