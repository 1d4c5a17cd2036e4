//! Data models for context budgeting

use super::token_budget::BudgetError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unit of retrieved document text.
///
/// Produced by the retrieval layer and never mutated here; selection only ever
/// borrows a prefix of the ranked chunk list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(content: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

impl AsRef<str> for DocumentChunk {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

/// Resolved context window for a model family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Normalized family name (lower-case, tag stripped)
    pub model_family: String,
    /// Maximum context window in tokens
    pub context_limit: usize,
}

impl ModelProfile {
    pub fn new(model_family: impl Into<String>, context_limit: usize) -> Self {
        Self {
            model_family: model_family.into(),
            context_limit,
        }
    }
}

/// Token accounting for one candidate document set.
///
/// Built fresh by every analyzer call and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub total_tokens: usize,
    pub context_tokens: usize,
    pub question_tokens: usize,
    pub prompt_overhead_tokens: usize,
    pub model_limit: usize,
    pub usable_limit: usize,
    pub will_fit: bool,
    pub utilization_percent: f64,
    pub documents_count: usize,
    pub recommended_max_docs: usize,
}

impl BudgetAnalysis {
    /// Tokens left in the usable budget (zero when over budget)
    pub fn remaining(&self) -> usize {
        self.usable_limit.saturating_sub(self.total_tokens)
    }

    /// Tokens over the usable budget (zero when it fits)
    pub fn overflow(&self) -> usize {
        self.total_tokens.saturating_sub(self.usable_limit)
    }

    /// Convert an over-budget analysis into a hard error
    pub fn ensure_fits(&self) -> Result<(), BudgetError> {
        if self.will_fit {
            Ok(())
        } else {
            Err(BudgetError::BudgetExceeded {
                used: self.total_tokens,
                max: self.usable_limit,
            })
        }
    }
}

/// Outcome of a full budget planning pass
#[derive(Debug, Clone)]
pub struct ContextPlan<'a, D> {
    /// Model name the plan was resolved against
    pub model_name: String,
    /// Prefix of the candidate list to send to the model
    pub documents: &'a [D],
    pub analysis: BudgetAnalysis,
    /// Advisory message, present only when the selection does not fit
    pub warning: Option<String>,
    /// True when no prefix fit and the top-ranked chunk was sent anyway
    pub fell_back: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(total: usize, usable: usize) -> BudgetAnalysis {
        BudgetAnalysis {
            total_tokens: total,
            context_tokens: total,
            question_tokens: 0,
            prompt_overhead_tokens: 0,
            model_limit: usable * 4 / 3,
            usable_limit: usable,
            will_fit: total <= usable,
            utilization_percent: total as f64 / usable as f64 * 100.0,
            documents_count: 1,
            recommended_max_docs: 1,
        }
    }

    #[test]
    fn test_chunk_as_ref_exposes_content() {
        let chunk = DocumentChunk::new("hello");
        let text: &str = chunk.as_ref();
        assert_eq!(text, "hello");
        assert!(chunk.metadata.is_empty());
    }

    #[test]
    fn test_remaining_and_overflow() {
        let fits = analysis(100, 150);
        assert_eq!(fits.remaining(), 50);
        assert_eq!(fits.overflow(), 0);
        assert!(fits.ensure_fits().is_ok());

        let over = analysis(200, 150);
        assert_eq!(over.remaining(), 0);
        assert_eq!(over.overflow(), 50);
        assert!(matches!(
            over.ensure_fits(),
            Err(BudgetError::BudgetExceeded { used: 200, max: 150 })
        ));
    }

    #[test]
    fn test_analysis_serializes_for_ui() {
        let json = serde_json::to_value(analysis(10, 20)).unwrap();
        assert_eq!(json["will_fit"], true);
        assert_eq!(json["usable_limit"], 20);
    }
}
