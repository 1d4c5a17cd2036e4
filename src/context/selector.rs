//! Largest-fitting-prefix document selection

use super::models::BudgetAnalysis;
use super::token_budget::{BudgetError, ContextBudgetAnalyzer};
use tracing::{debug, warn};

/// Documents chosen for a prompt together with their analysis
#[derive(Debug, Clone)]
pub struct Selection<'a, D> {
    /// Always a prefix of the candidate list
    pub documents: &'a [D],
    pub analysis: BudgetAnalysis,
    /// True when no prefix fit and the top-ranked document was kept anyway
    pub fell_back: bool,
}

/// Picks how many ranked documents to send, using the analyzer as cost oracle
#[derive(Clone)]
pub struct DocumentSelector {
    analyzer: ContextBudgetAnalyzer,
}

impl DocumentSelector {
    pub fn new(analyzer: ContextBudgetAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Select the longest prefix of `documents` that fits the model's budget.
    ///
    /// Without `max_chunks` the ceiling comes from probing the first document
    /// alone. Lengths are tried from the ceiling down to 1; context cost grows
    /// with every added document, so the first fitting length is the largest.
    /// When nothing fits, the top-ranked document is returned with its
    /// over-budget analysis.
    pub fn select<'a, D: AsRef<str>>(
        &self,
        documents: &'a [D],
        question: &str,
        prompt_template: &str,
        model_name: &str,
        max_chunks: Option<usize>,
    ) -> Result<Selection<'a, D>, BudgetError> {
        if documents.is_empty() {
            return Err(BudgetError::NoDocuments);
        }

        let ceiling = match max_chunks {
            Some(max) => max,
            None => {
                let probe = self
                    .analyzer
                    .analyze(&documents[..1], question, prompt_template, model_name);
                debug!(
                    "Probe analysis: recommended_max_docs={}, usable_limit={}",
                    probe.recommended_max_docs, probe.usable_limit
                );
                probe.recommended_max_docs
            }
        };
        let start = documents.len().min(ceiling.max(1));

        for num_docs in (1..=start).rev() {
            let candidate = &documents[..num_docs];
            let analysis = self
                .analyzer
                .analyze(candidate, question, prompt_template, model_name);

            if analysis.will_fit {
                debug!(
                    "Selected {} of {} documents ({} tokens, {:.1}% of usable budget)",
                    num_docs,
                    documents.len(),
                    analysis.total_tokens,
                    analysis.utilization_percent
                );
                return Ok(Selection {
                    documents: candidate,
                    analysis,
                    fell_back: false,
                });
            }
        }

        let candidate = &documents[..1];
        let analysis = self
            .analyzer
            .analyze(candidate, question, prompt_template, model_name);
        warn!(
            "No document prefix fits {}: sending top document anyway ({} > {} tokens)",
            model_name, analysis.total_tokens, analysis.usable_limit
        );

        Ok(Selection {
            documents: candidate,
            analysis,
            fell_back: true,
        })
    }

    pub fn analyzer(&self) -> &ContextBudgetAnalyzer {
        &self.analyzer
    }
}
