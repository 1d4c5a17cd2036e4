//! Context budget manager
//!
//! Runs the full per-request pipeline:
//! - Resolve the target model (request or configured default)
//! - Probe, then search for the largest fitting document prefix
//! - Attach an advisory warning when the result is still over budget
//! - Record the decision in logs and metrics

use super::models::{BudgetAnalysis, ContextPlan};
use super::selector::DocumentSelector;
use super::token_budget::{BudgetError, ContextBudgetAnalyzer};
use super::warning::format_warning;
use crate::config::BudgetConfig;
use crate::error::Result;
use crate::metrics::{Metrics, SelectionOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-request planning inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    pub question: String,
    /// Literal prompt skeleton the context will later be substituted into
    pub prompt_template: String,
    /// Falls back to the manager's default model when absent
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub max_chunks: Option<usize>,
}

impl PlanRequest {
    pub fn new(question: impl Into<String>, prompt_template: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            prompt_template: prompt_template.into(),
            model_name: None,
            max_chunks: None,
        }
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }
}

/// Context budget manager
pub struct ContextBudgetManager {
    selector: DocumentSelector,
    default_model: String,
    metrics: Option<Arc<Metrics>>,
}

impl ContextBudgetManager {
    /// Create a manager around an analyzer
    pub fn new(analyzer: ContextBudgetAnalyzer, default_model: impl Into<String>) -> Self {
        Self {
            selector: DocumentSelector::new(analyzer),
            default_model: default_model.into(),
            metrics: None,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &BudgetConfig) -> Result<Self> {
        let analyzer = config.build_analyzer()?;
        debug!(
            "Context budget manager: default_model={}, tokenizer={:?}",
            config.default_model, config.tokenizer
        );
        Ok(Self::new(analyzer, config.default_model.clone()))
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn resolve_model<'a>(&'a self, model_name: Option<&'a str>) -> &'a str {
        match model_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.default_model,
        }
    }

    /// Analyze a document set without selecting
    pub fn analyze<D: AsRef<str>>(
        &self,
        documents: &[D],
        question: &str,
        prompt_template: &str,
        model_name: Option<&str>,
    ) -> BudgetAnalysis {
        let model = self.resolve_model(model_name);
        let analysis = self
            .selector
            .analyzer()
            .analyze(documents, question, prompt_template, model);

        debug!(
            "Token analysis for {}: question={}, context={}, overhead={}, total={}, usable={}",
            model,
            analysis.question_tokens,
            analysis.context_tokens,
            analysis.prompt_overhead_tokens,
            analysis.total_tokens,
            analysis.usable_limit
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_analysis(&analysis);
        }
        analysis
    }

    /// Choose the documents for a request and explain the decision
    pub fn plan<'a, D: AsRef<str>>(
        &self,
        documents: &'a [D],
        request: &PlanRequest,
    ) -> std::result::Result<ContextPlan<'a, D>, BudgetError> {
        let model = self.resolve_model(request.model_name.as_deref());

        let selection = match self.selector.select(
            documents,
            &request.question,
            &request.prompt_template,
            model,
            request.max_chunks,
        ) {
            Ok(selection) => selection,
            Err(e) => {
                warn!("Context planning failed for {}: {}", model, e);
                if let Some(metrics) = &self.metrics {
                    metrics.record_selection(SelectionOutcome::Empty, None);
                }
                return Err(e);
            }
        };

        let warning = format_warning(&selection.analysis);
        if warning.is_some() {
            warn!(
                "Context exceeds budget for {}: {} > {} tokens",
                model, selection.analysis.total_tokens, selection.analysis.usable_limit
            );
        }

        if let Some(metrics) = &self.metrics {
            let outcome = if selection.fell_back {
                SelectionOutcome::Fallback
            } else {
                SelectionOutcome::Fit
            };
            metrics.record_selection(outcome, Some(&selection.analysis));
        }

        info!(
            "Planned context for {}: {}/{} documents, {:.1}% of usable budget",
            model,
            selection.documents.len(),
            documents.len(),
            selection.analysis.utilization_percent
        );

        Ok(ContextPlan {
            model_name: model.to_string(),
            documents: selection.documents,
            analysis: selection.analysis,
            warning,
            fell_back: selection.fell_back,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Get the analyzer
    pub fn analyzer(&self) -> &ContextBudgetAnalyzer {
        self.selector.analyzer()
    }
}
