//! Metrics collection for budget decisions

use crate::context::BudgetAnalysis;
use prometheus::{
    Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry,
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry,
};

/// Outcome label for a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// A prefix fit the usable budget
    Fit,
    /// Nothing fit; the top document was sent anyway
    Fallback,
    /// No candidate documents were supplied
    Empty,
}

impl SelectionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionOutcome::Fit => "fit",
            SelectionOutcome::Fallback => "fallback",
            SelectionOutcome::Empty => "empty",
        }
    }
}

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    pub analyses: Counter,
    pub selections: CounterVec,
    pub overflows: Counter,
    pub tokens_used: Histogram,
    pub utilization_percent: Histogram,
    pub selected_documents: Histogram,
}

impl Metrics {
    /// Create a new metrics collector on its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let analyses = register_counter_with_registry!(
            Opts::new("context_budget_analyses_total", "Total budget analyses reported"),
            registry
        )?;

        let selections = register_counter_vec_with_registry!(
            Opts::new("context_budget_selections_total", "Total document selections"),
            &["outcome"],
            registry
        )?;

        let overflows = register_counter_with_registry!(
            Opts::new(
                "context_budget_overflows_total",
                "Selections sent to the model over the usable budget"
            ),
            registry
        )?;

        let tokens_used = register_histogram_with_registry!(
            HistogramOpts::new("context_budget_tokens_used", "Estimated prompt tokens per request")
                .buckets(vec![256.0, 512.0, 1024.0, 2048.0, 4096.0, 8192.0, 16384.0, 32768.0, 65536.0]),
            registry
        )?;

        let utilization_percent = register_histogram_with_registry!(
            HistogramOpts::new(
                "context_budget_utilization_percent",
                "Share of the usable budget consumed per request"
            )
            .buckets(vec![10.0, 25.0, 50.0, 75.0, 90.0, 100.0, 150.0, 200.0]),
            registry
        )?;

        let selected_documents = register_histogram_with_registry!(
            HistogramOpts::new(
                "context_budget_selected_documents",
                "Documents selected per request"
            )
            .buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
            registry
        )?;

        Ok(Self {
            registry,
            analyses,
            selections,
            overflows,
            tokens_used,
            utilization_percent,
            selected_documents,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a standalone analysis
    pub fn record_analysis(&self, analysis: &BudgetAnalysis) {
        self.analyses.inc();
        self.tokens_used.observe(analysis.total_tokens as f64);
        self.utilization_percent.observe(analysis.utilization_percent);
    }

    /// Record the final result of a selection
    pub fn record_selection(&self, outcome: SelectionOutcome, analysis: Option<&BudgetAnalysis>) {
        self.selections.with_label_values(&[outcome.as_str()]).inc();
        if let Some(analysis) = analysis {
            self.record_analysis(analysis);
            self.selected_documents.observe(analysis.documents_count as f64);
            if !analysis.will_fit {
                self.overflows.inc();
            }
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
