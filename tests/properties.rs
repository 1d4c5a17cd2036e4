//! Property tests for budget invariants

use context_budget::context::{
    CharHeuristicEstimator, ContextBudgetAnalyzer, DocumentSelector, ModelLimitRegistry,
};
use proptest::prelude::*;
use std::sync::Arc;

fn analyzer() -> ContextBudgetAnalyzer {
    ContextBudgetAnalyzer::new(Arc::new(CharHeuristicEstimator), ModelLimitRegistry::new())
}

fn model_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("phi".to_string()),
        Just("mistral:latest".to_string()),
        Just("llama3.1:8b".to_string()),
        Just("foo-bar:13b".to_string()),
    ]
}

proptest! {
    #[test]
    fn context_tokens_monotonic_in_prefix_length(
        docs in prop::collection::vec("[a-z ]{0,400}", 1..12),
        question in "[a-z ?]{0,80}",
        model in model_name(),
    ) {
        let analyzer = analyzer();
        let mut previous = 0;
        for n in 0..=docs.len() {
            let analysis = analyzer.analyze(&docs[..n], &question, "", &model);
            prop_assert!(analysis.context_tokens >= previous);
            previous = analysis.context_tokens;
        }
    }

    #[test]
    fn budget_arithmetic_holds(
        docs in prop::collection::vec("[a-z ]{0,2000}", 0..8),
        question in "[a-z ?]{0,200}",
        template in "[a-z {}]{0,400}",
        model in model_name(),
    ) {
        let analysis = analyzer().analyze(&docs, &question, &template, &model);
        prop_assert_eq!(
            analysis.total_tokens,
            analysis.question_tokens + analysis.context_tokens + analysis.prompt_overhead_tokens
        );
        prop_assert_eq!(analysis.usable_limit, analysis.model_limit * 3 / 4);
        prop_assert_eq!(analysis.will_fit, analysis.total_tokens <= analysis.usable_limit);
        prop_assert_eq!(analysis.documents_count, docs.len());
        prop_assert!(analysis.recommended_max_docs >= 1);
    }

    #[test]
    fn recommendation_floor_with_huge_question(
        repeat in 1usize..20,
        model in model_name(),
    ) {
        let question = "word ".repeat(repeat * 10_000);
        let analysis = analyzer().analyze::<String>(&[], &question, "", &model);
        prop_assert!(analysis.recommended_max_docs >= 1);
    }

    #[test]
    fn selection_is_nonempty_prefix(
        docs in prop::collection::vec("[a-z ]{1,5000}", 1..15),
        question in "[a-z ?]{0,200}",
        max_chunks in prop::option::of(0usize..20),
        model in model_name(),
    ) {
        let selector = DocumentSelector::new(analyzer());
        let selection = selector.select(&docs, &question, "", &model, max_chunks).unwrap();

        prop_assert!(!selection.documents.is_empty());
        prop_assert!(selection.documents.len() <= docs.len());
        prop_assert_eq!(selection.documents, &docs[..selection.documents.len()]);
        prop_assert_eq!(selection.analysis.documents_count, selection.documents.len());
        prop_assert!(selection.analysis.will_fit || selection.documents.len() == 1);
    }
}
