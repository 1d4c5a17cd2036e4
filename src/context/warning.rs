//! User-facing advisory for over-budget selections

use super::models::BudgetAnalysis;

/// Build a Markdown warning for an analysis that does not fit.
///
/// Returns `None` when the analysis fits.
pub fn format_warning(analysis: &BudgetAnalysis) -> Option<String> {
    if analysis.will_fit {
        return None;
    }

    let capacity = if analysis.usable_limit == 0 {
        "model leaves no usable input budget".to_string()
    } else {
        format!("{:.0}% of model capacity", analysis.utilization_percent)
    };

    Some(format!(
        "⚠️ **Context Too Large** ({capacity})\n\
         \n\
         **Current:** {current} document chunks ({total} tokens)\n\
         **Model Limit:** {limit} tokens\n\
         **Recommended:** Use {recommended} or fewer document chunks\n\
         \n\
         **Suggestions:**\n\
         - Try a more specific question\n\
         - Reduce the number of retrieved context sources\n\
         - Switch to a model with a larger context window (like llama3)\n",
        capacity = capacity,
        current = analysis.documents_count,
        total = analysis.total_tokens,
        limit = analysis.model_limit,
        recommended = analysis.recommended_max_docs,
    ))
}
