//! Token estimation using tiktoken with a character-count fallback

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::{debug, warn};

/// Characters per token used by the heuristic estimator
pub const CHARS_PER_TOKEN: usize = 4;

/// Which counting strategy an estimator is using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorMode {
    /// Exact sub-word count from a BPE tokenizer
    Precise,
    /// `chars / 4`, rounded down
    Heuristic,
}

/// Token estimator trait for different tokenization strategies
pub trait TokenEstimator: Send + Sync {
    /// Estimate the number of tokens in the given text
    fn estimate(&self, text: &str) -> usize;

    /// Strategy currently in effect
    fn mode(&self) -> EstimatorMode;

    /// Estimate tokens for multiple texts
    fn estimate_batch(&self, texts: &[&str]) -> Vec<usize> {
        texts.iter().map(|t| self.estimate(t)).collect()
    }
}

/// Heuristic estimate: character count divided by four, rounded down
pub fn heuristic_estimate(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Tiktoken-based token estimator using cl100k_base.
///
/// The BPE tables are loaded on first use. If loading fails the estimator
/// settles into heuristic mode for the rest of its lifetime; the failure is
/// logged once and never surfaced to callers.
pub struct TiktokenEstimator {
    precise_enabled: bool,
    bpe: OnceCell<Option<Arc<CoreBPE>>>,
}

impl TiktokenEstimator {
    /// Create an estimator that tries cl100k_base on first use
    pub fn new() -> Self {
        Self {
            precise_enabled: true,
            bpe: OnceCell::new(),
        }
    }

    /// Create an estimator with the precise tokenizer disabled
    pub fn heuristic_only() -> Self {
        Self {
            precise_enabled: false,
            bpe: OnceCell::new(),
        }
    }

    fn bpe(&self) -> Option<&Arc<CoreBPE>> {
        self.bpe
            .get_or_init(|| {
                if !self.precise_enabled {
                    debug!("Precise tokenizer disabled, using character heuristic");
                    return None;
                }
                match cl100k_base() {
                    Ok(bpe) => {
                        debug!("Loaded cl100k_base tokenizer");
                        Some(Arc::new(bpe))
                    }
                    Err(e) => {
                        warn!("tiktoken initialization failed, falling back to heuristic: {}", e);
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl Default for TiktokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        match self.bpe() {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => heuristic_estimate(text),
        }
    }

    fn mode(&self) -> EstimatorMode {
        if self.bpe().is_some() {
            EstimatorMode::Precise
        } else {
            EstimatorMode::Heuristic
        }
    }
}

/// Character-count estimator (~4 characters per token)
#[derive(Debug, Clone, Copy, Default)]
pub struct CharHeuristicEstimator;

impl TokenEstimator for CharHeuristicEstimator {
    fn estimate(&self, text: &str) -> usize {
        heuristic_estimate(text)
    }

    fn mode(&self) -> EstimatorMode {
        EstimatorMode::Heuristic
    }
}
