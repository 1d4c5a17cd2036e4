//! Configuration for context budgeting
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional TOML
//! file, then `CONTEXT_BUDGET__<SECTION>__<KEY>` environment variables.

use crate::context::{
    ContextBudgetAnalyzer, ModelLimitRegistry, ModelProfile, TiktokenEstimator,
    DEFAULT_CONTEXT_LIMIT,
};
use crate::error::{ContextError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Environment prefix for layered configuration
pub const ENV_PREFIX: &str = "CONTEXT_BUDGET";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let config: Config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        let config = Config {
            budget: config.budget.from_env(),
            logging: config.logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.budget.validate()
    }
}

/// Tokenizer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// Use tiktoken when it loads, otherwise the character heuristic
    #[serde(alias = "tiktoken", alias = "precise")]
    Auto,
    /// Always use the character heuristic
    #[serde(alias = "chars")]
    Heuristic,
}

impl std::str::FromStr for TokenizerKind {
    type Err = ContextError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "tiktoken" | "precise" => Ok(TokenizerKind::Auto),
            "heuristic" | "chars" => Ok(TokenizerKind::Heuristic),
            other => Err(ContextError::Configuration(format!(
                "unknown tokenizer '{}'",
                other
            ))),
        }
    }
}

/// Budget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Token estimation strategy
    #[serde(default = "default_tokenizer")]
    pub tokenizer: TokenizerKind,

    /// Limit for model families not in the table
    #[serde(default = "default_context_limit")]
    pub default_context_limit: usize,

    /// Additional or overriding model limits
    #[serde(default)]
    pub models: Vec<ModelProfile>,
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_tokenizer() -> TokenizerKind {
    TokenizerKind::Auto
}

fn default_context_limit() -> usize {
    DEFAULT_CONTEXT_LIMIT
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            tokenizer: default_tokenizer(),
            default_context_limit: default_context_limit(),
            models: vec![],
        }
    }
}

impl BudgetConfig {
    /// Apply the plain environment overrides
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("LOCAL_LLM_MODEL") {
            if !val.trim().is_empty() {
                self.default_model = val;
            }
        }

        if let Ok(val) = std::env::var("CONTEXT_BUDGET_TOKENIZER") {
            match val.parse() {
                Ok(kind) => self.tokenizer = kind,
                Err(e) => warn!("Ignoring CONTEXT_BUDGET_TOKENIZER: {}", e),
            }
        }

        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_model.trim().is_empty() {
            return Err(ContextError::Configuration(
                "default_model must not be empty".to_string(),
            ));
        }
        self.registry()?;
        Ok(())
    }

    /// Limit registry with configured overrides applied
    pub fn registry(&self) -> Result<ModelLimitRegistry> {
        Ok(ModelLimitRegistry::with_overrides(
            &self.models,
            self.default_context_limit,
        )?)
    }

    /// Estimator for the configured tokenizer
    pub fn estimator(&self) -> TiktokenEstimator {
        match self.tokenizer {
            TokenizerKind::Auto => TiktokenEstimator::new(),
            TokenizerKind::Heuristic => TiktokenEstimator::heuristic_only(),
        }
    }

    /// Analyzer wired from this configuration
    pub fn build_analyzer(&self) -> Result<ContextBudgetAnalyzer> {
        Ok(ContextBudgetAnalyzer::new(
            Arc::new(self.estimator()),
            self.registry()?,
        ))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
