//! Model family context window limits

use super::models::ModelProfile;
use super::token_budget::BudgetError;
use std::collections::HashMap;

/// Limit for model families missing from the table
pub const DEFAULT_CONTEXT_LIMIT: usize = 2048;

/// Separator between a model family and its variant tag (`llama3:8b`)
pub const MODEL_TAG_SEPARATOR: char = ':';

/// Conservative per-family limits. Most of these models accept far more, but
/// generation gets unstable near the advertised window.
const BUILTIN_LIMITS: &[(&str, usize)] = &[
    ("mistral", 32768),
    ("llama3", 32768),
    ("llama3.1", 65536),
    ("llama3.2", 65536),
    ("llama3.3", 65536),
    ("deepseek", 32768),
    ("phi", 8192),
    ("gradient", 131072),
];

/// Strip the variant tag and lower-case a model name
pub fn normalize_model_name(model_name: &str) -> String {
    model_name
        .split(MODEL_TAG_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Resolves model names to context window sizes
#[derive(Debug, Clone)]
pub struct ModelLimitRegistry {
    limits: HashMap<String, usize>,
    default_limit: usize,
}

impl ModelLimitRegistry {
    /// Registry with the built-in table and default
    pub fn new() -> Self {
        let limits = BUILTIN_LIMITS
            .iter()
            .map(|(family, limit)| (family.to_string(), *limit))
            .collect();
        Self {
            limits,
            default_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }

    /// Built-in table extended or overridden by `profiles`
    pub fn with_overrides(
        profiles: &[ModelProfile],
        default_limit: usize,
    ) -> Result<Self, BudgetError> {
        let mut registry = Self::new();
        for profile in profiles {
            registry
                .limits
                .insert(normalize_model_name(&profile.model_family), profile.context_limit);
        }
        registry.default_limit = default_limit;
        registry.validate()?;
        Ok(registry)
    }

    /// Every limit must be positive and the default must undercut all of them
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.default_limit == 0 {
            return Err(BudgetError::ConfigurationInvalid {
                reason: "default context limit must be positive".to_string(),
            });
        }
        for (family, &limit) in &self.limits {
            if family.is_empty() {
                return Err(BudgetError::ConfigurationInvalid {
                    reason: "model family name must not be empty".to_string(),
                });
            }
            if limit == 0 {
                return Err(BudgetError::ConfigurationInvalid {
                    reason: format!("context limit for '{}' must be positive", family),
                });
            }
            if limit <= self.default_limit {
                return Err(BudgetError::ConfigurationInvalid {
                    reason: format!(
                        "default limit {} must be smaller than the limit for '{}' ({})",
                        self.default_limit, family, limit
                    ),
                });
            }
        }
        Ok(())
    }

    /// Context window for a model name
    pub fn limit_for(&self, model_name: &str) -> usize {
        self.limits
            .get(&normalize_model_name(model_name))
            .copied()
            .unwrap_or(self.default_limit)
    }

    /// Resolved profile for a model name; unknown families keep their normalized name
    pub fn profile_for(&self, model_name: &str) -> ModelProfile {
        let family = normalize_model_name(model_name);
        let limit = self.limits.get(&family).copied().unwrap_or(self.default_limit);
        ModelProfile::new(family, limit)
    }

    /// Whether the family of `model_name` is in the table
    pub fn is_known(&self, model_name: &str) -> bool {
        self.limits.contains_key(&normalize_model_name(model_name))
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// All configured profiles, sorted by family name
    pub fn profiles(&self) -> Vec<ModelProfile> {
        let mut profiles: Vec<_> = self
            .limits
            .iter()
            .map(|(family, &limit)| ModelProfile::new(family.clone(), limit))
            .collect();
        profiles.sort_by(|a, b| a.model_family.cmp(&b.model_family));
        profiles
    }
}

impl Default for ModelLimitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        assert!(ModelLimitRegistry::new().validate().is_ok());
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_model_name("Mistral:latest"), "mistral");
        assert_eq!(normalize_model_name("llama3.1:8b-instruct"), "llama3.1");
        assert_eq!(normalize_model_name("phi"), "phi");
        assert_eq!(normalize_model_name(""), "");
    }

    #[test]
    fn test_known_families() {
        let registry = ModelLimitRegistry::new();
        assert_eq!(registry.limit_for("phi"), 8192);
        assert_eq!(registry.limit_for("PHI:3.8b"), 8192);
        assert_eq!(registry.limit_for("llama3.2:3b"), 65536);
        assert_eq!(registry.limit_for("gradient"), 131072);
    }

    #[test]
    fn test_unknown_family_uses_default() {
        let registry = ModelLimitRegistry::new();
        assert_eq!(registry.limit_for("foo-bar:13b"), DEFAULT_CONTEXT_LIMIT);
        assert_eq!(registry.limit_for(""), DEFAULT_CONTEXT_LIMIT);
        assert!(!registry.is_known("foo-bar:13b"));

        let profile = registry.profile_for("foo-bar:13b");
        assert_eq!(profile.model_family, "foo-bar");
        assert_eq!(profile.context_limit, DEFAULT_CONTEXT_LIMIT);
    }

    #[test]
    fn test_profile_and_known_agree() {
        let registry = ModelLimitRegistry::new();

        let known = registry.profile_for("Llama3.1:70b");
        assert!(registry.is_known("Llama3.1:70b"));
        assert_eq!(known, ModelProfile::new("llama3.1", 65536));

        assert!(!registry.is_known("foo-bar:13b"));
        assert_eq!(
            registry.profile_for("foo-bar:13b").context_limit,
            registry.default_limit()
        );
    }

    #[test]
    fn test_default_smaller_than_every_family() {
        let registry = ModelLimitRegistry::new();
        assert!(registry
            .profiles()
            .iter()
            .all(|p| p.context_limit > registry.default_limit()));
    }

    #[test]
    fn test_overrides() {
        let registry = ModelLimitRegistry::with_overrides(
            &[
                ModelProfile::new("Qwen2", 16384),
                ModelProfile::new("phi", 4096),
            ],
            1024,
        )
        .unwrap();
        assert_eq!(registry.limit_for("qwen2:7b"), 16384);
        assert_eq!(registry.limit_for("phi"), 4096);
        assert_eq!(registry.limit_for("unknown"), 1024);
    }

    #[test]
    fn test_overrides_reject_zero_limit() {
        let result = ModelLimitRegistry::with_overrides(&[ModelProfile::new("tiny", 0)], 1024);
        assert!(matches!(result, Err(BudgetError::ConfigurationInvalid { .. })));
    }

    #[test]
    fn test_overrides_reject_default_not_smallest() {
        let result = ModelLimitRegistry::with_overrides(&[ModelProfile::new("small", 1024)], 2048);
        assert!(matches!(result, Err(BudgetError::ConfigurationInvalid { .. })));
    }
}
