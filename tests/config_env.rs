//! Environment layering for `Config::load`
//!
//! Kept in its own test binary: environment variables are process-wide.

use context_budget::config::{Config, TokenizerKind};

#[test]
fn test_prefixed_env_overrides_file_and_defaults() {
    let path = std::env::temp_dir().join(format!("context-budget-env-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[budget]\ndefault_context_limit = 1500\ntokenizer = \"auto\"\n\n[logging]\nlevel = \"warn\"\n",
    )
    .unwrap();

    std::env::set_var("CONTEXT_BUDGET__BUDGET__DEFAULT_CONTEXT_LIMIT", "1000");
    std::env::set_var("CONTEXT_BUDGET__BUDGET__TOKENIZER", "chars");
    std::env::set_var("CONTEXT_BUDGET__LOGGING__JSON", "true");

    let config = Config::load(Some(path.as_path()));

    // Cleanup
    std::env::remove_var("CONTEXT_BUDGET__BUDGET__DEFAULT_CONTEXT_LIMIT");
    std::env::remove_var("CONTEXT_BUDGET__BUDGET__TOKENIZER");
    std::env::remove_var("CONTEXT_BUDGET__LOGGING__JSON");
    std::fs::remove_file(&path).ok();

    let config = config.unwrap();
    assert_eq!(config.budget.default_context_limit, 1000);
    assert_eq!(config.budget.tokenizer, TokenizerKind::Heuristic);
    assert!(config.logging.json);
    // Untouched by the environment, so the file value stands
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.budget.registry().unwrap().limit_for("foo-bar:13b"), 1000);
}
