use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Validation authority
    pub anthropic_api_key: String,
    pub authority_model: String,

    // Validation ledger
    pub ledger_path: String,

    // Pipeline
    pub validation_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            authority_model: env::var("AUTHORITY_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".to_string()),
            ledger_path: env::var("LEDGER_PATH")
                .unwrap_or_else(|_| "validation_ledger.jsonl".to_string()),
            validation_concurrency: env::var("VALIDATION_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("VALIDATION_CONCURRENCY must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
