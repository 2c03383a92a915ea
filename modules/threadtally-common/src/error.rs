use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Input corpus is empty")]
    EmptyCorpus,

    #[error("No root post could be identified in the corpus")]
    NoRoot,

    #[error("Unknown post uri: {0}")]
    UnknownPost(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Validation authority error: {0}")]
    Authority(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
