pub mod canonical;
pub mod classify;
pub mod corpus;
pub mod extract;
pub mod inherit;
pub mod ledger;
pub mod pipeline;
pub mod source;
pub mod stats;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use corpus::Corpus;
pub use ledger::{JsonLedger, LedgerStore, MemoryLedger, ValidationLedger};
pub use pipeline::{PipelineOptions, TallyReport};
pub use stats::TallyStats;
