pub mod llm;
pub mod traits;

pub use llm::LlmAuthority;
pub use traits::{ValidationAuthority, Verdict};
