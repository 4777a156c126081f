//! Language-model enrichment: per-segment translation and transcript summaries

mod llm;
mod summary;
mod translator;

pub use llm::LlmClient;
pub use summary::Summarizer;
pub use translator::{Enricher, LlmTranslator, Translator};
