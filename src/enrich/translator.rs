use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::llm::LlmClient;
use crate::error::{PipelineError, Result};
use crate::language::display_name;

/// Machine translation collaborator
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language`.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Translator backed by a general-purpose language model.
pub struct LlmTranslator {
    client: LlmClient,
    timeout: Duration,
}

impl LlmTranslator {
    pub fn new(client: LlmClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn prompt(text: &str, target_language: &str) -> String {
        format!(
            "Translate the following text into {}. Output only the translation.\n\n{}",
            display_name(target_language),
            text
        )
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.client
            .generate(&Self::prompt(text, target_language), self.timeout)
            .await
            .map_err(|e| PipelineError::Enrichment {
                message: e.to_string(),
            })
    }
}

/// Best-effort translation of non-primary-language text.
#[derive(Clone)]
pub struct Enricher {
    translator: Option<Arc<dyn Translator>>,
    primary_language: String,
}

impl Enricher {
    pub fn new(translator: Arc<dyn Translator>, primary_language: impl Into<String>) -> Self {
        Self {
            translator: Some(translator),
            primary_language: primary_language.into(),
        }
    }

    /// An enricher that never translates.
    pub fn disabled(primary_language: impl Into<String>) -> Self {
        Self {
            translator: None,
            primary_language: primary_language.into(),
        }
    }

    pub fn primary_language(&self) -> &str {
        &self.primary_language
    }

    /// Translation into the primary language, or `None` when the text is
    /// already in it or the translator fails.
    pub async fn maybe_translate(&self, text: &str, language: &str) -> Option<String> {
        if language == self.primary_language {
            return None;
        }
        let translator = self.translator.as_ref()?;

        match translator.translate(text, &self.primary_language).await {
            Ok(translated) if !translated.trim().is_empty() => {
                debug!("Translated {} -> {}", language, self.primary_language);
                Some(translated.trim().to_string())
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Publishing without translation: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoTranslator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PipelineError::Enrichment {
                    message: "timed out".to_string(),
                });
            }
            Ok(format!("[{}] {}", target_language, text))
        }
    }

    fn enricher(fail: bool) -> (Enricher, Arc<EchoTranslator>) {
        let translator = Arc::new(EchoTranslator {
            calls: AtomicUsize::new(0),
            fail,
        });
        (Enricher::new(translator.clone(), "ko"), translator)
    }

    #[tokio::test]
    async fn test_primary_language_is_not_translated() {
        let (enricher, translator) = enricher(false);
        assert_eq!(enricher.maybe_translate("안녕하세요", "ko").await, None);
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_language_is_translated() {
        let (enricher, _) = enricher(false);
        assert_eq!(
            enricher.maybe_translate("hello", "en").await.as_deref(),
            Some("[ko] hello")
        );
    }

    #[tokio::test]
    async fn test_failure_yields_no_translation() {
        let (enricher, translator) = enricher(true);
        assert_eq!(enricher.maybe_translate("hello", "en").await, None);
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_enricher() {
        assert_eq!(Enricher::disabled("ko").maybe_translate("hello", "en").await, None);
    }

    #[test]
    fn test_prompt_names_target_language() {
        let prompt = LlmTranslator::prompt("hello", "ko");
        assert!(prompt.contains("into Korean"));
        assert!(prompt.ends_with("hello"));
    }
}
