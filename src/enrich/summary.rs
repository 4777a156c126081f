use std::time::Duration;
use tracing::info;

use super::llm::LlmClient;
use crate::error::SummaryError;

/// Meeting-style summaries of transcript lines.
#[derive(Clone)]
pub struct Summarizer {
    client: LlmClient,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(client: LlmClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn summarize<S: AsRef<str>>(&self, lines: &[S]) -> Result<String, SummaryError> {
        let transcript = join_lines(lines).ok_or(SummaryError::NothingToSummarize)?;

        info!("Summarizing {} transcript characters", transcript.len());

        Ok(self
            .client
            .generate(&summary_prompt(&transcript), self.timeout)
            .await?)
    }
}

fn join_lines<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let text = lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (!text.is_empty()).then_some(text)
}

fn summary_prompt(transcript: &str) -> String {
    format!(
        "The following are live speech-recognition captions. Summarize them as meeting notes.\n\n\
         Format:\n\
         ## Main topics\n\
         - Key topics discussed\n\n\
         ## Key points\n\
         - Important statements or decisions\n\n\
         ## Action items\n\
         - Follow-ups and things to do\n\n\
         Captions:\n{}",
        transcript
    )
}
