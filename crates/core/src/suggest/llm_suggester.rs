//! Remote suggester backed by an LLM completion endpoint.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::config::{LlmProvider, RemoteConfig};
use super::llm::{create_llm_client, CompletionRequest, LlmClient, LlmError};
use super::traits::{RemoteError, RemoteSuggester};
use crate::metrics;
use crate::vocabulary::Word;

const SYSTEM_PROMPT: &str = "Eres un asistente de comunicación aumentativa para hispanohablantes. \
El usuario está construyendo una oración y necesita sugerencias para la siguiente palabra.";

/// Asks an LLM for the most likely next word ids.
pub struct LlmSuggester {
    client: Box<dyn LlmClient>,
    max_tokens: u32,
    temperature: f32,
    max_vocabulary: usize,
    max_suggestions: usize,
}

impl LlmSuggester {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        let defaults = RemoteConfig::new(LlmProvider::Gemini);
        Self {
            client,
            max_tokens: defaults.max_output_tokens,
            temperature: defaults.temperature,
            max_vocabulary: defaults.max_vocabulary,
            max_suggestions: defaults.max_suggestions,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, LlmError> {
        let client = create_llm_client(config)?;
        Ok(Self {
            client,
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
            max_vocabulary: config.max_vocabulary,
            max_suggestions: config.max_suggestions,
        })
    }

    pub fn with_limits(mut self, max_vocabulary: usize, max_suggestions: usize) -> Self {
        self.max_vocabulary = max_vocabulary.max(1);
        self.max_suggestions = max_suggestions.max(1);
        self
    }

    fn build_prompt(&self, sentence: &[Word], vocabulary: &[Word]) -> String {
        let current = sentence
            .iter()
            .map(|w| w.spanish.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let vocab_list = vocabulary
            .iter()
            .take(self.max_vocabulary)
            .map(|w| format!("{}:{}", w.id, w.spanish))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"Oración actual: "{}"

Vocabulario disponible (formato id:palabra): {}

Responde SOLO con los IDs de las 5 palabras más probables que seguirían naturalmente en esta oración, separados por comas.
Por ejemplo: agua,comida,jugar,dormir,ir

Solo responde con los IDs, sin explicaciones."#,
            current, vocab_list
        )
    }
}

/// Parse a comma-separated id list into vocabulary words.
///
/// Ids are matched case-insensitively; unknown ids are dropped and at most
/// `limit` words are kept, in reply order.
pub fn parse_suggestions(
    text: &str,
    vocabulary: &[Word],
    limit: usize,
) -> Result<Vec<Word>, RemoteError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RemoteError::Malformed("empty reply".to_string()));
    }

    let by_id: HashMap<String, &Word> = vocabulary
        .iter()
        .map(|w| (w.id.to_lowercase(), w))
        .collect();

    let words: Vec<Word> = text
        .split(',')
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .filter_map(|id| by_id.get(&id).map(|w| (*w).clone()))
        .take(limit)
        .collect();

    if words.is_empty() {
        return Err(RemoteError::Empty);
    }
    Ok(words)
}

#[async_trait]
impl RemoteSuggester for LlmSuggester {
    fn name(&self) -> &str {
        self.client.provider()
    }

    async fn suggest(
        &self,
        sentence: &[Word],
        vocabulary: &[Word],
        cancel: &CancellationToken,
    ) -> Result<Vec<Word>, RemoteError> {
        let request = CompletionRequest::new(self.build_prompt(sentence, vocabulary))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let start = Instant::now();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(RemoteError::Aborted),
            result = self.client.complete(request) => result,
        };

        let response = response.map_err(|e| match e {
            LlmError::Timeout(after) => RemoteError::Timeout(after),
            LlmError::Json(msg) => RemoteError::Malformed(msg),
            other => RemoteError::Unavailable(other.to_string()),
        })?;

        let provider = self.client.provider();
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "input"])
            .inc_by(response.usage.input_tokens as u64);
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "output"])
            .inc_by(response.usage.output_tokens as u64);

        debug!(
            provider = %provider,
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            duration_ms = start.elapsed().as_millis() as u64,
            "LLM suggestion reply: {}",
            response.text.trim()
        );

        parse_suggestions(&response.text, vocabulary, self.max_suggestions)
    }
}
