/*!
 * Enrichment tasks and the processor that runs them.
 *
 * Each `TaskType` has a fixed row of sampling parameters. On a retry the
 * frequency penalty is raised to push the model away from the degenerate
 * output that failed. A reply that uses the whole output budget is treated
 * as truncated and fails the task.
 */

use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::batch::{BatchOutcome, BatchRunner, ProgressCallback};
use super::json_repair::parse_repaired;
use super::prompts::PromptTemplate;
use crate::errors::{GlossaryError, TaskError};
use crate::glossary::term::{EntityType, Term};
use crate::providers::{ChatClient, ChatMessage, ChatRequest, ChatResponse, SamplingParams};

/// Added to the frequency penalty on retry rounds
pub const RETRY_FREQUENCY_PENALTY_STEP: f32 = 0.2;

/// Kinds of backend task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    ApiTest,
    SummarizeContext,
    TranslateSurface,
    TranslateContext,
}

impl TaskType {
    /// Sampling parameters of a first attempt
    pub fn sampling(&self) -> SamplingParams {
        match self {
            Self::ApiTest | Self::SummarizeContext | Self::TranslateSurface => SamplingParams {
                temperature: 0.05,
                top_p: 0.85,
                max_tokens: 768,
                frequency_penalty: 0.0,
            },
            Self::TranslateContext => SamplingParams {
                temperature: 0.75,
                top_p: 0.95,
                max_tokens: 1024,
                frequency_penalty: 0.0,
            },
        }
    }

    /// Sampling parameters for an attempt, raised on retries
    pub fn sampling_for(&self, retry: bool) -> SamplingParams {
        let mut sampling = self.sampling();
        if retry {
            sampling.frequency_penalty += RETRY_FREQUENCY_PENALTY_STEP;
        }
        sampling
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ApiTest => "Connection test",
            Self::SummarizeContext => "Context classification",
            Self::TranslateSurface => "Surface translation",
            Self::TranslateContext => "Context translation",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Immutable per-run settings for the enrichment tasks
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub model: String,
    /// Language the glossary is translated into
    pub target_language: String,
    /// Deadline for a single request
    pub timeout: Duration,
    /// Maximum number of requests in flight, at least 1
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            model: "glm-4-9b-chat".to_string(),
            target_language: "Chinese".to_string(),
            timeout: Duration::from_secs(180),
            concurrency: 4,
        }
    }
}

/// Text of a JSON field, whatever scalar type the model chose
fn field_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Negative answers seen from models that ignore the English-only instruction
const NEGATIVE_ANSWERS: [&str; 3] = ["不是", "いいえ", "아니"];

/// Whether an `is_name` answer rejects the term
fn rejects_name(answer: &str) -> bool {
    let trimmed = answer.trim();
    if NEGATIVE_ANSWERS.iter().any(|negative| trimmed.starts_with(negative)) || trimmed.contains('否') {
        return true;
    }
    let lowered = answer.to_lowercase();
    let first_word = lowered.split(|c: char| !c.is_alphanumeric()).find(|w| !w.is_empty());
    matches!(first_word, Some("no" | "not" | "false"))
}

/// Runs enrichment tasks against a chat backend
pub struct ContextProcessor {
    client: Arc<dyn ChatClient>,
    config: WorkerConfig,
    progress: Option<ProgressCallback>,
}

impl ContextProcessor {
    pub fn new(client: Arc<dyn ChatClient>, config: WorkerConfig) -> Self {
        Self {
            client,
            config,
            progress: None,
        }
    }

    /// Report (settled, total) while batch rounds run
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Send one prompt and check the reply against the task's token ceiling
    async fn request(&self, prompt: String, task_type: TaskType, retry: bool) -> Result<ChatResponse, TaskError> {
        let sampling = task_type.sampling_for(retry);
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            sampling,
        };

        let response = tokio::time::timeout(self.config.timeout, self.client.complete(request))
            .await
            .map_err(|_| TaskError::Timeout(self.config.timeout))??;

        if response.usage.completion_tokens >= sampling.max_tokens {
            return Err(TaskError::Truncated {
                used: response.usage.completion_tokens,
                limit: sampling.max_tokens,
            });
        }

        Ok(response)
    }

    /// Check that the backend answers before any enrichment starts
    pub async fn api_test(&self) -> Result<(), GlossaryError> {
        let prompt = PromptTemplate::new(PromptTemplate::API_TEST).render(&[]);
        match self.request(prompt, TaskType::ApiTest, false).await {
            Ok(response) => {
                info!("Backend connection test passed: {}", response.text.trim());
                Ok(())
            }
            Err(e) => Err(GlossaryError::ConnectionTest(e.to_string())),
        }
    }

    /// Run one task for one term
    pub async fn execute(&self, task_type: TaskType, term: Term, retry: bool) -> Result<Term, TaskError> {
        match task_type {
            TaskType::ApiTest => {
                let prompt = PromptTemplate::new(PromptTemplate::API_TEST).render(&[]);
                self.request(prompt, task_type, retry).await?;
                Ok(term)
            }
            TaskType::SummarizeContext => self.summarize_context(term, retry).await,
            TaskType::TranslateSurface => self.translate_surface(term, retry).await,
            TaskType::TranslateContext => self.translate_context(term, retry).await,
        }
    }

    /// Run a task over a working set with bounded concurrency and retries
    pub async fn do_task(&self, terms: Vec<Term>, task_type: TaskType) -> BatchOutcome {
        let mut runner = BatchRunner::new(self.config.concurrency);
        if let Some(progress) = &self.progress {
            runner = runner.with_progress(progress.clone());
        }

        info!("{}: {} term(s)", task_type, terms.len());
        runner
            .run(task_type.description(), terms, |term, retry| self.execute(task_type, term, retry))
            .await
    }

    /// Classify a term from its context.
    ///
    /// A negative `is_name` answer tombstones the term; the inferred gender
    /// goes into `attribute`.
    async fn summarize_context(&self, mut term: Term, retry: bool) -> Result<Term, TaskError> {
        let context = term.context.join("\n");
        let prompt = PromptTemplate::new(PromptTemplate::SUMMARIZE_CONTEXT).render(&[
            ("surface", term.surface.as_str()),
            ("context", context.as_str()),
            ("target_language", self.config.target_language.as_str()),
        ]);
        let response = self.request(prompt, TaskType::SummarizeContext, retry).await?;

        let summary: Value = parse_repaired(&response.text)?;
        let is_name = field_text(&summary, "is_name")
            .ok_or_else(|| TaskError::MalformedResponse(format!("missing is_name: {}", summary)))?;

        if rejects_name(&is_name) {
            info!("Classification removed {} - {}", term.surface, summary);
            term.entity_type = EntityType::Removed;
        } else {
            debug!("Classification kept {} - {}", term.surface, summary);
        }

        term.attribute = field_text(&summary, "sex").unwrap_or_default();
        term.context_summary = Some(summary);
        term.raw_responses.summarize_context = response.raw;
        Ok(term)
    }

    /// Translate the surface form, two alternatives plus a reading
    async fn translate_surface(&self, mut term: Term, retry: bool) -> Result<Term, TaskError> {
        let attribute = if term.attribute.is_empty() { "unknown" } else { term.attribute.as_str() };
        let template = if term.entity_type == EntityType::Person {
            PromptTemplate::TRANSLATE_SURFACE_PERSON
        } else {
            PromptTemplate::TRANSLATE_SURFACE_COMMON
        };
        let prompt = PromptTemplate::new(template).render(&[
            ("surface", term.surface.as_str()),
            ("attribute", attribute),
            ("target_language", self.config.target_language.as_str()),
        ]);
        let response = self.request(prompt, TaskType::TranslateSurface, retry).await?;

        let data: Value = parse_repaired(&response.text)?;
        if !data.is_object() {
            return Err(TaskError::MalformedResponse(format!("expected an object: {}", data)));
        }

        let romanization = field_text(&data, "romaji").unwrap_or_default();
        term.romanization = if romanization != term.surface { romanization } else { String::new() };
        term.surface_translations = vec![
            field_text(&data, "translation_1").unwrap_or_default(),
            field_text(&data, "translation_2").unwrap_or_default(),
        ];
        term.translation_note = field_text(&data, "description").unwrap_or_default();
        term.raw_responses.translate_surface = response.raw;
        Ok(term)
    }

    /// Translate the term's context lines
    async fn translate_context(&self, mut term: Term, retry: bool) -> Result<Term, TaskError> {
        if term.context.is_empty() {
            debug!("No context to translate for {}", term.surface);
            return Ok(term);
        }

        let context = term.context.join("\n");
        let prompt = PromptTemplate::new(PromptTemplate::TRANSLATE_CONTEXT).render(&[
            ("surface", term.surface.as_str()),
            ("context", context.as_str()),
            ("target_language", self.config.target_language.as_str()),
        ]);
        let response = self.request(prompt, TaskType::TranslateContext, retry).await?;

        term.context_translation = response
            .text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        term.raw_responses.translate_context = response.raw;
        Ok(term)
    }
}
