/*!
 * End-to-end glossary generation.
 *
 * Flow of a run:
 * 1. Normalize the input and detect its majority language.
 * 2. Recognize candidates; merge and recount unless the recognizer's counts are final.
 * 3. Select contexts and drop terms seen fewer than `count_threshold` times.
 * 4. Classify person terms from their context and drop rejected ones.
 * 5. Drop non-person terms containing a person name.
 * 6. Japanese only: split person names into roots, merge, recount and reselect contexts.
 * 7. Translate surfaces, then contexts per category (skipped for Chinese sources).
 * 8. Assemble the glossary.
 */

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::context::{ContextSelector, Tokenizer};
use super::merge::merge_and_count;
use super::miner::{EntityRecognizer, KatakanaRecognizer, name_hints, process_text};
use super::morphology::{lemmatize_by_morphology, validate_by_duplication};
use super::term::{
    EntityType, Term, filter_by_count, remove_terms_of_type, replace_terms_of_type, terms_of_type,
};
use crate::app_config::{Config, NerMode};
use crate::enrichment::{ContextProcessor, ProgressCallback, TaskType};
use crate::errors::GlossaryError;
use crate::language_utils::{Language, detect_language};
use crate::providers::ChatClient;

/// Share of classified lines under which the input is reported as mixed-language
pub const MIXED_LANGUAGE_PROPORTION: f64 = 75.0;

/// One glossary line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Primary translation, empty when none was obtained
    pub translation: String,
    pub count: usize,
    /// Readable digest of everything learned about the term
    pub description: String,
}

/// Surface to entry, ordered by surface for stable output
pub type Glossary = BTreeMap<String, GlossaryEntry>;

/// Build the glossary from the final term set.
///
/// A surface kept under two entity types yields one entry, the more frequent.
pub fn to_glossary(terms: &[Term]) -> Glossary {
    let mut glossary = Glossary::new();

    for term in terms.iter().filter(|term| !term.is_removed()) {
        if let Some(existing) = glossary.get(&term.surface) {
            if existing.count >= term.count {
                continue;
            }
        }
        glossary.insert(
            term.surface.clone(),
            GlossaryEntry {
                translation: term.translation().to_string(),
                count: term.count,
                description: term.describe(),
            },
        );
    }

    glossary
}

/// Katakana-only glossary without any backend call
pub fn extract_katakana_glossary(content: &str, threshold: usize) -> Glossary {
    info!("Looking up katakana terms seen at least {} time(s)", threshold);
    let processed = process_text(content);
    let terms = KatakanaRecognizer::new(threshold).recognize(&processed.lines);
    info!("Found {} katakana term(s)", terms.len());
    to_glossary(&terms)
}

/// Runs the full pipeline for one input
pub struct GlossaryGenerator {
    config: Config,
    processor: ContextProcessor,
    recognizer: Arc<dyn EntityRecognizer>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl GlossaryGenerator {
    /// Create a generator; fails on an invalid configuration
    pub fn new(
        config: Config,
        client: Arc<dyn ChatClient>,
        tokenizer: Arc<dyn Tokenizer>,
        recognizer: Arc<dyn EntityRecognizer>,
    ) -> Result<Self, GlossaryError> {
        config.validate().map_err(|e| GlossaryError::Config(format!("{:#}", e)))?;
        let processor = ContextProcessor::new(client, config.to_worker_config());

        Ok(Self {
            config,
            processor,
            recognizer,
            tokenizer,
        })
    }

    /// Report batch progress as (settled, total)
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.processor = self.processor.with_progress(progress);
        self
    }

    /// Generate the glossary for `content`
    pub async fn generate(&self, content: &str) -> Result<Glossary, GlossaryError> {
        let terms = self.generate_terms(content).await?;
        Ok(to_glossary(&terms))
    }

    /// Run the pipeline and return the enriched terms
    pub async fn generate_terms(&self, content: &str) -> Result<Vec<Term>, GlossaryError> {
        let processed = process_text(content);
        let lines = processed.lines;
        let language = self.detect(&lines);

        info!("Looking up named entities");
        let mut observations = self.recognizer.recognize(&lines);
        let mut counts_are_final = self.recognizer.counts_are_final();
        if self.config.ner_mode == NerMode::External && !processed.names.is_empty() {
            info!("Adding {} speaker name(s) as person candidates", processed.names.len());
            observations.extend(name_hints(&processed.names));
            counts_are_final = false;
        }

        let mut terms = if counts_are_final {
            info!("Recognizer counts are final, skipping merge");
            observations
        } else {
            info!("Merging duplicates and counting occurrences");
            merge_and_count(observations, &lines, language)
        };

        let mut selector = ContextSelector::new(self.tokenizer.clone());
        info!("Selecting contexts for {} term(s)", terms.len());
        selector.assign_contexts(&mut terms, &lines);
        terms = self.apply_count_threshold(terms);

        let mut backend_checked = false;

        info!("Classifying person terms");
        let persons = terms_of_type(&terms, EntityType::Person);
        let persons = self.enrich(persons, TaskType::SummarizeContext, &mut backend_checked).await?;
        let persons = remove_terms_of_type(persons, EntityType::Removed);
        terms = replace_terms_of_type(terms, persons, EntityType::Person);

        info!("Checking terms against person names");
        terms = validate_by_duplication(terms, self.config.duplication_min_length);
        terms = remove_terms_of_type(terms, EntityType::Removed);

        if language == Language::Jp {
            info!("Recovering name roots");
            terms = lemmatize_by_morphology(terms, &self.config.blacklist);
            terms = remove_terms_of_type(terms, EntityType::Removed);
            terms = merge_and_count(terms, &lines, language);
            selector.assign_contexts(&mut terms, &lines);
            terms = self.apply_count_threshold(terms);
        }

        if language == Language::Zh {
            info!("Source text is Chinese, skipping translation");
            return Ok(terms);
        }

        if self.config.translate_surface {
            info!("Translating surfaces");
            terms = self.enrich(terms, TaskType::TranslateSurface, &mut backend_checked).await?;
        }

        for entity_type in EntityType::LIVE {
            let enabled = if entity_type == EntityType::Person {
                self.config.translate_context_person
            } else {
                self.config.translate_context_other
            };
            if !enabled {
                continue;
            }

            let mut subset = terms_of_type(&terms, entity_type);
            if subset.is_empty() {
                continue;
            }
            info!("Translating contexts of {} term(s) of type {}", subset.len(), entity_type.display_name());
            if let Some(threshold) = self.config.context_clip_tokens {
                for term in subset.iter_mut() {
                    term.context = selector.clip_context(&term.context, threshold);
                }
            }
            let subset = self.enrich(subset, TaskType::TranslateContext, &mut backend_checked).await?;
            terms = replace_terms_of_type(terms, subset, entity_type);
        }

        info!("Glossary ready with {} term(s)", terms.len());
        Ok(terms)
    }

    /// Majority language of the input, English when nothing classifies
    fn detect(&self, lines: &[String]) -> Language {
        info!("Detecting source language");
        let detection = detect_language(lines);

        match detection.language {
            Some(language) => {
                info!("Detected {} covering {:.1}% of lines", language.display_name(), detection.proportion);
                if detection.proportion < MIXED_LANGUAGE_PROPORTION {
                    warn!("Input looks multilingual; continuing with the majority language {}", language.display_name());
                }
                language
            }
            None => {
                warn!("No known script found in the input; continuing as {}", Language::En.display_name());
                Language::En
            }
        }
    }

    fn apply_count_threshold(&self, terms: Vec<Term>) -> Vec<Term> {
        let (kept, dropped) = filter_by_count(terms, self.config.count_threshold);
        info!(
            "Dropped {} term(s) seen fewer than {} time(s), {} left",
            dropped,
            self.config.count_threshold,
            kept.len()
        );
        kept
    }

    /// Run a batch task, checking the backend once before the first request
    async fn enrich(
        &self,
        terms: Vec<Term>,
        task_type: TaskType,
        backend_checked: &mut bool,
    ) -> Result<Vec<Term>, GlossaryError> {
        if terms.is_empty() {
            return Ok(terms);
        }
        if !*backend_checked {
            self.processor.api_test().await?;
            *backend_checked = true;
        }

        let outcome = self.processor.do_task(terms, task_type).await;
        Ok(outcome.terms)
    }
}
