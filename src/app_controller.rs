use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, NerMode};
use crate::file_utils::FileManager;
use crate::glossary::{
    EntityRecognizer, Glossary, GlossaryGenerator, KatakanaRecognizer, TiktokenTokenizer, extract_katakana_glossary,
};
use crate::providers::ChatClient;
use crate::providers::openai::OpenAI;

// @module: Application controller for glossary extraction

/// Main application controller for glossary extraction
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract and enrich a glossary from a file or directory, then write it as JSON
    pub async fn run(&self, input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
        let content = FileManager::read_input(input)?;
        let client: Arc<dyn ChatClient> = Arc::new(OpenAI::new(
            self.config.backend.api_key.clone(),
            self.config.backend.endpoint.clone(),
            Duration::from_secs(self.config.backend.timeout_secs),
        ));

        let glossary = self.generate_with_client(&content, client).await?;
        let output = output.unwrap_or_else(|| FileManager::generate_output_path(input));
        Self::write_glossary(&output, &glossary)?;

        info!("Wrote {} glossary entries to {:?}", glossary.len(), output);
        Ok(output)
    }

    /// Katakana-only extraction, no backend involved
    pub fn run_katakana(&self, input: &Path, output: Option<PathBuf>, threshold: Option<usize>) -> Result<PathBuf> {
        let content = FileManager::read_input(input)?;
        let glossary = extract_katakana_glossary(&content, threshold.unwrap_or(self.config.count_threshold));
        let output = output.unwrap_or_else(|| FileManager::generate_output_path(input));
        Self::write_glossary(&output, &glossary)?;

        info!("Wrote {} katakana entries to {:?}", glossary.len(), output);
        Ok(output)
    }

    /// Run the full pipeline on `content` with the given backend
    pub async fn generate_with_client(&self, content: &str, client: Arc<dyn ChatClient>) -> Result<Glossary> {
        let tokenizer = Arc::new(TiktokenTokenizer::new()?);

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} terms ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let bar = progress_bar.clone();
        let generator = GlossaryGenerator::new(self.config.clone(), client, tokenizer, self.recognizer())?
            .with_progress(Arc::new(move |settled, total| {
                bar.set_length(total as u64);
                bar.set_position(settled as u64);
            }));

        let result = generator.generate(content).await;
        progress_bar.finish_and_clear();
        Ok(result?)
    }

    /// Recognizer for the configured NER mode
    fn recognizer(&self) -> Arc<dyn EntityRecognizer> {
        match self.config.ner_mode {
            NerMode::Traditional => Arc::new(KatakanaRecognizer::new(self.config.count_threshold)),
            // Every run is an observation; the count threshold applies after merging
            NerMode::External => Arc::new(KatakanaRecognizer::new(1).as_observations()),
        }
    }

    /// Serialize a glossary as pretty JSON
    pub fn write_glossary(path: &Path, glossary: &Glossary) -> Result<()> {
        let json = serde_json::to_string_pretty(glossary).context("Failed to serialize glossary")?;
        FileManager::write_to_file(path, &json)
    }
}
