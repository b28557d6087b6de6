/*!
 * # glossgen - Glossary extraction for story text
 *
 * A Rust library that extracts a bilingual glossary (character names,
 * organizations, locations, items, events) from raw story text and enriches
 * it through an OpenAI-compatible chat backend.
 *
 * ## Features
 *
 * - Script classification and document language detection
 * - Katakana-run term mining, with pluggable recognizers
 * - Substring-safe merge and frequency counting
 * - Token-budgeted context selection
 * - Bounded-concurrency batch enrichment with round-based retries
 * - Japanese name root recovery
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `script`: Character script predicates and string helpers
 * - `language_utils`: Line-voting language detection
 * - `glossary`: Term model, mining, merging, contexts and the pipeline
 * - `enrichment`: LLM tasks, prompts, JSON repair and the batch runner
 * - `providers`: Chat-completion clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Scripted client for tests
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(non_snake_case)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod enrichment;
pub mod errors;
pub mod file_utils;
pub mod glossary;
pub mod language_utils;
pub mod providers;
pub mod script;

// Re-export main types for easier usage
pub use app_config::Config;
pub use glossary::{Glossary, GlossaryEntry, GlossaryGenerator, Term};
