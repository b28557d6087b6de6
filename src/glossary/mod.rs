/*!
 * Glossary extraction.
 *
 * - `term`: the term model and set helpers
 * - `miner`: text normalization and candidate recognition
 * - `merge`: dedup, confidence threshold and substring-safe counting
 * - `context`: token-budgeted context selection
 * - `morphology`: Japanese root recovery and duplication checks
 * - `generator`: the end-to-end pipeline
 */

pub mod context;
pub mod generator;
pub mod merge;
pub mod miner;
pub mod morphology;
pub mod term;

pub use context::{CharTokenizer, ContextSelector, TiktokenTokenizer, Tokenizer};
pub use generator::{Glossary, GlossaryEntry, GlossaryGenerator, extract_katakana_glossary, to_glossary};
pub use miner::{EntityRecognizer, KatakanaRecognizer, ProcessedText, process_text};
pub use term::{EntityType, Term, TermKey};
