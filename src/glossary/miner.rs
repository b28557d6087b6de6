/*!
 * Candidate mining: raw text normalization and term recognition.
 *
 * Story text exported from game engines is full of control codes. Lines are
 * normalized before anything else looks at them so that every later stage
 * (counting, context selection, prompts) sees the same text.
 */

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::term::{EntityType, Term};

/// Confidence given to katakana-run candidates; the heuristic has no real score
pub const KATAKANA_CONFIDENCE: f64 = 0.9;

/// Confidence given to speaker names found in structured input
pub const NAME_HINT_CONFIDENCE: f64 = 0.9;

static FONT_SCALE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\{|\\\}").expect("font scale pattern is valid"));

static SLASH_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/[A-Z]{1,5}\[\d+\]").expect("slash code pattern is valid"));

static BACKSLASH_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\\[A-Z]{1,5}\[\d+\]").expect("backslash code pattern is valid"));

static NAME_ESCAPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\\[A-Z]{1,5}\[").expect("name escape pattern is valid"));

static INLINE_WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S ]+").expect("whitespace pattern is valid"));

static MULTI_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("space pattern is valid"));

static KATAKANA_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{30A0}-\u{30FF}]{2,}").expect("katakana pattern is valid"));

/// Normalized input ready for mining
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedText {
    /// One entry per source line, control codes removed
    pub lines: Vec<String>,
    /// Speaker names taken from structured input
    pub names: Vec<String>,
}

/// Remove engine control codes and stray whitespace from a single line
pub fn normalize_line(line: &str) -> String {
    // `\N[12]` stands for a character name; keep the id so the speaker stays identifiable
    let line = line.trim().replace("\\N", "");
    let line = FONT_SCALE_REGEX.replace_all(&line, "");
    let line = SLASH_CODE_REGEX.replace_all(&line, "");
    let line = BACKSLASH_CODE_REGEX.replace_all(&line, "");
    let line = NAME_ESCAPE_REGEX.replace_all(&line, "[");
    let line = line.replace("【】", "");
    let line = INLINE_WHITESPACE_REGEX.replace_all(&line, "");
    let line = MULTI_SPACE_REGEX.replace_all(&line, " ");
    line.trim().to_string()
}

/// Structured exports: an object of `line -> translation` pairs, or an array
/// of `{name, message}` records. Returns `None` for anything else.
fn read_json_content(content: &str) -> Option<(Vec<String>, Vec<String>)> {
    let data: Value = serde_json::from_str(content).ok()?;

    match &data {
        Value::Object(map) if map.values().all(Value::is_string) => {
            let lines = map.keys().cloned().collect();
            Some((lines, Vec::new()))
        }
        Value::Array(items) => {
            let well_formed = items.iter().all(|item| match item {
                Value::Object(record) => ["name", "message"]
                    .iter()
                    .all(|field| record.get(*field).is_none_or(Value::is_string)),
                _ => false,
            });
            if !well_formed {
                return None;
            }

            let mut lines = Vec::new();
            let mut names = Vec::new();
            for item in items {
                if let Some(name) = item.get("name").and_then(Value::as_str).map(str::trim) {
                    if !name.is_empty() {
                        names.push(name.to_string());
                    }
                }
                if let Some(message) = item.get("message").and_then(Value::as_str).map(str::trim) {
                    if !message.is_empty() {
                        lines.push(message.to_string());
                    }
                }
            }
            Some((lines, names))
        }
        _ => None,
    }
}

/// Split raw input into normalized lines, reading structured exports when the
/// whole payload is one of the supported JSON shapes.
pub fn process_text(content: &str) -> ProcessedText {
    let (raw_lines, names) = match read_json_content(content) {
        Some((lines, names)) => {
            debug!("Structured input: {} lines, {} speaker names", lines.len(), names.len());
            (lines, names)
        }
        None => (content.lines().map(str::to_string).collect(), Vec::new()),
    };

    ProcessedText {
        lines: raw_lines.iter().map(|line| normalize_line(line)).collect(),
        names,
    }
}

/// Count every maximal run of two or more katakana characters in first-seen order
pub fn count_katakana_runs(text: &str) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for found in KATAKANA_RUN_REGEX.find_iter(text) {
        let surface = found.as_str();
        match counts.get_mut(surface) {
            Some(count) => *count += 1,
            None => {
                counts.insert(surface.to_string(), 1);
                order.push(surface.to_string());
            }
        }
    }

    order
        .into_iter()
        .map(|surface| {
            let count = counts[&surface];
            (surface, count)
        })
        .collect()
}

/// Named-entity recognition capability.
///
/// Implementations return raw observations; the same identity key may appear
/// several times with different confidences.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, lines: &[String]) -> Vec<Term>;

    /// Whether the observations already carry final counts and can skip merging
    fn counts_are_final(&self) -> bool {
        false
    }
}

/// Deterministic recognizer keeping katakana runs seen often enough
#[derive(Debug, Clone)]
pub struct KatakanaRecognizer {
    count_threshold: usize,
    final_counts: bool,
}

impl KatakanaRecognizer {
    pub fn new(count_threshold: usize) -> Self {
        Self {
            count_threshold,
            final_counts: true,
        }
    }

    /// Report runs as plain observations so they go through merge and recount
    pub fn as_observations(mut self) -> Self {
        self.final_counts = false;
        self
    }
}

impl EntityRecognizer for KatakanaRecognizer {
    fn recognize(&self, lines: &[String]) -> Vec<Term> {
        let text = lines.join("\n");
        let mut terms: Vec<Term> = count_katakana_runs(&text)
            .into_iter()
            .filter(|(_, count)| *count >= self.count_threshold)
            .map(|(surface, count)| Term::new(surface, EntityType::Unknown, count, KATAKANA_CONFIDENCE))
            .collect();

        terms.sort_by(|a, b| b.count.cmp(&a.count));
        terms
    }

    fn counts_are_final(&self) -> bool {
        self.final_counts
    }
}

/// Turn speaker names from structured input into person observations
pub fn name_hints(names: &[String]) -> Vec<Term> {
    names
        .iter()
        .map(|name| Term::new(name.clone(), EntityType::Person, 0, NAME_HINT_CONFIDENCE))
        .collect()
}
