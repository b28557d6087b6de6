/*!
 * Term model shared by every pipeline stage.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse entity category of a term.
///
/// `Removed` is a tombstone: stages tag terms instead of dropping them so that
/// iteration over the working set stays stable, and the pipeline filters them
/// out between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "PER")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "PRD")]
    Product,
    #[serde(rename = "EVT")]
    Event,
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "REMOVED")]
    Removed,
}

impl EntityType {
    /// Categories a live term can have
    pub const LIVE: [EntityType; 6] = [
        EntityType::Person,
        EntityType::Organization,
        EntityType::Location,
        EntityType::Product,
        EntityType::Event,
        EntityType::Unknown,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Person => "PER",
            Self::Organization => "ORG",
            Self::Location => "LOC",
            Self::Product => "PRD",
            Self::Event => "EVT",
            Self::Unknown => "UNKNOWN",
            Self::Removed => "REMOVED",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Location => "location",
            Self::Product => "item",
            Self::Event => "event",
            Self::Unknown => "unknown",
            Self::Removed => "removed",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Identity of a term: the same surface under two entity types is two terms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermKey {
    pub surface: String,
    pub entity_type: EntityType,
}

impl TermKey {
    pub fn new(surface: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            surface: surface.into(),
            entity_type,
        }
    }
}

/// Raw backend replies kept for debugging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResponses {
    pub summarize_context: String,
    pub translate_surface: String,
    pub translate_context: String,
}

/// A glossary candidate and everything the pipeline learns about it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub surface: String,
    pub entity_type: EntityType,
    /// Occurrences in the normalized text after substring suppression
    pub count: usize,
    /// Recognition confidence in [0, 1)
    pub confidence: f64,
    /// Supporting lines, bounded by a token budget
    pub context: Vec<String>,
    /// Free-form attribute, the inferred gender for persons
    pub attribute: String,
    pub surface_translations: Vec<String>,
    pub romanization: String,
    pub translation_note: String,
    pub context_translation: Vec<String>,
    /// Structured classification reply, when one was obtained
    pub context_summary: Option<Value>,
    #[serde(default)]
    pub raw_responses: RawResponses,
}

impl Term {
    pub fn new(surface: impl Into<String>, entity_type: EntityType, count: usize, confidence: f64) -> Self {
        Self {
            surface: surface.into(),
            entity_type,
            count,
            confidence,
            context: Vec::new(),
            attribute: String::new(),
            surface_translations: Vec::new(),
            romanization: String::new(),
            translation_note: String::new(),
            context_translation: Vec::new(),
            context_summary: None,
            raw_responses: RawResponses::default(),
        }
    }

    pub fn key(&self) -> TermKey {
        TermKey::new(self.surface.clone(), self.entity_type)
    }

    pub fn is_removed(&self) -> bool {
        self.entity_type == EntityType::Removed
    }

    /// Primary translation, empty when the surface was never translated
    pub fn translation(&self) -> &str {
        self.surface_translations
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Readable digest of the enrichment results for the glossary description
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("type: {}", self.entity_type.display_name())];

        if !self.romanization.is_empty() {
            parts.push(format!("romanization: {}", self.romanization));
        }
        let alternatives: Vec<&str> = self
            .surface_translations
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        if !alternatives.is_empty() {
            parts.push(format!("alternatives: {}", alternatives.join(" / ")));
        }
        if !self.attribute.is_empty() {
            parts.push(format!("attribute: {}", self.attribute));
        }
        if !self.translation_note.is_empty() {
            parts.push(format!("note: {}", self.translation_note));
        }
        if let Some(summary) = self
            .context_summary
            .as_ref()
            .and_then(|value| value.get("summary"))
            .and_then(Value::as_str)
        {
            parts.push(format!("summary: {}", summary));
        }

        parts.join("\n")
    }
}

/// Keep only terms of the given type
pub fn terms_of_type(terms: &[Term], entity_type: EntityType) -> Vec<Term> {
    terms
        .iter()
        .filter(|term| term.entity_type == entity_type)
        .cloned()
        .collect()
}

/// Drop every term of the given type
pub fn remove_terms_of_type(terms: Vec<Term>, entity_type: EntityType) -> Vec<Term> {
    terms
        .into_iter()
        .filter(|term| term.entity_type != entity_type)
        .collect()
}

/// Replace every term of `entity_type` with `replacements`
pub fn replace_terms_of_type(terms: Vec<Term>, replacements: Vec<Term>, entity_type: EntityType) -> Vec<Term> {
    let mut kept = remove_terms_of_type(terms, entity_type);
    kept.extend(replacements);
    kept
}

/// Keep terms seen at least `threshold` times; returns the survivors and how many were dropped
pub fn filter_by_count(terms: Vec<Term>, threshold: usize) -> (Vec<Term>, usize) {
    let before = terms.len();
    let kept: Vec<Term> = terms.into_iter().filter(|term| term.count >= threshold).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
