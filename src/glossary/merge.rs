/*!
 * Merge, threshold and count term observations.
 */

use std::collections::HashMap;

use log::debug;

use super::term::{EntityType, Term, TermKey};
use crate::language_utils::Language;

/// Upper bound for a merged confidence
pub const MAX_CONFIDENCE: f64 = 0.9999;

/// Minimum mean confidence per language, for persons and for everything else
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceThreshold {
    pub person: f64,
    pub other: f64,
}

impl ConfidenceThreshold {
    /// No reference data exists to tune these per language yet
    pub fn for_language(_language: Language) -> Self {
        Self {
            person: 0.8,
            other: 0.8,
        }
    }

    fn accepts(&self, term: &Term) -> bool {
        match term.entity_type {
            EntityType::Person => term.confidence >= self.person,
            _ => term.confidence >= self.other,
        }
    }
}

/// Replace every occurrence of `surface` with a same-length run of `#`
pub fn mask_occurrences(text: &str, surface: &str) -> String {
    if surface.is_empty() {
        return text.to_string();
    }
    text.replace(surface, &"#".repeat(surface.chars().count()))
}

/// Merge duplicate observations and count occurrences in `lines`.
///
/// Observations sharing an identity key collapse into their first occurrence
/// with the mean confidence. Survivors are counted per entity type, longest
/// surface first, masking each counted surface so a shorter term never counts
/// occurrences that belong to a longer one. Terms counted zero times are kept;
/// frequency filtering is a separate step. Output is sorted by descending count.
pub fn merge_and_count(terms: Vec<Term>, lines: &[String], language: Language) -> Vec<Term> {
    let threshold = ConfidenceThreshold::for_language(language);

    let mut order: Vec<TermKey> = Vec::new();
    let mut groups: HashMap<TermKey, (Term, f64, usize)> = HashMap::new();
    for term in terms {
        let key = term.key();
        match groups.get_mut(&key) {
            Some((_, sum, seen)) => {
                *sum += term.confidence;
                *seen += 1;
            }
            None => {
                order.push(key.clone());
                let confidence = term.confidence;
                groups.insert(key, (term, confidence, 1));
            }
        }
    }

    let mut by_type: Vec<(EntityType, Vec<Term>)> = Vec::new();
    for key in order {
        let Some((mut term, sum, seen)) = groups.remove(&key) else {
            continue;
        };
        term.confidence = (sum / seen as f64).min(MAX_CONFIDENCE);
        if !threshold.accepts(&term) {
            debug!("Dropping {} - {} below confidence threshold ({:.3})", term.surface, term.entity_type, term.confidence);
            continue;
        }
        match by_type.iter_mut().find(|(entity_type, _)| *entity_type == term.entity_type) {
            Some((_, bucket)) => bucket.push(term),
            None => by_type.push((term.entity_type, vec![term])),
        }
    }

    let joined = lines.concat();
    let mut counted = Vec::new();
    for (_, mut bucket) in by_type {
        bucket.sort_by(|a, b| b.surface.chars().count().cmp(&a.surface.chars().count()));

        let mut working = joined.clone();
        for mut term in bucket {
            term.count = if term.surface.is_empty() {
                0
            } else {
                working.matches(term.surface.as_str()).count()
            };
            working = mask_occurrences(&working, &term.surface);
            counted.push(term);
        }
    }

    counted.sort_by(|a, b| b.count.cmp(&a.count));
    counted
}
