/*!
 * Japanese root recovery and duplication checks.
 */

use log::info;

use super::term::{EntityType, Term};
use crate::script::{ScriptClass, extract_japanese_runs, is_cjk, is_valid_term};

/// Split person names written across several scripts into their roots.
///
/// `アリス姫` yields `アリス` (the `姫` run is too short to stand alone) and
/// the original term is tombstoned. Possessive forms (`AのB`) and surfaces
/// that start and end with kanji are left alone. Roots inherit type, count
/// and confidence and are appended after the existing terms; callers are
/// expected to merge and recount afterwards.
pub fn lemmatize_by_morphology(mut terms: Vec<Term>, blacklist: &[String]) -> Vec<Term> {
    let mut roots_found: Vec<Term> = Vec::new();

    for term in terms.iter_mut() {
        if term.entity_type != EntityType::Person {
            continue;
        }
        // Any の is read as a possessive AのB form
        if term.surface.contains('の') {
            continue;
        }
        let (Some(first), Some(last)) = (term.surface.chars().next(), term.surface.chars().last()) else {
            continue;
        };
        if is_cjk(first) && is_cjk(last) {
            continue;
        }

        let runs = extract_japanese_runs(&term.surface);
        if runs.len() <= 1 {
            continue;
        }

        let roots: Vec<String> = runs
            .into_iter()
            .filter(|run| is_valid_term(run, blacklist, ScriptClass::Japanese))
            .collect();
        if roots.is_empty() {
            continue;
        }

        info!("Recovered roots {} - {} => {}", term.entity_type, term.surface, roots.join(" / "));
        for root in roots {
            roots_found.push(Term::new(root, term.entity_type, term.count, term.confidence));
        }
        term.entity_type = EntityType::Removed;
    }

    terms.extend(roots_found);
    terms
}

/// Tombstone non-person terms whose surface contains a person surface.
///
/// Person surfaces shorter than `min_person_length` characters are ignored,
/// 0 disables the guard. Short names otherwise knock out many unrelated
/// terms that merely contain them.
pub fn validate_by_duplication(mut terms: Vec<Term>, min_person_length: usize) -> Vec<Term> {
    let persons: Vec<String> = terms
        .iter()
        .filter(|term| term.entity_type == EntityType::Person)
        .filter(|term| term.surface.chars().count() >= min_person_length)
        .map(|term| term.surface.clone())
        .collect();

    for term in terms.iter_mut() {
        if term.entity_type == EntityType::Person || term.entity_type == EntityType::Removed {
            continue;
        }
        if persons.iter().any(|person| term.surface.contains(person.as_str())) {
            info!("Duplication check removed {} - {}", term.surface, term.entity_type);
            term.entity_type = EntityType::Removed;
        }
    }

    terms
}
