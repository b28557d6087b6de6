/*!
 * Context window selection.
 *
 * Each term gets a handful of supporting lines from the source, packed
 * greedily under a token budget. Occurrences that belong to a longer term
 * containing this one are masked first so they do not pollute the context.
 */

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tiktoken_rs::{CoreBPE, cl100k_base};

use super::merge::mask_occurrences;
use super::term::Term;
use crate::errors::GlossaryError;

/// Token budget for a term's context
pub const CONTEXT_TOKEN_BUDGET: usize = 768;

/// Token counting capability; must be deterministic for caching to be sound
pub trait Tokenizer: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/// BPE tokenizer matching the encoding used by chat-completion backends
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    pub fn new() -> Result<Self, GlossaryError> {
        let bpe = cl100k_base().map_err(|e| GlossaryError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// One token per character
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count()
    }
}

/// Token lengths of lines seen during one run, keyed on exact text
#[derive(Debug, Default)]
pub struct TokenLengthCache {
    lengths: HashMap<String, usize>,
}

impl TokenLengthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    fn length_of(&mut self, tokenizer: &dyn Tokenizer, line: &str) -> usize {
        if let Some(length) = self.lengths.get(line) {
            return *length;
        }
        let length = tokenizer.count_tokens(line);
        self.lengths.insert(line.to_string(), length);
        length
    }
}

/// Greedy packing shared by selection and clipping.
///
/// Lines longer than the budget are skipped; packing stops at the first line
/// that would overflow it.
fn pack(candidates: &[(String, usize)], budget: usize) -> Vec<String> {
    let mut packed = Vec::new();
    let mut used = 0usize;

    for (line, length) in candidates {
        if *length > budget {
            continue;
        }
        if used + length > budget {
            break;
        }
        packed.push(line.clone());
        used += length;
    }

    packed
}

/// Per-run context selector; owns the token-length cache for the run
pub struct ContextSelector {
    tokenizer: Arc<dyn Tokenizer>,
    cache: TokenLengthCache,
    budget: usize,
}

impl ContextSelector {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self::with_budget(tokenizer, CONTEXT_TOKEN_BUDGET)
    }

    pub fn with_budget(tokenizer: Arc<dyn Tokenizer>, budget: usize) -> Self {
        Self {
            tokenizer,
            cache: TokenLengthCache::new(),
            budget,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn cache(&self) -> &TokenLengthCache {
        &self.cache
    }

    /// Token length of a line, computed once per run
    pub fn token_length(&mut self, line: &str) -> usize {
        self.cache.length_of(self.tokenizer.as_ref(), line)
    }

    /// Select supporting lines for `surface`.
    ///
    /// `surfaces` are all term surfaces of the run; those strictly containing
    /// `surface` are masked out of every line before matching. Candidates are
    /// taken longest first (ties by text) while they fit the budget. When none
    /// fits, the line exceeding the budget by the least is used alone.
    pub fn search_context(&mut self, surface: &str, surfaces: &[&str], lines: &[String]) -> Vec<String> {
        if surface.is_empty() {
            return Vec::new();
        }

        let mut superstrings: Vec<&str> = surfaces
            .iter()
            .copied()
            .filter(|other| *other != surface && other.contains(surface))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        superstrings.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates: Vec<(String, usize)> = Vec::new();
        for line in lines {
            let mut masked = line.clone();
            for superstring in &superstrings {
                if masked.contains(superstring) {
                    masked = mask_occurrences(&masked, superstring);
                }
            }
            if !masked.contains(surface) || seen.contains(&masked) {
                continue;
            }
            let length = self.token_length(&masked);
            seen.insert(masked.clone());
            candidates.push((masked, length));
        }

        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let context = pack(&candidates, self.budget);
        if !context.is_empty() {
            return context;
        }

        candidates
            .iter()
            .filter(|(_, length)| *length > self.budget)
            .min_by_key(|(_, length)| *length - self.budget)
            .map(|(line, _)| vec![line.clone()])
            .unwrap_or_default()
    }

    /// Assign a fresh context to every term
    pub fn assign_contexts(&mut self, terms: &mut [Term], lines: &[String]) {
        let surfaces: Vec<String> = terms.iter().map(|term| term.surface.clone()).collect();
        let surface_refs: Vec<&str> = surfaces.iter().map(String::as_str).collect();

        for term in terms.iter_mut() {
            term.context = self.search_context(&term.surface, &surface_refs, lines);
        }
    }

    /// Re-pack an assigned context under a different budget.
    ///
    /// Falls back to the single line whose length is closest to `threshold`
    /// when nothing fits.
    pub fn clip_context(&mut self, context: &[String], threshold: usize) -> Vec<String> {
        if context.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<(String, usize)> = context
            .iter()
            .map(|line| (line.clone(), self.token_length(line)))
            .collect();

        let clipped = pack(&candidates, threshold);
        if !clipped.is_empty() {
            return clipped;
        }

        let mut closest = &candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1.abs_diff(threshold) < closest.1.abs_diff(threshold) {
                closest = candidate;
            }
        }
        vec![closest.0.clone()]
    }
}
