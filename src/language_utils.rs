use serde::{Deserialize, Serialize};

use crate::script::{is_cjk, is_hangul, is_kana, is_latin};

/// Language detection for source documents
///
/// Every non-blank line votes for one language based on the scripts it is
/// written in; the document language is the one with the most votes.
/// Detectable source languages, in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    Jp,
    Kr,
    Zh,
    En,
}

impl Language {
    /// All languages, highest tie-break priority first
    pub const PRIORITY: [Language; 4] = [Language::Jp, Language::Kr, Language::Zh, Language::En];

    /// Short tag used in logs
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Jp => "JP",
            Self::Kr => "KR",
            Self::Zh => "ZH",
            Self::En => "EN",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Jp => "Japanese",
            Self::Kr => "Korean",
            Self::Zh => "Chinese",
            Self::En => "English",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Jp => 0,
            Self::Kr => 1,
            Self::Zh => 2,
            Self::En => 3,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Result of document-level language detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanguageDetection {
    /// Majority language, `None` when no line could be classified
    pub language: Option<Language>,
    /// Share of classified lines that voted for the majority, in percent
    pub proportion: f64,
}

/// Classify a single line, `None` when no character belongs to a known script.
///
/// Kana votes Japanese and hangul votes Korean. Ideographs vote Chinese unless
/// the line also carries kana or hangul, in which case they are read as kanji
/// or hanja and vote with the other script.
pub fn classify_line(line: &str) -> Option<Language> {
    let mut counts = [0usize; 4];
    let mut ideographs = 0usize;

    for ch in line.chars() {
        if is_kana(ch) {
            counts[Language::Jp.index()] += 1;
        } else if is_hangul(ch) {
            counts[Language::Kr.index()] += 1;
        } else if is_cjk(ch) {
            ideographs += 1;
        } else if is_latin(ch) {
            counts[Language::En.index()] += 1;
        }
    }

    if counts[Language::Jp.index()] > 0 {
        counts[Language::Jp.index()] += ideographs;
    } else if counts[Language::Kr.index()] > 0 {
        counts[Language::Kr.index()] += ideographs;
    } else {
        counts[Language::Zh.index()] += ideographs;
    }

    // Every ratio shares the line length as denominator, so comparing counts is enough
    let mut best: Option<(Language, usize)> = None;
    for language in Language::PRIORITY {
        let count = counts[language.index()];
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((language, count)),
        }
    }

    best.map(|(language, _)| language)
}

/// Detect the majority language of a document given its lines
pub fn detect_language<S: AsRef<str>>(lines: &[S]) -> LanguageDetection {
    let mut votes = [0usize; 4];

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        if let Some(language) = classify_line(line) {
            votes[language.index()] += 1;
        }
    }

    let total: usize = votes.iter().sum();
    if total == 0 {
        return LanguageDetection {
            language: None,
            proportion: 0.0,
        };
    }

    let mut majority = Language::PRIORITY[0];
    for language in Language::PRIORITY {
        if votes[language.index()] > votes[majority.index()] {
            majority = language;
        }
    }

    LanguageDetection {
        language: Some(majority),
        proportion: votes[majority.index()] as f64 / total as f64 * 100.0,
    }
}
