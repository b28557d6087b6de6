/*!
 * Unicode script classification.
 *
 * Pure predicates over code points for the scripts the glossary pipeline cares
 * about, plus string-level helpers built on them. Nothing here holds state;
 * every function is O(n) in the characters of its input.
 */

use once_cell::sync::Lazy;
use regex::Regex;

const HIRAGANA: (u32, u32) = (0x3040, 0x309F);
const KATAKANA: (u32, u32) = (0x30A0, 0x30FF);
const KATAKANA_PHONETIC_EXTENSIONS: (u32, u32) = (0x31F0, 0x31FF);
const VOICED_SOUND_MARKS: [u32; 2] = [0x309B, 0x309C];

const HANGUL_JAMO: (u32, u32) = (0x1100, 0x11FF);
const HANGUL_JAMO_EXTENDED_A: (u32, u32) = (0xA960, 0xA97F);
const HANGUL_JAMO_EXTENDED_B: (u32, u32) = (0xD7B0, 0xD7FF);
const HANGUL_SYLLABLES: (u32, u32) = (0xAC00, 0xD7AF);
const HANGUL_COMPATIBILITY_JAMO: (u32, u32) = (0x3130, 0x318F);

const CJK: (u32, u32) = (0x4E00, 0x9FFF);

const GENERAL_PUNCTUATION: (u32, u32) = (0x2000, 0x206F);
const CJK_SYMBOLS_AND_PUNCTUATION: (u32, u32) = (0x3000, 0x303F);
const HALFWIDTH_AND_FULLWIDTH_FORMS: (u32, u32) = (0xFF00, 0xFFEF);
const KATAKANA_MIDDLE_DOT: u32 = 0x30FB;

const LATIN_UPPER: (u32, u32) = (0x0041, 0x005A);
const LATIN_LOWER: (u32, u32) = (0x0061, 0x007A);
const LATIN_SUPPLEMENTAL: (u32, u32) = (0x00A0, 0x00FF);
const LATIN_EXTENDED_A: (u32, u32) = (0x0100, 0x017F);
const LATIN_EXTENDED_B: (u32, u32) = (0x0180, 0x024F);

const LATIN_PUNCTUATION: [(u32, u32); 6] = [
    (0x0020, 0x002F),
    (0x003A, 0x0040),
    (0x005B, 0x0060),
    (0x007B, 0x007E),
    (0x2000, 0x206F),
    (0x2E00, 0x2E7F),
];

/// Maximal runs of a single Japanese script: kanji, hiragana or katakana
static JAPANESE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{4E00}-\u{9FFF}]+|[\u{3040}-\u{309F}]+|[\u{30A0}-\u{30FF}]+")
        .expect("Japanese run pattern is valid")
});

static EDGE_NUMERALS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+|\d+$").expect("numeral pattern is valid"));

#[inline]
fn in_range(code: u32, range: (u32, u32)) -> bool {
    code >= range.0 && code <= range.1
}

pub fn is_hiragana(ch: char) -> bool {
    in_range(ch as u32, HIRAGANA)
}

pub fn is_katakana(ch: char) -> bool {
    in_range(ch as u32, KATAKANA)
}

/// Katakana including the phonetic extensions block and the voiced sound marks
pub fn is_kana_extended(ch: char) -> bool {
    let code = ch as u32;
    in_range(code, KATAKANA_PHONETIC_EXTENSIONS) || VOICED_SOUND_MARKS.contains(&code)
}

/// Hiragana, katakana, katakana extensions and voiced sound marks
pub fn is_kana(ch: char) -> bool {
    is_hiragana(ch) || is_katakana(ch) || is_kana_extended(ch)
}

/// CJK unified ideographs
pub fn is_cjk(ch: char) -> bool {
    in_range(ch as u32, CJK)
}

pub fn is_hangul(ch: char) -> bool {
    let code = ch as u32;
    in_range(code, HANGUL_JAMO)
        || in_range(code, HANGUL_JAMO_EXTENDED_A)
        || in_range(code, HANGUL_JAMO_EXTENDED_B)
        || in_range(code, HANGUL_SYLLABLES)
        || in_range(code, HANGUL_COMPATIBILITY_JAMO)
}

/// Any character that can appear in Japanese words, kanji included
pub fn is_japanese(ch: char) -> bool {
    is_cjk(ch) || is_kana(ch)
}

/// Any character that can appear in Korean words, hanja included
pub fn is_korean(ch: char) -> bool {
    is_cjk(ch) || is_hangul(ch)
}

pub fn is_latin(ch: char) -> bool {
    let code = ch as u32;
    in_range(code, LATIN_UPPER)
        || in_range(code, LATIN_LOWER)
        || in_range(code, LATIN_SUPPLEMENTAL)
        || in_range(code, LATIN_EXTENDED_A)
        || in_range(code, LATIN_EXTENDED_B)
}

pub fn is_cjk_punctuation(ch: char) -> bool {
    let code = ch as u32;
    in_range(code, GENERAL_PUNCTUATION)
        || in_range(code, CJK_SYMBOLS_AND_PUNCTUATION)
        || in_range(code, HALFWIDTH_AND_FULLWIDTH_FORMS)
        || code == KATAKANA_MIDDLE_DOT
}

pub fn is_latin_punctuation(ch: char) -> bool {
    let code = ch as u32;
    LATIN_PUNCTUATION.iter().any(|range| in_range(code, *range))
}

pub fn is_punctuation(ch: char) -> bool {
    is_cjk_punctuation(ch) || is_latin_punctuation(ch)
}

/// Character classes usable with the string-level helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    Hiragana,
    Katakana,
    Cjk,
    Japanese,
    Hangul,
    Korean,
    Latin,
    Punctuation,
}

impl ScriptClass {
    /// Whether `ch` belongs to this class
    pub fn matches(self, ch: char) -> bool {
        match self {
            Self::Hiragana => is_hiragana(ch),
            Self::Katakana => is_katakana(ch),
            Self::Cjk => is_cjk(ch),
            Self::Japanese => is_japanese(ch),
            Self::Hangul => is_hangul(ch),
            Self::Korean => is_korean(ch),
            Self::Latin => is_latin(ch),
            Self::Punctuation => is_punctuation(ch),
        }
    }
}

/// True when every character matches; vacuously true for an empty string
pub fn all_match(text: &str, class: ScriptClass) -> bool {
    text.chars().all(|ch| class.matches(ch))
}

pub fn any_match(text: &str, class: ScriptClass) -> bool {
    text.chars().any(|ch| class.matches(ch))
}

/// Trim, then drop leading and trailing characters that do not belong to `class`
pub fn strip_not_matching(text: &str, class: ScriptClass) -> String {
    text.trim()
        .trim_matches(|ch: char| !class.matches(ch))
        .trim()
        .to_string()
}

/// Trim, then drop leading and trailing punctuation
pub fn strip_punctuation(text: &str) -> String {
    text.trim().trim_matches(is_punctuation).trim().to_string()
}

/// Drop a run of ASCII digits at the start and at the end
pub fn strip_arabic_numerals(text: &str) -> String {
    EDGE_NUMERALS_REGEX.replace_all(text, "").into_owned()
}

/// Drop trailing kanji, e.g. an honorific written in kanji after a kana name
pub fn remove_suffix_cjk(text: &str) -> String {
    text.trim_end_matches(is_cjk).to_string()
}

/// Split a Japanese phrase into maximal kanji / hiragana / katakana runs
pub fn extract_japanese_runs(text: &str) -> Vec<String> {
    JAPANESE_RUN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A candidate is a usable term when it is longer than one character, is not
/// blacklisted and contains at least one character of the target script.
pub fn is_valid_term(surface: &str, blacklist: &[String], class: ScriptClass) -> bool {
    surface.chars().count() > 1
        && !blacklist.iter().any(|banned| banned == surface)
        && any_match(surface, class)
}
