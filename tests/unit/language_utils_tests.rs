/*!
 * Tests for script predicates and language detection
 */

use glossgen::language_utils::{Language, classify_line, detect_language};
use glossgen::script::{ScriptClass, all_match, any_match, is_valid_term, strip_not_matching, strip_punctuation};

#[test]
fn test_detect_language_withChineseMajority_shouldReportProportion() {
    let mut lines: Vec<String> = (0..8).map(|i| format!("他们在第{}个城市里见面了", i)).collect();
    lines.push("They met in the city".to_string());
    lines.push("Another English line".to_string());

    let detection = detect_language(&lines);
    assert_eq!(detection.language, Some(Language::Zh));
    assert!((detection.proportion - 80.0).abs() < 1e-9);
}

#[test]
fn test_detect_language_withKanjiAndKana_shouldVoteJapanese() {
    let lines = ["魔王城に向かった", "王国の騎士です", "Hello"];
    let detection = detect_language(&lines);
    assert_eq!(detection.language, Some(Language::Jp));
}

#[test]
fn test_detect_language_withNoScripts_shouldReportNothing() {
    let lines = ["", "   ", "1234 ... !!!"];
    let detection = detect_language(&lines);
    assert_eq!(detection.language, None);
    assert_eq!(detection.proportion, 0.0);
}

#[test]
fn test_detect_language_withTie_shouldUsePriorityOrder() {
    let lines = ["안녕하세요", "こんにちは"];
    let detection = detect_language(&lines);
    assert_eq!(detection.language, Some(Language::Jp));
    assert_eq!(detection.proportion, 50.0);
}

#[test]
fn test_classify_line_shouldCountLatinAgainstCjk() {
    assert_eq!(classify_line("OK 了"), Some(Language::En));
    assert_eq!(classify_line("了解 OK"), Some(Language::Zh));
    assert_eq!(classify_line("한국어 text"), Some(Language::En));
    assert_eq!(classify_line("..."), None);
}

#[test]
fn test_string_helpers_shouldMatchScriptClasses() {
    assert!(all_match("アリス", ScriptClass::Katakana));
    assert!(!all_match("アリスは", ScriptClass::Katakana));
    assert!(any_match("アリスは", ScriptClass::Hiragana));
    assert_eq!(strip_not_matching("「アリス」!", ScriptClass::Katakana), "アリス");
    assert_eq!(strip_punctuation("「アリス」"), "アリス");
}

#[test]
fn test_is_valid_term_shouldRejectShortBlacklistedAndForeign() {
    let blacklist = vec!["ボブ".to_string()];
    assert!(is_valid_term("アリス", &blacklist, ScriptClass::Japanese));
    assert!(!is_valid_term("ア", &blacklist, ScriptClass::Japanese));
    assert!(!is_valid_term("ボブ", &blacklist, ScriptClass::Japanese));
    assert!(!is_valid_term("Alice", &blacklist, ScriptClass::Japanese));
}
