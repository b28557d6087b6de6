/*!
 * Prompt templates for the enrichment tasks.
 *
 * Every template is a single user message with `{placeholder}` variables.
 * JSON-returning templates spell out the exact keys the parsers expect.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"));

/// A prompt template with `{name}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    /// Minimal request used to check that the backend answers at all
    pub const API_TEST: &'static str = r#"Reply with the single word "OK"."#;

    /// Decide whether a term is a personal name and summarize its role
    pub const SUMMARIZE_CONTEXT: &'static str = r#"Read the passages below that mention the term "{surface}" and analyse it step by step.

## Steps
1. Read every sentence and pay attention to each place the term appears, its role in the sentence and its relation to other words.
2. Summarize, in {target_language}, the relationships and plot background connected to the term.
3. Using the criteria below, decide whether the term is a personal name. If it is, also decide the gender of the character.

## Criteria
1. A form of address or honorific is not a name.
2. A word describing a place, facility, event, item or organization is not a name.
3. A word describing a state, action, feeling, appearance or other attribute is not a name.
4. A word describing an occupation, title, position or family relation is not a name.
5. If none of the above applies, the term is a name.

## Passages
{context}

Write `summary` and `basis` in {target_language}. Answer `is_name` and `sex` with the English words shown, whatever the language of the rest.
Answer with JSON only, containing exactly these keys and no other text:
{
"summary": "<summary of the story>",
"basis": "<short reason for the decision>",
"is_name": "<yes/no/unknown>",
"sex": "<male/female/unknown>"
}"#;

    /// Translate the passages around a term
    pub const TRANSLATE_CONTEXT: &'static str = r#"Read the passages below that mention "{surface}" and translate them into {target_language}.

## Steps
1. Read and understand every sentence so that nothing is translated out of context.
2. Translate sentence by sentence, keeping the original formatting and symbols and adding no pronouns or symbols absent from the source.
3. Review the result against the context: pronouns must be used correctly and the text must read naturally.

## Passages
{context}

Answer in {target_language} with the translated lines only, one per line, without numbering or any other text."#;

    /// Translate a non-person term
    pub const TRANSLATE_SURFACE_COMMON: &'static str = r#"Translate the proper noun below into {target_language} in two different ways and give its romanized reading.

## Proper noun
{surface}

Answer with JSON only, containing exactly these keys and no other text:
{
"translation_1": "<first translation>",
"translation_2": "<second translation>",
"romaji": "<romanized reading>",
"description": "<notes on the translation>"
}"#;

    /// Translate a character name, with the gender found by classification
    pub const TRANSLATE_SURFACE_PERSON: &'static str = r#"Translate the name of the character below, whose gender is {attribute}, into {target_language} in two different ways and give its romanized reading.

## Character name
{surface}

Answer with JSON only, containing exactly these keys and no other text:
{
"translation_1": "<first translation, usually a transliteration>",
"translation_2": "<second translation>",
"romaji": "<romanized reading>",
"description": "<notes on the translation>"
}"#;

    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Substitute every `{name}` placeholder found in `vars` in a single pass.
    ///
    /// Substituted values are never scanned again; unknown placeholders and
    /// JSON braces are kept as written.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(self.template, |caps: &Captures| {
                vars.iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
