/*!
 * Common test utilities for the glossgen test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use glossgen::glossary::{EntityRecognizer, EntityType, Term};
use glossgen::providers::ChatRequest;
use glossgen::providers::mock::MockChatClient;

/// Route test logs through env_logger; safe to call from every test
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Short Japanese story used across pipeline tests
pub const JAPANESE_STORY: &str = "アリス姫は森に住んでいる。
アリス姫とボブが話した。
ボブ商会の船が来た。
アリス姫は笑った。
先生が来た。";

/// Recognizer returning a fixed list of observations
pub struct FixedRecognizer {
    pub observations: Vec<Term>,
}

impl FixedRecognizer {
    pub fn new(observations: &[(&str, EntityType, f64)]) -> Self {
        Self {
            observations: observations
                .iter()
                .map(|(surface, entity_type, confidence)| Term::new(*surface, *entity_type, 0, *confidence))
                .collect(),
        }
    }
}

impl EntityRecognizer for FixedRecognizer {
    fn recognize(&self, _lines: &[String]) -> Vec<Term> {
        self.observations.clone()
    }
}

/// Text of the single user message of a request
pub fn prompt_of(request: &ChatRequest) -> &str {
    request.messages.first().map(|m| m.content.as_str()).unwrap_or("")
}

/// Canned reply for a prompt, chosen by the JSON keys the prompt asks for
pub fn canned_reply(prompt: &str) -> String {
    if prompt.contains("\"is_name\"") {
        if prompt.contains("\"先生\"") {
            r#"{"summary": "a form of address", "basis": "a title", "is_name": "no", "sex": "unknown"}"#.to_string()
        } else {
            "```json\n{\n\"summary\": \"the heroine\",\n\"basis\": \"addressed by name\",\n\"is_name\": \"yes\",\n\"sex\": \"female\",\n}\n```".to_string()
        }
    } else if prompt.contains("\"translation_1\"") {
        let (first, second, romaji) = if prompt.contains("アリス") {
            ("爱丽丝", "艾莉丝", "arisu")
        } else if prompt.contains("ボブ") {
            ("鲍勃", "波布", "bobu")
        } else {
            ("", "", "")
        };
        format!(
            "{{\"translation_1\": \"{}\", \"translation_2\": \"{}\", \"romaji\": \"{}\", \"description\": \"transliteration\"}}",
            first, second, romaji
        )
    } else if prompt.contains("translated lines only") {
        "第一行\n\n第二行\n".to_string()
    } else {
        "OK".to_string()
    }
}

/// Mock client answering every task with `canned_reply`
pub fn scripted_client() -> MockChatClient {
    MockChatClient::working().with_custom_response(|request| canned_reply(prompt_of(request)))
}
