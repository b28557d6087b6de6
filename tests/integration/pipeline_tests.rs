/*!
 * End-to-end tests of the glossary pipeline against scripted backends
 */

use std::sync::Arc;

use glossgen::app_config::{Config, NerMode};
use glossgen::errors::{GlossaryError, ProviderError};
use glossgen::glossary::{CharTokenizer, EntityRecognizer, EntityType, GlossaryGenerator, KatakanaRecognizer};
use glossgen::providers::mock::MockChatClient;

use crate::common::{FixedRecognizer, JAPANESE_STORY, canned_reply, init_logger, prompt_of, scripted_client};

fn config_with_threshold(count_threshold: usize) -> Config {
    Config {
        count_threshold,
        ..Config::default()
    }
}

fn story_recognizer() -> FixedRecognizer {
    FixedRecognizer::new(&[
        ("アリス姫", EntityType::Person, 0.95),
        ("ボブ", EntityType::Person, 0.9),
        ("ボブ商会", EntityType::Organization, 0.9),
        ("先生", EntityType::Person, 0.9),
    ])
}

fn generator(config: Config, client: &MockChatClient, recognizer: impl EntityRecognizer + 'static) -> GlossaryGenerator {
    GlossaryGenerator::new(config, Arc::new(client.clone()), Arc::new(CharTokenizer), Arc::new(recognizer)).unwrap()
}

#[tokio::test]
async fn test_generate_withJapaneseStory_shouldClassifySplitAndTranslate() {
    init_logger();
    let client = scripted_client();
    let generator = generator(config_with_threshold(1), &client, story_recognizer());

    let glossary = generator.generate(JAPANESE_STORY).await.unwrap();

    let surfaces: Vec<&str> = glossary.keys().map(String::as_str).collect();
    assert_eq!(surfaces, vec!["アリス", "ボブ"]);
    assert_eq!(glossary["アリス"].translation, "爱丽丝");
    assert_eq!(glossary["アリス"].count, 3);
    assert!(glossary["アリス"].description.contains("romanization: arisu"));
    assert_eq!(glossary["ボブ"].translation, "鲍勃");
    assert_eq!(glossary["ボブ"].count, 2);

    // connection test, three classifications, two surfaces, two contexts
    assert_eq!(client.request_count(), 8);
}

#[tokio::test]
async fn test_generate_terms_shouldKeepContextTranslations() {
    let client = scripted_client();
    let generator = generator(config_with_threshold(1), &client, story_recognizer());

    let terms = generator.generate_terms(JAPANESE_STORY).await.unwrap();
    let alice = terms.iter().find(|t| t.surface == "アリス").unwrap();

    assert_eq!(alice.entity_type, EntityType::Person);
    assert_eq!(alice.context.len(), 3);
    assert_eq!(alice.context_translation, vec!["第一行".to_string(), "第二行".to_string()]);
    assert_eq!(alice.raw_responses.translate_context, "第一行\n\n第二行\n");
    assert!(terms.iter().all(|t| t.surface != "先生" && t.surface != "ボブ商会"));
}

#[tokio::test]
async fn test_generate_withFailingSurfaceTranslation_shouldKeepTermUntranslated() {
    let client = MockChatClient::working().with_responder(|request| {
        let prompt = prompt_of(request);
        if prompt.contains("\"translation_1\"") && prompt.contains("ボブ") {
            return Err(ProviderError::ApiError {
                status_code: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(canned_reply(prompt))
    });
    let generator = generator(config_with_threshold(1), &client, story_recognizer());

    let glossary = generator.generate(JAPANESE_STORY).await.unwrap();

    assert_eq!(glossary["アリス"].translation, "爱丽丝");
    assert_eq!(glossary["ボブ"].translation, "");
    assert_eq!(glossary["ボブ"].count, 2);

    let failed_attempts = client
        .requests()
        .iter()
        .filter(|r| prompt_of(r).contains("\"translation_1\"") && prompt_of(r).contains("ボブ"))
        .count();
    assert_eq!(failed_attempts, 3);
}

#[tokio::test]
async fn test_generate_withUnreachableBackend_shouldFailConnectionTest() {
    let client = MockChatClient::failing();
    let generator = generator(config_with_threshold(1), &client, story_recognizer());

    let result = generator.generate(JAPANESE_STORY).await;
    assert!(matches!(result, Err(GlossaryError::ConnectionTest(_))));
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_generate_withChineseSource_shouldSkipTranslation() {
    let client = scripted_client();
    let recognizer = FixedRecognizer::new(&[("李雷", EntityType::Person, 0.9), ("北京", EntityType::Location, 0.9)]);
    let generator = generator(config_with_threshold(1), &client, recognizer);

    let glossary = generator.generate("李雷和韩梅梅在北京见面。\n李雷去了上海。").await.unwrap();

    assert_eq!(glossary["李雷"].count, 2);
    assert_eq!(glossary["李雷"].translation, "");
    assert_eq!(glossary["北京"].count, 1);
    assert_eq!(client.request_count(), 2);
    assert!(client.requests().iter().all(|r| !prompt_of(r).contains("\"translation_1\"")));
}

#[tokio::test]
async fn test_generate_withoutPersons_shouldNotTouchBackendWhenTranslationIsOff() {
    let client = scripted_client();
    let config = Config {
        translate_surface: false,
        translate_context_person: false,
        translate_context_other: false,
        ..config_with_threshold(2)
    };
    let generator = generator(config, &client, KatakanaRecognizer::new(2));

    let glossary = generator.generate("アリスは笑った\nアリスとボブが歩いた\n").await.unwrap();

    assert_eq!(glossary.len(), 1);
    assert_eq!(glossary["アリス"].count, 2);
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_generate_withSpeakerNames_shouldPreferPersonHints() {
    let client = scripted_client();
    let config = Config {
        ner_mode: NerMode::External,
        ..config_with_threshold(1)
    };
    let generator = generator(config, &client, KatakanaRecognizer::new(1).as_observations());

    let export = r#"[
        {"name": "アリス", "message": "アリスは森に住んでいる。"},
        {"name": "アリス", "message": "ボブ、こんにちは。"},
        {"name": "ボブ", "message": "アリス、元気？"}
    ]"#;
    let terms = generator.generate_terms(export).await.unwrap();

    let mut summary: Vec<(&str, EntityType, usize)> =
        terms.iter().map(|t| (t.surface.as_str(), t.entity_type, t.count)).collect();
    summary.sort_by(|a, b| a.0.cmp(b.0));
    assert_eq!(summary, vec![("アリス", EntityType::Person, 2), ("ボブ", EntityType::Person, 1)]);

    // connection test, two classifications, two surfaces, two contexts
    assert_eq!(client.request_count(), 7);
}

#[tokio::test]
async fn test_generate_withClipBudget_shouldShrinkTranslatedContexts() {
    let client = scripted_client();
    let config = Config {
        translate_surface: false,
        context_clip_tokens: Some(1),
        ..config_with_threshold(1)
    };
    let generator = generator(config, &client, story_recognizer());

    let terms = generator.generate_terms(JAPANESE_STORY).await.unwrap();
    let alice = terms.iter().find(|t| t.surface == "アリス").unwrap();

    assert_eq!(alice.context.len(), 1);
    assert!(alice.surface_translations.is_empty());
    assert_eq!(alice.context_translation.len(), 2);
}

#[test]
fn test_generator_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.backend.model = String::new();

    let result = GlossaryGenerator::new(
        config,
        Arc::new(MockChatClient::working()),
        Arc::new(CharTokenizer),
        Arc::new(KatakanaRecognizer::new(1)),
    );
    assert!(matches!(result, Err(GlossaryError::Config(_))));
}
