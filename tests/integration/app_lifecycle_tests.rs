/*!
 * Tests for the controller from input files to written glossaries
 */

use std::fs;
use std::sync::Arc;

use serde_json::Value;

use glossgen::app_config::Config;
use glossgen::app_controller::Controller;

use crate::common::{create_temp_dir, create_test_file, init_logger, scripted_client};

const KATAKANA_TEXT: &str = "アリスは笑った\nアリスとボブが歩いた\nボブとアリス\n";

#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.backend.endpoint = "localhost without scheme".to_string();
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_run_katakana_shouldWriteGlossaryNextToInput() {
    init_logger();
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "story.txt", KATAKANA_TEXT).unwrap();
    let controller = Controller::new_for_test().unwrap();

    let output = controller.run_katakana(&input, None, Some(2)).unwrap();
    assert_eq!(output, dir.path().join("story.glossary.json"));

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["アリス"]["count"], 3);
    assert_eq!(written["ボブ"]["count"], 2);
    assert_eq!(written["アリス"]["translation"], "");
}

#[test]
fn test_run_katakana_withDirectory_shouldUseConfiguredThreshold() {
    let dir = create_temp_dir().unwrap();
    create_test_file(dir.path(), "01.txt", "アリスは笑った\nボブが来た\n").unwrap();
    create_test_file(dir.path(), "02.txt", "アリスが歩いた\n").unwrap();
    let output_path = dir.path().join("out").join("terms.json");

    let config = Config {
        count_threshold: 2,
        ..Config::default()
    };
    let controller = Controller::with_config(config).unwrap();
    let output = controller.run_katakana(dir.path(), Some(output_path.clone()), None).unwrap();

    assert_eq!(output, output_path);
    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let entries = written.as_object().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(written["アリス"]["count"], 2);
}

#[tokio::test]
async fn test_generate_with_client_shouldTranslateKatakanaTerms() {
    init_logger();
    let config = Config {
        count_threshold: 2,
        ..Config::default()
    };
    let controller = Controller::with_config(config).unwrap();
    let client = scripted_client();

    let glossary = controller
        .generate_with_client(KATAKANA_TEXT, Arc::new(client.clone()))
        .await
        .unwrap();

    assert_eq!(glossary.len(), 2);
    assert_eq!(glossary["アリス"].translation, "爱丽丝");
    assert_eq!(glossary["ボブ"].translation, "鲍勃");
    assert!(glossary["ボブ"].description.contains("type: unknown"));

    // connection test, two surfaces, two contexts
    assert_eq!(client.request_count(), 5);
}

#[test]
fn test_write_glossary_shouldProduceSortedJson() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("glossary.json");
    let glossary = glossgen::glossary::extract_katakana_glossary(KATAKANA_TEXT, 1);

    Controller::write_glossary(&path, &glossary).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let alice = text.find("アリス").unwrap();
    let bob = text.find("ボブ").unwrap();
    assert!(alice < bob);
}
