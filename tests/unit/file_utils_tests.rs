/*!
 * Tests for file utility functions
 */

use std::fs;

use glossgen::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

/// Test file and directory existence checks
#[test]
fn test_exists_checks_shouldDistinguishFilesAndDirs() {
    let dir = create_temp_dir().unwrap();
    let file = create_test_file(dir.path(), "story.txt", "アリス").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::dir_exists(&file));
    assert!(FileManager::dir_exists(dir.path()));
    assert!(!FileManager::file_exists(dir.path().join("missing.txt")));
}

#[test]
fn test_generate_output_path_shouldSitNextToInput() {
    let dir = create_temp_dir().unwrap();
    let file = create_test_file(dir.path(), "chapter1.txt", "アリス").unwrap();

    assert_eq!(FileManager::generate_output_path(&file), dir.path().join("chapter1.glossary.json"));
    assert_eq!(FileManager::generate_output_path(dir.path()), dir.path().join("glossary.json"));
}

#[test]
fn test_find_input_files_shouldKeepKnownExtensionsSorted() {
    let dir = create_temp_dir().unwrap();
    let nested = dir.path().join("scenes");
    fs::create_dir_all(&nested).unwrap();

    create_test_file(dir.path(), "b.txt", "ボブ").unwrap();
    create_test_file(dir.path(), "a.JSON", "{}").unwrap();
    create_test_file(dir.path(), "notes.md", "skip").unwrap();
    create_test_file(&nested, "c.txt", "カイ").unwrap();

    let files = FileManager::find_input_files(dir.path()).unwrap();
    assert_eq!(
        files,
        vec![dir.path().join("a.JSON"), dir.path().join("b.txt"), nested.join("c.txt")]
    );
}

#[test]
fn test_read_input_withDirectory_shouldJoinNormalizedLines() {
    let dir = create_temp_dir().unwrap();
    create_test_file(dir.path(), "01.txt", "アリスは笑った\n").unwrap();
    create_test_file(
        dir.path(),
        "02.json",
        r#"[{"name": "ボブ", "message": "\\C[4]こんにちは"}, {"message": "さようなら"}]"#,
    )
    .unwrap();

    let text = FileManager::read_input(dir.path()).unwrap();
    assert_eq!(text, "アリスは笑った\nこんにちは\nさようなら");
}

#[test]
fn test_read_input_withMissingOrEmptyPath_shouldFail() {
    let dir = create_temp_dir().unwrap();
    assert!(FileManager::read_input(dir.path().join("missing")).is_err());
    assert!(FileManager::read_input(dir.path()).is_err());
}

#[test]
fn test_write_to_file_shouldCreateParents() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("out").join("glossary.json");

    FileManager::write_to_file(&path, "{}").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
}
