use anyhow::{Context, Result, anyhow};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::glossary::process_text;

// @module: File and directory utilities

/// Extensions read as story text
pub const INPUT_EXTENSIONS: [&str; 2] = ["txt", "json"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Default glossary path next to the input
    // @params: input path, file or directory
    pub fn generate_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
        let input = input.as_ref();

        if input.is_dir() {
            return input.join("glossary.json");
        }

        let stem = input.file_stem().unwrap_or_default().to_string_lossy().to_string();
        let parent = input.parent().unwrap_or(Path::new("."));
        parent.join(format!("{}.glossary.json", stem))
    }

    /// Find story files under a directory, sorted by path
    pub fn find_input_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy();
                    if INPUT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read the text of an input file or of every story file in a directory.
    ///
    /// Files of a directory are flattened to their normalized lines and
    /// concatenated, so structured exports contribute their dialogue only.
    pub fn read_input<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();

        if Self::file_exists(path) {
            return Self::read_to_string(path);
        }
        if !Self::dir_exists(path) {
            return Err(anyhow!("Input path does not exist: {:?}", path));
        }

        let files = Self::find_input_files(path)?;
        if files.is_empty() {
            return Err(anyhow!("No .txt or .json files found in {:?}", path));
        }

        let mut lines = Vec::new();
        for file in &files {
            debug!("Reading {:?}", file);
            let content = Self::read_to_string(file)?;
            lines.extend(process_text(&content).lines);
        }
        Ok(lines.join("\n"))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
