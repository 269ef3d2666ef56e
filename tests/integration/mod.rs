// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture helper for creating temporary manuscript workspaces
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Create a file relative to the fixture root, creating parent directories
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write `voices.toml` at the fixture root and return its path
    pub fn create_manifest(&self, content: &str) -> PathBuf {
        self.create_file("voices.toml", content)
    }

    /// Parse a JSON output file relative to the fixture root
    pub fn read_json<P: AsRef<Path>>(&self, relative_path: P) -> serde_json::Value {
        let path = self.root_path.join(relative_path);
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
        serde_json::from_str(&content).unwrap_or_else(|e| panic!("Invalid JSON in {}: {e}", path.display()))
    }
}

/// Compare a sentence table document against expected `(speaker, sentence)` rows in id order
pub fn assert_table(actual: &serde_json::Value, expected: &[(&str, &str)], context: &str) {
    let obj = actual
        .as_object()
        .unwrap_or_else(|| panic!("{context}: table should be a JSON object"));

    if obj.len() != expected.len() {
        panic!(
            "{}: Record count mismatch. Expected {} records, got {}",
            context,
            expected.len(),
            obj.len()
        );
    }

    for (i, (speaker, sentence)) in expected.iter().enumerate() {
        let id = (i + 1).to_string();
        let record = obj
            .get(&id)
            .unwrap_or_else(|| panic!("{context}: missing record {id}"));
        assert_eq!(record["speaker"], *speaker, "{context}: speaker mismatch at id {id}");
        assert_eq!(record["sentence"], *sentence, "{context}: sentence mismatch at id {id}");
    }
}
