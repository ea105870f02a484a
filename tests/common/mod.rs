#![allow(dead_code)]

use anyhow::Result;
use client_count::models::{ActivityResponse, VersionHistoryEntry};
use std::fs;
use std::path::{Path, PathBuf};

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

pub fn load_activity_fixture() -> ActivityResponse {
    let content = fs::read_to_string(fixture_path("activity_response.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

pub fn load_version_history_fixture() -> Vec<VersionHistoryEntry> {
    let content = fs::read_to_string(fixture_path("version_history.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

pub fn write_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}
