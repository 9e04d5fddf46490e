//! Common utilities for integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// Scratch directory holding config and script files for one test
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Write `contents` to `name` inside the workspace
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }
}

/// Replay script for a quick burst of keystrokes: "a", "ab", "abc"
pub const TYPING_BURST: &str = r#"
[[step]]
at_ms = 0
value = "a"

[[step]]
at_ms = 100
value = "ab"

[[step]]
at_ms = 200
value = "abc"
"#;
