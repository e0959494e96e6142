#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch input/output directories that are removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh workspace with an empty `files/` input directory.
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("temp dir");
        fs::create_dir(temp_dir.path().join("files")).expect("create input dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.temp_dir.path().join("files")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.path().join("output")
    }

    /// Writes `contents` into the input directory and returns the path.
    pub fn add_input(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        fs::write(&path, contents).expect("write input file");
        path
    }

    /// Copies a committed fixture into the input directory.
    pub fn add_fixture(&self, name: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        fs::copy(fixture_path(name), &path).expect("copy fixture");
        path
    }

    /// Reads an output file, dropping a leading byte-order mark.
    pub fn read_output(&self, name: &str) -> String {
        let contents = fs::read_to_string(self.output_dir().join(name)).expect("read output");
        contents.trim_start_matches('\u{feff}').to_string()
    }
}
