//! Shared helpers for CLI integration tests.
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Path of a file under the workspace `fixtures/` directory.
pub fn fixture(relative: &str) -> PathBuf {
    faceswap_utils::fixture_path(relative).expect("fixture should exist")
}

/// Command for the CLI binary, run inside a fresh scratch directory so no stray
/// `config/faceswap_settings.json` or `output/` from the workspace is picked up.
pub fn cli_in_scratch() -> (Command, TempDir) {
    let scratch = TempDir::new().expect("create temp dir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_faceswap-cli"));
    cmd.current_dir(scratch.path());
    (cmd, scratch)
}

/// Skips the calling test unless all pretrained models are available.
#[macro_export]
macro_rules! require_models {
    () => {{
        match faceswap_utils::models_dir() {
            Some(dir) => dir,
            None => {
                eprintln!("Skipping test: pretrained models not found");
                return;
            }
        }
    }};
}

/// Whether captured process output contains `needle`.
pub fn contains(haystack: &[u8], needle: &str) -> bool {
    String::from_utf8_lossy(haystack).contains(needle)
}
