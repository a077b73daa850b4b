use std::path::Path;
use std::process::{Command, Output};

use url::Url;

/// Environment variables the CLI reads; cleared so the host setup cannot
/// leak into tests.
const VISION_ENV: &[&str] = &[
    "VISION_API_URL",
    "VISION_API_USERNAME",
    "VISION_API_PASSWORD",
    "VISION_API_CLIENT_ID",
    "VISION_API_CLIENT_SECRET",
    "VISION_API_RENEWAL_SECS",
    "VISION_API_PAGE_SIZE",
    "VISION_API_TIMEOUT_SECS",
    "VISION_API_MAX_CONCURRENCY",
    "RUST_LOG",
];

/// Run the CLI binary with an isolated HOME.
pub fn run_cli(args: &[&str], home: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vision"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    for var in VISION_ENV {
        cmd.env_remove(var);
    }
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], home: &Path) -> String {
    let output = run_cli(args, home);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Parse JSON-lines stdout into values.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

/// `file://` URL for a snapshot directory.
pub fn file_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}
