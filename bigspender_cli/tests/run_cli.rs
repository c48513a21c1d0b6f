use std::io::Write;
use std::process::Command;

#[test]
fn test_broken_config_file_is_skipped_when_key_is_in_env() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, "{{not json").unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_bigspender"))
        .args(["run", "--api-key-env", "BIGSPENDER_CLI_TEST_KEY", "--config"])
        .arg(config.path())
        .args(["--base-url", "http://127.0.0.1:1", "--timeout-secs", "2"])
        .env("BIGSPENDER_CLI_TEST_KEY", "k")
        .env_remove("RUST_LOG")
        .output()
        .expect("run bigspender");

    // Nothing listens on port 1, so the run fails at the token request.
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!stderr.contains("Error: Invalid config file"), "stderr: {}", stderr);
    assert!(stderr.contains("Ignoring config file overrides"), "stderr: {}", stderr);
    assert!(stderr.contains("Request failed"), "stderr: {}", stderr);
}

#[test]
fn test_missing_key_everywhere_fails_before_any_request() {
    let dir = tempfile::tempdir().unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_bigspender"))
        .args(["run", "--api-key-env", "BIGSPENDER_CLI_UNSET_KEY", "--config"])
        .arg(dir.path().join("config.json"))
        .env_remove("BIGSPENDER_CLI_UNSET_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("run bigspender");

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("API key not configured"), "stderr: {}", stderr);
}
