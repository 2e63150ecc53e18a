use std::process::Command;

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_digitionary"));
    command.env("RUST_LOG", "error");
    command.env_remove("DIGITIONARY_PRIVATE_KEY");
    command
}

#[test]
fn cli_mode_with_config_and_dry_run_works() {
    let config_path = format!("{}/config/local.yaml", env!("CARGO_MANIFEST_DIR"));

    let output = binary()
        .arg("--config")
        .arg(config_path)
        .arg("--dry-run")
        .arg("--log-level")
        .arg("error")
        .output()
        .expect("Failed to start digitionary binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_dry_run_rejects_invalid_base_url() {
    let output = binary()
        .arg("--api-base-url")
        .arg("not a url")
        .arg("--dry-run")
        .arg("--log-level")
        .arg("error")
        .output()
        .expect("Failed to start digitionary binary");

    assert!(!output.status.success());
}

#[test]
fn cli_message_prints_canonical_lines() {
    let output = binary()
        .arg("message")
        .arg("--address")
        .arg("0xAbC123000000000000000000000000000000dEaD")
        .arg("--chain-id")
        .arg("1")
        .arg("--log-level")
        .arg("error")
        .output()
        .expect("Failed to start digitionary binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("localhost:3000 wants you to sign in with your Ethereum account:\n"));
    assert!(stdout.contains("\nURI: http://localhost:3000\n"));
    assert!(stdout.contains("\nVersion: 1\n"));
    assert!(stdout.contains("\nChain ID: 1\n"));
}

fn write_message(name: &str, timing: &str) -> std::path::PathBuf {
    let message = format!(
        "app.example wants you to sign in with your Ethereum account:\n\
         0xAbC123000000000000000000000000000000dEaD\n\
         \n\
         Sign in to Digi-tionary\n\
         \n\
         URI: https://app.example\n\
         Version: 1\n\
         Chain ID: 1\n\
         Nonce: abcdefgh12345678\n\
         Issued At: 2024-01-01T00:00:00.000Z\n\
         {timing}"
    );
    let path = std::env::temp_dir().join(format!("digitionary-{}-{name}.txt", std::process::id()));
    std::fs::write(&path, message).expect("write message file");
    path
}

fn run_verify(message_file: &std::path::Path) -> std::process::Output {
    binary()
        .arg("verify")
        .arg("--message-file")
        .arg(message_file)
        .arg("--signature")
        .arg(format!("0x{}", "11".repeat(65)))
        .arg("--log-level")
        .arg("error")
        .output()
        .expect("Failed to start digitionary binary")
}

#[test]
fn cli_verify_reports_expired_message() {
    let path = write_message("expired", "Expiration Time: 2024-01-01T00:05:00.000Z");
    let output = run_verify(&path);
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Message expired at"));
}

#[test]
fn cli_verify_reports_message_not_yet_valid() {
    let path = write_message(
        "not-before",
        "Expiration Time: 2999-01-01T00:00:00.000Z\nNot Before: 2998-01-01T00:00:00.000Z",
    );
    let output = run_verify(&path);
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Message not valid before"));
}
