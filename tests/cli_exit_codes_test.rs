use std::process::Command;
use tempfile::TempDir;

fn run_in(dir: &TempDir, bin: &str, args: &[&str]) -> std::process::Output {
    Command::new(bin)
        .args(args)
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn is_empty(dir: &TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

#[test]
fn test_deploy_help_exits_zero_without_side_effects() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(&temp_dir, env!("CARGO_BIN_EXE_ocr-deploy"), &["--help"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--gpu"));
    assert!(stdout.contains("--skip-build"));
    assert!(is_empty(&temp_dir));
}

#[test]
fn test_deploy_unknown_flag_exits_one_without_side_effects() {
    let temp_dir = TempDir::new().unwrap();

    for flags in [vec!["--turbo"], vec!["--gpu", "--turbo"], vec!["--skip-build", "-x"]] {
        let output = run_in(&temp_dir, env!("CARGO_BIN_EXE_ocr-deploy"), &flags);
        assert_eq!(output.status.code(), Some(1), "flags {:?}", flags);
        assert!(!output.stderr.is_empty());
    }
    assert!(is_empty(&temp_dir));
}

#[test]
fn test_health_unknown_flag_exits_one() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(&temp_dir, env!("CARGO_BIN_EXE_ocr-health"), &["--skip-build"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_models_help_exits_zero() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(&temp_dir, env!("CARGO_BIN_EXE_ocr-models"), &["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(is_empty(&temp_dir));
}

#[test]
fn test_invalid_config_file_exits_one() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("broken.toml");
    std::fs::write(&config, "[[endpoints]]\nurl = \"not a url\"\ndisplay_name = \"x\"\n").unwrap();

    let output = run_in(
        &temp_dir,
        env!("CARGO_BIN_EXE_ocr-deploy"),
        &["--config", config.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(!temp_dir.path().join(".env").exists());
}

#[test]
fn test_health_json_keeps_stdout_parseable() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(&temp_dir, env!("CARGO_BIN_EXE_ocr-health"), &["--json"]);

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let healthy = report["healthy"].as_bool().unwrap();
    assert_eq!(output.status.code(), Some(if healthy { 0 } else { 1 }));
    assert_eq!(report["results"].as_array().unwrap().len(), 12);
    assert!(String::from_utf8_lossy(&output.stderr).contains("==> Containers"));
}
