mod common;

use anyhow::Result;
use common::{FakeRunner, Reply};
use tempfile::TempDir;
use transport_ocr_ops::config::toml_config::ModelsConfig;
use transport_ocr_ops::core::provision::ClientState;
use transport_ocr_ops::{ModelProvisioner, OpsError};

#[tokio::test]
async fn test_provisions_layoutlm_and_leaves_dbnet_stub() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let runner = FakeRunner::all_ok();
    let provisioner = ModelProvisioner::new(ModelsConfig::default(), temp_dir.path(), runner.clone());

    let report = provisioner.run().await?;

    assert_eq!(report.client, ClientState::AlreadyInstalled);
    assert!(temp_dir.path().join("models/layoutlm").is_dir());
    assert!(temp_dir.path().join("models/dbnet").is_dir());
    assert!(report.layoutlm_downloaded);
    assert!(!report.dbnet_downloaded);

    let layoutlm = temp_dir.path().join("models/layoutlm");
    assert_eq!(
        runner.calls(),
        vec![
            "huggingface-cli --help".to_string(),
            format!(
                "huggingface-cli download microsoft/layoutlmv3-base --local-dir {}",
                layoutlm.display()
            ),
        ]
    );
    // The DBNet slot is a placeholder: nothing is fetched for it.
    assert!(runner.calls_matching("dbnet").is_empty());
    assert_eq!(std::fs::read_dir(&report.dbnet_dir)?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_existing_layoutlm_weights_are_not_downloaded_again() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let layoutlm = temp_dir.path().join("models/layoutlm");
    std::fs::create_dir_all(&layoutlm)?;
    std::fs::write(layoutlm.join("config.json"), "{}")?;
    let runner = FakeRunner::all_ok();
    let provisioner = ModelProvisioner::new(ModelsConfig::default(), temp_dir.path(), runner.clone());

    let report = provisioner.run().await?;

    assert!(!report.layoutlm_downloaded);
    assert!(runner.calls_matching(" download ").is_empty());
    assert_eq!(std::fs::read_to_string(layoutlm.join("config.json"))?, "{}");
    Ok(())
}

#[tokio::test]
async fn test_installs_missing_client() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeRunner::new(|line| {
        if line == "huggingface-cli --help" {
            Reply::NotFound
        } else {
            Reply::Ok(String::new())
        }
    });
    let provisioner = ModelProvisioner::new(ModelsConfig::default(), temp_dir.path(), runner.clone());

    let report = provisioner.run().await.unwrap();

    assert_eq!(report.client, ClientState::Installed);
    assert_eq!(runner.calls()[1], "pip install -U huggingface_hub");
}

#[tokio::test]
async fn test_failed_install_halts() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeRunner::new(|line| {
        if line.starts_with("huggingface-cli") {
            Reply::NotFound
        } else {
            Reply::Fail("pip: network unreachable".to_string())
        }
    });
    let provisioner = ModelProvisioner::new(ModelsConfig::default(), temp_dir.path(), runner.clone());

    let err = provisioner.run().await.unwrap_err();

    assert!(matches!(err, OpsError::CommandFailed { .. }));
    assert!(!temp_dir.path().join("models").exists());
    assert_eq!(runner.calls().len(), 2);
}

#[tokio::test]
async fn test_failed_download_propagates() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeRunner::new(|line| {
        if line.contains(" download ") {
            Reply::Fail("401 Client Error".to_string())
        } else {
            Reply::Ok(String::new())
        }
    });
    let provisioner = ModelProvisioner::new(ModelsConfig::default(), temp_dir.path(), runner);

    let err = provisioner.run().await.unwrap_err();

    match err {
        OpsError::CommandFailed { command, stderr, .. } => {
            assert!(command.starts_with("huggingface-cli download microsoft/layoutlmv3-base"));
            assert_eq!(stderr, "401 Client Error");
        }
        other => panic!("unexpected error {:?}", other),
    }
}
