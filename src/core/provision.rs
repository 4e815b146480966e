use crate::config::toml_config::ModelsConfig;
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    AlreadyInstalled,
    Installed,
}

#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub client: ClientState,
    pub layoutlm_dir: PathBuf,
    /// False when the LayoutLM directory already held files and the download was skipped.
    pub layoutlm_downloaded: bool,
    pub dbnet_dir: PathBuf,
    pub dbnet_downloaded: bool,
}

/// Populates the models directory the OCR service mounts.
///
/// Fail-fast: the first failing install or download aborts with its error.
pub struct ModelProvisioner<R: CommandRunner> {
    config: ModelsConfig,
    root: PathBuf,
    runner: R,
}

impl<R: CommandRunner> ModelProvisioner<R> {
    pub fn new(config: ModelsConfig, root: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            config,
            root: root.into(),
            runner,
        }
    }

    pub async fn run(&self) -> Result<ProvisionReport> {
        let client = self.ensure_client().await?;

        let models_root = self.root.join(&self.config.root);
        let layoutlm_dir = models_root.join(&self.config.layoutlm_dir);
        let dbnet_dir = models_root.join(&self.config.dbnet_dir);
        std::fs::create_dir_all(&layoutlm_dir)?;
        std::fs::create_dir_all(&dbnet_dir)?;

        let layoutlm_downloaded = if has_files(&layoutlm_dir)? {
            tracing::info!("{} already populated, skipping download", layoutlm_dir.display());
            println!("LayoutLM model already present in {}", layoutlm_dir.display());
            false
        } else {
            self.download_layoutlm(&layoutlm_dir).await?;
            true
        };
        let dbnet_downloaded = self.download_dbnet(&dbnet_dir);

        tracing::info!("Models ready in {}", models_root.display());
        Ok(ProvisionReport {
            client,
            layoutlm_dir,
            layoutlm_downloaded,
            dbnet_dir,
            dbnet_downloaded,
        })
    }

    pub async fn ensure_client(&self) -> Result<ClientState> {
        if self.runner.is_installed(&self.config.client, &["--help"]).await {
            tracing::debug!("{} already installed", self.config.client);
            return Ok(ClientState::AlreadyInstalled);
        }

        tracing::info!("Installing {}", self.config.client);
        let mut parts = self.config.install_command.iter().map(String::as_str);
        let program = parts.next().unwrap_or("pip");
        let args: Vec<&str> = parts.collect();
        self.runner.run_checked(program, &args).await?;
        Ok(ClientState::Installed)
    }

    async fn download_layoutlm(&self, target: &Path) -> Result<()> {
        let local_dir = target.to_string_lossy();
        tracing::info!("Downloading {} into {}", self.config.layoutlm_repo, local_dir);
        println!("Downloading {} ...", self.config.layoutlm_repo);

        self.runner
            .run_checked(
                &self.config.client,
                &[
                    "download",
                    self.config.layoutlm_repo.as_str(),
                    "--local-dir",
                    &*local_dir,
                ],
            )
            .await?;
        Ok(())
    }

    /// Placeholder: no DBNet weights source is defined yet, so nothing is
    /// downloaded and the directory stays empty.
    fn download_dbnet(&self, target: &Path) -> bool {
        tracing::warn!("DBNet download is not implemented, {} left empty", target.display());
        println!("DBNet model: not implemented, place the weights in {} manually", target.display());
        false
    }
}

fn has_files(dir: &Path) -> Result<bool> {
    Ok(std::fs::read_dir(dir)?.next().is_some())
}
