use crate::config::toml_config::{DirectoryEntry, OpsConfig};
use crate::core::probes;
use crate::core::settle::{settle, SettleOutcome, SettlePlan};
use crate::domain::model::{ProbeOutcome, ProbeResult, RunOptions};
use crate::domain::ports::{CommandRunner, HttpProber};
use crate::utils::console::{self, Tone};
use crate::utils::error::{OpsError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileState {
    Existing,
    Seeded,
}

#[derive(Debug, Clone)]
pub struct DeployReport {
    pub options: RunOptions,
    pub created_directories: Vec<PathBuf>,
    pub env_file: EnvFileState,
    pub settle: SettleOutcome,
    pub readiness: Vec<ProbeResult>,
    pub directory: Vec<DirectoryEntry>,
}

impl DeployReport {
    pub fn all_ready(&self) -> bool {
        self.readiness.iter().all(|r| r.outcome == ProbeOutcome::Ok)
    }
}

/// Creates every missing directory under `root`; returns the ones it created.
pub fn prepare_directories<S: AsRef<str>>(root: &Path, directories: &[S]) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in directories {
        let path = root.join(dir.as_ref());
        if path.is_dir() {
            continue;
        }
        std::fs::create_dir_all(&path)?;
        tracing::debug!("Created {}", path.display());
        created.push(path);
    }
    Ok(created)
}

/// Seeds the env file from the template on first run; an existing file is left alone.
pub fn prepare_env_file(env_file: &Path, template: &Path) -> Result<EnvFileState> {
    if env_file.exists() {
        tracing::debug!("{} already present", env_file.display());
        return Ok(EnvFileState::Existing);
    }

    if !template.is_file() {
        return Err(OpsError::MissingTemplate {
            path: template.display().to_string(),
        });
    }

    std::fs::copy(template, env_file)?;
    tracing::info!("Created {} from {}", env_file.display(), template.display());
    Ok(EnvFileState::Seeded)
}

/// Values from the env file; an unreadable file yields an empty map.
pub fn read_env_vars(env_file: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(env_file) {
        Ok(iter) => iter,
        Err(e) => {
            tracing::warn!("Could not read {}: {}", env_file.display(), e);
            return HashMap::new();
        }
    };

    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!("Skipping malformed line in {}: {}", env_file.display(), e);
            None
        }
    })
    .collect()
}

/// Linear bring-up: validate, prepare, build, start, settle, probe, report.
pub struct Deployer<R: CommandRunner, H: HttpProber> {
    config: OpsConfig,
    runner: R,
    prober: H,
}

impl<R: CommandRunner, H: HttpProber> Deployer<R, H> {
    pub fn new(config: OpsConfig, runner: R, prober: H) -> Self {
        Self {
            config,
            runner,
            prober,
        }
    }

    pub async fn run(&self, options: &RunOptions) -> Result<DeployReport> {
        const STEP_WIDTH: usize = 16;
        println!("{}", console::heading("Deploying Transport OCR"));
        if options.gpu {
            println!("{}", console::paint("GPU mode enabled", Tone::Warn));
        }

        self.validate_prerequisites().await?;

        let root = self.config.root();
        let created_directories = prepare_directories(&root, &self.config.project.directories)?;
        println!("{}", console::status_line("Directories", STEP_WIDTH, "READY", Tone::Good));

        let env_path = root.join(&self.config.project.env_file);
        let env_file = prepare_env_file(&env_path, &root.join(&self.config.project.env_template))?;
        if env_file == EnvFileState::Seeded {
            println!(
                "{}",
                console::paint(
                    &format!("Created {}, review it before going to production", env_path.display()),
                    Tone::Warn
                )
            );
        }

        let files = self.compose_files(options);
        if options.skip_build {
            tracing::info!("Skipping image build");
            println!("{}", console::status_line("Build", STEP_WIDTH, "SKIPPED", Tone::Warn));
        } else {
            println!("{}", console::heading("Building images"));
            self.compose(&files, &["build"]).await?;
        }

        println!("{}", console::heading("Starting services"));
        self.compose(&files, &["up", "-d"]).await?;

        let vars = read_env_vars(&env_path);
        let plan = SettlePlan::from(&self.config.settle);
        let vars_ref = &vars;
        let settle_outcome = settle(&plan, move || self.all_ready(vars_ref)).await;

        println!("{}", console::heading("Checking services"));
        let readiness = self.run_readiness(&vars).await;
        let width = readiness
            .iter()
            .map(|result| result.target.display_name.chars().count())
            .max()
            .unwrap_or(0);
        for result in &readiness {
            let tone = if result.outcome == ProbeOutcome::Ok {
                Tone::Good
            } else {
                Tone::Bad
            };
            println!("{}", console::status_line(&result.target.display_name, width, result.label(), tone));
        }

        let report = DeployReport {
            options: *options,
            created_directories,
            env_file,
            settle: settle_outcome,
            readiness,
            directory: self.config.directory.clone(),
        };

        print_directory(&report);
        Ok(report)
    }

    pub async fn validate_prerequisites(&self) -> Result<()> {
        let engine = &self.config.project.engine;
        if !self.runner.is_installed(engine, &["--version"]).await {
            tracing::error!("{} is not installed", engine);
            return Err(OpsError::MissingPrerequisite {
                tool: engine.clone(),
            });
        }

        let (program, prefix) = self.compose_command();
        let mut args = prefix;
        args.push("version");
        if !self.runner.is_installed(program, &args).await {
            let tool = self.config.compose.command.join(" ");
            tracing::error!("{} is not installed", tool);
            return Err(OpsError::MissingPrerequisite { tool });
        }

        Ok(())
    }

    /// Base files, then the GPU overlay when requested, each as a `-f` pair.
    pub fn compose_files(&self, options: &RunOptions) -> Vec<String> {
        let root = self.config.root();
        let mut files: Vec<String> = self
            .config
            .compose
            .files
            .iter()
            .map(|file| root.join(file).to_string_lossy().into_owned())
            .collect();
        if options.gpu {
            files.push(
                root.join(&self.config.compose.gpu_overlay)
                    .to_string_lossy()
                    .into_owned(),
            );
        }
        files
    }

    fn compose_command(&self) -> (&str, Vec<&str>) {
        let mut parts = self.config.compose.command.iter().map(String::as_str);
        let program = parts.next().unwrap_or("docker-compose");
        (program, parts.collect())
    }

    async fn compose(&self, files: &[String], action: &[&str]) -> Result<()> {
        let (program, mut args) = self.compose_command();
        for file in files {
            args.push("-f");
            args.push(file.as_str());
        }
        args.extend_from_slice(action);

        self.runner.run_checked(program, &args).await?;
        Ok(())
    }

    async fn run_readiness(&self, vars: &HashMap<String, String>) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.config.readiness.len());
        for check in &self.config.readiness {
            results.push(
                probes::readiness(
                    &self.runner,
                    &self.prober,
                    &self.config.project.engine,
                    check,
                    |name| self.config.container_id(name),
                    vars,
                )
                .await,
            );
        }
        results
    }

    async fn all_ready(&self, vars: &HashMap<String, String>) -> bool {
        self.run_readiness(vars)
            .await
            .iter()
            .all(|r| r.outcome == ProbeOutcome::Ok)
    }
}

fn print_directory(report: &DeployReport) {
    println!();
    println!("{}", console::paint("Deployment complete", Tone::Good));
    if !report.all_ready() {
        println!(
            "{}",
            console::paint("Some services did not pass the readiness check, run ocr-health for details", Tone::Warn)
        );
    }
    println!();
    println!("Services:");
    for entry in &report.directory {
        println!("  {:<16} {}", entry.name, entry.url);
    }
}
