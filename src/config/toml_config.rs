use crate::domain::model::{ServiceTarget, Topology};
use crate::utils::error::{OpsError, Result};
use crate::utils::validation::{self, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ocr-ops.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    pub project: ProjectConfig,
    pub compose: ComposeConfig,
    pub settle: SettleConfig,
    pub http: HttpConfig,
    pub containers: Vec<ContainerEntry>,
    pub endpoints: Vec<EndpointEntry>,
    pub bucket: BucketConfig,
    pub readiness: Vec<ReadinessCheck>,
    pub directory: Vec<DirectoryEntry>,
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub root: String,
    pub container_prefix: String,
    pub engine: String,
    pub env_file: String,
    pub env_template: String,
    pub directories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Program plus leading arguments, e.g. `["docker", "compose"]`.
    pub command: Vec<String>,
    pub files: Vec<String>,
    pub gpu_overlay: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub delay_seconds: u64,
    pub poll: bool,
    pub max_wait_seconds: u64,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerEntry {
    /// Service name without the project prefix.
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointEntry {
    pub url: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    pub enabled: bool,
    pub cli: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReadinessCheck {
    /// Runs a tool inside a container; `expect` must appear in stdout when set.
    Exec {
        name: String,
        container: String,
        command: Vec<String>,
        #[serde(default)]
        expect: Option<String>,
    },
    Http {
        name: String,
        url: String,
    },
}

impl ReadinessCheck {
    pub fn name(&self) -> &str {
        match self {
            ReadinessCheck::Exec { name, .. } | ReadinessCheck::Http { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub root: String,
    pub client: String,
    pub install_command: Vec<String>,
    pub layoutlm_repo: String,
    pub layoutlm_dir: String,
    pub dbnet_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            container_prefix: "transport_ocr".to_string(),
            engine: "docker".to_string(),
            env_file: ".env".to_string(),
            env_template: ".env.example".to_string(),
            directories: ["models", "logs", "media", "data/postgres", "data/redis", "data/minio"]
                .iter()
                .map(|dir| dir.to_string())
                .collect(),
        }
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            command: vec!["docker-compose".to_string()],
            files: vec!["docker-compose.yml".to_string()],
            gpu_overlay: "docker-compose.gpu.yml".to_string(),
        }
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 10,
            poll: false,
            max_wait_seconds: 60,
            initial_interval_ms: 500,
            max_interval_ms: 5_000,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cli: "mc".to_string(),
            path: "local/documents".to_string(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            root: "models".to_string(),
            client: "huggingface-cli".to_string(),
            install_command: ["pip", "install", "-U", "huggingface_hub"]
                .iter()
                .map(|arg| arg.to_string())
                .collect(),
            layoutlm_repo: "microsoft/layoutlmv3-base".to_string(),
            layoutlm_dir: "layoutlm".to_string(),
            dbnet_dir: "dbnet".to_string(),
        }
    }
}

fn container(name: &str, display_name: &str) -> ContainerEntry {
    ContainerEntry {
        name: name.to_string(),
        display_name: display_name.to_string(),
    }
}

fn endpoint(url: &str, display_name: &str) -> EndpointEntry {
    EndpointEntry {
        url: url.to_string(),
        display_name: display_name.to_string(),
    }
}

fn link(name: &str, url: &str) -> DirectoryEntry {
    DirectoryEntry {
        name: name.to_string(),
        url: url.to_string(),
    }
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            compose: ComposeConfig::default(),
            settle: SettleConfig::default(),
            http: HttpConfig::default(),
            containers: vec![
                container("postgres", "PostgreSQL"),
                container("redis", "Redis"),
                container("minio", "MinIO"),
                container("ocr_service", "OCR Service"),
                container("web_app", "Web App"),
                container("nginx", "Nginx"),
            ],
            endpoints: vec![
                endpoint("http://localhost:8001/admin", "Web App Admin"),
                endpoint("http://localhost:8000/health", "OCR API"),
                endpoint("http://localhost:9090", "Prometheus"),
                endpoint("http://localhost:3000", "Grafana"),
                endpoint("http://localhost:9000/minio/health/live", "MinIO"),
            ],
            bucket: BucketConfig::default(),
            readiness: vec![
                ReadinessCheck::Exec {
                    name: "PostgreSQL".to_string(),
                    container: "postgres".to_string(),
                    command: vec![
                        "pg_isready".to_string(),
                        "-U".to_string(),
                        "${POSTGRES_USER:-postgres}".to_string(),
                    ],
                    expect: None,
                },
                ReadinessCheck::Exec {
                    name: "Redis".to_string(),
                    container: "redis".to_string(),
                    command: vec!["redis-cli".to_string(), "ping".to_string()],
                    expect: Some("PONG".to_string()),
                },
                ReadinessCheck::Http {
                    name: "MinIO".to_string(),
                    url: "http://localhost:9000/minio/health/live".to_string(),
                },
            ],
            directory: vec![
                link("Web App", "http://localhost:8001"),
                link("Admin", "http://localhost:8001/admin"),
                link("OCR API docs", "http://localhost:8000/docs"),
                link("MinIO Console", "http://localhost:9001"),
                link("Prometheus", "http://localhost:9090"),
                link("Grafana", "http://localhost:3000"),
            ],
            models: ModelsConfig::default(),
        }
    }
}

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("variable pattern is valid")
    })
}

/// Replaces `${VAR}` and `${VAR:-default}` using `lookup`.
///
/// With `use_defaults` off, unresolved placeholders are left verbatim so they
/// can be expanded later against another source (the env file).
pub fn substitute_vars<F>(content: &str, lookup: F, use_defaults: bool) -> String
where
    F: Fn(&str) -> Option<String>,
{
    var_pattern()
        .replace_all(content, |caps: &Captures| {
            if let Some(value) = lookup(&caps[1]) {
                return value;
            }
            match caps.get(2) {
                Some(default) if use_defaults => default.as_str().to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

impl OpsConfig {
    /// Reads and parses a TOML file, substituting `${VAR}` placeholders.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_vars(content, |name| std::env::var(name).ok(), false);

        toml::from_str(&processed).map_err(|e| OpsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Explicit path, then `ocr-ops.toml` in the working directory, then built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => {
                tracing::debug!("No configuration file, using built-in topology");
                Ok(Self::default())
            }
        }
    }

    pub fn load_validated(path: Option<&Path>) -> Result<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.project.root)
    }

    pub fn container_id(&self, name: &str) -> String {
        if self.project.container_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.project.container_prefix, name)
        }
    }

    pub fn topology(&self) -> Topology {
        Topology {
            containers: self
                .containers
                .iter()
                .map(|c| ServiceTarget::container(self.container_id(&c.name), &c.display_name))
                .collect(),
            endpoints: self
                .endpoints
                .iter()
                .map(|e| ServiceTarget::endpoint(&e.url, &e.display_name))
                .collect(),
            bucket: self
                .bucket
                .enabled
                .then(|| ServiceTarget::bucket(&self.bucket.path)),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("project.root", &self.project.root)?;
        validation::validate_non_empty_string("project.engine", &self.project.engine)?;
        validation::validate_path("project.env_file", &self.project.env_file)?;
        validation::validate_path("project.env_template", &self.project.env_template)?;
        for dir in &self.project.directories {
            validation::validate_path("project.directories", dir)?;
        }

        validation::validate_non_empty_command("compose.command", &self.compose.command)?;
        if self.compose.files.is_empty() {
            return Err(OpsError::MissingConfigError {
                field: "compose.files".to_string(),
            });
        }
        for file in &self.compose.files {
            validation::validate_path("compose.files", file)?;
        }
        validation::validate_path("compose.gpu_overlay", &self.compose.gpu_overlay)?;

        if self.settle.poll {
            validation::validate_at_least(
                "settle.max_wait_seconds",
                self.settle.max_wait_seconds,
                self.settle.delay_seconds,
            )?;
            validation::validate_at_least("settle.initial_interval_ms", self.settle.initial_interval_ms, 1)?;
            validation::validate_at_least(
                "settle.max_interval_ms",
                self.settle.max_interval_ms,
                self.settle.initial_interval_ms,
            )?;
        }
        validation::validate_at_least("http.timeout_seconds", self.http.timeout_seconds, 1)?;

        for c in &self.containers {
            validation::validate_non_empty_string("containers.name", &c.name)?;
        }
        validation::validate_unique("containers.name", self.containers.iter().map(|c| c.name.as_str()))?;
        for e in &self.endpoints {
            validation::validate_url("endpoints.url", &e.url)?;
        }

        if self.bucket.enabled {
            validation::validate_non_empty_string("bucket.cli", &self.bucket.cli)?;
            validation::validate_non_empty_string("bucket.path", &self.bucket.path)?;
        }

        for check in &self.readiness {
            match check {
                ReadinessCheck::Exec {
                    container, command, ..
                } => {
                    validation::validate_non_empty_command("readiness.command", command)?;
                    if !self.containers.iter().any(|c| &c.name == container) {
                        return Err(OpsError::InvalidConfigValueError {
                            field: "readiness.container".to_string(),
                            value: container.clone(),
                            reason: "Not listed in [[containers]]".to_string(),
                        });
                    }
                }
                ReadinessCheck::Http { url, .. } => validation::validate_url("readiness.url", url)?,
            }
        }

        for entry in &self.directory {
            validation::validate_url("directory.url", &entry.url)?;
        }

        validation::validate_path("models.root", &self.models.root)?;
        validation::validate_non_empty_string("models.client", &self.models.client)?;
        validation::validate_non_empty_command("models.install_command", &self.models.install_command)?;
        validation::validate_non_empty_string("models.layoutlm_repo", &self.models.layoutlm_repo)?;

        Ok(())
    }
}

impl Validate for OpsConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_topology_is_fixed() {
        let topology = OpsConfig::default().topology();

        let containers: Vec<&str> = topology.containers.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            containers,
            vec![
                "transport_ocr_postgres",
                "transport_ocr_redis",
                "transport_ocr_minio",
                "transport_ocr_ocr_service",
                "transport_ocr_web_app",
                "transport_ocr_nginx",
            ]
        );

        let endpoints: Vec<&str> = topology.endpoints.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            endpoints,
            vec![
                "http://localhost:8001/admin",
                "http://localhost:8000/health",
                "http://localhost:9090",
                "http://localhost:3000",
                "http://localhost:9000/minio/health/live",
            ]
        );

        assert_eq!(topology.bucket.map(|b| b.id), Some("local/documents".to_string()));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(OpsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_content = r#"
[project]
container_prefix = "staging_ocr"

[settle]
delay_seconds = 3
"#;

        let config = OpsConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.project.container_prefix, "staging_ocr");
        assert_eq!(config.project.env_file, ".env");
        assert_eq!(config.settle.delay_seconds, 3);
        assert_eq!(config.containers.len(), 6);
        assert_eq!(config.container_id("redis"), "staging_ocr_redis");
    }

    #[test]
    fn test_readiness_checks_parse() {
        let toml_content = r#"
[[containers]]
name = "db"
display_name = "Database"

[[readiness]]
type = "exec"
name = "Database"
container = "db"
command = ["pg_isready"]

[[readiness]]
type = "http"
name = "API"
url = "http://localhost:8000/health"
"#;

        let config = OpsConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.readiness.len(), 2);
        assert_eq!(config.readiness[1].name(), "API");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OCR_OPS_TEST_PREFIX", "prod_ocr");

        let toml_content = r#"
[project]
container_prefix = "${OCR_OPS_TEST_PREFIX}"
env_file = "${OCR_OPS_UNSET_VAR_FOR_TEST:-.env.local}"
"#;

        let config = OpsConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.project.container_prefix, "prod_ocr");
        // Unresolved placeholders survive loading untouched.
        assert_eq!(config.project.env_file, "${OCR_OPS_UNSET_VAR_FOR_TEST:-.env.local}");

        std::env::remove_var("OCR_OPS_TEST_PREFIX");
    }

    #[test]
    fn test_substitute_vars_with_defaults() {
        let lookup = |name: &str| (name == "POSTGRES_USER").then(|| "ocr".to_string());
        assert_eq!(substitute_vars("${POSTGRES_USER:-postgres}", lookup, true), "ocr");
        assert_eq!(substitute_vars("${MISSING:-postgres}", lookup, true), "postgres");
        assert_eq!(substitute_vars("${MISSING}", lookup, true), "${MISSING}");
    }

    #[test]
    fn test_readiness_must_reference_known_container() {
        let mut config = OpsConfig::default();
        config.readiness.push(ReadinessCheck::Exec {
            name: "Kafka".to_string(),
            container: "kafka".to_string(),
            command: vec!["true".to_string()],
            expect: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_wait_cannot_undercut_delay() {
        let mut config = OpsConfig::default();
        config.settle.poll = true;
        config.settle.delay_seconds = 10;
        config.settle.max_wait_seconds = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[compose]\ncommand = [\"docker\", \"compose\"]\n")
            .unwrap();

        let config = OpsConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.compose.command, vec!["docker", "compose"]);
        assert_eq!(config.compose.files, vec!["docker-compose.yml"]);
    }
}
