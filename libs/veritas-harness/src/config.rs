// Runtime and harness configuration
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default wall-clock limit for one verification run.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Upper bound for caller-supplied timeouts.
pub const MAX_TIMEOUT_MS: u64 = 60_000;
pub const MAX_SOURCE_BYTES: usize = 1024 * 1024; // 1MB
pub const MAX_INPUT_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Language of candidate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "python" | "python3" | "py" => Ok(Language::Python),
            other => bail!("Unsupported language: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub name: String,
    pub version: String,
    /// Docker image, used by the docker backend only.
    pub image: String,
    /// Interpreter executable.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub file_extension: String,
    pub memory_limit_mb: u32,
    pub cpu_limit: f32,
}

impl RuntimeConfig {
    pub fn python() -> Self {
        Self {
            name: "python".to_string(),
            version: "3.11".to_string(),
            image: "python:3.11-slim".to_string(),
            command: "python3".to_string(),
            args: vec!["-I".to_string()],
            file_extension: "py".to_string(),
            memory_limit_mb: 256,
            cpu_limit: 0.5,
        }
    }

    pub fn memory_limit_bytes(&self) -> i64 {
        (self.memory_limit_mb as i64) * 1024 * 1024
    }

    pub fn nano_cpus(&self) -> i64 {
        (self.cpu_limit as f64 * 1_000_000_000.0) as i64
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RuntimesJson {
    runtimes: Vec<RuntimeConfig>,
}

/// Runtime configuration manager
#[derive(Debug, Clone)]
pub struct RuntimeConfigManager {
    configs: HashMap<String, RuntimeConfig>,
}

impl RuntimeConfigManager {
    /// Load runtime configurations from a runtimes.json file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Runtime config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let runtimes_json: RuntimesJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        if runtimes_json.runtimes.is_empty() {
            bail!("{} defines no runtimes", config_path.display());
        }

        let configs = runtimes_json
            .runtimes
            .into_iter()
            .map(|rt| (rt.name.clone(), rt))
            .collect();

        Ok(Self { configs })
    }

    /// Path from HARNESS_RUNTIME_CONFIG, else config/runtimes.json
    pub fn default_path() -> PathBuf {
        std::env::var("HARNESS_RUNTIME_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/runtimes.json"))
    }

    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path())
    }

    /// Built-in runtimes, no file needed.
    pub fn builtin() -> Self {
        let python = RuntimeConfig::python();
        Self {
            configs: HashMap::from([(python.name.clone(), python)]),
        }
    }

    /// The default file when it exists, built-ins otherwise. A file that
    /// exists but is broken is still an error.
    pub fn load_or_builtin() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::builtin())
        }
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: &Language) -> Result<&RuntimeConfig> {
        let name = language.to_string();
        self.configs
            .get(&name)
            .ok_or_else(|| anyhow::anyhow!("No runtime configured for language: {}", name))
    }

    /// List all configured runtimes
    pub fn list_runtimes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Where candidate processes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local interpreter, one child process per run.
    Process,
    /// One disposable container per run.
    Docker,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Process => write!(f, "process"),
            Backend::Docker => write!(f, "docker"),
        }
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "process" | "local" => Ok(Backend::Process),
            "docker" => Ok(Backend::Docker),
            other => bail!("Unknown backend: {} (expected process or docker)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSettings {
    pub timeout_ms: u64,
    pub backend: Backend,
    pub language: Language,
    pub max_source_bytes: usize,
    pub max_input_bytes: usize,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            backend: Backend::Process,
            language: Language::Python,
            max_source_bytes: MAX_SOURCE_BYTES,
            max_input_bytes: MAX_INPUT_BYTES,
        }
    }
}

impl HarnessSettings {
    /// Defaults overridden by HARNESS_TIMEOUT_MS and HARNESS_BACKEND.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(raw) = std::env::var("HARNESS_TIMEOUT_MS") {
            settings.timeout_ms = raw
                .parse()
                .with_context(|| format!("Invalid HARNESS_TIMEOUT_MS: {}", raw))?;
        }
        if let Ok(raw) = std::env::var("HARNESS_BACKEND") {
            settings.backend = raw.parse()?;
        }

        Ok(settings)
    }

    /// Caller override, clamped to `1..=MAX_TIMEOUT_MS`.
    pub fn effective_timeout_ms(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.timeout_ms).clamp(1, MAX_TIMEOUT_MS)
    }
}
