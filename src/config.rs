use serde::Deserialize;
use std::path::{Path, PathBuf};
use directories::{BaseDirs, ProjectDirs};
use anyhow::{Context, Result};
use std::fs;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub entries: EntriesConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_max_columns")]
    pub max_columns: i32,
    /// `%c` is replaced by the command line, otherwise it is appended.
    #[serde(default = "default_terminal")]
    pub terminal: String,
    #[serde(default = "default_true")]
    pub single_instance: bool,
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

fn default_max_columns() -> i32 { 3 }
fn default_terminal() -> String { "x-terminal-emulator -e %c".to_string() }
fn default_true() -> bool { true }

fn default_socket_path() -> PathBuf {
    BaseDirs::new()
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(std::env::temp_dir)
        .join("launchgrid.sock")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_columns: default_max_columns(),
            terminal: default_terminal(),
            single_instance: default_true(),
            socket_path: default_socket_path(),
        }
    }
}

/// Directories scanned for entries. User dirs always come first when
/// resolving `inherit` references.
#[derive(Deserialize, Debug, Clone)]
pub struct EntriesConfig {
    #[serde(default)]
    pub user_dirs: Vec<PathBuf>,
    #[serde(default = "default_system_dirs")]
    pub system_dirs: Vec<PathBuf>,
}

fn default_system_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("/usr/share/applications/")]
}

impl Default for EntriesConfig {
    fn default() -> Self {
        Self {
            user_dirs: Vec::new(),
            system_dirs: default_system_dirs(),
        }
    }
}

impl Config {
    pub fn parse(content: &str, config_dir: &Path) -> Result<Config> {
        let mut config: Config = toml::from_str(content)?;
        config.fill_defaults(config_dir);
        Ok(config)
    }

    pub fn with_config_dir(config_dir: &Path) -> Config {
        let mut config = Config::default();
        config.fill_defaults(config_dir);
        config
    }

    fn fill_defaults(&mut self, config_dir: &Path) {
        if self.entries.user_dirs.is_empty() {
            self.entries.user_dirs.push(config_dir.to_path_buf());
        }
        if self.general.max_columns < 1 {
            log::warn!("max_columns must be positive, using {}", default_max_columns());
            self.general.max_columns = default_max_columns();
        }
    }
}

pub fn default_config_dir() -> PathBuf {
    match ProjectDirs::from("org", "launchgrid", "launchgrid") {
        Some(dirs) => dirs.config_dir().to_path_buf(),
        None => PathBuf::from("."),
    }
}

pub fn load_config(config_dir: Option<&Path>) -> Result<Config> {
    let config_dir = config_dir.map(Path::to_path_buf).unwrap_or_else(default_config_dir);
    let config_path = config_dir.join("config.toml");

    if !config_path.exists() {
        log::debug!("no config at {:?}, using defaults", config_path);
        return Ok(Config::with_config_dir(&config_dir));
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    Config::parse(&content, &config_dir)
        .with_context(|| format!("parsing {}", config_path.display()))
}
