use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persistent CLI session configuration, stored as `config.toml` in the
/// platform config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Remote repository URL the session targets.
    pub url: String,
    /// Committer name.
    pub name: String,
    /// Committer email.
    pub email: String,
    /// Remote name used when `push` is not given one explicitly.
    #[serde(default = "default_remote")]
    pub default_remote: String,
    /// SSH host-key verification. On by default; turning it off is an
    /// explicit opt-in recorded in the config file.
    #[serde(default = "default_verify_host_keys")]
    pub verify_host_keys: bool,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_verify_host_keys() -> bool {
    true
}

impl CourierConfig {
    /// Load the configuration, failing when `setup` has not been run yet.
    pub fn load() -> Result<Self> {
        let path = ConfigManager::config_file_path()?;
        let raw = fs::read_to_string(&path).with_context(|| {
            format!(
                "No configuration at {} - run 'git-courier setup' first",
                path.display()
            )
        })?;

        toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write the configuration, creating the config directory if needed.
    pub fn save(&self) -> Result<()> {
        ConfigManager::ensure_config_dir()?;

        let path = ConfigManager::config_file_path()?;
        let raw = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Cross-platform configuration directory manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the main configuration directory path following platform conventions:
    /// - Linux: $XDG_CONFIG_HOME/git-courier or ~/.config/git-courier
    /// - macOS: ~/Library/Application Support/git-courier
    /// - Windows: %APPDATA%\git-courier
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            // Follow XDG Base Directory Specification
            if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
                Ok(PathBuf::from(xdg_config).join("git-courier"))
            } else {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                Ok(home.join(".config").join("git-courier"))
            }
        }

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home
                .join("Library")
                .join("Application Support")
                .join("git-courier"))
        }

        #[cfg(target_os = "windows")]
        {
            Ok(dirs::config_dir()
                .context("Failed to get Windows config directory")?
                .join("git-courier"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".git-courier"))
        }
    }

    /// Get the config file path (config.toml)
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("git-courier.log"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;
        Ok(config_dir)
    }
}
