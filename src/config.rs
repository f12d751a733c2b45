use crate::env::default_root_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoginConfig {
    /// `username:password` file, relative paths taken from the launch directory.
    pub credentials: PathBuf,
    pub max_attempts: u32,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from("users.txt"),
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShellConfig {
    /// Where a bare `cd` goes. Platform root when unset.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub history: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            history: true,
        }
    }
}

impl ShellConfig {
    pub fn root_dir(&self) -> PathBuf {
        self.root_dir.clone().unwrap_or_else(default_root_dir)
    }
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Default `env_logger` filter; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    login: LoginOverlay,
    #[serde(default)]
    shell: ShellOverlay,
    #[serde(default)]
    log: LogOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct LoginOverlay {
    credentials: Option<PathBuf>,
    max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ShellOverlay {
    root_dir: Option<PathBuf>,
    history: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct LogOverlay {
    level: Option<String>,
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        match toml::from_str(DEFAULT_CONFIG) {
            Ok(config) => config,
            Err(e) => {
                log::error!("embedded default config does not parse: {e}");
                Self {
                    login: LoginConfig::default(),
                    shell: ShellConfig::default(),
                    log: LogConfig::default(),
                }
            }
        }
    }

    /// Embedded defaults, overridden by ~/.config/minishell/config.toml if it exists.
    ///
    /// Keys present in the user file replace the defaults one by one.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = std::env::var_os("HOME")
            .and_then(|home| Self::load_overlay(&Path::new(&home).join(".config/minishell/config.toml")))
        {
            config.apply_overlay(overlay);
        }
        config
    }

    fn load_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("minishell: config parse error in {}: {e}", path.display());
                None
            }
        }
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.login.credentials {
            self.login.credentials = v;
        }
        if let Some(v) = overlay.login.max_attempts {
            self.login.max_attempts = v;
        }
        if let Some(v) = overlay.shell.root_dir {
            self.shell.root_dir = Some(v);
        }
        if let Some(v) = overlay.shell.history {
            self.shell.history = v;
        }
        if let Some(v) = overlay.log.level {
            self.log.level = v;
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.login.credentials, PathBuf::from("users.txt"));
        assert_eq!(config.login.max_attempts, 3);
        assert!(config.shell.history);
        assert_eq!(config.shell.root_dir, None);
        assert_eq!(config.log.level, "error");
    }

    #[test]
    fn default_root_is_platform_root() {
        let config = Config::default_config();
        assert_eq!(config.shell.root_dir(), default_root_dir());
    }

    #[test]
    fn overlay_overrides_only_given_keys() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [login]
            max_attempts = 5

            [shell]
            root_dir = "/srv"
        "#,
        );
        assert_eq!(config.login.max_attempts, 5);
        assert_eq!(config.login.credentials, PathBuf::from("users.txt"));
        assert_eq!(config.shell.root_dir(), PathBuf::from("/srv"));
        assert!(config.shell.history);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.login.max_attempts, 3);
        assert_eq!(config.log.level, "error");
    }

    #[test]
    fn malformed_overlay_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[login\nmax_attempts = ").unwrap();
        assert!(Config::load_overlay(&path).is_none());
        assert!(Config::load_overlay(&dir.path().join("absent.toml")).is_none());
    }

    #[test]
    fn overlay_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log]\nlevel = \"debug\"\n[shell]\nhistory = false\n").unwrap();
        let mut config = Config::default_config();
        config.apply_overlay(Config::load_overlay(&path).unwrap());
        assert_eq!(config.log.level, "debug");
        assert!(!config.shell.history);
    }
}
