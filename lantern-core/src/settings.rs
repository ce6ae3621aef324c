//! Persisted scanner settings
//!
//! Loaded once before a crawl and read-only afterwards. A missing file is
//! seeded with defaults; a corrupt one falls back to defaults in memory so
//! the scan always proceeds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Config file location, tilde-expanded at load time
pub const CONFIG_FILE_PATH: &str = "~/.config/lantern/config.json";

/// SOCKS5h endpoint of a default local Tor daemon. The `h` makes the proxy
/// resolve hostnames so the target never hits a local resolver.
pub const DEFAULT_PROXY: &str = "socks5h://127.0.0.1:9050";

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Proxy endpoint for http:// targets
    #[serde(default = "default_proxy")]
    pub http_proxy: String,
    /// Proxy endpoint for https:// targets
    #[serde(default = "default_proxy")]
    pub https_proxy: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Paths probed against the base URL, in order
    #[serde(default = "default_common_paths")]
    pub common_paths: Vec<String>,
}

fn default_proxy() -> String {
    DEFAULT_PROXY.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_common_paths() -> Vec<String> {
    [
        "/admin/",
        "/login.php",
        "/panel/",
        "/dashboard/",
        "/config.php",
        "/.env",
        "/phpinfo.php",
        "/test.php",
        "/backup.zip",
        "/sitemap.xml",
        "/robots.txt",
        "/.git/config",
        "/.svn/entries",
        "/README.md",
        "/index.php.bak",
        "/.htaccess",
        "/wp-admin/",
        "/wp-login.php",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_proxy: default_proxy(),
            https_proxy: default_proxy(),
            timeout_secs: default_timeout(),
            common_paths: default_common_paths(),
        }
    }
}

impl Settings {
    /// Load from the per-user config file, seeding it with defaults when absent
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(raw) => match serde_json::from_str(&raw) {
                    Ok(settings) => {
                        info!("Loaded configuration from {}", path.display());
                        settings
                    }
                    Err(e) => {
                        warn!(
                            "Error parsing config file {}: {}. Using default config.",
                            path.display(),
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!(
                        "Could not read config file {}: {}. Using default config.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            }
        } else {
            let defaults = Self::default();
            match defaults.store(path) {
                Ok(()) => info!("Created default config file at {}", path.display()),
                Err(e) => warn!(
                    "Could not write default config file to {}: {}. Using default config.",
                    path.display(),
                    e
                ),
            }
            defaults
        }
    }

    /// Write the settings as pretty-printed JSON, creating parent directories
    pub fn store(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, raw)
    }
}

fn config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(CONFIG_FILE_PATH).as_ref())
}
