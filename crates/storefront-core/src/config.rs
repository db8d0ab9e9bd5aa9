//! Storefront configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// Storefront configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Backend API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Recently viewed products.
    #[serde(default)]
    pub recently_viewed: RecentlyViewedConfig,

    /// Toast notifications.
    #[serde(default)]
    pub toasts: ToastConfig,

    /// Add-to-cart behaviour.
    #[serde(default)]
    pub cart: CartConfig,

    /// Post-login routing.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load config from a file. `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Find a config file in `start` or any parent directory.
    pub fn find(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_FILE_NAMES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load `explicit` if given, else the nearest config above `cwd`, else
    /// defaults. Returns the file used, if any.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        match Self::find(cwd) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where the key-value store lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for `storage.json`. Defaults to the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Path of the storage file.
    pub fn path(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| data_dir().join("storefront"))
            .join("storage.json")
    }
}

/// Platform data directory.
fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentlyViewedConfig {
    /// Stored history length.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Entries shown by default.
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

fn default_max_entries() -> usize {
    20
}

fn default_display_limit() -> usize {
    10
}

impl Default for RecentlyViewedConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            display_limit: default_display_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastConfig {
    #[serde(default = "default_toast_duration_ms")]
    pub default_duration_ms: u64,

    /// Time a closing toast stays before removal.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

fn default_toast_duration_ms() -> u64 {
    5000
}

fn default_grace_ms() -> u64 {
    300
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_toast_duration_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// How long the add button shows its confirmation.
    #[serde(default = "default_confirmation_ms")]
    pub confirmation_ms: u64,

    /// Quantity ceiling when stock is unknown.
    #[serde(default = "default_max_quantity")]
    pub default_max_quantity: u32,

    /// The backend accepts a whole quantity in one request.
    #[serde(default)]
    pub batch_add: bool,
}

fn default_confirmation_ms() -> u64 {
    2000
}

fn default_max_quantity() -> u32 {
    10
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            confirmation_ms: default_confirmation_ms(),
            default_max_quantity: default_max_quantity(),
            batch_add: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Role name to landing path.
    #[serde(default = "default_role_redirects")]
    pub role_redirects: BTreeMap<String, String>,

    /// Landing path when neither a role path nor a return path applies.
    #[serde(default = "default_redirect")]
    pub default_redirect: String,
}

fn default_role_redirects() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("admin".to_string(), "/admin".to_string()),
        ("seller".to_string(), "/seller/dashboard".to_string()),
    ])
}

fn default_redirect() -> String {
    "/".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            role_redirects: default_role_redirects(),
            default_redirect: default_redirect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Generate a default storefront.toml.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# Storefront client configuration

[api]
base_url = "{base_url}"
timeout_secs = 30

[storage]
# dir = "/path/to/storage"

[recently_viewed]
max_entries = 20
display_limit = 10

[toasts]
default_duration_ms = 5000
grace_ms = 300

[cart]
confirmation_ms = 2000
default_max_quantity = 10
# Set when the backend accepts a whole quantity in one request.
batch_add = false

[auth]
default_redirect = "/"

[auth.role_redirects]
admin = "/admin"
seller = "/seller/dashboard"

[logging]
level = "info"
"#,
        base_url = base_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_matches_defaults() {
        let parsed: StorefrontConfig =
            toml::from_str(&generate_default_config("http://localhost:5000/api")).unwrap();
        assert_eq!(parsed, StorefrontConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: StorefrontConfig = toml::from_str(
            r#"
[api]
base_url = "https://shop.test/api"

[cart]
batch_add = true
"#,
        )
        .unwrap();
        assert_eq!(parsed.api.base_url, "https://shop.test/api");
        assert_eq!(parsed.api.timeout_secs, 30);
        assert!(parsed.cart.batch_add);
        assert_eq!(parsed.cart.confirmation_ms, 2000);
        assert_eq!(parsed.auth.role_redirects["seller"], "/seller/dashboard");
    }

    #[test]
    fn test_save_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorefrontConfig::default();
        config.recently_viewed.display_limit = 4;

        for name in ["a.toml", "a.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(StorefrontConfig::load(&path).unwrap(), config);
        }
        let json = std::fs::read_to_string(dir.path().join("a.json")).unwrap();
        assert!(json.trim_start().starts_with('{'));
    }

    #[test]
    fn test_find_searches_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".storefront.toml"), "[logging]\nlevel = \"debug\"\n").unwrap();

        let (config, found) = StorefrontConfig::discover(None, &nested).unwrap();
        assert_eq!(found, Some(dir.path().join(".storefront.toml")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_storage_path() {
        let storage = StorageConfig {
            dir: Some(PathBuf::from("/tmp/shop")),
        };
        assert_eq!(storage.path(), PathBuf::from("/tmp/shop/storage.json"));
    }
}
