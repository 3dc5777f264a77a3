//! kubectl-style configuration
//!
//! Contexts pair a cluster with a user. The file lives at
//! `~/.searchctl/config.yaml` unless `--config` or `SEARCHCTL_CONFIG` points
//! elsewhere; without a file the built-in `default` context targets
//! `http://localhost:9200` without credentials. Environment variables
//! override the resolved connection:
//!
//! - `SEARCHCTL_URL`
//! - `SEARCHCTL_APIKEY`
//! - `SEARCHCTL_USERNAME` / `SEARCHCTL_PASSWORD`

use crate::client::{Auth, ConnectionSettings, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const CONFIG_ENV: &str = "SEARCHCTL_CONFIG";
pub const URL_ENV: &str = "SEARCHCTL_URL";
pub const APIKEY_ENV: &str = "SEARCHCTL_APIKEY";
pub const USERNAME_ENV: &str = "SEARCHCTL_USERNAME";
pub const PASSWORD_ENV: &str = "SEARCHCTL_PASSWORD";

const DEFAULT_SERVER: &str = "http://localhost:9200";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("no current context is set")]
    NoCurrentContext,

    #[error("context {0:?} not found")]
    ContextNotFound(String),

    #[error("cluster {0:?} not found")]
    ClusterNotFound(String),

    #[error("user {0:?} not found")]
    UserNotFound(String),

    #[error("invalid server URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no config file location: home directory unknown")]
    NoLocation,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub current_context: String,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Config".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterConfig {
    pub server: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure_skip_tls_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            current_context: "default".to_string(),
            contexts: vec![NamedContext {
                name: "default".to_string(),
                context: ContextConfig {
                    cluster: "default".to_string(),
                    user: "default".to_string(),
                },
            }],
            clusters: vec![NamedCluster {
                name: "default".to_string(),
                cluster: ClusterConfig {
                    server: DEFAULT_SERVER.to_string(),
                    ..Default::default()
                },
            }],
            users: vec![NamedUser {
                name: "default".to_string(),
                user: UserConfig::default(),
            }],
        }
    }
}

/// Connection overrides taken from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub url: Option<String>,
    pub apikey: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl EnvOverrides {
    /// Read the `SEARCHCTL_*` variables. Empty values count as unset.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            url: var(URL_ENV),
            apikey: var(APIKEY_ENV),
            username: var(USERNAME_ENV),
            password: var(PASSWORD_ENV),
        }
    }
}

impl Config {
    /// Parse a config file. A missing file yields the built-in default.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text).map_err(write_err)
    }

    /// The context in effect: the override when given, else `current-context`.
    pub fn current_context_name<'a>(&'a self, context_override: Option<&'a str>) -> Result<&'a str> {
        match context_override.filter(|c| !c.is_empty()) {
            Some(name) => Ok(name),
            None if self.current_context.is_empty() => Err(ConfigError::NoCurrentContext),
            None => Ok(&self.current_context),
        }
    }

    pub fn context(&self, name: &str) -> Result<&ContextConfig> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.context)
            .ok_or_else(|| ConfigError::ContextNotFound(name.to_string()))
    }

    pub fn cluster(&self, name: &str) -> Result<&ClusterConfig> {
        self.clusters
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.cluster)
            .ok_or_else(|| ConfigError::ClusterNotFound(name.to_string()))
    }

    /// A context without a user connects anonymously.
    pub fn user(&self, name: &str) -> Result<UserConfig> {
        if name.is_empty() {
            return Ok(UserConfig::default());
        }
        self.users
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.user.clone())
            .ok_or_else(|| ConfigError::UserNotFound(name.to_string()))
    }

    /// Resolve the connection for a context with environment overrides applied.
    pub fn resolve(
        &self,
        context_override: Option<&str>,
        env: &EnvOverrides,
    ) -> Result<ConnectionSettings> {
        let context = self.context(self.current_context_name(context_override)?)?;
        let cluster = self.cluster(&context.cluster)?;
        let user = self.user(&context.user)?;

        let server = env.url.clone().unwrap_or_else(|| cluster.server.clone());
        let url = Url::parse(&server).map_err(|source| ConfigError::InvalidUrl {
            url: server.clone(),
            source,
        })?;

        let env_credentials = env.apikey.is_some() || env.username.is_some();
        let auth = if env_credentials {
            Auth::new(
                env.username.clone(),
                env.password.clone(),
                env.apikey.clone(),
            )
        } else {
            Auth::new(user.username, user.password, user.api_key)
        };

        Ok(ConnectionSettings {
            url,
            auth,
            insecure: cluster.insecure_skip_tls_verify,
            timeout: cluster
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    /// Switch `current-context`. The context must exist.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        self.context(name)?;
        self.current_context = name.to_string();
        Ok(())
    }
}

/// `~/.searchctl/config.yaml`.
pub fn default_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".searchctl").join("config.yaml"))
}

/// Config location: the flag, then `SEARCHCTL_CONFIG`, then the default.
pub fn locate(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| {
            std::env::var(CONFIG_ENV)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .or_else(default_path)
}

/// A config together with where it was (or would be) read from.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: Option<PathBuf>,
    pub config: Config,
}

impl ConfigFile {
    pub fn load(flag: Option<&Path>) -> Result<Self> {
        let path = locate(flag);
        let config = match &path {
            Some(path) => Config::load_from(path)?,
            None => Config::default(),
        };
        Ok(Self { path, config })
    }

    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or(ConfigError::NoLocation)?;
        self.config.save_to(path)
    }
}
