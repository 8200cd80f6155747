use crate::error::RssError;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the path of the YAML configuration file.
pub const CONFIG_FILE_ENV: &str = "RSS_CONFIG_FILE";

/// Protocol revisions advertised on the API index.
pub const API_LEVELS: &[&str] = &["v1-2"];

/// Version reported by the version/status endpoints.
pub const NEWS_APP_VERSION: &str = "6.0.5";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FolderSeed {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FeedSeed {
    pub name: String,
    pub url: String,
    /// Name of the parent folder.
    pub folder: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// SQLite database file.
    pub database: PathBuf,
    #[serde(default)]
    pub users: Vec<UserEntry>,
    #[serde(default)]
    pub folders: Vec<FolderSeed>,
    #[serde(default)]
    pub feeds: Vec<FeedSeed>,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    /// Build a config with no users or seeds, pointing at `database`.
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            users: Vec::new(),
            folders: Vec::new(),
            feeds: Vec::new(),
            loglevel: default_loglevel(),
            listen_addr: default_listen_addr(),
        }
    }

    /// Load the file named by `RSS_CONFIG_FILE`.
    pub fn from_env() -> Result<Self, RssError> {
        let path = std::env::var_os(CONFIG_FILE_ENV)
            .ok_or(RssError::MissingConfigPath(CONFIG_FILE_ENV))?;
        Self::load(Path::new(&path))
    }

    /// Load a YAML file; `RSS_LOGLEVEL` and `RSS_LISTEN_ADDR` override it.
    pub fn load(path: &Path) -> Result<Self, RssError> {
        // Read eagerly: figment silently ignores missing files.
        let contents = std::fs::read_to_string(path)?;
        let cfg: Config = Figment::new()
            .merge(Yaml::string(&contents))
            .merge(Env::prefixed("RSS_").only(&["loglevel", "listen_addr"]))
            .extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), RssError> {
        for feed in &self.feeds {
            Url::parse(&feed.url).map_err(|e| {
                RssError::Config(format!(
                    "feed {:?} has invalid url {:?}: {e}",
                    feed.name, feed.url
                ))
            })?;
        }
        Ok(())
    }
}
