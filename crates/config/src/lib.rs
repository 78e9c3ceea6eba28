//! Layered configuration for shelf.
//!
//! Values are merged from, in increasing priority:
//!
//! 1. built-in defaults (catalog and library root under the user's data directory),
//! 2. an optional configuration file (TOML, YAML or JSON, picked by extension),
//! 3. environment variables prefixed with `SHELF_`, nested keys separated by `__`
//!    (e.g. `SHELF_SEARCH__PAGE_SIZE=50`).
//!
//! ```toml
//! [library]
//! catalog = "/home/me/.local/share/shelf/catalog.db"
//! root = "/home/me/Books"
//! durability = "strict"
//! mode = "move"
//!
//! [search]
//! page_size = 20
//! more_results_cap = 100
//!
//! [convert]
//! program = "/usr/bin/ebook-convert"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use shelf_catalog::Durability;
use shelf_storage::Mode;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const ENV_PREFIX: &str = "SHELF_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub convert: ConvertConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// SQLite catalog database file.
    pub catalog: PathBuf,
    /// Directory imported files are placed under.
    pub root: PathBuf,
    #[serde(default)]
    pub durability: Durability,
    /// Whether imports copy or move the source file.
    #[serde(default)]
    pub mode: Mode,
}
impl Default for LibraryConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            catalog: data.join("catalog.db"),
            root: data.join("books"),
            durability: Durability::default(),
            mode: Mode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub page_size: usize,
    /// The most "more results" a search page will count.
    pub more_results_cap: usize,
}
impl Default for SearchConfig {
    fn default() -> Self {
        Self { page_size: 20, more_results_cap: 100 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Conversion program; discovered on `PATH` when unset.
    #[serde(default)]
    pub program: Option<PathBuf>,
}

/// The platform data directory for shelf, or a relative fallback when the
/// home directory can't be determined (which then fails validation).
fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", "shelf").map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_else(|| PathBuf::from("shelf"))
}

impl Config {
    /// The merged configuration sources, without extracting them.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::Invalid("configuration file must be .toml, .yaml, .yml or .json")),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the configuration. A missing `file` is not an error.
    #[instrument]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(catalog = %config.library.catalog.display(), root = %config.library.root.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.library.catalog.is_absolute() {
            exn::bail!(ErrorKind::Invalid("library.catalog must be an absolute path"));
        }
        if !self.library.root.is_absolute() {
            exn::bail!(ErrorKind::Invalid("library.root must be an absolute path"));
        }
        if self.search.page_size == 0 {
            exn::bail!(ErrorKind::Invalid("search.page_size must be greater than zero"));
        }
        Ok(())
    }
}
