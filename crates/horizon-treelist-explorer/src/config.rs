//! Explorer settings, loaded from TOML.
//!
//! Every field has a default, so a file only needs the keys it changes:
//!
//! ```toml
//! expand_depth = 1
//! show_hidden = true
//!
//! [list]
//! row_height = 20
//! selection_mode = "MultiExtended"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use horizon_treelist::{Size, TreeListConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

/// File name looked up in the platform configuration directory.
pub const CONFIG_FILE_NAME: &str = "explorer.toml";

/// Default `strftime` pattern of the "Date modified" column.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Settings of one explorer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Directory whose entries become the root rows; the home directory if unset.
    pub root: Option<PathBuf>,
    /// How many levels below the roots are expanded before printing.
    pub expand_depth: usize,
    /// Whether entries starting with `.` are listed.
    pub show_hidden: bool,
    /// Simulated client width in pixels.
    pub viewport_width: i32,
    /// Simulated client height in pixels.
    pub viewport_height: i32,
    /// Pixels per character when converting column widths to text.
    pub char_width: i32,
    pub date_format: String,
    /// Settings handed to the control.
    pub list: TreeListConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            root: None,
            expand_depth: 0,
            show_hidden: false,
            viewport_width: 800,
            viewport_height: 600,
            char_width: 8,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            list: TreeListConfig::default(),
        }
    }
}

impl ExplorerConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| ExplorerError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ExplorerError::io(path, e))?;
        let config = Self::from_toml(&text, path)?;
        config.list.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads `explicit` if given, else the file in the platform configuration
    /// directory if it exists, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The directory to list: the configured root or the home directory.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or(ExplorerError::NoHomeDirectory)
    }

    /// The simulated client size.
    pub fn viewport_size(&self) -> Size {
        Size::new(self.viewport_width.max(0), self.viewport_height.max(0))
    }
}

/// `<config dir>/explorer.toml` for this application, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "Horizon Lattice", "TreeList Explorer")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
