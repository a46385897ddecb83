//! TOML configuration.
//!
//! ```toml
//! material = "aluminum"
//!
//! [conversion]
//! freecad_timeout_secs = 300
//! freecad_commands = ["freecadcmd", ["flatpak", "run", "--command=FreeCADCmd", "org.freecad.FreeCAD"]]
//!
//! [cost]
//! setup_cost = 5000.0
//! ```
//!
//! A top-level `scratch_dir = "/var/tmp/partscope"` moves request workspaces
//! out of the system temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use partscope_analysis::{CostRates, Material};
use partscope_convert::ConversionSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Everything tunable about a run. Missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Converter chain settings.
    pub conversion: ConversionSettings,
    /// Shop rates.
    pub cost: CostRates,
    /// Material used when none is given.
    pub material: Material,
    /// Parent of per-request workspaces. System temp directory when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_toml_str(&text)
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
