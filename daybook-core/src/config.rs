//! Global daybook configuration at `~/.config/daybook/config.toml`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_CREATOR, DEFAULT_MAX_DOTS_PER_DAY};
use crate::error::{DaybookError, DaybookResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/daybook";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_creator() -> String {
    DEFAULT_CREATOR.to_string()
}

fn default_max_dots_per_day() -> usize {
    DEFAULT_MAX_DOTS_PER_DAY
}

/// Settings read from the config file, overridable with `DAYBOOK_*`
/// environment variables (e.g. `DAYBOOK_DATA_DIR`).
#[derive(Debug, Clone, Deserialize)]
pub struct DaybookConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where exports go. Falls back to the data directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    #[serde(default = "default_creator")]
    pub default_creator: String,

    #[serde(default = "default_max_dots_per_day")]
    pub max_dots_per_day: usize,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        DaybookConfig {
            data_dir: default_data_dir(),
            export_dir: None,
            default_creator: default_creator(),
            max_dots_per_day: default_max_dots_per_day(),
        }
    }
}

impl DaybookConfig {
    pub fn config_path() -> DaybookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DaybookError::Config("Could not determine config directory".into()))?
            .join("daybook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template there
    /// on first run.
    pub fn load() -> DaybookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DaybookResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("DAYBOOK").try_parsing(true))
            .build()
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DaybookError::Config(e.to_string()))
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_dir
            .as_deref()
            .map(expand)
            .unwrap_or_else(|| self.data_path())
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> DaybookResult<()> {
        let contents = format!(
            "\
# daybook configuration

# Where events, categories and preferences are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Where `daybook export` writes .ics files (defaults to data_dir):
# export_dir = \"~/Downloads\"

# Creator recorded on new entries when none is given:
# default_creator = \"{DEFAULT_CREATOR}\"

# Marker dots shown per day in the month view:
# max_dots_per_day = {DEFAULT_MAX_DOTS_PER_DAY}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaybookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DaybookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
