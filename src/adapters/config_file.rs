//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  A missing file
//! means first run and yields defaults; a file that does not parse is
//! `Corrupted`; a file that parses but fails range checks is rejected.
//! Saves go to a sibling temp file and are renamed into place, so a crash
//! mid-write leaves the previous config intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{SensorConfig, validate_config};

pub struct FileConfigAdapter {
    path: PathBuf,
}

impl FileConfigAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for FileConfigAdapter {
    fn load(&self) -> Result<SensorConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "FileConfigAdapter: {} not found, using defaults",
                    self.path.display()
                );
                return Ok(SensorConfig::default());
            }
            Err(e) => {
                warn!("FileConfigAdapter: read {} failed: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };

        let cfg: SensorConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("FileConfigAdapter: {} is not valid config: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        validate_config(&cfg)?;
        info!("FileConfigAdapter: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &SensorConfig) -> Result<(), ConfigError> {
        validate_config(config)?;

        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                warn!("FileConfigAdapter: write {} failed: {}", self.path.display(), e);
                ConfigError::IoError
            })?;
        info!("FileConfigAdapter: config saved to {}", self.path.display());
        Ok(())
    }
}
