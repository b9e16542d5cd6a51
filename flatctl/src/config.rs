// SPDX-License-Identifier: MIT

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use flatfs::constant::FLAT_MIN_CONTAINER_SIZE;
use serde::Deserialize;

use crate::size::Size;

pub const DEFAULT_CONTAINER: &str = "container.flat";
pub const DEFAULT_CONFIG: &str = "flatctl.toml";

/// Optional `flatctl.toml`.
///
/// ```toml
/// container = "data/box.flat"
/// size = "8M"
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub container: Option<PathBuf>,
    pub size: Option<Size>,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        // Relative container paths are taken from the config's own directory.
        if let Some(container) = config.container.as_mut() {
            if container.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                *container = base.join(&*container);
            }
        }
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise `flatctl.toml` from the working
    /// directory when present.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Effective settings after command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub container: PathBuf,
    /// Declared size; `None` means "read it from the container header".
    pub size: Option<Size>,
}

impl Settings {
    pub fn resolve(config: Config, container: Option<PathBuf>, size: Option<Size>) -> Self {
        Self {
            container: container
                .or(config.container)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTAINER)),
            size: size.or(config.size),
        }
    }

    /// Size used when creating a container.
    pub fn create_size(&self) -> anyhow::Result<u64> {
        let size = self.size.map_or(FLAT_MIN_CONTAINER_SIZE, Size::bytes);
        anyhow::ensure!(
            size >= FLAT_MIN_CONTAINER_SIZE,
            "Container size {} is below the minimum of {}",
            Size(size),
            Size(FLAT_MIN_CONTAINER_SIZE)
        );
        Ok(size)
    }
}
