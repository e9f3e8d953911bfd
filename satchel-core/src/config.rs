//! Loading and validating the inventory configuration.

use std::{fs, io, path::Path};

use rustc_hash::FxHashSet;
use satchel_utils::Footprint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::InventoryError;
use crate::inventory::InventoryGrid;
use crate::item::{ItemCatalog, ItemCategory, ItemKind};

const DEFAULT_CONFIG: &str = include_str!("../../package-content/satchel_config.json5");

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("config file I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid JSON5 or doesn't match the expected shape.
    #[error("config file is malformed: {0}")]
    Parse(#[from] serde_json5::Error),
    /// The values parsed but make no sense together.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
    /// An item kind could not be built.
    #[error("invalid item kind: {0}")]
    Item(#[from] InventoryError),
}

/// Settings for one inventory grid and the item kinds it can hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatchelConfig {
    /// Width of the grid in pixels.
    pub grid_width: u32,
    /// Height of the grid in pixels.
    pub grid_height: u32,
    /// Side length of one slot in pixels.
    pub slot_size: u32,
    /// Default log filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Item kinds, in catalog order.
    #[serde(default)]
    pub items: Vec<ItemKindConfig>,
}

/// One item kind as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemKindConfig {
    /// Unique kind id.
    pub id: String,
    /// Display name. Defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Category.
    #[serde(default)]
    pub category: ItemCategory,
    /// Footprint width in cells.
    #[serde(default = "one_cell")]
    pub width: i32,
    /// Footprint height in cells.
    #[serde(default = "one_cell")]
    pub height: i32,
    /// Whether items of this kind stack.
    #[serde(default = "yes")]
    pub stackable: bool,
    /// Largest stack. Ignored for non-stackable kinds.
    #[serde(default = "one_item")]
    pub max_stack_size: u32,
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn one_cell() -> i32 {
    1
}

fn one_item() -> u32 {
    1
}

fn yes() -> bool {
    true
}

impl ItemKindConfig {
    /// Builds the item kind this entry describes.
    pub fn to_kind(&self) -> Result<ItemKind, InventoryError> {
        let footprint =
            Footprint::new(self.width, self.height).ok_or(InventoryError::InvalidFootprint {
                width: self.width,
                height: self.height,
            })?;
        Ok(
            ItemKind::new(self.id.clone(), footprint, self.stackable, self.max_stack_size)?
                .with_name(self.name.clone().unwrap_or_else(|| self.id.clone()))
                .with_category(self.category),
        )
    }
}

impl SatchelConfig {
    /// Parses the configuration bundled with the crate.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json5(DEFAULT_CONFIG)
    }

    /// Parses and validates a JSON5 document.
    pub fn from_json5(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json5::from_str(text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Reads the config at `path`, or writes the bundled default there and uses that.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let config_str = fs::read_to_string(path)?;
            return Self::from_json5(&config_str);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        log::info!("Wrote default config to {}", path.display());
        Self::bundled()
    }

    /// Checks the values for consistency.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.slot_size == 0 {
            return Err("Slot size must be greater than 0");
        }
        if self.grid_width < self.slot_size || self.grid_height < self.slot_size {
            return Err("Grid must be at least one slot wide and one slot high");
        }
        if i32::try_from(self.grid_width / self.slot_size).is_err()
            || i32::try_from(self.grid_height / self.slot_size).is_err()
        {
            return Err("Grid has too many slots");
        }

        let mut seen = FxHashSet::default();
        for item in &self.items {
            if item.id.is_empty() {
                return Err("Item ids must not be empty");
            }
            if !seen.insert(item.id.as_str()) {
                return Err("Item ids must be unique");
            }
            if item.width < 1 || item.height < 1 {
                return Err("Item footprints must be at least 1x1");
            }
            if item.max_stack_size == 0 {
                return Err("Item max stack size must be at least 1");
            }
        }
        Ok(())
    }

    /// Returns the number of columns, rounding partial slots down.
    #[must_use]
    pub fn columns(&self) -> i32 {
        i32::try_from(self.grid_width / self.slot_size.max(1)).unwrap_or(i32::MAX)
    }

    /// Returns the number of rows, rounding partial slots down.
    #[must_use]
    pub fn rows(&self) -> i32 {
        i32::try_from(self.grid_height / self.slot_size.max(1)).unwrap_or(i32::MAX)
    }

    /// Builds the item catalog.
    pub fn catalog(&self) -> Result<ItemCatalog, InventoryError> {
        let mut catalog = ItemCatalog::new();
        for item in &self.items {
            catalog.insert(item.to_kind()?);
        }
        Ok(catalog)
    }

    /// Builds an empty grid with the configured dimensions.
    pub fn build_grid(&self) -> Result<InventoryGrid, InventoryError> {
        InventoryGrid::new(self.columns(), self.rows(), self.slot_size)
    }
}

impl Default for SatchelConfig {
    fn default() -> Self {
        Self {
            grid_width: 320,
            grid_height: 320,
            slot_size: 32,
            log_level: default_log_level(),
            items: Vec::new(),
        }
    }
}
