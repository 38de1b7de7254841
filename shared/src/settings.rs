//! Configuration management for the Vertical Farm Dashboard
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. JSON overrides handed over by the host page
//! 3. Environment variable overrides with VFARM__ prefix

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::CropCatalog;
use crate::error::FarmResult;
use crate::types::ClimateData;

/// Main dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DashboardConfig {
    /// Container layout and mock population
    #[validate]
    pub container: ContainerConfig,

    /// Initial climate readings
    pub climate: ClimateData,

    /// tracing-subscriber filter directive, e.g. "info,shared=debug"
    #[validate(length(min = 1))]
    pub log_filter: String,

    /// Crop catalog replacing the built-in one
    #[serde(default)]
    pub catalog_json: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContainerConfig {
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1))]
    pub name: String,

    /// Row names, one letter each by convention
    #[validate(length(min = 1, max = 4))]
    pub rows: Vec<String>,

    #[validate(range(min = 1, max = 10))]
    pub racks_per_row: u32,

    #[validate(range(min = 1, max = 10))]
    pub trays_per_rack: u32,

    /// Fill the container with the deterministic mock pattern
    pub populate: bool,

    /// Crops cycled through when populating
    pub mock_crop_ids: Vec<String>,
}

impl DashboardConfig {
    /// Load configuration from defaults, JSON overrides and environment variables
    pub fn load(overrides_json: Option<&str>) -> FarmResult<Self> {
        Self::load_with_env(overrides_json, environment())
    }

    fn load_with_env(overrides_json: Option<&str>, env: Environment) -> FarmResult<Self> {
        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("container.id", "container_41_i2f")?
            .set_default("container.name", "Container No. 41-i2f")?
            .set_default("container.rows", vec!["A", "B"])?
            .set_default("container.racks_per_row", 6)?
            .set_default("container.trays_per_rack", 7)?
            .set_default("container.populate", true)?
            .set_default(
                "container.mock_crop_ids",
                vec!["arugula", "lollo_rossa", "romano", "endive", "basil"],
            )?
            .set_default("climate.temperature", 21.0)?
            .set_default("climate.humidity", 72.0)?
            .set_default("climate.co2", 1050.0)?
            .set_default("climate.lighting", 400.0)?
            .set_default("climate.ph", 6.1)?
            .set_default("climate.ec", 1050.0)?
            .set_default("log_filter", "info")?;

        if let Some(json) = overrides_json.filter(|j| !j.trim().is_empty()) {
            builder = builder.add_source(File::from_str(json, FileFormat::Json));
        }

        let config = builder
            // Override with environment variables (VFARM__ prefix)
            .add_source(env)
            .build()?;

        let config: DashboardConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Crop catalog selected by this configuration
    pub fn catalog(&self) -> FarmResult<CropCatalog> {
        match &self.catalog_json {
            Some(json) => CropCatalog::from_json(json),
            None => Ok(CropCatalog::builtin()),
        }
    }
}

/// `VFARM__CONTAINER__ROWS=A,B,C` style variables; list fields are comma separated
fn environment() -> Environment {
    Environment::with_prefix("VFARM")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("container.rows")
        .with_list_parse_key("container.mock_crop_ids")
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            container: ContainerConfig::default(),
            climate: ClimateData::default(),
            log_filter: "info".to_string(),
            catalog_json: None,
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            id: "container_41_i2f".to_string(),
            name: "Container No. 41-i2f".to_string(),
            rows: vec!["A".to_string(), "B".to_string()],
            racks_per_row: 6,
            trays_per_rack: 7,
            populate: true,
            mock_crop_ids: ["arugula", "lollo_rossa", "romano", "endive", "basil"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
