//! Crop catalog
//!
//! The built-in table is taken from the grower's cultivation sheet. Basil
//! and tomato need a warmer, drier, more concentrated nutrient regime than
//! the leafy greens and cannot share a container with them.

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, FarmResult};
use crate::models::{ClimateEnvelope, CropType, GrowthStage, StageParameters};
use crate::types::ClimateRange;
use crate::validation::validate_crop;

/// Read-only table of crop definitions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CropCatalog {
    crops: Vec<CropType>,
}

impl CropCatalog {
    /// Validate and wrap a list of crops
    pub fn new(crops: Vec<CropType>) -> FarmResult<Self> {
        for (index, crop) in crops.iter().enumerate() {
            validate_crop(crop)
                .map_err(|msg| FarmError::InvalidCatalog(format!("{}: {}", crop.id, msg)))?;
            if crops[..index].iter().any(|c| c.id == crop.id) {
                return Err(FarmError::InvalidCatalog(format!(
                    "duplicate crop id {}",
                    crop.id
                )));
            }
        }
        Ok(Self { crops })
    }

    /// Parse a catalog from a JSON array of crops
    pub fn from_json(json: &str) -> FarmResult<Self> {
        let crops: Vec<CropType> = serde_json::from_str(json)?;
        Self::new(crops)
    }

    pub fn builtin() -> Self {
        Self {
            crops: vec![
                arugula(),
                lollo_rossa(),
                romano(),
                endive(),
                basil(),
                lettuce(),
                spinach(),
                tomato(),
            ],
        }
    }

    pub fn crops(&self) -> &[CropType] {
        &self.crops
    }

    pub fn get(&self, crop_id: &str) -> Option<&CropType> {
        self.crops.iter().find(|c| c.id == crop_id)
    }

    /// Like [`CropCatalog::get`], failing with `UnknownCrop`
    pub fn require(&self, crop_id: &str) -> FarmResult<&CropType> {
        self.get(crop_id)
            .ok_or_else(|| FarmError::UnknownCrop(crop_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}

impl Default for CropCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Built-in crops
// ============================================================================

fn stage(id: &str, name: &str, duration: u32, description: &str, icon: &str) -> GrowthStage {
    GrowthStage {
        id: id.to_string(),
        name: name.to_string(),
        duration,
        description: description.to_string(),
        icon: icon.to_string(),
        parameters: None,
    }
}

/// pH and EC given in tenths / whole units, temperature and humidity whole
fn params(ph: (i64, i64), ec: (i64, i64), temperature: (i64, i64), humidity: (i64, i64)) -> StageParameters {
    StageParameters {
        ph: ClimateRange::tenths(ph.0, ph.1),
        ec: ClimateRange::whole(ec.0, ec.1),
        temperature: ClimateRange::whole(temperature.0, temperature.1),
        humidity: ClimateRange::whole(humidity.0, humidity.1),
    }
}

fn with_params(mut stage: GrowthStage, parameters: StageParameters) -> GrowthStage {
    stage.parameters = Some(parameters);
    stage
}

fn crop(
    id: &str,
    name: &str,
    icon: &str,
    color: &str,
    envelope: ClimateEnvelope,
    growth_stages: Vec<GrowthStage>,
) -> CropType {
    let total_growth_days = growth_stages.iter().map(|s| s.duration).sum();
    CropType {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        image: Some(format!("/images/crops/{}.svg", id)),
        climate_requirements: envelope,
        growth_stages,
        total_growth_days,
    }
}

fn leafy_green_envelope(ph_max_tenths: i64) -> ClimateEnvelope {
    ClimateEnvelope {
        temperature: ClimateRange::whole(20, 22),
        humidity: ClimateRange::whole(70, 75),
        co2: ClimateRange::whole(800, 1200),
        lighting: ClimateRange::whole(200, 400),
        ph: ClimateRange::tenths(58, ph_max_tenths),
        ec: ClimateRange::whole(900, 1400),
    }
}

fn arugula() -> CropType {
    crop(
        "arugula",
        "Arugula",
        "🌿",
        "#16A34A",
        leafy_green_envelope(65),
        vec![
            with_params(
                stage("germination", "Sprouts", 4, "Seed germination", "🌱"),
                params((58, 62), (900, 1200), (20, 22), (70, 75)),
            ),
            with_params(
                stage("vegetation", "Vegetation", 12, "Active leaf growth", "🌿"),
                params((60, 65), (900, 1200), (20, 22), (70, 75)),
            ),
            with_params(
                stage("maturation", "Maturation", 8, "Preparing for harvest", "🍃"),
                params((60, 65), (1300, 1400), (20, 22), (70, 75)),
            ),
        ],
    )
}

fn lollo_rossa() -> CropType {
    crop(
        "lollo_rossa",
        "Lollo Rossa",
        "🥬",
        "#DC2626",
        leafy_green_envelope(63),
        vec![
            with_params(
                stage("germination", "Sprouts", 5, "Seed germination", "🌱"),
                params((58, 62), (900, 1200), (20, 22), (70, 75)),
            ),
            with_params(
                stage("vegetation", "Vegetation", 17, "Leaf formation", "🌿"),
                params((58, 63), (900, 1400), (20, 22), (70, 75)),
            ),
            with_params(
                stage("maturation", "Maturation", 8, "Final maturation", "🍃"),
                params((60, 63), (1300, 1400), (20, 22), (70, 75)),
            ),
        ],
    )
}

fn romano() -> CropType {
    crop(
        "romano",
        "Romano",
        "🥬",
        "#059669",
        leafy_green_envelope(65),
        vec![
            with_params(
                stage("germination", "Sprouts", 6, "Seed germination", "🌱"),
                params((58, 63), (900, 1200), (20, 22), (70, 75)),
            ),
            with_params(
                stage("vegetation", "Vegetation", 22, "Active growth", "🌿"),
                params((58, 64), (900, 1400), (20, 22), (70, 75)),
            ),
            with_params(
                stage("maturation", "Maturation", 12, "Preparing for harvest", "🍃"),
                params((60, 65), (1300, 1400), (20, 22), (70, 75)),
            ),
        ],
    )
}

fn endive() -> CropType {
    crop(
        "endive",
        "Endive",
        "🥬",
        "#10B981",
        leafy_green_envelope(65),
        vec![
            with_params(
                stage("germination", "Sprouts", 5, "Seed germination", "🌱"),
                params((58, 63), (900, 1200), (20, 22), (70, 75)),
            ),
            with_params(
                stage("vegetation", "Vegetation", 17, "Leaf formation", "🌿"),
                params((59, 64), (900, 1400), (20, 22), (70, 75)),
            ),
            with_params(
                stage("maturation", "Maturation", 12, "Final maturation", "🍃"),
                params((60, 65), (1300, 1400), (20, 22), (70, 75)),
            ),
        ],
    )
}

fn basil() -> CropType {
    crop(
        "basil",
        "Basil",
        "🌿",
        "#7C3AED",
        ClimateEnvelope {
            temperature: ClimateRange::whole(25, 30),
            humidity: ClimateRange::whole(50, 60),
            co2: ClimateRange::whole(1000, 1500),
            lighting: ClimateRange::whole(300, 500),
            ph: ClimateRange::tenths(65, 75),
            ec: ClimateRange::whole(1500, 2000),
        },
        vec![
            with_params(
                stage("germination", "Sprouts", 7, "Seed germination", "🌱"),
                params((65, 70), (1500, 1700), (25, 30), (50, 60)),
            ),
            with_params(
                stage("vegetation", "Vegetation", 21, "Active leaf growth", "🌿"),
                params((65, 75), (1500, 1800), (25, 30), (50, 60)),
            ),
            with_params(
                stage("maturation", "Maturation", 14, "Preparing for harvest", "🍃"),
                params((68, 75), (1800, 2000), (25, 30), (50, 60)),
            ),
        ],
    )
}

fn lettuce() -> CropType {
    crop(
        "lettuce",
        "Lettuce",
        "🥬",
        "#10B981",
        ClimateEnvelope {
            temperature: ClimateRange::whole(16, 22),
            humidity: ClimateRange::whole(50, 65),
            co2: ClimateRange::whole(600, 1000),
            lighting: ClimateRange::whole(150, 300),
            ph: ClimateRange::tenths(60, 70),
            ec: ClimateRange::whole(800, 1200),
        },
        vec![
            stage("germination", "Germination", 5, "Seed germination", "🌱"),
            stage("seedling", "Seedling", 10, "Seedling development", "🌿"),
            stage("vegetation", "Vegetation", 25, "Leaf formation", "🥬"),
            stage("harvest", "Harvest", 5, "Ready to harvest", "✂️"),
        ],
    )
}

fn spinach() -> CropType {
    crop(
        "spinach",
        "Spinach",
        "🥬",
        "#059669",
        ClimateEnvelope {
            temperature: ClimateRange::whole(15, 20),
            humidity: ClimateRange::whole(55, 70),
            co2: ClimateRange::whole(700, 1100),
            lighting: ClimateRange::whole(180, 350),
            ph: ClimateRange::tenths(60, 75),
            ec: ClimateRange::whole(900, 1300),
        },
        vec![
            stage("germination", "Germination", 6, "Seed germination", "🌱"),
            stage("seedling", "Seedling", 12, "Seedling development", "🌿"),
            stage("vegetation", "Vegetation", 20, "Active growth", "🍃"),
            stage("harvest", "Harvest", 7, "Ready to harvest", "✂️"),
        ],
    )
}

fn tomato() -> CropType {
    crop(
        "tomato",
        "Tomato",
        "🍅",
        "#DC2626",
        ClimateEnvelope {
            temperature: ClimateRange::whole(28, 35),
            humidity: ClimateRange::whole(40, 50),
            co2: ClimateRange::whole(1500, 2000),
            lighting: ClimateRange::whole(500, 800),
            ph: ClimateRange::tenths(50, 55),
            ec: ClimateRange::whole(2000, 2500),
        },
        vec![
            stage("germination", "Germination", 10, "Seed germination", "🌱"),
            stage("seedling", "Seedling", 21, "Seedling development", "🌿"),
            stage("vegetation", "Vegetation", 45, "Flowering and fruit set", "🌸"),
            stage("harvest", "Harvest", 14, "Fruit ripening", "✂️"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let builtin = CropCatalog::builtin();
        let revalidated = CropCatalog::new(builtin.crops().to_vec());
        assert!(revalidated.is_ok());
        assert_eq!(builtin.len(), 8);
    }

    #[test]
    fn test_total_growth_days() {
        let catalog = CropCatalog::builtin();
        assert_eq!(catalog.get("arugula").unwrap().total_growth_days, 24);
        assert_eq!(catalog.get("lollo_rossa").unwrap().total_growth_days, 30);
        assert_eq!(catalog.get("romano").unwrap().total_growth_days, 40);
        assert_eq!(catalog.get("endive").unwrap().total_growth_days, 34);
        assert_eq!(catalog.get("basil").unwrap().total_growth_days, 42);
        assert_eq!(catalog.get("lettuce").unwrap().total_growth_days, 45);
        assert_eq!(catalog.get("tomato").unwrap().total_growth_days, 90);
    }

    #[test]
    fn test_require_unknown_crop() {
        let catalog = CropCatalog::builtin();
        assert!(matches!(
            catalog.require("kale"),
            Err(FarmError::UnknownCrop(id)) if id == "kale"
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let crops = vec![arugula(), arugula()];
        assert!(matches!(
            CropCatalog::new(crops),
            Err(FarmError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_from_json_validates_totals() {
        let json = r##"[{
            "id": "microgreens",
            "name": "Microgreens",
            "icon": "🌱",
            "color": "#22C55E",
            "climate_requirements": {
                "temperature": {"min": 18, "max": 24},
                "humidity": {"min": 60, "max": 70},
                "co2": {"min": 600, "max": 1000},
                "lighting": {"min": 150, "max": 300},
                "ph": {"min": 5.5, "max": 6.5},
                "ec": {"min": 800, "max": 1200}
            },
            "growth_stages": [
                {"id": "germination", "name": "Germination", "duration": 3, "description": "", "icon": "🌱"},
                {"id": "growth", "name": "Growth", "duration": 7, "description": "", "icon": "🌿"}
            ],
            "total_growth_days": 11
        }]"##;
        assert!(matches!(
            CropCatalog::from_json(json),
            Err(FarmError::InvalidCatalog(_))
        ));

        let fixed = json.replace("\"total_growth_days\": 11", "\"total_growth_days\": 10");
        let catalog = CropCatalog::from_json(&fixed).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("microgreens").is_some());
    }
}
