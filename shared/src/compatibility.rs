//! Crop compatibility
//!
//! Two crops can share a container only if their climate envelopes overlap
//! on temperature, humidity, pH and EC at the same time. CO2 and lighting
//! are controlled per shelf and are not compared.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CropCatalog;
use crate::models::{Container, CropType, TrayStatus};
use crate::types::ClimateRange;

/// Smallest pH overlap that still counts as shared
pub fn min_ph_overlap() -> Decimal {
    Decimal::new(1, 1)
}

/// Smallest EC overlap that still counts as shared, µS/cm
pub fn min_ec_overlap() -> Decimal {
    Decimal::from(50)
}

/// Overlap width on each compared axis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AxisOverlaps {
    #[serde(with = "rust_decimal::serde::float")]
    pub temperature: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub humidity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ph: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ec: Decimal,
}

/// Result of comparing two crops
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompatibilityCheck {
    pub compatible: bool,
    /// One entry per failing axis
    pub reasons: Vec<String>,
    pub overlaps: AxisOverlaps,
}

/// A crop that cannot join the container, with why
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockedCrop {
    pub crop: CropType,
    pub reasons: Vec<String>,
}

/// Catalog split by what can be planted next to the existing crops
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailableCrops {
    pub available: Vec<CropType>,
    pub blocked: Vec<BlockedCrop>,
}

fn range_reason(axis: &str, unit: &str, a: &CropType, ra: &ClimateRange, b: &CropType, rb: &ClimateRange) -> String {
    format!(
        "Incompatible {}: {} ({}{}) and {} ({}{})",
        axis, a.name, ra, unit, b.name, rb, unit
    )
}

/// Compare the climate envelopes of two crops
///
/// Every failing axis is reported, not just the first one.
pub fn check_crop_compatibility(a: &CropType, b: &CropType) -> CompatibilityCheck {
    let ea = &a.climate_requirements;
    let eb = &b.climate_requirements;

    let overlaps = AxisOverlaps {
        temperature: ea.temperature.overlap(&eb.temperature),
        humidity: ea.humidity.overlap(&eb.humidity),
        ph: ea.ph.overlap(&eb.ph),
        ec: ea.ec.overlap(&eb.ec),
    };

    let mut reasons = Vec::new();
    if overlaps.temperature <= Decimal::ZERO {
        reasons.push(range_reason("temperature", "°C", a, &ea.temperature, b, &eb.temperature));
    }
    if overlaps.humidity <= Decimal::ZERO {
        reasons.push(range_reason("humidity", "%", a, &ea.humidity, b, &eb.humidity));
    }
    if overlaps.ph < min_ph_overlap() {
        reasons.push(range_reason("pH", "", a, &ea.ph, b, &eb.ph));
    }
    if overlaps.ec < min_ec_overlap() {
        reasons.push(range_reason("EC", " µS/cm", a, &ea.ec, b, &eb.ec));
    }

    CompatibilityCheck {
        compatible: reasons.is_empty(),
        reasons,
        overlaps,
    }
}

/// Split the catalog into crops that can join `existing_crop_ids` and crops that cannot
///
/// A crop already present is always available. Ids missing from the
/// catalog are ignored.
pub fn available_crops_for_container(catalog: &CropCatalog, existing_crop_ids: &[String]) -> AvailableCrops {
    if existing_crop_ids.is_empty() {
        return AvailableCrops {
            available: catalog.crops().to_vec(),
            blocked: Vec::new(),
        };
    }

    let existing: Vec<&CropType> = catalog
        .crops()
        .iter()
        .filter(|c| existing_crop_ids.contains(&c.id))
        .collect();

    let mut available = Vec::new();
    let mut blocked = Vec::new();

    for crop in catalog.crops() {
        if existing_crop_ids.contains(&crop.id) {
            available.push(crop.clone());
            continue;
        }

        let reasons: Vec<String> = existing
            .iter()
            .map(|other| check_crop_compatibility(crop, other))
            .filter(|check| !check.compatible)
            .flat_map(|check| check.reasons)
            .collect();

        if reasons.is_empty() {
            available.push(crop.clone());
        } else {
            blocked.push(BlockedCrop {
                crop: crop.clone(),
                reasons,
            });
        }
    }

    AvailableCrops { available, blocked }
}

/// Crops that can share a container with `base_crop_id`, itself included
pub fn compatible_crops<'a>(catalog: &'a CropCatalog, base_crop_id: &str) -> Vec<&'a CropType> {
    let Some(base) = catalog.get(base_crop_id) else {
        return Vec::new();
    };
    catalog
        .crops()
        .iter()
        .filter(|crop| crop.id == base.id || check_crop_compatibility(base, crop).compatible)
        .collect()
}

/// Distinct crops currently growing or planned, in container order
pub fn existing_crop_ids(container: &Container) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for tray in container.trays() {
        if !matches!(tray.status(), TrayStatus::Growing | TrayStatus::Planned) {
            continue;
        }
        if let Some(crop_id) = tray.crop_id() {
            if !ids.iter().any(|id| id == crop_id) {
                ids.push(crop_id.to_string());
            }
        }
    }
    ids
}
