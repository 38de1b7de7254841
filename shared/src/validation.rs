//! Validation utilities for the Vertical Farm Dashboard

use crate::models::{Container, CropType, StageParameters};
use crate::types::ClimateRange;

// ============================================================================
// Crop Validations
// ============================================================================

/// Validate that a range is not inverted
pub fn validate_climate_range(range: &ClimateRange) -> Result<(), &'static str> {
    if !range.is_valid() {
        return Err("Range minimum exceeds maximum");
    }
    Ok(())
}

fn validate_stage_parameters(parameters: &StageParameters) -> Result<(), &'static str> {
    validate_climate_range(&parameters.ph)?;
    validate_climate_range(&parameters.ec)?;
    validate_climate_range(&parameters.temperature)?;
    validate_climate_range(&parameters.humidity)?;
    Ok(())
}

/// Validate a crop definition before it enters the catalog
pub fn validate_crop(crop: &CropType) -> Result<(), &'static str> {
    if crop.id.trim().is_empty() {
        return Err("Crop id cannot be empty");
    }
    if crop.name.trim().is_empty() {
        return Err("Crop name cannot be empty");
    }

    let envelope = &crop.climate_requirements;
    for range in [
        &envelope.temperature,
        &envelope.humidity,
        &envelope.co2,
        &envelope.lighting,
        &envelope.ph,
        &envelope.ec,
    ] {
        validate_climate_range(range)?;
    }

    if crop.growth_stages.is_empty() {
        return Err("Crop must have at least one growth stage");
    }
    for stage in &crop.growth_stages {
        if stage.duration == 0 {
            return Err("Growth stage duration must be at least one day");
        }
        if let Some(parameters) = &stage.parameters {
            validate_stage_parameters(parameters)?;
        }
    }
    if crop.stage_days() != crop.total_growth_days {
        return Err("Total growth days must equal the sum of stage durations");
    }
    Ok(())
}

// ============================================================================
// Container Validations
// ============================================================================

/// Check that every tray is `empty` exactly when it holds no crop
pub fn validate_tray_consistency(container: &Container) -> Result<(), &'static str> {
    if container.trays().all(|t| t.is_consistent()) {
        Ok(())
    } else {
        Err("Tray status and crop record disagree")
    }
}

/// Check that stored derived counts match the tray set
pub fn validate_derived_stats(container: &Container) -> Result<(), &'static str> {
    let stats = &container.stats;
    if stats.occupied + stats.free != stats.total_trays {
        return Err("Occupied and free trays do not add up to the total");
    }
    if stats.total_trays != container.trays().count() {
        return Err("Stats total differs from the tray count");
    }
    let occupied = container.trays().filter(|t| t.status().is_occupied()).count();
    if stats.occupied != occupied {
        return Err("Stats occupied count is stale");
    }
    Ok(())
}
