//! Container construction
//!
//! Builds a container from its layout, either empty or populated with a
//! deterministic mock pattern so that repeated loads render the same farm.

use chrono::{DateTime, Duration, Utc};

use crate::catalog::CropCatalog;
use crate::error::FarmResult;
use crate::models::{Container, CropInstance, CropType, Rack, Row, Tray, TrayStatus};
use crate::settings::ContainerConfig;
use crate::types::ClimateData;

pub fn row_id(name: &str) -> String {
    format!("row_{}", name)
}

pub fn rack_id(row_id: &str, position: u32) -> String {
    format!("{}_rack_{}", row_id, position)
}

pub fn tray_id(rack_id: &str, position: u32) -> String {
    format!("{}_tray_{}", rack_id, position)
}

/// Container with the configured layout and every tray empty
pub fn empty_container(config: &ContainerConfig, climate: ClimateData) -> Container {
    let rows = config
        .rows
        .iter()
        .map(|name| {
            let row_id = row_id(name);
            let racks = (1..=config.racks_per_row)
                .map(|rack_position| {
                    let rack_id = rack_id(&row_id, rack_position);
                    let trays = (1..=config.trays_per_rack)
                        .map(|tray_position| Tray::empty(tray_id(&rack_id, tray_position), &rack_id, tray_position))
                        .collect();
                    Rack::new(rack_id, &row_id, rack_position, trays)
                })
                .collect();
            Row::new(row_id, name, racks)
        })
        .collect();

    Container::new(&config.id, &config.name, rows, climate)
}

/// Status a mock tray gets from its seed, None for an empty tray
fn mock_status(seed: u32) -> Option<TrayStatus> {
    if seed % 10 < 3 {
        return None;
    }
    let status = match seed % 100 {
        0..=9 => TrayStatus::Planned,
        10..=69 => TrayStatus::Growing,
        70..=84 => TrayStatus::Ready,
        85..=94 => TrayStatus::Harvested,
        _ => TrayStatus::StopPending,
    };
    Some(status)
}

/// Crop record for a crop planted `days_growing` days before `now`
fn mock_crop(crop: &CropType, days_growing: u32, now: DateTime<Utc>) -> CropInstance {
    let planted_date = now - Duration::days(i64::from(days_growing));
    let progress = crop.growth_progress(days_growing);

    CropInstance {
        crop_id: crop.id.clone(),
        planted_date,
        current_stage: progress
            .as_ref()
            .map(|p| p.stage_id.clone())
            .unwrap_or_default(),
        days_in_stage: progress.as_ref().map_or(0, |p| p.days_in_stage),
        total_days_growing: days_growing,
        estimated_harvest_date: planted_date + Duration::days(i64::from(crop.total_growth_days)),
        actual_harvest_date: None,
        stage_progress: progress.map_or(0.0, |p| p.progress),
        problems: Vec::new(),
        staged_by: None,
    }
}

/// Container populated with the deterministic mock pattern
///
/// Each tray gets a seed from its global rack index and position; the seed
/// decides occupancy, status, crop and age. With `populate` off this is the
/// same as [`empty_container`].
pub fn generate_container(
    config: &ContainerConfig,
    climate: ClimateData,
    catalog: &CropCatalog,
    now: DateTime<Utc>,
) -> FarmResult<Container> {
    let mut container = empty_container(config, climate);
    if !config.populate {
        return Ok(container);
    }

    let mock_crops = config
        .mock_crop_ids
        .iter()
        .map(|id| catalog.require(id))
        .collect::<FarmResult<Vec<&CropType>>>()?;
    if mock_crops.is_empty() {
        tracing::warn!(container_id = %container.id, "No mock crops configured, container left empty");
        return Ok(container);
    }

    let mut rack_index = 0;
    for row in &mut container.rows {
        for rack in &mut row.racks {
            rack_index += 1;
            for tray in &mut rack.trays {
                let seed = rack_index * config.trays_per_rack + tray.position;
                let Some(status) = mock_status(seed) else {
                    continue;
                };
                let crop = mock_crops[seed as usize % mock_crops.len()];
                let days_growing = seed % crop.total_growth_days.max(1);
                tray.occupy(status, mock_crop(crop, days_growing, now));
            }
        }
    }
    container.recompute();

    tracing::info!(
        container_id = %container.id,
        trays = container.stats.total_trays,
        occupied = container.stats.occupied,
        "Generated mock container"
    );

    Ok(container)
}
