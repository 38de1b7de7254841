//! Crop definitions and growth staging

use serde::{Deserialize, Serialize};

use crate::types::ClimateRange;

/// A crop that can be grown in the container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropType {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub climate_requirements: ClimateEnvelope,
    pub growth_stages: Vec<GrowthStage>,
    pub total_growth_days: u32,
}

/// Climate a crop tolerates across its whole growth cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateEnvelope {
    /// °C
    pub temperature: ClimateRange,
    /// Relative humidity, %
    pub humidity: ClimateRange,
    /// ppm
    pub co2: ClimateRange,
    /// µmol/m²/s
    pub lighting: ClimateRange,
    pub ph: ClimateRange,
    /// µS/cm
    pub ec: ClimateRange,
}

/// One stage of a crop's growth cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthStage {
    pub id: String,
    pub name: String,
    /// Days
    pub duration: u32,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<StageParameters>,
}

/// Stage-specific targets, narrower than the crop envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageParameters {
    pub ph: ClimateRange,
    pub ec: ClimateRange,
    pub temperature: ClimateRange,
    pub humidity: ClimateRange,
}

/// Where a crop stands after a number of days
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthProgress {
    pub stage_id: String,
    pub stage_index: usize,
    pub days_in_stage: u32,
    /// 0-100
    pub progress: f64,
}

impl CropType {
    /// Sum of stage durations
    pub fn stage_days(&self) -> u32 {
        self.growth_stages.iter().map(|s| s.duration).sum()
    }

    pub fn first_stage(&self) -> Option<&GrowthStage> {
        self.growth_stages.first()
    }

    /// Stage reached after `days_growing` days
    ///
    /// Past the end of the cycle the last stage is reported at 100%.
    /// Returns None for a crop without stages.
    pub fn growth_progress(&self, days_growing: u32) -> Option<GrowthProgress> {
        let mut accumulated = 0;
        for (index, stage) in self.growth_stages.iter().enumerate() {
            let stage_end = accumulated + stage.duration;
            if days_growing < stage_end {
                let days_in_stage = days_growing - accumulated;
                return Some(GrowthProgress {
                    stage_id: stage.id.clone(),
                    stage_index: index,
                    days_in_stage,
                    progress: f64::from(days_in_stage) / f64::from(stage.duration) * 100.0,
                });
            }
            accumulated = stage_end;
        }

        let last = self.growth_stages.last()?;
        Some(GrowthProgress {
            stage_id: last.id.clone(),
            stage_index: self.growth_stages.len() - 1,
            days_in_stage: last.duration,
            progress: 100.0,
        })
    }

    /// Stage following the one reached after `days_growing` days
    pub fn next_stage(&self, days_growing: u32) -> Option<&GrowthStage> {
        let current = self.growth_progress(days_growing)?;
        self.growth_stages.get(current.stage_index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CropCatalog;

    #[test]
    fn test_progress_at_day_zero() {
        let catalog = CropCatalog::builtin();
        let arugula = catalog.get("arugula").unwrap();
        let progress = arugula.growth_progress(0).unwrap();
        assert_eq!(progress.stage_id, "germination");
        assert_eq!(progress.stage_index, 0);
        assert_eq!(progress.days_in_stage, 0);
        assert_eq!(progress.progress, 0.0);
    }

    #[test]
    fn test_progress_mid_cycle() {
        let catalog = CropCatalog::builtin();
        let arugula = catalog.get("arugula").unwrap();
        // germination 4 days, vegetation 12 days
        let progress = arugula.growth_progress(10).unwrap();
        assert_eq!(progress.stage_id, "vegetation");
        assert_eq!(progress.days_in_stage, 6);
        assert!((progress.progress - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_past_end() {
        let catalog = CropCatalog::builtin();
        let arugula = catalog.get("arugula").unwrap();
        let progress = arugula.growth_progress(100).unwrap();
        assert_eq!(progress.stage_id, "maturation");
        assert_eq!(progress.progress, 100.0);
        assert!(arugula.next_stage(100).is_none());
    }

    #[test]
    fn test_next_stage() {
        let catalog = CropCatalog::builtin();
        let arugula = catalog.get("arugula").unwrap();
        assert_eq!(arugula.next_stage(0).unwrap().id, "vegetation");
    }
}
