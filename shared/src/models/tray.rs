//! Tray and crop instance models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a tray
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrayStatus {
    Empty,
    /// Crop chosen, not yet committed
    Planned,
    Growing,
    /// Ready to harvest
    Ready,
    /// Harvested, waiting to be cleared
    Harvested,
    /// Marked for stopping
    StopPending,
    Problem,
}

impl TrayStatus {
    pub fn is_occupied(&self) -> bool {
        !matches!(self, TrayStatus::Empty)
    }
}

impl std::fmt::Display for TrayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrayStatus::Empty => write!(f, "empty"),
            TrayStatus::Planned => write!(f, "planned"),
            TrayStatus::Growing => write!(f, "growing"),
            TrayStatus::Ready => write!(f, "ready"),
            TrayStatus::Harvested => write!(f, "harvested"),
            TrayStatus::StopPending => write!(f, "stop_pending"),
            TrayStatus::Problem => write!(f, "problem"),
        }
    }
}

/// A crop growing (or planned) in a tray
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropInstance {
    pub crop_id: String,
    pub planted_date: DateTime<Utc>,
    pub current_stage: String,
    pub days_in_stage: u32,
    pub total_days_growing: u32,
    pub estimated_harvest_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_harvest_date: Option<DateTime<Utc>>,
    /// 0-100
    pub stage_progress: f64,
    #[serde(default)]
    pub problems: Vec<Problem>,
    /// Draft action that put the crop here while the tray is `planned`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_by: Option<Uuid>,
}

/// An issue detected on a tray
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Problem {
    pub id: String,
    pub kind: ProblemKind,
    pub severity: ProblemSeverity,
    pub description: String,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    Climate,
    Nutrition,
    Disease,
    Equipment,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProblemSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Smallest cultivation unit; holds at most one crop
///
/// Status and crop are only changed by the transition engine and the
/// container factory, which keep `Empty` and `crop == None` in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tray {
    pub id: String,
    pub rack_id: String,
    /// 1-based, counted bottom to top
    pub position: u32,
    pub(crate) status: TrayStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) crop: Option<CropInstance>,
}

impl Tray {
    pub fn empty(id: impl Into<String>, rack_id: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            rack_id: rack_id.into(),
            position,
            status: TrayStatus::Empty,
            crop: None,
        }
    }

    /// Put a crop in the tray; `status` must not be `Empty`
    pub(crate) fn occupy(&mut self, status: TrayStatus, crop: CropInstance) {
        debug_assert!(status.is_occupied());
        self.status = status;
        self.crop = Some(crop);
    }

    pub(crate) fn clear(&mut self) {
        self.status = TrayStatus::Empty;
        self.crop = None;
    }

    pub fn status(&self) -> TrayStatus {
        self.status
    }

    pub fn crop(&self) -> Option<&CropInstance> {
        self.crop.as_ref()
    }

    pub fn crop_id(&self) -> Option<&str> {
        self.crop.as_ref().map(|c| c.crop_id.as_str())
    }

    /// `Empty` exactly when there is no crop
    pub fn is_consistent(&self) -> bool {
        self.status.is_occupied() == self.crop.is_some()
    }

    pub fn has_open_problems(&self) -> bool {
        self.status == TrayStatus::Problem
            || self
                .crop
                .as_ref()
                .is_some_and(|c| c.problems.iter().any(|p| p.resolved_at.is_none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TrayStatus::StopPending).unwrap(),
            "\"stop_pending\""
        );
    }

    #[test]
    fn test_empty_tray_is_consistent() {
        let tray = Tray::empty("t1", "r1", 1);
        assert!(tray.is_consistent());
        assert!(tray.crop_id().is_none());
        assert!(!tray.has_open_problems());
    }
}
