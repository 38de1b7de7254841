//! Draft action models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tray::TrayStatus;
use crate::types::Target;

/// What a draft action does, with only the data that kind needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Plant { crop_id: String },
    Harvest,
    Clear,
    StopGrowing,
    CancelStop,
}

impl ActionKind {
    pub fn plant(crop_id: impl Into<String>) -> Self {
        ActionKind::Plant {
            crop_id: crop_id.into(),
        }
    }

    /// Whether a tray in `status` can be targeted when the action is queued
    pub fn accepts(&self, status: TrayStatus) -> bool {
        match self {
            ActionKind::Plant { .. } => status == TrayStatus::Empty,
            ActionKind::Harvest => status == TrayStatus::Ready,
            ActionKind::Clear => {
                matches!(status, TrayStatus::Planned | TrayStatus::Harvested)
            }
            ActionKind::StopGrowing => status == TrayStatus::Growing,
            ActionKind::CancelStop => status == TrayStatus::StopPending,
        }
    }

    pub fn crop_id(&self) -> Option<&str> {
        match self {
            ActionKind::Plant { crop_id } => Some(crop_id),
            _ => None,
        }
    }

    /// Human-readable label for the changes summary
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Plant { .. } => "Plant",
            ActionKind::Harvest => "Harvest",
            ActionKind::Clear => "Clear",
            ActionKind::StopGrowing => "Stop growing",
            ActionKind::CancelStop => "Cancel stop",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Plant { .. } => write!(f, "plant"),
            ActionKind::Harvest => write!(f, "harvest"),
            ActionKind::Clear => write!(f, "clear"),
            ActionKind::StopGrowing => write!(f, "stop_growing"),
            ActionKind::CancelStop => write!(f, "cancel_stop"),
        }
    }
}

/// A queued, not yet committed mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftAction {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(flatten)]
    pub target: Target,
    pub created_at: DateTime<Utc>,
    /// Concrete trays to mutate, resolved when the action was queued
    pub affected_trays: Vec<String>,
}

/// Draft action before the queue assigns its id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDraftAction {
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(flatten)]
    pub target: Target,
    pub affected_trays: Vec<String>,
}

impl NewDraftAction {
    pub fn new(kind: ActionKind, target: Target, affected_trays: Vec<String>) -> Self {
        Self {
            kind,
            target,
            affected_trays,
        }
    }

    /// Action on individual trays, which are also the affected trays
    pub fn for_trays<I, S>(kind: ActionKind, tray_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = Target::trays(tray_ids);
        let affected_trays = target.target_ids.clone();
        Self::new(kind, target, affected_trays)
    }
}
