//! Status transition engine
//!
//! The only code that changes tray status. Planting is two-phase: queueing
//! a plant action stages its empty trays as `planned`, committing turns
//! them into `growing`. Trays whose status does not fit an action are
//! skipped and reported, never treated as errors.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CropCatalog;
use crate::models::{ActionKind, Container, CropInstance, CropType, DraftAction, Tray, TrayStatus};
use crate::types::{Target, TargetType};

/// Why a tray was left untouched by an action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    TrayNotFound,
    StatusMismatch { status: TrayStatus },
    /// Planned for a different crop
    CropMismatch { crop_id: String },
    UnknownCrop { crop_id: String },
}

/// A tray an action could not change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedTransition {
    pub action_id: Uuid,
    pub tray_id: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of committing a batch of draft actions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplyReport {
    pub applied_actions: Vec<Uuid>,
    /// Trays that changed, in the order they changed
    pub updated_trays: Vec<String>,
    pub skipped: Vec<SkippedTransition>,
    pub stats: crate::models::ContainerStats,
}

/// Which actions make sense for a set of trays (context menu state)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionAvailability {
    pub plant: bool,
    pub harvest: bool,
    pub clear: bool,
    pub stop_growing: bool,
    pub cancel_stop: bool,
}

impl ActionAvailability {
    pub fn allows(&self, kind: &ActionKind) -> bool {
        match kind {
            ActionKind::Plant { .. } => self.plant,
            ActionKind::Harvest => self.harvest,
            ActionKind::Clear => self.clear,
            ActionKind::StopGrowing => self.stop_growing,
            ActionKind::CancelStop => self.cancel_stop,
        }
    }
}

/// Which of the five action kinds have at least one eligible tray
pub fn action_availability<'a>(trays: impl IntoIterator<Item = &'a Tray>) -> ActionAvailability {
    let mut availability = ActionAvailability::default();
    for tray in trays {
        let status = tray.status();
        availability.plant |= status == TrayStatus::Empty;
        availability.harvest |= ActionKind::Harvest.accepts(status);
        availability.clear |= ActionKind::Clear.accepts(status);
        availability.stop_growing |= ActionKind::StopGrowing.accepts(status);
        availability.cancel_stop |= ActionKind::CancelStop.accepts(status);
    }
    availability
}

/// Expand a target to concrete trays eligible for `kind` right now
///
/// Row targets expand to all racks of the row, rack targets to their trays.
/// Ids that do not exist are skipped; each tray appears once.
pub fn resolve_affected_trays(container: &Container, kind: &ActionKind, target: &Target) -> Vec<String> {
    let mut candidates: Vec<&Tray> = Vec::new();
    for id in &target.target_ids {
        match target.target_type {
            TargetType::Row => {
                if let Some(row) = container.row(id) {
                    candidates.extend(row.racks.iter().flat_map(|r| r.trays.iter()));
                }
            }
            TargetType::Rack => {
                if let Some(rack) = container.rack(id) {
                    candidates.extend(rack.trays.iter());
                }
            }
            TargetType::Tray => {
                if let Some(tray) = container.tray(id) {
                    candidates.push(tray);
                }
            }
        }
    }

    let mut affected: Vec<String> = Vec::new();
    for tray in candidates {
        if kind.accepts(tray.status()) && !affected.contains(&tray.id) {
            affected.push(tray.id.clone());
        }
    }
    affected
}

/// Fresh crop record for a crop planted at `now`
pub fn new_crop_instance(crop: &CropType, now: DateTime<Utc>) -> CropInstance {
    CropInstance {
        crop_id: crop.id.clone(),
        planted_date: now,
        current_stage: crop
            .first_stage()
            .map(|s| s.id.clone())
            .unwrap_or_default(),
        days_in_stage: 0,
        total_days_growing: 0,
        estimated_harvest_date: now + Duration::days(i64::from(crop.total_growth_days)),
        actual_harvest_date: None,
        stage_progress: 0.0,
        problems: Vec::new(),
        staged_by: None,
    }
}

/// First phase of planting: mark the action's empty trays as `planned`
///
/// Returns the staged tray ids. Non-plant actions stage nothing.
pub fn stage_plant(
    container: &mut Container,
    catalog: &CropCatalog,
    action: &DraftAction,
    now: DateTime<Utc>,
) -> Vec<String> {
    let ActionKind::Plant { crop_id } = &action.kind else {
        return Vec::new();
    };
    let Some(crop) = catalog.get(crop_id) else {
        tracing::warn!(crop_id = %crop_id, action_id = %action.id, "Cannot stage unknown crop");
        return Vec::new();
    };

    let mut staged = Vec::new();
    for tray_id in &action.affected_trays {
        let Some(tray) = container.tray_mut(tray_id) else {
            continue;
        };
        if tray.status == TrayStatus::Empty {
            let planned = CropInstance {
                staged_by: Some(action.id),
                ..new_crop_instance(crop, now)
            };
            tray.occupy(TrayStatus::Planned, planned);
            staged.push(tray_id.clone());
        }
    }
    container.recompute();
    tracing::debug!(action_id = %action.id, trays = staged.len(), "Staged planting");
    staged
}

/// Undo [`stage_plant`] for an action discarded from the draft
///
/// Only trays still `planned` by this very action go back to `empty`; a
/// tray cleared and staged again by a later action keeps that staging.
pub fn unstage_plant(container: &mut Container, action: &DraftAction) -> Vec<String> {
    if !matches!(action.kind, ActionKind::Plant { .. }) {
        return Vec::new();
    }

    let mut reverted = Vec::new();
    for tray_id in &action.affected_trays {
        let Some(tray) = container.tray_mut(tray_id) else {
            continue;
        };
        let staged_here = tray
            .crop()
            .is_some_and(|crop| crop.staged_by == Some(action.id));
        if tray.status == TrayStatus::Planned && staged_here {
            tray.clear();
            reverted.push(tray_id.clone());
        }
    }
    container.recompute();
    reverted
}

/// Apply one action to one tray
fn transition(
    tray: &mut Tray,
    kind: &ActionKind,
    catalog: &CropCatalog,
    now: DateTime<Utc>,
) -> Result<(), SkipReason> {
    match (kind, tray.status) {
        (ActionKind::Plant { crop_id }, TrayStatus::Planned) => {
            if tray.crop_id() != Some(crop_id.as_str()) {
                return Err(SkipReason::CropMismatch {
                    crop_id: tray.crop_id().unwrap_or_default().to_string(),
                });
            }
            tray.status = TrayStatus::Growing;
            if let Some(crop) = tray.crop.as_mut() {
                crop.staged_by = None;
            }
        }
        (ActionKind::Plant { crop_id }, TrayStatus::Empty) => {
            let crop = catalog.get(crop_id).ok_or_else(|| SkipReason::UnknownCrop {
                crop_id: crop_id.clone(),
            })?;
            tray.occupy(TrayStatus::Growing, new_crop_instance(crop, now));
        }
        (ActionKind::Harvest, TrayStatus::Ready) => {
            tray.status = TrayStatus::Harvested;
            if let Some(crop) = tray.crop.as_mut() {
                crop.actual_harvest_date = Some(now);
            }
        }
        (ActionKind::Clear, TrayStatus::Planned | TrayStatus::Harvested) => {
            tray.clear();
        }
        (ActionKind::StopGrowing, TrayStatus::Growing) => {
            tray.status = TrayStatus::StopPending;
        }
        (ActionKind::CancelStop, TrayStatus::StopPending) => {
            tray.status = TrayStatus::Growing;
        }
        (_, status) => return Err(SkipReason::StatusMismatch { status }),
    }
    Ok(())
}

/// Commit draft actions to the container
///
/// Actions run in the given order, trays in `affected_trays` order. The
/// whole batch runs before derived statistics are recomputed.
pub fn apply_actions(
    container: &mut Container,
    catalog: &CropCatalog,
    actions: &[DraftAction],
    now: DateTime<Utc>,
) -> ApplyReport {
    let mut applied_actions = Vec::with_capacity(actions.len());
    let mut updated_trays: Vec<String> = Vec::new();
    let mut skipped = Vec::new();

    for action in actions {
        for tray_id in &action.affected_trays {
            let outcome = match container.tray_mut(tray_id) {
                Some(tray) => transition(tray, &action.kind, catalog, now),
                None => Err(SkipReason::TrayNotFound),
            };

            match outcome {
                Ok(()) => {
                    if !updated_trays.contains(tray_id) {
                        updated_trays.push(tray_id.clone());
                    }
                }
                Err(reason) => {
                    tracing::debug!(
                        action_id = %action.id,
                        action = %action.kind,
                        tray_id = %tray_id,
                        ?reason,
                        "Skipped tray transition"
                    );
                    skipped.push(SkippedTransition {
                        action_id: action.id,
                        tray_id: tray_id.clone(),
                        reason,
                    });
                }
            }
        }
        applied_actions.push(action.id);
    }

    container.recompute();

    tracing::info!(
        actions = applied_actions.len(),
        updated = updated_trays.len(),
        skipped = skipped.len(),
        "Applied draft actions"
    );

    ApplyReport {
        applied_actions,
        updated_trays,
        skipped,
        stats: container.stats.clone(),
    }
}
