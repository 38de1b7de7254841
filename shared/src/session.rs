//! Farm session
//!
//! Ties the catalog, the container, the selection and the draft queue
//! together. Every state change the dashboard makes goes through here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CropCatalog;
use crate::compatibility::{self, AvailableCrops, CompatibilityCheck};
use crate::drafts::DraftQueue;
use crate::error::{FarmError, FarmResult};
use crate::factory::generate_container;
use crate::models::{ActionKind, Container, DraftAction, NewDraftAction, Tray};
use crate::selection::SelectionState;
use crate::settings::DashboardConfig;
use crate::transitions::{self, ActionAvailability, ApplyReport};
use crate::types::{Target, TargetType};

/// Minutes a single action is expected to take on the farm floor
pub const MINUTES_PER_ACTION: u32 = 5;

/// One queued action as shown in the changes summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionSummary {
    pub action_id: Uuid,
    pub kind: ActionKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_name: Option<String>,
    pub target_label: String,
    /// "Row A · Rack 3 · Tray 5" for each affected tray still in the container
    pub tray_locations: Vec<String>,
}

/// Review of the pending draft before it is committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangesSummary {
    pub actions: Vec<ActionSummary>,
    pub total_affected_trays: usize,
    pub estimated_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmSession {
    catalog: CropCatalog,
    container: Container,
    selection: SelectionState,
    drafts: DraftQueue,
}

impl FarmSession {
    pub fn new(catalog: CropCatalog, container: Container) -> Self {
        Self {
            catalog,
            container,
            selection: SelectionState::default(),
            drafts: DraftQueue::default(),
        }
    }

    /// Build the catalog and container described by `config`
    pub fn from_config(config: &DashboardConfig, now: DateTime<Utc>) -> FarmResult<Self> {
        let catalog = config.catalog()?;
        let container = generate_container(&config.container, config.climate.clone(), &catalog, now)?;
        tracing::info!(
            container_id = %container.id,
            crops = catalog.len(),
            "Farm session started"
        );
        Ok(Self::new(catalog, container))
    }

    pub fn catalog(&self) -> &CropCatalog {
        &self.catalog
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn drafts(&self) -> &DraftQueue {
        &self.drafts
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn toggle_row(&mut self, row_id: &str) {
        self.selection.toggle_row(row_id);
    }

    pub fn toggle_rack(&mut self, rack_id: &str) {
        self.selection.toggle_rack(rack_id);
    }

    pub fn toggle_tray(&mut self, tray_id: &str) {
        self.selection.toggle_tray(tray_id);
    }

    /// Toggle a row together with the racks it holds in the container
    pub fn select_row(&mut self, row_id: &str) {
        let rack_ids = self
            .container
            .row(row_id)
            .map(|row| row.rack_ids())
            .unwrap_or_default();
        self.selection.select_row(row_id, &rack_ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    pub fn enter_multi_mode(&mut self) {
        self.selection.enter_multi_mode();
    }

    // ========================================================================
    // Draft queue
    // ========================================================================

    /// Queue an action against `target`
    ///
    /// The affected trays are fixed now. A plant action also stages its
    /// trays as `planned` until it is committed or discarded.
    pub fn queue_action(&mut self, kind: ActionKind, target: Target) -> FarmResult<DraftAction> {
        if let Some(crop_id) = kind.crop_id() {
            self.catalog.require(crop_id)?;
        }

        let affected_trays = transitions::resolve_affected_trays(&self.container, &kind, &target);
        if affected_trays.is_empty() {
            return Err(FarmError::NoEligibleTrays(kind));
        }

        let now = Utc::now();
        let action = self
            .drafts
            .add_action_at(NewDraftAction::new(kind, target, affected_trays), now);
        transitions::stage_plant(&mut self.container, &self.catalog, &action, now);

        tracing::info!(
            action_id = %action.id,
            action = %action.kind,
            target = %action.target.target_type,
            trays = action.affected_trays.len(),
            "Queued draft action"
        );
        Ok(action)
    }

    /// Queue an action against the current selection, then clear it
    pub fn queue_for_selection(&mut self, kind: ActionKind) -> FarmResult<DraftAction> {
        let container = &self.container;
        let target = self.selection.target(|row_id| {
            container.row(row_id).map(|row| row.rack_ids()).unwrap_or_default()
        })?;
        let action = self.queue_action(kind, target)?;
        self.selection.clear_selection();
        Ok(action)
    }

    /// Discard a queued action, reverting trays it staged
    pub fn remove_action(&mut self, action_id: Uuid) -> Option<DraftAction> {
        let action = self.drafts.remove_action(action_id)?;
        transitions::unstage_plant(&mut self.container, &action);
        Some(action)
    }

    /// Discard the whole draft
    pub fn clear_actions(&mut self) -> Vec<DraftAction> {
        let actions = self.drafts.clear_actions();
        for action in &actions {
            transitions::unstage_plant(&mut self.container, action);
        }
        actions
    }

    /// Commit the listed actions in queue order; the rest stay queued
    pub fn apply_actions(&mut self, action_ids: &[Uuid]) -> ApplyReport {
        let actions = self.drafts.take_selected(action_ids);
        transitions::apply_actions(&mut self.container, &self.catalog, &actions, Utc::now())
    }

    pub fn apply_all_actions(&mut self) -> ApplyReport {
        let ids = self.drafts.ids();
        self.apply_actions(&ids)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Catalog split against the crops growing or planned in the container
    pub fn available_crops(&self) -> AvailableCrops {
        let existing = compatibility::existing_crop_ids(&self.container);
        compatibility::available_crops_for_container(&self.catalog, &existing)
    }

    pub fn check_crop_compatibility(&self, crop_a: &str, crop_b: &str) -> FarmResult<CompatibilityCheck> {
        let a = self.catalog.require(crop_a)?;
        let b = self.catalog.require(crop_b)?;
        Ok(compatibility::check_crop_compatibility(a, b))
    }

    /// Which actions the trays under `target` currently allow
    pub fn action_availability(&self, target: &Target) -> ActionAvailability {
        transitions::action_availability(self.target_trays(target))
    }

    fn target_trays<'a>(&'a self, target: &'a Target) -> impl Iterator<Item = &'a Tray> + 'a {
        let container = &self.container;
        target.target_ids.iter().flat_map(move |id| {
            let trays: Vec<&'a Tray> = match target.target_type {
                TargetType::Row => container
                    .row(id)
                    .map(|row| row.racks.iter().flat_map(|r| r.trays.iter()).collect())
                    .unwrap_or_default(),
                TargetType::Rack => container
                    .rack(id)
                    .map(|rack| rack.trays.iter().collect())
                    .unwrap_or_default(),
                TargetType::Tray => container.tray(id).into_iter().collect(),
            };
            trays
        })
    }

    pub fn changes_summary(&self) -> ChangesSummary {
        let actions: Vec<ActionSummary> = self
            .drafts
            .actions()
            .iter()
            .map(|action| ActionSummary {
                action_id: action.id,
                kind: action.kind.clone(),
                label: action.kind.label().to_string(),
                crop_name: action
                    .kind
                    .crop_id()
                    .and_then(|id| self.catalog.get(id))
                    .map(|crop| crop.name.clone()),
                target_label: self.target_label(&action.target),
                tray_locations: action
                    .affected_trays
                    .iter()
                    .filter_map(|id| self.container.tray_location(id))
                    .collect(),
            })
            .collect();

        ChangesSummary {
            total_affected_trays: self.drafts.actions().iter().map(|a| a.affected_trays.len()).sum(),
            estimated_minutes: actions.len() as u32 * MINUTES_PER_ACTION,
            actions,
        }
    }

    /// "Row A", "Row A · Rack 3", "Row A · Rack 3 · Tray 5" or "N racks"
    fn target_label(&self, target: &Target) -> String {
        let count = target.target_ids.len();
        if count != 1 {
            return format!("{} {}s", count, target.target_type);
        }

        let id = &target.target_ids[0];
        let label = match target.target_type {
            TargetType::Row => self.container.row(id).map(|row| format!("Row {}", row.name)),
            TargetType::Rack => self
                .container
                .locate_rack(id)
                .map(|(row, rack)| format!("Row {} · Rack {}", row.name, rack.position)),
            TargetType::Tray => self.container.tray_location(id),
        };
        label.unwrap_or_else(|| format!("1 {}", target.target_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrayStatus;
    use crate::selection::SelectionMode;
    use crate::settings::ContainerConfig;

    fn empty_session() -> FarmSession {
        let config = DashboardConfig {
            container: ContainerConfig {
                rows: vec!["A".to_string()],
                racks_per_row: 2,
                trays_per_rack: 3,
                populate: false,
                ..ContainerConfig::default()
            },
            ..DashboardConfig::default()
        };
        FarmSession::from_config(&config, Utc::now()).unwrap()
    }

    fn mock_session() -> FarmSession {
        FarmSession::from_config(&DashboardConfig::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_queue_plant_stages_trays() {
        let mut session = empty_session();
        let action = session
            .queue_action(ActionKind::plant("arugula"), Target::racks(["row_A_rack_1"]))
            .unwrap();
        assert_eq!(action.affected_trays.len(), 3);
        assert_eq!(session.container().stats.planned, 3);
        assert!(session.drafts().has_actions());
    }

    #[test]
    fn test_queue_unknown_crop_fails() {
        let mut session = empty_session();
        let result = session.queue_action(ActionKind::plant("kale"), Target::rows(["row_A"]));
        assert!(matches!(result, Err(FarmError::UnknownCrop(_))));
        assert!(!session.drafts().has_actions());
    }

    #[test]
    fn test_queue_without_eligible_trays_fails() {
        let mut session = empty_session();
        let result = session.queue_action(ActionKind::Harvest, Target::rows(["row_A"]));
        assert!(matches!(result, Err(FarmError::NoEligibleTrays(ActionKind::Harvest))));
    }

    #[test]
    fn test_queue_for_selection_clears_selection() {
        let mut session = empty_session();
        session.select_row("row_A");
        assert_eq!(session.selection().selected_racks.len(), 2);

        let action = session.queue_for_selection(ActionKind::plant("basil")).unwrap();
        assert_eq!(action.target.target_type, TargetType::Rack);
        assert_eq!(action.affected_trays.len(), 6);
        assert!(!session.selection().has_selection());
        assert_eq!(session.selection().mode, SelectionMode::Single);
    }

    #[test]
    fn test_toggled_row_is_kept_next_to_a_rack() {
        let mut session = FarmSession::from_config(
            &DashboardConfig {
                container: ContainerConfig {
                    rows: vec!["A".to_string(), "B".to_string()],
                    racks_per_row: 2,
                    trays_per_rack: 3,
                    populate: false,
                    ..ContainerConfig::default()
                },
                ..DashboardConfig::default()
            },
            Utc::now(),
        )
        .unwrap();
        session.toggle_row("row_A");
        session.toggle_rack("row_B_rack_1");

        let action = session.queue_for_selection(ActionKind::plant("lettuce")).unwrap();
        assert_eq!(action.target.target_type, TargetType::Rack);
        assert_eq!(action.affected_trays.len(), 9);
        assert_eq!(session.container().stats.planned, 9);
        assert_eq!(
            session.container().tray("row_A_rack_2_tray_3").unwrap().status(),
            TrayStatus::Planned
        );
    }

    #[test]
    fn test_queue_for_empty_selection_fails() {
        let mut session = empty_session();
        assert!(matches!(
            session.queue_for_selection(ActionKind::Harvest),
            Err(FarmError::EmptySelection)
        ));
    }

    #[test]
    fn test_remove_action_reverts_staging() {
        let mut session = empty_session();
        let action = session
            .queue_action(ActionKind::plant("romano"), Target::trays(["row_A_rack_1_tray_1"]))
            .unwrap();
        assert!(session.remove_action(action.id).is_some());
        assert_eq!(session.container().stats.free, 6);
        assert!(session.container().tray("row_A_rack_1_tray_1").unwrap().crop().is_none());
    }

    #[test]
    fn test_removing_an_old_plant_keeps_a_newer_staging() {
        let mut session = empty_session();
        let tray = "row_A_rack_1_tray_1";
        let first = session
            .queue_action(ActionKind::plant("lettuce"), Target::trays([tray]))
            .unwrap();
        let clear = session.queue_action(ActionKind::Clear, Target::trays([tray])).unwrap();
        session.apply_actions(&[clear.id]);
        let second = session
            .queue_action(ActionKind::plant("lettuce"), Target::trays([tray]))
            .unwrap();

        session.remove_action(first.id).unwrap();
        assert_eq!(session.container().tray(tray).unwrap().status(), TrayStatus::Planned);
        assert_eq!(session.drafts().ids(), vec![second.id]);
        assert_eq!(
            compatibility::existing_crop_ids(session.container()),
            vec!["lettuce".to_string()]
        );

        session.remove_action(second.id).unwrap();
        assert_eq!(session.container().tray(tray).unwrap().status(), TrayStatus::Empty);
    }

    #[test]
    fn test_clear_actions_reverts_staging() {
        let mut session = empty_session();
        session
            .queue_action(ActionKind::plant("romano"), Target::racks(["row_A_rack_1"]))
            .unwrap();
        session
            .queue_action(ActionKind::plant("endive"), Target::racks(["row_A_rack_2"]))
            .unwrap();
        assert_eq!(session.clear_actions().len(), 2);
        assert_eq!(session.container().stats.occupied, 0);
    }

    #[test]
    fn test_apply_selected_actions_only() {
        let mut session = empty_session();
        let first = session
            .queue_action(ActionKind::plant("romano"), Target::racks(["row_A_rack_1"]))
            .unwrap();
        let second = session
            .queue_action(ActionKind::plant("endive"), Target::racks(["row_A_rack_2"]))
            .unwrap();

        let report = session.apply_actions(&[first.id]);
        assert_eq!(report.applied_actions, vec![first.id]);
        assert_eq!(report.stats.growing, 3);
        assert_eq!(report.stats.planned, 3);
        assert_eq!(session.drafts().ids(), vec![second.id]);
    }

    #[test]
    fn test_staged_crops_count_as_existing() {
        let mut session = empty_session();
        assert!(session.available_crops().blocked.is_empty());

        session
            .queue_action(ActionKind::plant("basil"), Target::trays(["row_A_rack_1_tray_1"]))
            .unwrap();
        let available = session.available_crops();
        assert!(available.blocked.iter().any(|b| b.crop.id == "arugula"));
        assert!(available.available.iter().any(|c| c.id == "basil"));
    }

    #[test]
    fn test_check_compatibility_by_id() {
        let session = empty_session();
        assert!(session.check_crop_compatibility("arugula", "endive").unwrap().compatible);
        assert!(!session.check_crop_compatibility("arugula", "basil").unwrap().compatible);
        assert!(session.check_crop_compatibility("arugula", "kale").is_err());
    }

    #[test]
    fn test_changes_summary() {
        let mut session = empty_session();
        session
            .queue_action(ActionKind::plant("basil"), Target::rows(["row_A"]))
            .unwrap();
        session
            .queue_action(ActionKind::Clear, Target::trays(["row_A_rack_2_tray_3"]))
            .unwrap();
        session
            .queue_action(ActionKind::Clear, Target::racks(["row_A_rack_1", "row_A_rack_2"]))
            .unwrap();

        let summary = session.changes_summary();
        assert_eq!(summary.actions.len(), 3);
        assert_eq!(summary.estimated_minutes, 15);
        assert_eq!(summary.total_affected_trays, 6 + 1 + 6);

        let plant = &summary.actions[0];
        assert_eq!(plant.label, "Plant");
        assert_eq!(plant.crop_name.as_deref(), Some("Basil"));
        assert_eq!(plant.target_label, "Row A");
        assert_eq!(plant.tray_locations[0], "Row A · Rack 1 · Tray 1");

        assert_eq!(summary.actions[1].target_label, "Row A · Rack 2 · Tray 3");
        assert_eq!(summary.actions[2].target_label, "2 racks");
    }

    #[test]
    fn test_action_availability_for_target() {
        let session = mock_session();
        let availability = session.action_availability(&Target::racks(["row_A_rack_1"]));
        let rack = session.container().rack("row_A_rack_1").unwrap();
        assert_eq!(
            availability.plant,
            rack.trays.iter().any(|t| t.status() == TrayStatus::Empty)
        );
        assert_eq!(
            availability.harvest,
            rack.trays.iter().any(|t| t.status() == TrayStatus::Ready)
        );
    }

    #[test]
    fn test_mock_session_commit_round() {
        let mut session = mock_session();
        let ready_before = session.container().stats.ready;
        if ready_before == 0 {
            return;
        }
        let rows: Vec<String> = session.container().rows.iter().map(|r| r.id.clone()).collect();
        session.queue_action(ActionKind::Harvest, Target::rows(rows)).unwrap();
        let report = session.apply_all_actions();
        assert_eq!(report.updated_trays.len(), ready_before);
        assert_eq!(session.container().stats.ready, 0);
        assert!(!session.drafts().has_actions());
    }
}
