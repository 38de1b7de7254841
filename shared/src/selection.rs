//! Row/rack/tray selection state

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, FarmResult};
use crate::types::{Target, TargetType};

/// Single selection opens items, multi selection collects them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

/// Currently selected rows, racks and trays
///
/// Ids are not checked against the container. Row selection is a shortcut
/// over rack selection: callers pass the row's rack ids and those racks are
/// added or removed together with the row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectionState {
    pub selected_rows: BTreeSet<String>,
    pub selected_racks: BTreeSet<String>,
    pub selected_trays: BTreeSet<String>,
    pub mode: SelectionMode,
}

fn toggle(set: &mut BTreeSet<String>, id: &str) {
    if !set.remove(id) {
        set.insert(id.to_string());
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_row(&mut self, row_id: &str) {
        toggle(&mut self.selected_rows, row_id);
        self.sync_mode();
    }

    pub fn toggle_rack(&mut self, rack_id: &str) {
        toggle(&mut self.selected_racks, rack_id);
        self.sync_mode();
    }

    pub fn toggle_tray(&mut self, tray_id: &str) {
        toggle(&mut self.selected_trays, tray_id);
        self.sync_mode();
    }

    /// Toggle a row together with its racks
    ///
    /// Deselecting removes exactly `rack_ids`, including racks that had
    /// been picked individually before.
    pub fn select_row<S: AsRef<str>>(&mut self, row_id: &str, rack_ids: &[S]) {
        if self.selected_rows.remove(row_id) {
            for rack_id in rack_ids {
                self.selected_racks.remove(rack_id.as_ref());
            }
        } else {
            self.selected_rows.insert(row_id.to_string());
            self.selected_racks
                .extend(rack_ids.iter().map(|id| id.as_ref().to_string()));
        }
        self.sync_mode();
    }

    pub fn clear_selection(&mut self) {
        *self = Self::default();
    }

    pub fn enter_multi_mode(&mut self) {
        self.mode = SelectionMode::Multi;
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_rows.is_empty()
            || !self.selected_racks.is_empty()
            || !self.selected_trays.is_empty()
    }

    /// Number of selected items at the most specific selected level
    pub fn count(&self) -> usize {
        if !self.selected_trays.is_empty() {
            self.selected_trays.len()
        } else if !self.selected_racks.is_empty() {
            self.selected_racks.len()
        } else {
            self.selected_rows.len()
        }
    }

    /// Turn the selection into a draft target
    ///
    /// `racks_of_row` lists the racks of a row. Rows selected alongside
    /// racks become rack targets: a row whose racks are already selected
    /// (through [`Self::select_row`]) adds nothing, a row toggled on its own
    /// adds all of its racks. Trays cannot be mixed with racks or rows.
    pub fn target<F>(&self, racks_of_row: F) -> FarmResult<Target>
    where
        F: Fn(&str) -> Vec<String>,
    {
        let has_trays = !self.selected_trays.is_empty();
        let has_racks = !self.selected_racks.is_empty();
        let has_rows = !self.selected_rows.is_empty();

        match (has_rows, has_racks, has_trays) {
            (false, false, false) => Err(FarmError::EmptySelection),
            (false, false, true) => Ok(Target::trays(self.selected_trays.iter().cloned())),
            (false, true, false) => Ok(Target::racks(self.selected_racks.iter().cloned())),
            (true, true, false) => {
                let mut racks = self.selected_racks.clone();
                for row_id in &self.selected_rows {
                    let row_racks = racks_of_row(row_id);
                    if !row_racks.iter().any(|id| self.selected_racks.contains(id)) {
                        racks.extend(row_racks);
                    }
                }
                Ok(Target::racks(racks))
            }
            (true, false, false) => Ok(Target::rows(self.selected_rows.iter().cloned())),
            (_, true, true) => Err(FarmError::MixedSelection(TargetType::Rack, TargetType::Tray)),
            (true, false, true) => Err(FarmError::MixedSelection(TargetType::Row, TargetType::Tray)),
        }
    }

    fn sync_mode(&mut self) {
        self.mode = if self.has_selection() {
            SelectionMode::Multi
        } else {
            SelectionMode::Single
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_switches_mode() {
        let mut selection = SelectionState::new();
        assert_eq!(selection.mode, SelectionMode::Single);

        selection.toggle_tray("t1");
        assert_eq!(selection.mode, SelectionMode::Multi);
        assert!(selection.selected_trays.contains("t1"));

        selection.toggle_tray("t1");
        assert_eq!(selection.mode, SelectionMode::Single);
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_mode_stays_multi_while_anything_is_selected() {
        let mut selection = SelectionState::new();
        selection.toggle_row("row_A");
        selection.toggle_rack("rack_1");
        selection.toggle_rack("rack_1");
        assert_eq!(selection.mode, SelectionMode::Multi);
    }

    #[test]
    fn test_select_row_round_trip_restores_racks() {
        let mut selection = SelectionState::new();
        selection.toggle_rack("row_B_rack_1");
        let before = selection.selected_racks.clone();

        let racks = ["row_A_rack_1", "row_A_rack_2"];
        selection.select_row("row_A", &racks);
        assert!(selection.selected_rows.contains("row_A"));
        assert!(selection.selected_racks.contains("row_A_rack_2"));

        selection.select_row("row_A", &racks);
        assert_eq!(selection.selected_racks, before);
        assert!(selection.selected_rows.is_empty());
    }

    #[test]
    fn test_select_row_removes_individually_picked_racks() {
        let mut selection = SelectionState::new();
        selection.toggle_rack("row_A_rack_1");
        let racks = ["row_A_rack_1", "row_A_rack_2"];
        selection.select_row("row_A", &racks);
        selection.select_row("row_A", &racks);
        assert!(selection.selected_racks.is_empty());
        assert_eq!(selection.mode, SelectionMode::Single);
    }

    #[test]
    fn test_clear_and_multi_mode() {
        let mut selection = SelectionState::new();
        selection.enter_multi_mode();
        assert_eq!(selection.mode, SelectionMode::Multi);
        assert!(!selection.has_selection());

        selection.toggle_tray("t1");
        selection.clear_selection();
        assert_eq!(selection, SelectionState::default());
    }

    fn racks_of(row_id: &str) -> Vec<String> {
        (1..=2).map(|n| format!("{}_rack_{}", row_id, n)).collect()
    }

    #[test]
    fn test_target_resolution() {
        let mut selection = SelectionState::new();
        assert!(matches!(selection.target(racks_of), Err(FarmError::EmptySelection)));

        selection.toggle_row("row_A");
        let target = selection.target(racks_of).unwrap();
        assert_eq!(target.target_type, TargetType::Row);
        assert_eq!(target.target_ids, vec!["row_A".to_string()]);

        selection.toggle_tray("t1");
        assert!(matches!(
            selection.target(racks_of),
            Err(FarmError::MixedSelection(TargetType::Row, TargetType::Tray))
        ));
    }

    #[test]
    fn test_selected_row_does_not_duplicate_its_racks() {
        let mut selection = SelectionState::new();
        selection.select_row("row_B", &racks_of("row_B"));
        let target = selection.target(racks_of).unwrap();
        assert_eq!(target.target_type, TargetType::Rack);
        assert_eq!(
            target.target_ids,
            vec!["row_B_rack_1".to_string(), "row_B_rack_2".to_string()]
        );

        selection.toggle_tray("t1");
        assert!(matches!(
            selection.target(racks_of),
            Err(FarmError::MixedSelection(TargetType::Rack, TargetType::Tray))
        ));
    }

    #[test]
    fn test_toggled_row_expands_next_to_racks() {
        let mut selection = SelectionState::new();
        selection.toggle_row("row_A");
        selection.toggle_rack("row_B_rack_1");

        let target = selection.target(racks_of).unwrap();
        assert_eq!(target.target_type, TargetType::Rack);
        assert_eq!(
            target.target_ids,
            vec![
                "row_A_rack_1".to_string(),
                "row_A_rack_2".to_string(),
                "row_B_rack_1".to_string(),
            ]
        );
    }

    #[test]
    fn test_tray_only_target() {
        let mut selection = SelectionState::new();
        selection.toggle_tray("t2");
        selection.toggle_tray("t1");
        let target = selection.target(racks_of).unwrap();
        assert_eq!(target.target_type, TargetType::Tray);
        assert_eq!(target.target_ids, vec!["t1".to_string(), "t2".to_string()]);
        assert_eq!(selection.count(), 2);
    }
}
