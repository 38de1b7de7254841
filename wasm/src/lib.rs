//! WebAssembly module for the Vertical Farm Dashboard
//!
//! Exposes the farm session to the browser:
//! - Container, catalog and statistics queries as JSON
//! - Row/rack/tray selection
//! - Draft action queueing and commit
//! - Crop compatibility checks

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use shared::{ActionKind, CropCatalog, DashboardConfig, FarmError, FarmSession, Target};

pub mod logging;

// Re-export shared types for use by other Rust consumers
pub use shared::models::*;
pub use shared::types::*;

fn to_js_error(err: FarmError) -> JsValue {
    let error = js_sys::Error::new(&err.to_string());
    error.set_name(err.code());
    error.into()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| to_js_error(e.into()))
}

fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| to_js_error(e.into()))
}

/// Dashboard state owned by the page
#[wasm_bindgen]
pub struct FarmDashboard {
    session: FarmSession,
}

#[wasm_bindgen]
impl FarmDashboard {
    /// Create the dashboard from optional JSON configuration overrides
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<FarmDashboard, JsValue> {
        let config = DashboardConfig::load(config_json.as_deref()).map_err(to_js_error)?;
        logging::init_logging(&config.log_filter);

        let session = FarmSession::from_config(&config, chrono::Utc::now()).map_err(to_js_error)?;
        Ok(FarmDashboard { session })
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn container(&self) -> Result<String, JsValue> {
        to_json(self.session.container())
    }

    pub fn stats(&self) -> Result<String, JsValue> {
        to_json(&self.session.container().stats)
    }

    pub fn catalog(&self) -> Result<String, JsValue> {
        to_json(self.session.catalog())
    }

    pub fn selection(&self) -> Result<String, JsValue> {
        to_json(self.session.selection())
    }

    pub fn drafts(&self) -> Result<String, JsValue> {
        to_json(self.session.drafts())
    }

    pub fn has_actions(&self) -> bool {
        self.session.drafts().has_actions()
    }

    /// "Row A · Rack 3 · Tray 5", or undefined for an unknown tray
    pub fn tray_location(&self, tray_id: &str) -> Option<String> {
        self.session.container().tray_location(tray_id)
    }

    pub fn available_crops(&self) -> Result<String, JsValue> {
        to_json(&self.session.available_crops())
    }

    pub fn check_crop_compatibility(&self, crop_a: &str, crop_b: &str) -> Result<String, JsValue> {
        let check = self
            .session
            .check_crop_compatibility(crop_a, crop_b)
            .map_err(to_js_error)?;
        to_json(&check)
    }

    /// Context menu state for a `{"target_type": ..., "target_ids": [...]}` target
    pub fn action_availability(&self, target_json: &str) -> Result<String, JsValue> {
        let target: Target = from_json(target_json)?;
        to_json(&self.session.action_availability(&target))
    }

    pub fn changes_summary(&self) -> Result<String, JsValue> {
        to_json(&self.session.changes_summary())
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn toggle_row(&mut self, row_id: &str) {
        self.session.toggle_row(row_id);
    }

    pub fn toggle_rack(&mut self, rack_id: &str) {
        self.session.toggle_rack(rack_id);
    }

    pub fn toggle_tray(&mut self, tray_id: &str) {
        self.session.toggle_tray(tray_id);
    }

    pub fn select_row(&mut self, row_id: &str) {
        self.session.select_row(row_id);
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    pub fn enter_multi_mode(&mut self) {
        self.session.enter_multi_mode();
    }

    // ------------------------------------------------------------------------
    // Draft actions
    // ------------------------------------------------------------------------

    /// Queue `{"type": "plant", "crop_id": ...}` (or another kind) against a target
    pub fn queue_action(&mut self, kind_json: &str, target_json: &str) -> Result<String, JsValue> {
        let kind: ActionKind = from_json(kind_json)?;
        let target: Target = from_json(target_json)?;
        let action = self.session.queue_action(kind, target).map_err(to_js_error)?;
        to_json(&action)
    }

    pub fn queue_for_selection(&mut self, kind_json: &str) -> Result<String, JsValue> {
        let kind: ActionKind = from_json(kind_json)?;
        let action = self.session.queue_for_selection(kind).map_err(to_js_error)?;
        to_json(&action)
    }

    /// Returns false for unknown or malformed ids
    pub fn remove_action(&mut self, action_id: &str) -> bool {
        Uuid::parse_str(action_id)
            .ok()
            .and_then(|id| self.session.remove_action(id))
            .is_some()
    }

    /// Returns the number of discarded actions
    pub fn clear_actions(&mut self) -> usize {
        self.session.clear_actions().len()
    }

    /// Commit the actions listed in a JSON array of ids
    pub fn apply_actions(&mut self, action_ids_json: &str) -> Result<String, JsValue> {
        let ids: Vec<Uuid> = from_json(action_ids_json)?;
        to_json(&self.session.apply_actions(&ids))
    }

    pub fn apply_all_actions(&mut self) -> Result<String, JsValue> {
        to_json(&self.session.apply_all_actions())
    }
}

/// Compare two crops of the built-in catalog
#[wasm_bindgen]
pub fn check_crop_compatibility(crop_a: &str, crop_b: &str) -> Result<String, JsValue> {
    let catalog = CropCatalog::builtin();
    let a = catalog.require(crop_a).map_err(to_js_error)?;
    let b = catalog.require(crop_b).map_err(to_js_error)?;
    to_json(&shared::check_crop_compatibility(a, b))
}

/// Split the built-in catalog against a JSON array of existing crop ids
#[wasm_bindgen]
pub fn available_crops_for(existing_ids_json: &str) -> Result<String, JsValue> {
    let existing: Vec<String> = from_json(existing_ids_json)?;
    to_json(&shared::available_crops_for_container(&CropCatalog::builtin(), &existing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn dashboard(overrides: &str) -> FarmDashboard {
        match FarmDashboard::new(Some(overrides.to_string())) {
            Ok(dashboard) => dashboard,
            Err(_) => panic!("dashboard should load"),
        }
    }

    fn ok<T>(result: Result<T, JsValue>) -> T {
        match result {
            Ok(value) => value,
            Err(_) => panic!("expected success"),
        }
    }

    #[test]
    fn test_default_dashboard_container() {
        let dashboard = dashboard("");
        let container: Value = serde_json::from_str(&ok(dashboard.container())).unwrap();
        assert_eq!(container["id"], "container_41_i2f");
        assert_eq!(container["rows"].as_array().unwrap().len(), 2);
        assert_eq!(container["stats"]["total_trays"], 84);
    }

    #[test]
    fn test_queue_and_apply_through_json() {
        let mut dashboard = dashboard(r#"{"container": {"rows": ["A"], "racks_per_row": 1, "populate": false}}"#);
        dashboard.toggle_rack("row_A_rack_1");
        let action: Value = serde_json::from_str(&ok(
            dashboard.queue_for_selection(r#"{"type": "plant", "crop_id": "lettuce"}"#),
        ))
        .unwrap();
        assert_eq!(action["type"], "plant");
        assert_eq!(action["target_type"], "rack");
        assert_eq!(action["affected_trays"].as_array().unwrap().len(), 7);
        assert!(dashboard.has_actions());

        let report: Value = serde_json::from_str(&ok(dashboard.apply_all_actions())).unwrap();
        assert_eq!(report["stats"]["growing"], 7);
        assert_eq!(report["stats"]["free"], 0);
        assert!(!dashboard.has_actions());
    }

    #[test]
    fn test_remove_action_by_string_id() {
        let mut dashboard = dashboard(r#"{"container": {"populate": false}}"#);
        let action: Value = serde_json::from_str(&ok(dashboard.queue_action(
            r#"{"type": "plant", "crop_id": "basil"}"#,
            r#"{"target_type": "tray", "target_ids": ["row_B_rack_2_tray_3"]}"#,
        )))
        .unwrap();
        let id = action["id"].as_str().unwrap().to_string();

        assert!(!dashboard.remove_action("not-a-uuid"));
        assert!(dashboard.remove_action(&id));
        assert_eq!(dashboard.clear_actions(), 0);
    }

    #[test]
    fn test_summary_and_location() {
        let mut dashboard = dashboard(r#"{"container": {"populate": false}}"#);
        ok(dashboard.queue_action(
            r#"{"type": "plant", "crop_id": "romano"}"#,
            r#"{"target_type": "row", "target_ids": ["row_A"]}"#,
        ));
        let summary: Value = serde_json::from_str(&ok(dashboard.changes_summary())).unwrap();
        assert_eq!(summary["estimated_minutes"], 5);
        assert_eq!(summary["actions"][0]["target_label"], "Row A");
        assert_eq!(
            dashboard.tray_location("row_A_rack_2_tray_1").as_deref(),
            Some("Row A · Rack 2 · Tray 1")
        );
    }

    #[test]
    fn test_free_functions() {
        let check: Value = serde_json::from_str(&ok(check_crop_compatibility("arugula", "basil"))).unwrap();
        assert_eq!(check["compatible"], false);
        assert_eq!(check["reasons"].as_array().unwrap().len(), 4);

        let split: Value = serde_json::from_str(&ok(available_crops_for(r#"["basil"]"#))).unwrap();
        assert!(split["blocked"]
            .as_array()
            .unwrap()
            .iter()
            .any(|b| b["crop"]["id"] == "arugula"));
    }
}
