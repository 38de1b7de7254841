//! Draft action queue
//!
//! An ordered log of pending intents. The queue never touches the
//! container; legality is decided when actions are committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DraftAction, NewDraftAction};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct DraftQueue {
    actions: Vec<DraftAction>,
}

impl DraftQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action, assigning its id and creation time
    pub fn add_action(&mut self, action: NewDraftAction) -> DraftAction {
        self.add_action_at(action, Utc::now())
    }

    pub fn add_action_at(&mut self, action: NewDraftAction, created_at: DateTime<Utc>) -> DraftAction {
        let action = DraftAction {
            id: Uuid::new_v4(),
            kind: action.kind,
            target: action.target,
            created_at,
            affected_trays: action.affected_trays,
        };
        self.actions.push(action.clone());
        action
    }

    /// Drop an action; unknown ids are ignored
    pub fn remove_action(&mut self, action_id: Uuid) -> Option<DraftAction> {
        let index = self.actions.iter().position(|a| a.id == action_id)?;
        Some(self.actions.remove(index))
    }

    pub fn clear_actions(&mut self) -> Vec<DraftAction> {
        std::mem::take(&mut self.actions)
    }

    /// Remove and return the actions whose ids are listed, in queue order
    pub fn take_selected(&mut self, action_ids: &[Uuid]) -> Vec<DraftAction> {
        let (selected, kept): (Vec<DraftAction>, Vec<DraftAction>) = std::mem::take(&mut self.actions)
            .into_iter()
            .partition(|a| action_ids.contains(&a.id));
        self.actions = kept;
        selected
    }

    pub fn get(&self, action_id: Uuid) -> Option<&DraftAction> {
        self.actions.iter().find(|a| a.id == action_id)
    }

    pub fn actions(&self) -> &[DraftAction] {
        &self.actions
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.actions.iter().map(|a| a.id).collect()
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
