//! Container, row and rack models with derived statistics

use serde::{Deserialize, Serialize};

use super::tray::{Tray, TrayStatus};
use crate::types::ClimateData;

/// Fill level of a rack
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RackStatus {
    Empty,
    Partial,
    Full,
}

/// Vertical stack of trays
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rack {
    pub id: String,
    pub row_id: String,
    /// 1-based position within the row
    pub position: u32,
    pub trays: Vec<Tray>,
    pub total_trays: usize,
    pub occupied_trays: usize,
    pub status: RackStatus,
    pub has_problems: bool,
    pub has_ready_to_harvest: bool,
}

/// One aisle of racks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub id: String,
    pub name: String,
    pub racks: Vec<Rack>,
    pub total_trays: usize,
    pub occupied_trays: usize,
}

/// Tray counts per status, as totals and percentages
///
/// `*_percent` fields are relative to all trays, `*_percent_of_occupied`
/// to the occupied ones. A zero denominator yields 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContainerStats {
    pub total_trays: usize,
    pub occupied: usize,
    pub occupied_percent: f64,
    pub planned: usize,
    pub planned_percent: f64,
    pub planned_percent_of_occupied: f64,
    pub growing: usize,
    pub growing_percent: f64,
    pub growing_percent_of_occupied: f64,
    pub ready: usize,
    pub ready_percent: f64,
    pub ready_percent_of_occupied: f64,
    pub harvested: usize,
    pub harvested_percent: f64,
    pub stop_pending: usize,
    pub problems: usize,
    pub free: usize,
    pub free_percent: f64,
}

/// The whole growing unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub rows: Vec<Row>,
    pub current_climate: ClimateData,
    pub stats: ContainerStats,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl Rack {
    pub fn new(id: impl Into<String>, row_id: impl Into<String>, position: u32, trays: Vec<Tray>) -> Self {
        let mut rack = Self {
            id: id.into(),
            row_id: row_id.into(),
            position,
            trays,
            total_trays: 0,
            occupied_trays: 0,
            status: RackStatus::Empty,
            has_problems: false,
            has_ready_to_harvest: false,
        };
        rack.recompute();
        rack
    }

    pub fn recompute(&mut self) {
        self.total_trays = self.trays.len();
        self.occupied_trays = self.trays.iter().filter(|t| t.status().is_occupied()).count();
        self.status = if self.occupied_trays == 0 {
            RackStatus::Empty
        } else if self.occupied_trays == self.total_trays {
            RackStatus::Full
        } else {
            RackStatus::Partial
        };
        self.has_problems = self.trays.iter().any(Tray::has_open_problems);
        self.has_ready_to_harvest = self.trays.iter().any(|t| t.status() == TrayStatus::Ready);
    }

    pub fn tray(&self, tray_id: &str) -> Option<&Tray> {
        self.trays.iter().find(|t| t.id == tray_id)
    }
}

impl Row {
    pub fn new(id: impl Into<String>, name: impl Into<String>, racks: Vec<Rack>) -> Self {
        let mut row = Self {
            id: id.into(),
            name: name.into(),
            racks,
            total_trays: 0,
            occupied_trays: 0,
        };
        row.recompute();
        row
    }

    pub fn recompute(&mut self) {
        for rack in &mut self.racks {
            rack.recompute();
        }
        self.total_trays = self.racks.iter().map(|r| r.total_trays).sum();
        self.occupied_trays = self.racks.iter().map(|r| r.occupied_trays).sum();
    }

    pub fn rack_ids(&self) -> Vec<String> {
        self.racks.iter().map(|r| r.id.clone()).collect()
    }
}

impl ContainerStats {
    /// Count statuses over every tray of the given rows
    pub fn calculate(rows: &[Row]) -> Self {
        let mut stats = ContainerStats::default();
        let mut empty = 0;

        for tray in rows.iter().flat_map(|r| &r.racks).flat_map(|r| &r.trays) {
            stats.total_trays += 1;
            match tray.status() {
                TrayStatus::Empty => empty += 1,
                TrayStatus::Planned => stats.planned += 1,
                TrayStatus::Growing => stats.growing += 1,
                TrayStatus::Ready => stats.ready += 1,
                TrayStatus::Harvested => stats.harvested += 1,
                TrayStatus::StopPending => stats.stop_pending += 1,
                TrayStatus::Problem => stats.problems += 1,
            }
        }

        let total = stats.total_trays;
        stats.free = empty;
        stats.occupied = total - empty;
        let occupied = stats.occupied;

        stats.occupied_percent = percent(occupied, total);
        stats.planned_percent = percent(stats.planned, total);
        stats.planned_percent_of_occupied = percent(stats.planned, occupied);
        stats.growing_percent = percent(stats.growing, total);
        stats.growing_percent_of_occupied = percent(stats.growing, occupied);
        stats.ready_percent = percent(stats.ready, total);
        stats.ready_percent_of_occupied = percent(stats.ready, occupied);
        stats.harvested_percent = percent(stats.harvested, total);
        stats.free_percent = percent(empty, total);
        stats
    }
}

impl Container {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rows: Vec<Row>,
        current_climate: ClimateData,
    ) -> Self {
        let mut container = Self {
            id: id.into(),
            name: name.into(),
            rows,
            current_climate,
            stats: ContainerStats::default(),
        };
        container.recompute();
        container
    }

    /// Refresh every derived value from the tray set
    pub fn recompute(&mut self) {
        for row in &mut self.rows {
            row.recompute();
        }
        self.stats = ContainerStats::calculate(&self.rows);
    }

    pub fn racks(&self) -> impl Iterator<Item = &Rack> {
        self.rows.iter().flat_map(|r| r.racks.iter())
    }

    pub fn trays(&self) -> impl Iterator<Item = &Tray> {
        self.racks().flat_map(|r| r.trays.iter())
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    pub fn rack(&self, rack_id: &str) -> Option<&Rack> {
        self.racks().find(|r| r.id == rack_id)
    }

    pub fn tray(&self, tray_id: &str) -> Option<&Tray> {
        self.trays().find(|t| t.id == tray_id)
    }

    pub(crate) fn tray_mut(&mut self, tray_id: &str) -> Option<&mut Tray> {
        self.rows
            .iter_mut()
            .flat_map(|r| r.racks.iter_mut())
            .flat_map(|r| r.trays.iter_mut())
            .find(|t| t.id == tray_id)
    }

    /// Row and rack holding a tray
    pub fn locate_tray(&self, tray_id: &str) -> Option<(&Row, &Rack, &Tray)> {
        self.rows.iter().find_map(|row| {
            row.racks.iter().find_map(|rack| {
                rack.tray(tray_id).map(|tray| (row, rack, tray))
            })
        })
    }

    /// Row holding a rack
    pub fn locate_rack(&self, rack_id: &str) -> Option<(&Row, &Rack)> {
        self.rows
            .iter()
            .find_map(|row| row.racks.iter().find(|r| r.id == rack_id).map(|rack| (row, rack)))
    }

    /// "Row A · Rack 3 · Tray 5"
    pub fn tray_location(&self, tray_id: &str) -> Option<String> {
        self.locate_tray(tray_id).map(|(row, rack, tray)| {
            format!("Row {} · Rack {} · Tray {}", row.name, rack.position, tray.position)
        })
    }
}
