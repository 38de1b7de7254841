//! Common types used across the dashboard core

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed interval for a climate or nutrient parameter
///
/// Bounds are exact decimals so that pH and EC overlaps compare without
/// floating-point drift (6.3 - 6.2 must be exactly 0.1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClimateRange {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
}

impl ClimateRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Whole-number range, e.g. temperature 20-22
    pub fn whole(min: i64, max: i64) -> Self {
        Self {
            min: Decimal::from(min),
            max: Decimal::from(max),
        }
    }

    /// Range with one decimal place given in tenths, e.g. pH 58..65 for 5.8-6.5
    pub fn tenths(min: i64, max: i64) -> Self {
        Self {
            min: Decimal::new(min, 1),
            max: Decimal::new(max, 1),
        }
    }

    /// Width of the intersection with another range, clamped at zero
    pub fn overlap(&self, other: &ClimateRange) -> Decimal {
        let width = self.max.min(other.max) - self.min.max(other.min);
        width.max(Decimal::ZERO)
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl std::fmt::Display for ClimateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min.normalize(), self.max.normalize())
    }
}

/// Current climate readings inside the container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateData {
    pub temperature: f64,
    pub humidity: f64,
    pub co2: f64,
    pub lighting: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec: Option<f64>,
}

impl Default for ClimateData {
    fn default() -> Self {
        Self {
            temperature: 21.0,
            humidity: 72.0,
            co2: 1050.0,
            lighting: 400.0,
            ph: Some(6.1),
            ec: Some(1050.0),
        }
    }
}

/// Hierarchy level a draft action or selection refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Row,
    Rack,
    Tray,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetType::Row => write!(f, "row"),
            TargetType::Rack => write!(f, "rack"),
            TargetType::Tray => write!(f, "tray"),
        }
    }
}

/// Ids picked at one hierarchy level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub target_type: TargetType,
    pub target_ids: Vec<String>,
}

impl Target {
    pub fn rows<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(TargetType::Row, ids)
    }

    pub fn racks<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(TargetType::Rack, ids)
    }

    pub fn trays<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(TargetType::Tray, ids)
    }

    fn of<I, S>(target_type: TargetType, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_type,
            target_ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_exact_for_tenths() {
        let a = ClimateRange::tenths(58, 63);
        let b = ClimateRange::tenths(62, 65);
        assert_eq!(a.overlap(&b), Decimal::new(1, 1));
    }

    #[test]
    fn test_disjoint_overlap_is_zero() {
        let a = ClimateRange::whole(20, 22);
        let b = ClimateRange::whole(25, 30);
        assert_eq!(a.overlap(&b), Decimal::ZERO);
        assert_eq!(b.overlap(&a), Decimal::ZERO);
    }

    #[test]
    fn test_range_display_drops_trailing_zeros() {
        assert_eq!(ClimateRange::tenths(60, 70).to_string(), "6-7");
        assert_eq!(ClimateRange::tenths(58, 65).to_string(), "5.8-6.5");
        assert_eq!(ClimateRange::whole(900, 1400).to_string(), "900-1400");
    }

    #[test]
    fn test_range_serializes_as_numbers() {
        let json = serde_json::to_string(&ClimateRange::tenths(58, 65)).unwrap();
        assert_eq!(json, r#"{"min":5.8,"max":6.5}"#);
    }
}
