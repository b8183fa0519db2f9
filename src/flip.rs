use crate::aggregator::ExposureTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipType {
    PositiveToNegative,
    NegativeToPositive,
}

impl fmt::Display for FlipType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FlipType::PositiveToNegative => write!(f, "positive → negative"),
            FlipType::NegativeToPositive => write!(f, "negative → positive"),
        }
    }
}

/// A price region where net dealer GEX changes sign between two adjacent
/// strikes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipZone {
    pub lower_strike: f64,
    pub upper_strike: f64,
    pub flip_price: f64,
    pub flip_type: FlipType,
}

/// Scan adjacent strike pairs for net-GEX sign changes. A zero on either
/// side never triggers a flip; tables with fewer than 2 rows yield no
/// zones. Never fails.
pub fn detect(table: &ExposureTable) -> Vec<FlipZone> {
    let mut zones = Vec::new();

    for pair in table.windows(2) {
        let current = pair[0].net_gex;
        let next = pair[1].net_gex;

        let flip_type = if current > 0.0 && next < 0.0 {
            FlipType::PositiveToNegative
        } else if current < 0.0 && next > 0.0 {
            FlipType::NegativeToPositive
        } else {
            continue;
        };

        let lower = pair[0].quote.strike;
        let upper = pair[1].quote.strike;
        let magnitude = current.abs() + next.abs();
        // The strict sign condition keeps magnitude > 0, but guard against
        // floating noise anyway and fall back to the midpoint.
        let flip_price = if magnitude > 0.0 {
            lower + (upper - lower) * current.abs() / magnitude
        } else {
            (lower + upper) / 2.0
        };

        zones.push(FlipZone { lower_strike: lower, upper_strike: upper, flip_price, flip_type });
    }

    if !zones.is_empty() {
        debug!(count = zones.len(), "Gamma flip zones detected");
    }

    zones
}
