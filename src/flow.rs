use crate::aggregator::ExposureTable;
use crate::config;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// GEX-style bias. Positive net gamma pins price (range-bound), negative
/// net gamma amplifies moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GexBias {
    BullishSideways,
    HighVolatility,
    Neutral,
    NoData,
}

impl fmt::Display for GexBias {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GexBias::BullishSideways => write!(f, "BULLISH/SIDEWAYS"),
            GexBias::HighVolatility => write!(f, "HIGH VOLATILITY"),
            GexBias::Neutral => write!(f, "NEUTRAL"),
            GexBias::NoData => write!(f, "NO DATA"),
        }
    }
}

/// DEX near-bias has no neutral band: any positive total reads bullish,
/// anything else bearish. Deliberate asymmetry with the GEX bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DexBias {
    Bullish,
    Bearish,
    NoData,
}

impl fmt::Display for DexBias {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DexBias::Bullish => write!(f, "BULLISH"),
            DexBias::Bearish => write!(f, "BEARISH"),
            DexBias::NoData => write!(f, "NO DATA"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowMetrics {
    pub gex_near_total: f64,
    pub dex_near_total: f64,
    pub gex_total: f64,
    pub dex_total: f64,
    pub gex_near_bias: GexBias,
    pub dex_near_bias: DexBias,
    pub combined_bias: GexBias,
}

impl FlowMetrics {
    /// Well-defined result for an empty table: zero totals, no-data labels.
    pub fn no_data() -> Self {
        Self {
            gex_near_total: 0.0,
            dex_near_total: 0.0,
            gex_total: 0.0,
            dex_total: 0.0,
            gex_near_bias: GexBias::NoData,
            dex_near_bias: DexBias::NoData,
            combined_bias: GexBias::NoData,
        }
    }
}

/// Near-the-money and whole-chain flow totals with directional bias
/// labels. Total over any input; an empty table yields the no-data result
/// rather than an error.
pub fn analyze(table: &ExposureTable, reference_price: f64) -> FlowMetrics {
    if table.is_empty() {
        return FlowMetrics::no_data();
    }

    // Positional window: NEAR_MONEY_STRIKES rows each side of the row
    // closest to the reference price, in the price-sorted table.
    let atm_idx = nearest_row_index(table, reference_price);
    let start = atm_idx.saturating_sub(config::NEAR_MONEY_STRIKES);
    let end = (atm_idx + config::NEAR_MONEY_STRIKES + 1).min(table.len());
    let near = &table[start..end];

    let gex_near_total: f64 = near.iter().map(|r| r.net_gex).sum();
    let dex_near_total: f64 = near.iter().map(|r| r.net_dex).sum();
    let gex_total: f64 = table.iter().map(|r| r.net_gex).sum();
    let dex_total: f64 = table.iter().map(|r| r.net_dex).sum();

    let gex_near_bias = classify_gex(gex_near_total);
    let dex_near_bias =
        if dex_near_total > 0.0 { DexBias::Bullish } else { DexBias::Bearish };
    let combined_bias = classify_gex((gex_near_total + dex_near_total) / 2.0);

    debug!(gex_near_total, dex_near_total, ?gex_near_bias, "Flow analysis complete");

    FlowMetrics {
        gex_near_total,
        dex_near_total,
        gex_total,
        dex_total,
        gex_near_bias,
        dex_near_bias,
        combined_bias,
    }
}

fn classify_gex(total: f64) -> GexBias {
    if total > config::GEX_BIAS_THRESHOLD {
        GexBias::BullishSideways
    } else if total < -config::GEX_BIAS_THRESHOLD {
        GexBias::HighVolatility
    } else {
        GexBias::Neutral
    }
}

fn nearest_row_index(table: &ExposureTable, reference_price: f64) -> usize {
    let mut idx = 0;
    let mut min_diff = f64::MAX;
    for (i, row) in table.iter().enumerate() {
        let diff = (row.quote.strike - reference_price).abs();
        if diff < min_diff {
            min_diff = diff;
            idx = i;
        }
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ExposureRow;
    use crate::normalizer::StrikeQuote;

    fn row(strike: f64, net_gex: f64, net_dex: f64) -> ExposureRow {
        ExposureRow {
            quote: StrikeQuote {
                strike,
                call_oi: 0.0,
                put_oi: 0.0,
                call_oi_change: 0.0,
                put_oi_change: 0.0,
                call_volume: 0.0,
                put_volume: 0.0,
                call_iv: 0.15,
                put_iv: 0.15,
                call_ltp: 0.0,
                put_ltp: 0.0,
            },
            call_gamma: 0.0,
            put_gamma: 0.0,
            call_delta: 0.0,
            put_delta: 0.0,
            call_gex: net_gex,
            put_gex: 0.0,
            net_gex,
            call_dex: net_dex,
            put_dex: 0.0,
            net_dex,
            call_flow_gex: 0.0,
            put_flow_gex: 0.0,
            net_flow_gex: 0.0,
            call_flow_dex: 0.0,
            put_flow_dex: 0.0,
            net_flow_dex: 0.0,
            hedging_pressure: 0.0,
            total_volume: 0.0,
        }
    }

    #[test]
    fn test_empty_table_gives_no_data() {
        let metrics = analyze(&vec![], 24500.0);
        assert_eq!(metrics.gex_near_bias, GexBias::NoData);
        assert_eq!(metrics.dex_near_bias, DexBias::NoData);
        assert_eq!(metrics.combined_bias, GexBias::NoData);
        assert_eq!(metrics.gex_near_total, 0.0);
    }

    #[test]
    fn test_near_window_is_positional() {
        // 15 strikes, ATM in the middle at index 7; window covers idx 2..=12
        let table: Vec<ExposureRow> = (0..15)
            .map(|i| {
                let strike = 24150.0 + 50.0 * i as f64;
                // Outside-window rows carry huge values that must not leak in
                let g = if (2..=12).contains(&i) { 10.0 } else { 1e6 };
                row(strike, g, 1.0)
            })
            .collect();

        let metrics = analyze(&table, 24500.0);
        assert_eq!(metrics.gex_near_total, 110.0);
        assert_eq!(metrics.dex_near_total, 11.0);
        // Whole-chain total includes everything
        assert_eq!(metrics.dex_total, 15.0);
    }

    #[test]
    fn test_near_window_clamps_at_table_edges() {
        let table = vec![row(24450.0, 10.0, 5.0), row(24500.0, 20.0, 5.0)];
        let metrics = analyze(&table, 24500.0);
        assert_eq!(metrics.gex_near_total, 30.0);
    }

    #[test]
    fn test_gex_bias_thresholds_exact() {
        assert_eq!(classify_gex(50.1), GexBias::BullishSideways);
        assert_eq!(classify_gex(50.0), GexBias::Neutral);
        assert_eq!(classify_gex(-50.0), GexBias::Neutral);
        assert_eq!(classify_gex(-50.1), GexBias::HighVolatility);
        assert_eq!(classify_gex(0.0), GexBias::Neutral);
    }

    #[test]
    fn test_dex_bias_has_no_neutral_band() {
        let bullish = analyze(&vec![row(24500.0, 0.0, 0.001)], 24500.0);
        assert_eq!(bullish.dex_near_bias, DexBias::Bullish);

        let bearish = analyze(&vec![row(24500.0, 0.0, 0.0)], 24500.0);
        assert_eq!(bearish.dex_near_bias, DexBias::Bearish);
    }

    #[test]
    fn test_combined_bias_uses_mean_of_totals() {
        // gex = 80, dex = 40 -> mean 60 -> bullish/sideways
        let table = vec![row(24500.0, 80.0, 40.0)];
        assert_eq!(analyze(&table, 24500.0).combined_bias, GexBias::BullishSideways);

        // gex = 80, dex = -80 -> mean 0 -> neutral
        let table = vec![row(24500.0, 80.0, -80.0)];
        assert_eq!(analyze(&table, 24500.0).combined_bias, GexBias::Neutral);

        // gex = -80, dex = -40 -> mean -60 -> high volatility
        let table = vec![row(24500.0, -80.0, -40.0)];
        assert_eq!(analyze(&table, 24500.0).combined_bias, GexBias::HighVolatility);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let table = vec![row(24450.0, 60.0, -10.0), row(24500.0, -5.0, 2.0)];
        let a = analyze(&table, 24500.0);
        let b = analyze(&table, 24500.0);
        assert_eq!(a.gex_near_total, b.gex_near_total);
        assert_eq!(a.gex_near_bias, b.gex_near_bias);
    }
}
