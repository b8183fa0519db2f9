//! Per-strike exposure aggregation.
//!
//! Sign convention (the system contract, applied identically to the OI and
//! OI-change variants): dealers are modeled as short options. Call GEX is
//! negated, put GEX is not; both DEX legs are negated, which leaves put DEX
//! positive since put delta is already negative.

use crate::config::{self, ContractSpec};
use crate::error::AnalyzerError;
use crate::greeks;
use crate::normalizer::StrikeQuote;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One strike's worth of exposure figures. GEX/DEX values are in billions
/// of currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureRow {
    #[serde(flatten)]
    pub quote: StrikeQuote,

    pub call_gamma: f64,
    pub put_gamma: f64,
    pub call_delta: f64,
    pub put_delta: f64,

    pub call_gex: f64,
    pub put_gex: f64,
    pub net_gex: f64,
    pub call_dex: f64,
    pub put_dex: f64,
    pub net_dex: f64,

    pub call_flow_gex: f64,
    pub put_flow_gex: f64,
    pub net_flow_gex: f64,
    pub call_flow_dex: f64,
    pub put_flow_dex: f64,
    pub net_flow_dex: f64,

    pub hedging_pressure: f64,
    pub total_volume: f64,
}

/// Rows sorted ascending by strike; immutable snapshot for one analysis
/// request.
pub type ExposureTable = Vec<ExposureRow>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmInfo {
    pub atm_strike: f64,
    pub atm_call_premium: f64,
    pub atm_put_premium: f64,
    pub atm_straddle_premium: f64,
}

/// Build the exposure table and ATM info for one normalized chain.
///
/// A quote is included iff its distance from the reference price, measured
/// in strike intervals, is at most `window_in_strikes` (inclusive). An
/// empty filtered set is an explicit error, never a silently-empty table.
pub fn aggregate(
    quotes: &[StrikeQuote],
    reference_price: f64,
    spec: &ContractSpec,
    window_in_strikes: f64,
    risk_free_rate: f64,
    time_to_expiry: f64,
) -> Result<(ExposureTable, AtmInfo), AnalyzerError> {
    if reference_price <= 0.0 {
        return Err(AnalyzerError::InvalidUnderlying(reference_price));
    }

    let mut included: Vec<&StrikeQuote> = quotes
        .iter()
        .filter(|q| (q.strike - reference_price).abs() / spec.strike_interval <= window_in_strikes)
        .collect();

    if included.is_empty() {
        return Err(AnalyzerError::EmptyWindow { reference_price, window_in_strikes });
    }

    included.sort_by(|a, b| a.strike.partial_cmp(&b.strike).unwrap());

    // ATM: ascending scan, first strike at the minimum distance wins ties
    let mut atm = AtmInfo {
        atm_strike: 0.0,
        atm_call_premium: 0.0,
        atm_put_premium: 0.0,
        atm_straddle_premium: 0.0,
    };
    let mut min_atm_diff = f64::MAX;
    for q in &included {
        let diff = (q.strike - reference_price).abs();
        if diff < min_atm_diff {
            min_atm_diff = diff;
            atm.atm_strike = q.strike;
            atm.atm_call_premium = q.call_ltp;
            atm.atm_put_premium = q.put_ltp;
        }
    }
    atm.atm_straddle_premium = atm.atm_call_premium + atm.atm_put_premium;

    let mut table: ExposureTable = included
        .iter()
        .map(|q| build_row(q, reference_price, spec, risk_free_rate, time_to_expiry))
        .collect();

    apply_hedging_pressure(&mut table);

    debug!(
        rows = table.len(),
        atm_strike = atm.atm_strike,
        "Aggregated exposure table"
    );

    Ok((table, atm))
}

fn build_row(
    q: &StrikeQuote,
    reference_price: f64,
    spec: &ContractSpec,
    risk_free_rate: f64,
    time_to_expiry: f64,
) -> ExposureRow {
    let call_iv = q.call_iv.max(config::IV_FLOOR);
    let put_iv = q.put_iv.max(config::IV_FLOOR);

    let call_gamma = greeks::gamma(reference_price, q.strike, time_to_expiry, risk_free_rate, call_iv);
    let put_gamma = greeks::gamma(reference_price, q.strike, time_to_expiry, risk_free_rate, put_iv);
    let call_delta = greeks::call_delta(reference_price, q.strike, time_to_expiry, risk_free_rate, call_iv);
    let put_delta = greeks::put_delta(reference_price, q.strike, time_to_expiry, risk_free_rate, put_iv);

    let gex_unit = reference_price * reference_price * spec.multiplier / config::BILLION;
    let dex_unit = reference_price * spec.multiplier / config::BILLION;

    let call_gex = -(q.call_oi * call_gamma * gex_unit);
    let put_gex = q.put_oi * put_gamma * gex_unit;
    let call_dex = -(q.call_oi * call_delta * dex_unit);
    let put_dex = -(q.put_oi * put_delta * dex_unit);

    let call_flow_gex = -(q.call_oi_change * call_gamma * gex_unit);
    let put_flow_gex = q.put_oi_change * put_gamma * gex_unit;
    let call_flow_dex = -(q.call_oi_change * call_delta * dex_unit);
    let put_flow_dex = -(q.put_oi_change * put_delta * dex_unit);

    ExposureRow {
        quote: q.clone(),
        call_gamma,
        put_gamma,
        call_delta,
        put_delta,
        call_gex,
        put_gex,
        net_gex: call_gex + put_gex,
        call_dex,
        put_dex,
        net_dex: call_dex + put_dex,
        call_flow_gex,
        put_flow_gex,
        net_flow_gex: call_flow_gex + put_flow_gex,
        call_flow_dex,
        put_flow_dex,
        net_flow_dex: call_flow_dex + put_flow_dex,
        hedging_pressure: 0.0,
        total_volume: q.call_volume + q.put_volume,
    }
}

/// Normalize net GEX per strike into [-100, 100] for cross-strike
/// comparison. All zeros when the table's max |net_gex| is zero.
fn apply_hedging_pressure(table: &mut ExposureTable) {
    let max_net_gex = table.iter().map(|r| r.net_gex.abs()).fold(0.0, f64::max);

    if max_net_gex > 0.0 {
        for row in table.iter_mut() {
            row.hedging_pressure = (row.net_gex / max_net_gex) * 100.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(strike: f64, call_oi: f64, put_oi: f64) -> StrikeQuote {
        StrikeQuote {
            strike,
            call_oi,
            put_oi,
            call_oi_change: call_oi / 10.0,
            put_oi_change: -put_oi / 10.0,
            call_volume: 100.0,
            put_volume: 200.0,
            call_iv: 0.12,
            put_iv: 0.14,
            call_ltp: 150.0,
            put_ltp: 140.0,
        }
    }

    const NIFTY: ContractSpec = config::NIFTY_SPEC;

    fn sample_quotes() -> Vec<StrikeQuote> {
        vec![
            quote(24400.0, 50_000.0, 80_000.0),
            quote(24450.0, 60_000.0, 70_000.0),
            quote(24500.0, 90_000.0, 90_000.0),
            quote(24550.0, 70_000.0, 60_000.0),
            quote(24600.0, 80_000.0, 50_000.0),
        ]
    }

    #[test]
    fn test_net_sums_are_exact() {
        let (table, _) =
            aggregate(&sample_quotes(), 24513.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        for row in &table {
            assert_eq!(row.net_gex, row.call_gex + row.put_gex);
            assert_eq!(row.net_dex, row.call_dex + row.put_dex);
            assert_eq!(row.net_flow_gex, row.call_flow_gex + row.put_flow_gex);
            assert_eq!(row.net_flow_dex, row.call_flow_dex + row.put_flow_dex);
        }
    }

    #[test]
    fn test_sign_convention_dealer_short() {
        let (table, _) =
            aggregate(&sample_quotes(), 24513.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        for row in &table {
            // Calls carry the negative GEX side, puts the positive
            assert!(row.call_gex <= 0.0);
            assert!(row.put_gex >= 0.0);
            // Both DEX legs negated: call DEX negative, put DEX positive
            assert!(row.call_dex <= 0.0);
            assert!(row.put_dex >= 0.0);
        }
    }

    #[test]
    fn test_gamma_equal_across_legs_at_equal_iv() {
        let mut q = quote(24500.0, 1000.0, 1000.0);
        q.call_iv = 0.15;
        q.put_iv = 0.15;
        let (table, _) = aggregate(&[q], 24500.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        assert_eq!(table[0].call_gamma, table[0].put_gamma);
    }

    #[test]
    fn test_window_boundary_inclusive() {
        let quotes = vec![
            quote(24000.0, 100.0, 100.0), // exactly 10 intervals below
            quote(24500.0, 100.0, 100.0),
            quote(25000.0, 100.0, 100.0), // exactly 10 intervals above
            quote(25050.0, 100.0, 100.0), // 11 intervals, out
            quote(23950.0, 100.0, 100.0), // out
        ];
        let (table, _) = aggregate(&quotes, 24500.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        let strikes: Vec<f64> = table.iter().map(|r| r.quote.strike).collect();
        assert_eq!(strikes, vec![24000.0, 24500.0, 25000.0]);
    }

    #[test]
    fn test_empty_window_is_explicit_error() {
        let quotes = vec![quote(30000.0, 100.0, 100.0)];
        let err = aggregate(&quotes, 24500.0, &NIFTY, 10.0, 0.07, 0.02).unwrap_err();
        assert!(matches!(err, AnalyzerError::EmptyWindow { .. }));
    }

    #[test]
    fn test_atm_nearest_strike_wins() {
        let (_, atm) = aggregate(&sample_quotes(), 24513.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        // 24513 is 13 away from 24500 and 37 from 24550
        assert_eq!(atm.atm_strike, 24500.0);
        assert_eq!(atm.atm_straddle_premium, atm.atm_call_premium + atm.atm_put_premium);
    }

    #[test]
    fn test_atm_tie_breaks_to_first_in_ascending_scan() {
        let quotes = vec![quote(24450.0, 100.0, 100.0), quote(24550.0, 100.0, 100.0)];
        let (_, atm) = aggregate(&quotes, 24500.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        assert_eq!(atm.atm_strike, 24450.0);
    }

    #[test]
    fn test_hedging_pressure_bounds() {
        let (table, _) = aggregate(&sample_quotes(), 24513.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        assert!(table
            .iter()
            .any(|r| r.hedging_pressure.abs() == 100.0));
        for row in &table {
            assert!(row.hedging_pressure >= -100.0 && row.hedging_pressure <= 100.0);
        }
    }

    #[test]
    fn test_hedging_pressure_all_zero_when_flat() {
        // Zero OI everywhere means zero net GEX everywhere
        let quotes = vec![quote(24450.0, 0.0, 0.0), quote(24500.0, 0.0, 0.0)];
        let (table, _) = aggregate(&quotes, 24500.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        for row in &table {
            assert_eq!(row.net_gex, 0.0);
            assert_eq!(row.hedging_pressure, 0.0);
        }
    }

    #[test]
    fn test_table_sorted_ascending() {
        let mut quotes = sample_quotes();
        quotes.reverse();
        let (table, _) = aggregate(&quotes, 24513.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        for pair in table.windows(2) {
            assert!(pair[0].quote.strike < pair[1].quote.strike);
        }
    }

    #[test]
    fn test_degenerate_expiry_yields_zero_greeks_not_error() {
        let (table, _) = aggregate(&sample_quotes(), 24513.0, &NIFTY, 10.0, 0.07, 0.0).unwrap();
        for row in &table {
            assert_eq!(row.call_gamma, 0.0);
            assert_eq!(row.net_gex, 0.0);
            assert_eq!(row.net_dex, 0.0);
        }
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let quotes = sample_quotes();
        let (a, atm_a) = aggregate(&quotes, 24513.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        let (b, atm_b) = aggregate(&quotes, 24513.0, &NIFTY, 10.0, 0.07, 0.02).unwrap();
        assert_eq!(atm_a.atm_strike, atm_b.atm_strike);
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.net_gex, rb.net_gex);
            assert_eq!(ra.hedging_pressure, rb.hedging_pressure);
        }
    }
}
