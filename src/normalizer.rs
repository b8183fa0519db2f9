use crate::config;
use crate::error::AnalyzerError;
use crate::models::{OptionChain, OptionDetail};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Canonical per-strike record for one expiry: both legs merged, fields
/// defaulted, IVs as fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeQuote {
    pub strike: f64,
    pub call_oi: f64,
    pub put_oi: f64,
    pub call_oi_change: f64,
    pub put_oi_change: f64,
    pub call_volume: f64,
    pub put_volume: f64,
    pub call_iv: f64,
    pub put_iv: f64,
    pub call_ltp: f64,
    pub put_ltp: f64,
}

/// Normalization output: the deduplicated quotes plus the chain-level
/// fields downstream stages need.
#[derive(Debug, Clone)]
pub struct NormalizedChain {
    pub expiry: String,
    pub underlying_value: f64,
    pub quotes: Vec<StrikeQuote>,
}

/// Select the expiry for analysis. Expiry dates keep provider order;
/// an out-of-range index clamps to 0.
pub fn select_expiry(expiry_dates: &[String], expiry_index: usize) -> Result<&String, AnalyzerError> {
    if expiry_dates.is_empty() {
        return Err(AnalyzerError::NoExpiries);
    }
    let idx = if expiry_index >= expiry_dates.len() { 0 } else { expiry_index };
    Ok(&expiry_dates[idx])
}

/// Normalize one raw chain payload into per-strike quotes for the selected
/// expiry. Malformed records are skipped, never fatal; duplicate strikes
/// collapse first-seen-wins.
pub fn normalize(chain: &OptionChain, expiry_index: usize) -> Result<NormalizedChain, AnalyzerError> {
    let records = &chain.records;

    if records.underlying_value <= 0.0 {
        return Err(AnalyzerError::InvalidUnderlying(records.underlying_value));
    }

    let expiry = select_expiry(&records.expiry_dates, expiry_index)?.clone();

    let mut quotes: Vec<StrikeQuote> = Vec::new();
    let mut seen_strikes: Vec<f64> = Vec::new();

    for item in &records.data {
        if item.expiry_date.as_deref() != Some(expiry.as_str()) {
            continue;
        }

        let strike = match item.strike_price {
            Some(s) if s > 0.0 => s,
            _ => {
                warn!(?item.strike_price, "Skipping record with missing or zero strike");
                continue;
            }
        };

        // First-seen wins for duplicate strikes
        if seen_strikes.iter().any(|&s| s == strike) {
            debug!(strike, "Skipping duplicate strike");
            continue;
        }
        seen_strikes.push(strike);

        let ce = item.call.clone().unwrap_or_default();
        let pe = item.put.clone().unwrap_or_default();

        quotes.push(StrikeQuote {
            strike,
            call_oi: ce.open_interest.unwrap_or(0.0),
            put_oi: pe.open_interest.unwrap_or(0.0),
            call_oi_change: ce.change_in_oi.unwrap_or(0.0),
            put_oi_change: pe.change_in_oi.unwrap_or(0.0),
            call_volume: ce.volume.unwrap_or(0.0),
            put_volume: pe.volume.unwrap_or(0.0),
            call_iv: normalize_iv(&ce),
            put_iv: normalize_iv(&pe),
            call_ltp: ce.last_price.unwrap_or(0.0),
            put_ltp: pe.last_price.unwrap_or(0.0),
        });
    }

    if quotes.is_empty() {
        return Err(AnalyzerError::NoOptionData(expiry));
    }

    Ok(NormalizedChain { expiry, underlying_value: records.underlying_value, quotes })
}

/// Convert a provider IV (percent units) to a usable fraction. Zero or
/// missing IV gets the policy default instead of silently erasing the
/// strike's Greeks.
fn normalize_iv(detail: &OptionDetail) -> f64 {
    match detail.iv {
        Some(iv) if iv > 0.0 => (iv / 100.0).max(config::MIN_PROVIDER_IV),
        _ => config::DEFAULT_IV,
    }
}

/// Time to expiry in years (measured to the 15:30 close on expiry day)
/// and calendar days remaining. Already-expired dates floor at one
/// trading hour so same-day analysis still produces Greeks.
pub fn time_to_expiry(expiry: &str) -> Result<(f64, i64)> {
    let expiry_date = NaiveDate::parse_from_str(expiry, config::EXPIRY_DATE_FORMAT)
        .with_context(|| format!("Failed to parse expiry date: {}", expiry))?;

    let close = NaiveTime::from_hms_opt(15, 30, 0).unwrap();
    let expiry_close = expiry_date.and_time(close);

    let now = Local::now().naive_local();
    let seconds = (expiry_close - now).num_seconds() as f64;
    let years = (seconds / (365.0 * 24.0 * 3600.0)).max(config::MIN_TIME_TO_EXPIRY);

    let days = (expiry_date - now.date()).num_days().max(0);

    Ok((years, days))
}
