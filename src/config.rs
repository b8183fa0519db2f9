// -----------------------------------------------
// CONTRACT SPECS (per index class)
// -----------------------------------------------

/// Lot size and strike spacing for one index class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractSpec {
    pub multiplier: f64,
    pub strike_interval: f64,
}

pub const NIFTY_SPEC: ContractSpec = ContractSpec { multiplier: 25.0, strike_interval: 50.0 };
pub const BANKNIFTY_SPEC: ContractSpec = ContractSpec { multiplier: 15.0, strike_interval: 100.0 };
pub const FINNIFTY_SPEC: ContractSpec = ContractSpec { multiplier: 40.0, strike_interval: 50.0 };
pub const MIDCPNIFTY_SPEC: ContractSpec = ContractSpec { multiplier: 75.0, strike_interval: 25.0 };

/// Look up the contract spec for a symbol. Unknown symbols fall back to
/// the NIFTY spec.
pub fn contract_spec(symbol: &str) -> ContractSpec {
    if symbol.contains("BANKNIFTY") {
        BANKNIFTY_SPEC
    } else if symbol.contains("FINNIFTY") {
        FINNIFTY_SPEC
    } else if symbol.contains("MIDCPNIFTY") {
        MIDCPNIFTY_SPEC
    } else {
        NIFTY_SPEC
    }
}

// -----------------------------------------------
// VOLATILITY POLICY
// -----------------------------------------------
/// Provider IVs of zero would erase a strike's Greeks entirely, so they
/// get this default instead.
pub const DEFAULT_IV: f64 = 0.15;
/// Minimum IV fraction accepted from the provider during normalization.
pub const MIN_PROVIDER_IV: f64 = 0.10;
/// Hard floor applied right before the Greek engine is called.
pub const IV_FLOOR: f64 = 0.01;

// -----------------------------------------------
// RATES AND SCALING
// -----------------------------------------------
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.07;
/// Exposure figures are reported in billions of currency units.
pub const BILLION: f64 = 1_000_000_000.0;

// -----------------------------------------------
// FLOW ANALYSIS
// -----------------------------------------------
/// Strikes counted on each side of ATM for the near-money window.
pub const NEAR_MONEY_STRIKES: usize = 5;
/// Near-GEX totals beyond +/- this threshold flip the bias label.
pub const GEX_BIAS_THRESHOLD: f64 = 50.0;

// -----------------------------------------------
// EXPIRY HANDLING
// -----------------------------------------------
/// Expiry dates arrive as e.g. "30-Dec-2025".
pub const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y";
/// Floor on time-to-expiry so same-day chains still produce Greeks:
/// one trading hour, in years.
pub const MIN_TIME_TO_EXPIRY: f64 = 1.0 / (24.0 * 365.0);

// -----------------------------------------------
// RUNTIME CONFIGURATION (binary only)
// -----------------------------------------------

/// Path of the decoded option-chain snapshot to analyze.
pub fn get_input_path() -> String {
    std::env::var("GEX_INPUT").unwrap_or_else(|_| "option_chain.json".to_string())
}

pub fn get_symbol() -> String {
    std::env::var("GEX_SYMBOL").unwrap_or_else(|_| "NIFTY".to_string())
}

/// Strike window on each side of the reference price, in strike intervals.
pub fn get_strikes_range() -> f64 {
    std::env::var("GEX_STRIKES_RANGE")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(10.0)
}

pub fn get_expiry_index() -> usize {
    std::env::var("GEX_EXPIRY_INDEX")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
}

pub fn get_risk_free_rate() -> f64 {
    std::env::var("GEX_RISK_FREE_RATE")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(DEFAULT_RISK_FREE_RATE)
}

/// Optional path for the JSON report dump; empty disables it.
pub fn get_report_path() -> Option<String> {
    std::env::var("GEX_REPORT").ok().filter(|p| !p.is_empty())
}
