use std::fmt;

#[derive(Debug)]
pub enum AnalyzerError {
    /// The payload carried no expiry dates at all.
    NoExpiries,
    /// No option records matched the selected expiry.
    NoOptionData(String),
    /// Reference price missing or non-positive.
    InvalidUnderlying(f64),
    /// No strikes survived the window filter. Distinct from a flat market:
    /// callers must widen the window or report no-data, not treat this as
    /// zero exposure.
    EmptyWindow { reference_price: f64, window_in_strikes: f64 },
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalyzerError::NoExpiries => write!(f, "No expiry dates found in option chain"),
            AnalyzerError::NoOptionData(expiry) => {
                write!(f, "No option data found for expiry {}", expiry)
            }
            AnalyzerError::InvalidUnderlying(value) => {
                write!(f, "Invalid underlying price: {}", value)
            }
            AnalyzerError::EmptyWindow { reference_price, window_in_strikes } => write!(
                f,
                "No valid strikes found within {} intervals of {:.2}",
                window_in_strikes, reference_price
            ),
        }
    }
}

impl std::error::Error for AnalyzerError {}
