use serde::{Deserialize, Serialize};

/// Decoded option-chain payload as the data-fetch layer hands it over.
/// Field names mirror the NSE option-chain JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub records: Records,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: f64,

    #[serde(rename = "expiryDates", default)]
    pub expiry_dates: Vec<String>,

    #[serde(default)]
    pub data: Vec<OptionData>,
}

/// One raw per-strike record; call and put legs are nested entries sharing
/// the strike + expiry key. Provider-optional fields stay `Option` here and
/// get defaulted during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionData {
    #[serde(rename = "expiryDate", default)]
    pub expiry_date: Option<String>,

    #[serde(rename = "strikePrice", default)]
    pub strike_price: Option<f64>,

    #[serde(rename = "CE", default)]
    pub call: Option<OptionDetail>,

    #[serde(rename = "PE", default)]
    pub put: Option<OptionDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionDetail {
    #[serde(rename = "openInterest", default)]
    pub open_interest: Option<f64>,

    #[serde(rename = "changeinOpenInterest", default)]
    pub change_in_oi: Option<f64>,

    #[serde(rename = "totalTradedVolume", default)]
    pub volume: Option<f64>,

    #[serde(rename = "impliedVolatility", default)]
    pub iv: Option<f64>,

    #[serde(rename = "lastPrice", default)]
    pub last_price: Option<f64>,
}
