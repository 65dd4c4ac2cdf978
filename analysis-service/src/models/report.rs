//! Documented shape of the model's analysis.
//!
//! Only used when strict schema validation is enabled. Values stay strings
//! because the prompt asks for free-form price levels and labels.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub market_structure: MarketStructure,
    pub smc_levels: Vec<SmcLevel>,
    pub trade_setup: TradeSetup,
    pub risk_management: RiskManagement,
    pub confirmation_checklist: Vec<ChecklistItem>,
}

#[derive(Debug, Deserialize)]
pub struct MarketStructure {
    #[serde(rename = "4h")]
    pub h4: TimeframeStructure,
    #[serde(rename = "1h")]
    pub h1: TimeframeStructure,
    #[serde(rename = "15m")]
    pub m15: TimeframeStructure,
    #[serde(rename = "5m")]
    pub m5: TimeframeStructure,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeStructure {
    pub trend: String,
    pub structure: String,
    pub key_level: String,
}

#[derive(Debug, Deserialize)]
pub struct SmcLevel {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
    pub status: String,
    pub significance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSetup {
    pub direction: String,
    pub entry_zone: String,
    pub stop_loss: String,
    pub take_profit1: String,
    pub take_profit2: String,
    pub take_profit3: String,
    pub rationale: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskManagement {
    pub rr_ratio1: String,
    pub rr_ratio2: String,
    pub rr_ratio3: String,
}

#[derive(Debug, Deserialize)]
pub struct ChecklistItem {
    pub item: String,
    pub status: String,
    pub priority: String,
}

impl AnalysisReport {
    /// Check a parsed analysis against the documented shape.
    pub fn validate_value(value: &serde_json::Value) -> Result<(), String> {
        let report = AnalysisReport::deserialize(value).map_err(|e| e.to_string())?;

        match report.trade_setup.direction.to_ascii_uppercase().as_str() {
            "LONG" | "SHORT" => Ok(()),
            other => Err(format!(
                "tradeSetup.direction must be LONG or SHORT, got '{}'",
                other
            )),
        }
    }
}
