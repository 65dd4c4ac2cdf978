//! Fixed instruction sent ahead of the charts.

/// SMC/ICT analysis prompt. The JSON shape here is the contract that
/// [`crate::models::AnalysisReport`] checks in strict mode.
pub const ANALYSIS_PROMPT: &str = r#"Analyze these 4 cryptocurrency trading charts using Smart Money Concepts (SMC) and ICT principles.

Charts provided in order: 5-minute, 15-minute, 1-hour, 4-hour timeframes.

Provide comprehensive analysis and return results in this exact JSON format:
{
  "marketStructure": {
    "4h": {"trend": "BULLISH/BEARISH/NEUTRAL", "structure": "CHoCH/BOS/Consolidation", "keyLevel": "price level"},
    "1h": {"trend": "BULLISH/BEARISH/NEUTRAL", "structure": "CHoCH/BOS/Consolidation", "keyLevel": "price level"},
    "15m": {"trend": "BULLISH/BEARISH/NEUTRAL", "structure": "CHoCH/BOS/Consolidation", "keyLevel": "price level"},
    "5m": {"trend": "BULLISH/BEARISH/NEUTRAL", "structure": "CHoCH/BOS/Consolidation", "keyLevel": "price level"}
  },
  "smcLevels": [
    {"type": "Order Block/Fair Value Gap/Liquidity Zone", "price": "exact price", "status": "Active/Pending/Swept", "significance": "High/Medium/Low"}
  ],
  "tradeSetup": {
    "direction": "LONG/SHORT",
    "entryZone": "price range",
    "stopLoss": "price",
    "takeProfit1": "price",
    "takeProfit2": "price",
    "takeProfit3": "price",
    "rationale": "detailed explanation"
  },
  "riskManagement": {
    "rrRatio1": "1:X format",
    "rrRatio2": "1:X format",
    "rrRatio3": "1:X format"
  },
  "confirmationChecklist": [
    {"item": "HTF Trend Alignment", "status": "Confirmed/Pending", "priority": "High"},
    {"item": "Order Block Retest", "status": "Confirmed/Pending", "priority": "High"},
    {"item": "Break of Structure", "status": "Confirmed/Pending", "priority": "High"},
    {"item": "Volume Confirmation", "status": "Confirmed/Pending", "priority": "Medium"},
    {"item": "Fair Value Gap", "status": "Confirmed/Pending", "priority": "Medium"}
  ]
}"#;
