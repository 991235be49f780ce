use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{BusinessInfo, MarketResearch, SwotAnalysis};

/// Everything the backend's processing endpoint produces for the sidebar.
///
/// Every section is optional; a missing section is shown as a "no data"
/// placeholder rather than treated as an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnalysisBundle {
    /// Summary of the business idea.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessInfo>,

    /// Market and competitor research.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketResearch>,

    /// SWOT analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swot: Option<SwotAnalysis>,

    /// The simulation tree: state names mapping to
    /// `{ "state_description": ..., "next_steps": { ... } }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Value>,

    /// Time series keyed by graph id: `{ "data": [..], "title"?, "x_label"?, "y_label"? }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphs: Option<Map<String, Value>>,

    /// Error message reported by the backend instead of content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisBundle {
    /// Returns true if no section is present.
    pub fn is_empty(&self) -> bool {
        self.business.is_none()
            && self.market.is_none()
            && self.swot.is_none()
            && self.thinking.is_none()
            && self.graphs.is_none()
    }
}
