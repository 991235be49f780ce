use serde::{Deserialize, Serialize};

use super::lenient;

/// Market research produced by the trend and competitor agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MarketResearch {
    /// Current size of the market.
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_size: Option<String>,

    /// Growth rate of the market.
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_growth_rate: Option<String>,

    /// Total addressable market.
    #[serde(default, deserialize_with = "lenient::text")]
    pub total_addressable_market: Option<String>,

    /// Serviceable obtainable market.
    #[serde(default, deserialize_with = "lenient::text")]
    pub serviceable_obtainable_market: Option<String>,

    /// Notable trends.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub market_trends: Vec<String>,

    /// Obstacles for a new entrant.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub barriers_to_entry: Vec<String>,

    /// Known competitors.
    #[serde(default)]
    pub competitors: Vec<Competitor>,

    /// Customer segments worth targeting.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub customer_segments: Vec<String>,

    /// Search keywords associated with the market.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub keywords: Vec<String>,
}

/// One competitor in the market.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Competitor {
    /// Competitor name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    /// One-line description.
    #[serde(default, deserialize_with = "lenient::text")]
    pub short_description: Option<String>,

    /// Estimated market share.
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_share: Option<String>,

    /// What the competitor does well.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub strengths: Vec<String>,

    /// Where the competitor falls short.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub weaknesses: Vec<String>,
}
