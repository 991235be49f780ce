use serde::{Deserialize, Serialize};

use super::lenient;

/// The business idea as summarized by the analyst agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BusinessInfo {
    /// Name of the business.
    #[serde(default, deserialize_with = "lenient::text")]
    pub business_name: Option<String>,

    /// One-paragraph description.
    #[serde(default, deserialize_with = "lenient::text")]
    pub short_description: Option<String>,

    /// Industry the business operates in.
    #[serde(default, deserialize_with = "lenient::text")]
    pub industry: Option<String>,

    /// How the business creates value.
    #[serde(default, deserialize_with = "lenient::text")]
    pub business_model: Option<String>,

    /// Who buys.
    #[serde(default, deserialize_with = "lenient::text")]
    pub target_customers: Option<String>,

    /// How the business earns money.
    #[serde(default, deserialize_with = "lenient::text")]
    pub revenue_model: Option<String>,

    /// Estimated probability of success in [0, 1].
    #[serde(default, deserialize_with = "lenient::number")]
    pub success_probability: Option<f64>,
}
