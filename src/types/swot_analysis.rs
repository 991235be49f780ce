use serde::{Deserialize, Serialize};

use super::lenient;

/// Strengths, weaknesses, opportunities and threats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SwotAnalysis {
    /// Internal advantages.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub strengths: Vec<String>,

    /// Internal disadvantages.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub weaknesses: Vec<String>,

    /// External openings.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub opportunities: Vec<String>,

    /// External risks.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub threats: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn swot_deserialization() {
        let swot: SwotAnalysis = serde_json::from_value(json!({
            "strengths": ["cheap"],
            "threats": ["regulation", "incumbents"]
        }))
        .unwrap();
        assert_eq!(swot.strengths, vec!["cheap".to_string()]);
        assert!(swot.weaknesses.is_empty());
        assert_eq!(swot.threats.len(), 2);
    }
}
