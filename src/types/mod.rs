// Public modules
pub mod analysis_bundle;
pub mod business_info;
pub mod chat_reply;
pub mod chat_request;
pub mod market_research;
pub mod swot_analysis;

mod lenient;

// Re-exports
pub use analysis_bundle::AnalysisBundle;
pub use business_info::BusinessInfo;
pub use chat_reply::{ChatReply, EMPTY_REPLY};
pub use chat_request::ChatRequest;
pub use market_research::{Competitor, MarketResearch};
pub use swot_analysis::SwotAnalysis;
