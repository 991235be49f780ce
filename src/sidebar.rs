//! Text formatting for the analysis sidebar.
//!
//! The backend's processing endpoint returns an [`AnalysisBundle`]; this
//! module turns it into five plain-text sections suitable for a terminal.
//! Every section has a fixed placeholder for when its data is missing.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{AnalysisBundle, BusinessInfo, MarketResearch, SwotAnalysis};

/// Shown in the business tab when the bundle has no `business` key.
pub const NO_BUSINESS: &str = "No business information available";
/// Shown in the market tab when the bundle has no `market` key.
pub const NO_MARKET: &str = "No market research available";
/// Shown in the SWOT tab when the bundle has no `swot` key.
pub const NO_SWOT: &str = "No SWOT analysis available";
/// Shown in the simulation tab when the bundle has no `thinking` key.
pub const NO_SIMULATION: &str = "No simulation data available";
/// Shown in the graphs tab when the bundle has no usable `graphs`.
pub const NO_GRAPHS: &str = "No graph data available";

const NOT_AVAILABLE: &str = "N/A";

/// The root state the simulation tree starts from when present.
pub const INITIAL_STATE: &str = "Initial_State";

/////////////////////////////////////////////// tabs ///////////////////////////////////////////////

/// One of the five sidebar tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarTab {
    /// Business overview and market trends.
    Business,
    /// Competitors and keywords.
    Market,
    /// Strengths, weaknesses, opportunities and threats.
    Swot,
    /// Outline of the simulated decision tree.
    Simulation,
    /// Monthly projections.
    Graphs,
}

impl SidebarTab {
    /// Every tab in display order.
    pub const ALL: [SidebarTab; 5] = [
        SidebarTab::Business,
        SidebarTab::Market,
        SidebarTab::Swot,
        SidebarTab::Simulation,
        SidebarTab::Graphs,
    ];

    /// The heading shown above the tab's content.
    pub fn title(self) -> &'static str {
        match self {
            SidebarTab::Business => "Market Trends",
            SidebarTab::Market => "Competitor Research",
            SidebarTab::Swot => "SWOT Analysis",
            SidebarTab::Simulation => "Deep Simulation",
            SidebarTab::Graphs => "Graphs",
        }
    }
}

impl fmt::Display for SidebarTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SidebarTab::Business => "business",
            SidebarTab::Market => "market",
            SidebarTab::Swot => "swot",
            SidebarTab::Simulation => "simulation",
            SidebarTab::Graphs => "graphs",
        };
        f.write_str(name)
    }
}

impl FromStr for SidebarTab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" | "trends" => Ok(SidebarTab::Business),
            "market" | "competitors" => Ok(SidebarTab::Market),
            "swot" => Ok(SidebarTab::Swot),
            "simulation" | "simulate" | "thinking" => Ok(SidebarTab::Simulation),
            "graphs" | "graph" => Ok(SidebarTab::Graphs),
            other => Err(Error::validation(
                format!("unknown tab {other:?}; expected business, market, swot, simulation or graphs"),
                Some("tab".to_string()),
            )),
        }
    }
}

///////////////////////////////////////////// sections /////////////////////////////////////////////

/// Formatted text for every sidebar tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarSections {
    /// Text of [`SidebarTab::Business`].
    pub market_trends: String,
    /// Text of [`SidebarTab::Market`].
    pub competitor_research: String,
    /// Text of [`SidebarTab::Swot`].
    pub swot_analysis: String,
    /// Text of [`SidebarTab::Simulation`].
    pub simulation: String,
    /// Text of [`SidebarTab::Graphs`].
    pub graphs: String,
}

impl SidebarSections {
    /// Sections used when the raw response could not be processed.
    pub fn processing_error() -> Self {
        Self {
            market_trends: "Error processing business information.".to_string(),
            competitor_research: "Error processing market research data.".to_string(),
            swot_analysis: "Error processing SWOT analysis.".to_string(),
            simulation: "Error processing simulation data.".to_string(),
            graphs: "Error processing graph data.".to_string(),
        }
    }

    /// Returns the text for `tab`.
    pub fn section(&self, tab: SidebarTab) -> &str {
        match tab {
            SidebarTab::Business => &self.market_trends,
            SidebarTab::Market => &self.competitor_research,
            SidebarTab::Swot => &self.swot_analysis,
            SidebarTab::Simulation => &self.simulation,
            SidebarTab::Graphs => &self.graphs,
        }
    }
}

impl Default for SidebarSections {
    fn default() -> Self {
        format_sections(&AnalysisBundle::default())
    }
}

/// Formats every section of `bundle`.
pub fn format_sections(bundle: &AnalysisBundle) -> SidebarSections {
    SidebarSections {
        market_trends: format_business_info(bundle),
        competitor_research: format_market_research(bundle),
        swot_analysis: format_swot_analysis(bundle),
        simulation: format_simulation(bundle),
        graphs: format_graphs(bundle),
    }
}

/// Parses a raw processing response and formats it.
///
/// A response that is not a valid bundle yields the error text in every section.
pub fn process_response(raw: &str) -> SidebarSections {
    match serde_json::from_str::<AnalysisBundle>(raw) {
        Ok(bundle) => format_sections(&bundle),
        Err(_) => SidebarSections::processing_error(),
    }
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn bullets(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        return fallback.to_string();
    }
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats the business tab, which also carries the market overview.
pub fn format_business_info(bundle: &AnalysisBundle) -> String {
    let Some(business) = &bundle.business else {
        return NO_BUSINESS.to_string();
    };
    let BusinessInfo {
        business_name,
        short_description,
        industry,
        business_model,
        target_customers,
        revenue_model,
        success_probability,
    } = business;
    let probability = success_probability
        .map(|p| format!("{:.1}%", p * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let market = bundle.market.clone().unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "# {}", or_na(business_name));
    let _ = writeln!(out, "{}", short_description.as_deref().unwrap_or(""));
    let _ = writeln!(out);
    let _ = writeln!(out, "## Business Details");
    let _ = writeln!(out, "• Industry: {}", or_na(industry));
    let _ = writeln!(out, "• Business Model: {}", or_na(business_model));
    let _ = writeln!(out, "• Target Customers: {}", or_na(target_customers));
    let _ = writeln!(out, "• Revenue Model: {}", or_na(revenue_model));
    let _ = writeln!(out);
    let _ = writeln!(out, "## Success Metrics");
    let _ = writeln!(out, "• Success Probability: {probability}");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Market Overview");
    let _ = writeln!(out, "• Market Size: {}", or_na(&market.market_size));
    let _ = writeln!(out, "• Growth Rate: {}", or_na(&market.market_growth_rate));
    let _ = writeln!(
        out,
        "• Total Addressable Market: {}",
        or_na(&market.total_addressable_market)
    );
    let _ = writeln!(
        out,
        "• Serviceable Obtainable Market: {}",
        or_na(&market.serviceable_obtainable_market)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Key Market Trends");
    let _ = writeln!(out, "{}", bullets(&market.market_trends, "No trends available"));
    out
}

/// Formats the market research tab.
pub fn format_market_research(bundle: &AnalysisBundle) -> String {
    let Some(market) = &bundle.market else {
        return NO_MARKET.to_string();
    };
    let MarketResearch {
        market_size,
        market_growth_rate,
        total_addressable_market,
        serviceable_obtainable_market,
        barriers_to_entry,
        competitors,
        customer_segments,
        keywords,
        ..
    } = market;

    let mut out = String::new();
    let _ = writeln!(out, "# Market Research");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Market Details");
    let _ = writeln!(out, "• Market Size: {}", or_na(market_size));
    let _ = writeln!(out, "• Growth Rate: {}", or_na(market_growth_rate));
    let _ = writeln!(
        out,
        "• Total Addressable Market: {}",
        or_na(total_addressable_market)
    );
    let _ = writeln!(
        out,
        "• Serviceable Obtainable Market: {}",
        or_na(serviceable_obtainable_market)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Barriers to Entry");
    let _ = writeln!(out, "{}", bullets(barriers_to_entry, "No barriers listed"));
    let _ = writeln!(out);
    if competitors.is_empty() {
        let _ = writeln!(out, "## Competitor Analysis");
        let _ = writeln!(out, "No competitor data available");
        let _ = writeln!(out);
    } else {
        let _ = writeln!(out, "## Competitor Analysis");
        let _ = writeln!(out);
        for competitor in competitors {
            let _ = writeln!(out, "### {}", or_na(&competitor.name));
            let _ = writeln!(
                out,
                "{}",
                competitor.short_description.as_deref().unwrap_or("")
            );
            let _ = writeln!(out, "• Market Share: {}", or_na(&competitor.market_share));
            let _ = writeln!(out);
            let _ = writeln!(out, "Strengths:");
            let _ = writeln!(out, "{}", bullets(&competitor.strengths, "None specified"));
            let _ = writeln!(out);
            let _ = writeln!(out, "Weaknesses:");
            let _ = writeln!(out, "{}", bullets(&competitor.weaknesses, "None specified"));
            let _ = writeln!(out);
        }
    }
    let _ = writeln!(out, "## Target Customer Segments");
    let _ = writeln!(
        out,
        "{}",
        bullets(customer_segments, "No customer segments specified")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Keywords");
    if keywords.is_empty() {
        let _ = writeln!(out, "No keywords specified");
    } else {
        let _ = writeln!(out, "{}", keywords.join(", "));
    }
    out
}

/// Formats the SWOT tab.
pub fn format_swot_analysis(bundle: &AnalysisBundle) -> String {
    let Some(swot) = &bundle.swot else {
        return NO_SWOT.to_string();
    };
    let SwotAnalysis {
        strengths,
        weaknesses,
        opportunities,
        threats,
    } = swot;
    format!(
        "# SWOT Analysis\n\n\
         ## Strengths\n{}\n\n\
         ## Weaknesses\n{}\n\n\
         ## Opportunities\n{}\n\n\
         ## Threats\n{}\n",
        bullets(strengths, "No strengths specified"),
        bullets(weaknesses, "No weaknesses specified"),
        bullets(opportunities, "No opportunities specified"),
        bullets(threats, "No threats specified"),
    )
}

/// Formats the simulation tab as an indented outline of the thinking tree.
pub fn format_simulation(bundle: &AnalysisBundle) -> String {
    let Some(thinking) = &bundle.thinking else {
        return NO_SIMULATION.to_string();
    };
    match ThinkingNode::from_thinking(thinking) {
        Some(root) => root.outline(),
        None => "No valid tree data found".to_string(),
    }
}

/// Formats the graphs tab as one table of points per series.
pub fn format_graphs(bundle: &AnalysisBundle) -> String {
    let series = bundle
        .graphs
        .as_ref()
        .map(GraphSeries::from_graphs)
        .unwrap_or_default();
    if series.is_empty() {
        return NO_GRAPHS.to_string();
    }
    series
        .iter()
        .map(GraphSeries::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/////////////////////////////////////////// ThinkingNode ///////////////////////////////////////////

/// One state of the simulated business trajectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingNode {
    /// State name with underscores replaced by spaces.
    pub name: String,
    /// The state's `state_description`, or empty.
    pub description: String,
    /// States reachable through `next_steps`, in document order.
    pub children: Vec<ThinkingNode>,
}

impl ThinkingNode {
    /// Builds the tree from the bundle's `thinking` value.
    ///
    /// The root is `Initial_State` when present, otherwise the first
    /// object-valued key.  Returns `None` if no candidate root exists.
    pub fn from_thinking(thinking: &Value) -> Option<Self> {
        let states = thinking.as_object()?;
        let (id, data) = match states.get(INITIAL_STATE) {
            Some(data) => (INITIAL_STATE, data),
            None => states
                .iter()
                .find(|(_, value)| value.is_object())
                .map(|(key, value)| (key.as_str(), value))?,
        };
        Some(Self::convert(id, data))
    }

    fn convert(id: &str, data: &Value) -> Self {
        let name = id.replace('_', " ");
        let Some(fields) = data.as_object() else {
            return Self {
                name,
                description: String::new(),
                children: Vec::new(),
            };
        };
        let description = fields
            .get("state_description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let children = fields
            .get("next_steps")
            .and_then(Value::as_object)
            .map(|steps| {
                steps
                    .iter()
                    .map(|(key, value)| Self::convert(key, value))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name,
            description,
            children,
        }
    }

    /// Renders the tree with two spaces of indentation per level.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        if self.description.is_empty() {
            let _ = writeln!(out, "{indent}- {}", self.name);
        } else {
            let _ = writeln!(out, "{indent}- {}: {}", self.name, self.description);
        }
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(ThinkingNode::len).sum::<usize>()
    }

    /// Trees always contain their root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

//////////////////////////////////////////// GraphSeries ///////////////////////////////////////////

/// A monthly time series from the bundle's `graphs`.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSeries {
    /// Key of the entry in `graphs`.
    pub id: String,
    /// Heading; defaults to the id in title case.
    pub title: String,
    /// Label of the x axis; defaults to "Month".
    pub x_label: String,
    /// Label of the y axis; defaults to "Value".
    pub y_label: String,
    /// `("Month N", value)` pairs, one per data point.
    pub points: Vec<(String, f64)>,
}

impl GraphSeries {
    /// Converts every entry that has a `data` array; other entries are skipped.
    pub fn from_graphs(graphs: &Map<String, Value>) -> Vec<Self> {
        graphs
            .iter()
            .filter_map(|(id, entry)| Self::from_entry(id, entry))
            .collect()
    }

    fn from_entry(id: &str, entry: &Value) -> Option<Self> {
        let data = entry.get("data")?.as_array()?;
        let label = |key: &str, default: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        let points = data
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| Some((format!("Month {}", idx + 1), value.as_f64()?)))
            .collect();
        Some(Self {
            id: id.to_string(),
            title: entry
                .get("title")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| title_case(id)),
            x_label: label("x_label", "Month"),
            y_label: label("y_label", "Value"),
            points,
        })
    }
}

impl fmt::Display for GraphSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}", self.title)?;
        writeln!(f, "{} | {}", self.x_label, self.y_label)?;
        for (x, y) in &self.points {
            writeln!(f, "{x} | {y}")?;
        }
        Ok(())
    }
}

fn title_case(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
