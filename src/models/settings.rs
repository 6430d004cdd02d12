use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Table,
    Bar,
    Line,
    Pie,
}

/// Colours handed out to chart series and pie segments, in order.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#2563eb", "#16a34a", "#f59e0b", "#dc2626", "#7c3aed", "#0891b2", "#db2777", "#65a30d",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSettings {
    /// Base URL of the blog API, without a trailing slash.
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_palette")]
    pub chart_palette: Vec<String>,
    #[serde(default)]
    pub default_chart: ChartKind,
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        ConsoleSettings {
            api_base: "http://localhost:8080/api".to_string(),
            api_token: None,
            chart_palette: default_palette(),
            default_chart: ChartKind::default(),
        }
    }
}
