use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Overview,
    Sales,
    Logs,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Sales, Tab::Logs];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Sales => "sales",
            Tab::Logs => "logs",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Tab::Overview => "/api/overview",
            Tab::Sales => "/api/sales",
            Tab::Logs => "/api/logs",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::Sales => 1,
            Tab::Logs => 2,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "overview" => Ok(Tab::Overview),
            "sales" => Ok(Tab::Sales),
            "logs" => Ok(Tab::Logs),
            other => Err(format!("unknown tab '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl FilterState {
    pub fn new(start_date: Option<String>, end_date: Option<String>) -> Self {
        Self {
            start_date: non_blank(start_date),
            end_date: non_blank(end_date),
        }
    }

    pub fn normalized(self) -> Self {
        Self::new(self.start_date, self.end_date)
    }

    pub fn query_params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("start_date", self.start_date.clone()),
            ("end_date", self.end_date.clone()),
        ]
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OverviewMetrics {
    #[serde(deserialize_with = "or_default")]
    pub presell_entries: u64,
    #[serde(deserialize_with = "or_default")]
    pub bot_starts: u64,
    #[serde(deserialize_with = "or_default")]
    pub pix_generated: u64,
    #[serde(deserialize_with = "or_default")]
    pub pix_paid: u64,
    #[serde(deserialize_with = "or_default")]
    pub step_1_welcome: u64,
    #[serde(deserialize_with = "or_default")]
    pub step_2_preview: u64,
    #[serde(deserialize_with = "or_default")]
    pub step_3_gallery: u64,
    #[serde(deserialize_with = "or_default")]
    pub step_4_vip_plans: u64,
    #[serde(deserialize_with = "or_default")]
    pub step_5_payment: u64,
    #[serde(deserialize_with = "or_default")]
    pub blocked_users: u64,
    #[serde(deserialize_with = "or_default")]
    pub joined_group: u64,
    #[serde(deserialize_with = "or_default")]
    pub left_group: u64,
    #[serde(deserialize_with = "or_default")]
    pub conversions: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalesMetrics {
    #[serde(deserialize_with = "or_default")]
    pub total_revenue: f64,
    #[serde(deserialize_with = "or_default")]
    pub total_transactions: u64,
    #[serde(deserialize_with = "or_default")]
    pub conversion_rate: f64,
    #[serde(deserialize_with = "or_default")]
    pub average_ticket: f64,
    #[serde(deserialize_with = "or_default")]
    pub sales_by_date: Vec<SalesByDate>,
    #[serde(deserialize_with = "or_default")]
    pub sales_by_plan: Vec<SalesByPlan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalesByDate {
    #[serde(deserialize_with = "or_default")]
    pub date: String,
    #[serde(deserialize_with = "or_default")]
    pub revenue: f64,
    #[serde(deserialize_with = "or_default")]
    pub transactions: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalesByPlan {
    #[serde(deserialize_with = "plan_label")]
    pub plan: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub revenue: f64,
    #[serde(deserialize_with = "or_default")]
    pub transactions: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    #[serde(rename = "type", deserialize_with = "or_default")]
    pub kind: String,
    #[serde(deserialize_with = "or_default")]
    pub message: String,
    pub created_at: Option<String>,
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Option<Vec<LogEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default, deserialize_with = "or_default")]
    pub status: String,
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Plan ids come back as text or as a bare number depending on the column type.
fn plan_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let label = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    };
    Ok(label.filter(|text| !text.is_empty()))
}
