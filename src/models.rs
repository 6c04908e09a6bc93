use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const UNKNOWN: &str = "Unknown";
pub const BOOKED: &str = "Booked";

/// One outreach/scheduling event as delivered by the record source.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Record {
    #[serde(rename = "Patient ID", default, deserialize_with = "string_or_number")]
    pub patient_id: String,
    #[serde(rename = "Date", default)]
    pub date: String,
    #[serde(rename = "Time", default)]
    pub time: String,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "Provider Name", default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(rename = "Department", default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(rename = "pt_language", default, skip_serializing_if = "Option::is_none")]
    pub patient_language: Option<String>,
    #[serde(rename = "reach_out_medium", default, skip_serializing_if = "Option::is_none")]
    pub reach_out_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach_out_count: Option<i64>,
    #[serde(rename = "Duplicate", default, deserialize_with = "flag")]
    pub duplicate: bool,
    #[serde(rename = "Kept", default, skip_serializing_if = "Option::is_none")]
    pub kept: Option<bool>,
}

impl Record {
    /// Status label used for grouping. An explicit status wins, then the
    /// outreach counter code, then `Unknown`.
    pub fn status_label(&self) -> &str {
        if let Some(status) = non_empty(&self.status) {
            return status;
        }
        match self.reach_out_count {
            Some(code) => status_from_reach_out_count(code),
            None => UNKNOWN,
        }
    }

    pub fn provider_label(&self) -> &str {
        non_empty(&self.provider_name).unwrap_or(UNKNOWN)
    }

    pub fn language_label(&self) -> &str {
        non_empty(&self.patient_language).unwrap_or(UNKNOWN)
    }

    pub fn medium_label(&self) -> &str {
        non_empty(&self.reach_out_medium).unwrap_or(UNKNOWN)
    }

    pub fn is_booked(&self) -> bool {
        self.status_label() == BOOKED
    }

    /// Identity of a booking event; two records with the same key are the
    /// same booking.
    pub fn booking_key(&self) -> (&str, &str, &str, &str) {
        (
            self.patient_id.as_str(),
            self.date.as_str(),
            self.time.as_str(),
            self.status_label(),
        )
    }
}

pub fn status_from_reach_out_count(code: i64) -> &'static str {
    match code {
        -1 => BOOKED,
        -2 => "Max Reached Out",
        -3 => "No Available Slots",
        -4 => "No Selection Made",
        -5 => "Failed",
        1 => "Reached Once",
        2 => "Reached Twice",
        _ => "Other",
    }
}

/// Absent and empty values are missing; anything else is kept verbatim.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => value,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(value) => value,
        serde_json::Value::String(value) => {
            matches!(value.trim().to_ascii_lowercase().as_str(), "✅" | "true" | "yes" | "1")
        }
        serde_json::Value::Number(value) => value.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

/// Percentages go over the wire in fixed one-decimal form, e.g. `"33.3"`.
fn fixed_one_decimal<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{value:.1}"))
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(value) => value
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("percent out of range")),
        serde_json::Value::String(value) => value.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!("invalid percent {other}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreakdownRow {
    pub label: String,
    pub count: u64,
    #[serde(serialize_with = "fixed_one_decimal", deserialize_with = "number_or_string")]
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AggregationResult {
    pub status_breakdown: Vec<BreakdownRow>,
    pub total_sent: u64,
    pub total_booked: u64,
    pub percent_booked: f64,
    pub estimated_revenue: f64,
    pub language_breakdown: Vec<BreakdownRow>,
    pub medium_breakdown: Vec<BreakdownRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderVolume {
    pub provider_name: String,
    pub booked_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowRate {
    pub months_covered: Vec<String>,
    pub total_booked: u64,
    pub total_kept: u64,
    pub show_rate_percent: f64,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub tenant_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub tenant_id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

/// Date selection as it arrives on the query string.
#[derive(Debug, Deserialize, Default)]
pub struct SelectionQuery {
    pub mode: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub preset: Option<String>,
    pub status: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthsQuery {
    pub months: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub start: String,
    pub end: String,
    pub metrics: AggregationResult,
    pub providers: Vec<ProviderVolume>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatestDateResponse {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub records: usize,
}
