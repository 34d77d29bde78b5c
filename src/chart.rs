//! Chart payload shaping.
//!
//! Turns a raw chart event payload into a renderer-ready data/config pair.
//! The shaper is pure: it resolves the chart kind and title, fills in the
//! default palette where the backend sent the `"auto"` sentinel, and passes
//! everything else through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Title used when neither `config.title` nor `title` is present.
pub const TITLE_PLACEHOLDER: &str = "Chart";

/// Default palette assigned for the `"auto"` color sentinel.
///
/// Ordered and cyclically assignable: renderers wrap around when a dataset
/// has more entries than the palette.
pub const DEFAULT_PALETTE: [&str; 5] = ["#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF"];

/// A renderer-ready chart payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    /// Visual form: `config.type`, else top-level `type`, else `"bar"`.
    pub kind: String,
    /// The named series to plot.
    pub data: DatasetBundle,
    /// Opaque renderer options carried through from `config.options`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Category labels plus one or more named series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Value>>,
    #[serde(default)]
    pub datasets: Vec<Series>,
}

/// One named series with optional color specs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Value>,
    /// Fields this core does not interpret (stacking, axes, etc.).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shape a raw chart payload for rendering.
///
/// Pure; applied exactly once per chart turn, at append time. Missing or
/// malformed `data` degrades to an empty bundle rather than an error.
pub fn shape(raw: &Value) -> ChartPayload {
    let config = raw.get("config");

    let kind = config
        .and_then(|c| c.get("type"))
        .and_then(Value::as_str)
        .or_else(|| raw.get("type").and_then(Value::as_str))
        .unwrap_or("bar")
        .to_string();

    let mut data: DatasetBundle = raw
        .get("data")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    for series in &mut data.datasets {
        resolve_color(&mut series.background_color);
        resolve_color(&mut series.border_color);
    }

    ChartPayload {
        kind,
        data,
        options: config.and_then(|c| c.get("options")).cloned(),
    }
}

/// Resolve a chart title: `config.title`, else `title`, else a placeholder.
pub fn resolve_title(raw: &Value) -> String {
    raw.get("config")
        .and_then(|c| c.get("title"))
        .and_then(Value::as_str)
        .or_else(|| raw.get("title").and_then(Value::as_str))
        .unwrap_or(TITLE_PLACEHOLDER)
        .to_string()
}

/// Replace the `"auto"` sentinel with the default palette; anything else is
/// preserved as the caller supplied it.
fn resolve_color(color: &mut Option<Value>) {
    if color.as_ref().and_then(Value::as_str) == Some("auto") {
        *color = Some(Value::Array(
            DEFAULT_PALETTE.iter().map(|c| Value::from(*c)).collect(),
        ));
    }
}
