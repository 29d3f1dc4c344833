//! Widget render dispatch.
//!
//! Rendering produces a [`WidgetView`]: a serializable description of what a
//! tile shows. Front ends draw it; this crate only decides the content.

use serde::Serialize;
use serde_json::Value;

use crate::registry::{self, WidgetDefinition};
use crate::widgets::WidgetConfig;

/// Fallback bar heights (percent) when a chart widget has no bound series.
const SAMPLE_BARS: &[u32] = &[60, 80, 45, 90, 70, 55, 85];
const SAMPLE_ZONES: &[u32] = &[40, 65, 30, 80, 55, 70, 45, 90];
const SAMPLE_LINE: &[(u32, u32)] = &[(0, 55), (40, 40), (80, 48), (120, 25), (160, 32), (200, 15)];
const SAMPLE_CROSSINGS: &[(u32, u32)] = &[
    (0, 50),
    (30, 35),
    (60, 42),
    (90, 20),
    (120, 30),
    (150, 15),
    (180, 25),
    (200, 18),
];

/// Content of a single widget tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WidgetView {
    Stat { value: f64, subtitle: String },
    Occupancy { zone: String, current: f64, average: f64 },
    Bars { heights: Vec<u32> },
    Line { points: Vec<(u32, u32)> },
    CameraFeed { camera_id: Option<String> },
    EventList { events: Vec<String> },
}

/// Result of rendering a placed widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutput {
    Content {
        widget_id: String,
        title: String,
        view: WidgetView,
    },
    /// The widget's type is not in the registry. Carries the raw type string.
    UnknownWidget {
        widget_id: String,
        widget_type: String,
    },
}

/// Render a placed widget through the registry's content renderer.
pub fn render(config: &WidgetConfig) -> RenderOutput {
    match registry::lookup(&config.widget_type) {
        Some(def) => RenderOutput::Content {
            widget_id: config.id.clone(),
            title: config.title.clone(),
            view: (def.content)(config),
        },
        None => RenderOutput::UnknownWidget {
            widget_id: config.id.clone(),
            widget_type: config.widget_type.clone(),
        },
    }
}

/// Render the picker preview of a definition using its preview data.
pub fn render_preview(def: &WidgetDefinition) -> WidgetView {
    (def.preview)(def.preview_data.as_ref())
}

// ---------------------------------------------------------------------------
// Content renderers
// ---------------------------------------------------------------------------

pub(crate) fn stat_content(widget: &WidgetConfig) -> WidgetView {
    WidgetView::Stat {
        value: widget.data_f64("value").unwrap_or(0.0),
        subtitle: widget.data_str("subtitle").unwrap_or_default().to_string(),
    }
}

pub(crate) fn occupancy_content(widget: &WidgetConfig) -> WidgetView {
    WidgetView::Occupancy {
        zone: widget.data_str("zone").unwrap_or("Zone").to_string(),
        current: widget.data_f64("current").unwrap_or(0.0),
        average: widget.data_f64("average").unwrap_or(0.0),
    }
}

pub(crate) fn bar_chart_content(widget: &WidgetConfig) -> WidgetView {
    bars_from(widget.data.as_ref().and_then(|d| d.get("values")), SAMPLE_BARS)
}

pub(crate) fn zone_counting_content(widget: &WidgetConfig) -> WidgetView {
    bars_from(widget.data.as_ref().and_then(|d| d.get("values")), SAMPLE_ZONES)
}

pub(crate) fn line_chart_content(widget: &WidgetConfig) -> WidgetView {
    line_from(widget.data.as_ref().and_then(|d| d.get("points")), SAMPLE_LINE)
}

pub(crate) fn line_crossing_content(widget: &WidgetConfig) -> WidgetView {
    line_from(
        widget.data.as_ref().and_then(|d| d.get("points")),
        SAMPLE_CROSSINGS,
    )
}

pub(crate) fn camera_feed_content(widget: &WidgetConfig) -> WidgetView {
    WidgetView::CameraFeed {
        camera_id: widget.data_str("cameraId").map(str::to_string),
    }
}

pub(crate) fn event_list_content(widget: &WidgetConfig) -> WidgetView {
    let events = widget
        .data
        .as_ref()
        .and_then(|d| d.get("events"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    WidgetView::EventList { events }
}

// ---------------------------------------------------------------------------
// Preview renderers
// ---------------------------------------------------------------------------

fn preview_number(data: Option<&Value>, key: &str, default: f64) -> f64 {
    data.and_then(|d| d.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(default)
}

pub(crate) fn stat_preview(data: Option<&Value>) -> WidgetView {
    WidgetView::Stat {
        value: preview_number(data, "value", 127.0),
        subtitle: data
            .and_then(|d| d.get("subtitle"))
            .and_then(Value::as_str)
            .unwrap_or("Configured cameras")
            .to_string(),
    }
}

pub(crate) fn occupancy_preview(data: Option<&Value>) -> WidgetView {
    WidgetView::Occupancy {
        zone: "Zone".to_string(),
        current: preview_number(data, "current", 0.0),
        average: preview_number(data, "average", 0.0),
    }
}

pub(crate) fn bar_chart_preview(_data: Option<&Value>) -> WidgetView {
    WidgetView::Bars {
        heights: SAMPLE_BARS[..5].to_vec(),
    }
}

pub(crate) fn zone_counting_preview(_data: Option<&Value>) -> WidgetView {
    WidgetView::Bars {
        heights: SAMPLE_ZONES[..6].to_vec(),
    }
}

pub(crate) fn line_chart_preview(_data: Option<&Value>) -> WidgetView {
    WidgetView::Line {
        points: vec![(0, 28), (25, 20), (50, 24), (75, 12), (100, 8)],
    }
}

pub(crate) fn line_crossing_preview(_data: Option<&Value>) -> WidgetView {
    WidgetView::Line {
        points: vec![(0, 25), (20, 15), (40, 20), (60, 8), (80, 15), (100, 10)],
    }
}

pub(crate) fn camera_feed_preview(_data: Option<&Value>) -> WidgetView {
    WidgetView::CameraFeed { camera_id: None }
}

pub(crate) fn event_list_preview(_data: Option<&Value>) -> WidgetView {
    WidgetView::EventList { events: Vec::new() }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bar heights from a JSON array of numbers, clamped to 0..=100.
fn bars_from(values: Option<&Value>, fallback: &[u32]) -> WidgetView {
    let heights = values
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_f64)
                .map(|v| v.clamp(0.0, 100.0).round() as u32)
                .collect::<Vec<_>>()
        })
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| fallback.to_vec());
    WidgetView::Bars { heights }
}

/// Polyline points from a JSON array of `[x, y]` pairs.
fn line_from(points: Option<&Value>, fallback: &[(u32, u32)]) -> WidgetView {
    let points = points
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|p| {
                    let pair = p.as_array()?;
                    Some((pair.first()?.as_u64()? as u32, pair.get(1)?.as_u64()? as u32))
                })
                .collect::<Vec<_>>()
        })
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| fallback.to_vec());
    WidgetView::Line { points }
}
