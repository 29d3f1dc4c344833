//! Widget and dashboard layout model.
//!
//! [`WidgetConfig`] is both the in-memory and the wire shape of a placed
//! widget: the JSON stored in `dashboard_layouts.layout` is exactly a
//! `Vec<WidgetConfig>` serialized with camelCase keys.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Number of columns in the placement grid.
pub const GRID_COLUMNS: u32 = 12;

/// Rows a stored widget may reach: `y + h` never exceeds this.
pub const MAX_GRID_ROWS: u32 = 1_000;

/// First version assigned to a layout, and the version reported when no
/// layout has been saved yet.
pub const INITIAL_LAYOUT_VERSION: i32 = 1;

/// Key under which the local (offline) layout copy is stored.
pub const LAYOUT_STORAGE_KEY: &str = "dashboard-widget-layout";

// ---------------------------------------------------------------------------
// Widget types
// ---------------------------------------------------------------------------

/// The closed set of widget kinds the registry knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetType {
    StatCard,
    LineChart,
    BarChart,
    ZoneCounting,
    LineCrossing,
    Occupancy,
    CameraFeed,
    EventList,
}

impl WidgetType {
    pub const ALL: [WidgetType; 8] = [
        WidgetType::StatCard,
        WidgetType::LineChart,
        WidgetType::BarChart,
        WidgetType::ZoneCounting,
        WidgetType::LineCrossing,
        WidgetType::Occupancy,
        WidgetType::CameraFeed,
        WidgetType::EventList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetType::StatCard => "stat-card",
            WidgetType::LineChart => "line-chart",
            WidgetType::BarChart => "bar-chart",
            WidgetType::ZoneCounting => "zone-counting",
            WidgetType::LineCrossing => "line-crossing",
            WidgetType::Occupancy => "occupancy",
            WidgetType::CameraFeed => "camera-feed",
            WidgetType::EventList => "event-list",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// Width and height in grid units with optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSize {
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
}

impl WidgetSize {
    const fn preset(w: u32, h: u32, min_w: u32, min_h: u32) -> Self {
        Self {
            w,
            h,
            min_w: Some(min_w),
            min_h: Some(min_h),
            max_w: None,
            max_h: None,
        }
    }

    /// Check `w`/`h` are positive and `min <= default <= max` on both axes.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.w == 0 || self.h == 0 {
            return Err(CoreError::Validation(
                "Widget width and height must be positive".into(),
            ));
        }
        check_bounds("width", self.w, self.min_w, self.max_w)?;
        check_bounds("height", self.h, self.min_h, self.max_h)
    }
}

fn check_bounds(axis: &str, value: u32, min: Option<u32>, max: Option<u32>) -> Result<(), CoreError> {
    if let Some(min) = min {
        if value < min {
            return Err(CoreError::Validation(format!(
                "Widget {axis} {value} is below its minimum {min}"
            )));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(CoreError::Validation(format!(
                "Widget {axis} {value} exceeds its maximum {max}"
            )));
        }
    }
    Ok(())
}

/// Size presets offered when configuring a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizePreset {
    Small,
    Medium,
    Large,
    Wide,
    Tall,
    Full,
}

impl SizePreset {
    pub const ALL: [SizePreset; 6] = [
        SizePreset::Small,
        SizePreset::Medium,
        SizePreset::Large,
        SizePreset::Wide,
        SizePreset::Tall,
        SizePreset::Full,
    ];

    pub const fn size(self) -> WidgetSize {
        match self {
            SizePreset::Small => WidgetSize::preset(2, 2, 2, 2),
            SizePreset::Medium => WidgetSize::preset(4, 2, 2, 2),
            SizePreset::Large => WidgetSize::preset(4, 4, 2, 2),
            SizePreset::Wide => WidgetSize::preset(6, 2, 4, 2),
            SizePreset::Tall => WidgetSize::preset(2, 4, 2, 2),
            SizePreset::Full => WidgetSize::preset(12, 4, 4, 2),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizePreset::Small => "Small (2×2)",
            SizePreset::Medium => "Medium (4×2)",
            SizePreset::Large => "Large (4×4)",
            SizePreset::Wide => "Wide (6×2)",
            SizePreset::Tall => "Tall (2×4)",
            SizePreset::Full => "Full Width (12×4)",
        }
    }

    /// The preset whose `w`/`h` match `size`, falling back to
    /// [`SizePreset::Medium`].
    pub fn matching(size: &WidgetSize) -> SizePreset {
        SizePreset::ALL
            .into_iter()
            .find(|p| {
                let s = p.size();
                s.w == size.w && s.h == size.h
            })
            .unwrap_or(SizePreset::Medium)
    }
}

// ---------------------------------------------------------------------------
// Placed widgets
// ---------------------------------------------------------------------------

/// A widget placed on a user's dashboard.
///
/// `widget_type` stays a plain string so a layout that references a retired
/// type still loads; [`WidgetConfig::kind`] resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl WidgetConfig {
    /// Create an unplaced widget of `widget_type` with the bounds of `size`.
    ///
    /// The id is `widget-<uuid>`; position is left to the grid.
    pub fn new(widget_type: WidgetType, title: impl Into<String>, size: WidgetSize) -> Self {
        Self {
            id: format!("widget-{}", uuid::Uuid::new_v4()),
            widget_type: widget_type.as_str().to_string(),
            title: title.into(),
            x: None,
            y: None,
            w: size.w,
            h: size.h,
            min_w: size.min_w,
            min_h: size.min_h,
            max_w: size.max_w,
            max_h: size.max_h,
            data: None,
            locked: None,
        }
    }

    /// Resolve the type string against the known kinds.
    pub fn kind(&self) -> Option<WidgetType> {
        self.widget_type.parse().ok()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }

    pub fn size(&self) -> WidgetSize {
        WidgetSize {
            w: self.w,
            h: self.h,
            min_w: self.min_w,
            min_h: self.min_h,
            max_w: self.max_w,
            max_h: self.max_h,
        }
    }

    /// Read a string field from the data bag.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }

    /// Read a numeric field from the data bag.
    pub fn data_f64(&self, key: &str) -> Option<f64> {
        self.data.as_ref()?.get(key)?.as_f64()
    }
}

/// The full, versioned collection of one user's widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub widgets: Vec<WidgetConfig>,
    pub version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            widgets: Vec::new(),
            version: INITIAL_LAYOUT_VERSION,
            updated_at: None,
        }
    }
}

/// Validate a widget collection before it is persisted.
///
/// Rejects empty or duplicate ids, zero sizes, widgets that stick out past
/// the last column, and widgets reaching below [`MAX_GRID_ROWS`]. Unknown
/// widget types are accepted; they render as placeholders.
pub fn validate_widgets(widgets: &[WidgetConfig]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(widgets.len());
    for widget in widgets {
        if widget.id.trim().is_empty() {
            return Err(CoreError::Validation("Widget id must not be empty".into()));
        }
        if !seen.insert(widget.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate widget id '{}'",
                widget.id
            )));
        }
        if widget.w == 0 || widget.h == 0 {
            return Err(CoreError::Validation(format!(
                "Widget '{}' must have a positive width and height",
                widget.id
            )));
        }
        if widget.w > GRID_COLUMNS {
            return Err(CoreError::Validation(format!(
                "Widget '{}' is wider than the {GRID_COLUMNS}-column grid",
                widget.id
            )));
        }
        if widget.x.unwrap_or(0).checked_add(widget.w).is_none_or(|right| right > GRID_COLUMNS) {
            return Err(CoreError::Validation(format!(
                "Widget '{}' extends past column {GRID_COLUMNS}",
                widget.id
            )));
        }
        if widget.y.unwrap_or(0).checked_add(widget.h).is_none_or(|bottom| bottom > MAX_GRID_ROWS) {
            return Err(CoreError::Validation(format!(
                "Widget '{}' extends below row {MAX_GRID_ROWS}",
                widget.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn widget_type_parses_every_wire_name() {
        for kind in WidgetType::ALL {
            assert_eq!(kind.as_str().parse::<WidgetType>(), Ok(kind));
        }
        assert!("pie-chart".parse::<WidgetType>().is_err());
    }

    #[test]
    fn presets_satisfy_their_own_bounds() {
        for preset in SizePreset::ALL {
            assert!(preset.size().validate().is_ok(), "{preset:?}");
        }
        assert_eq!(SizePreset::Full.size().w, GRID_COLUMNS);
    }

    #[test]
    fn size_below_minimum_is_rejected() {
        let size = WidgetSize {
            w: 1,
            ..SizePreset::Medium.size()
        };
        assert_matches!(size.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn matching_preset_falls_back_to_medium() {
        let size = WidgetSize::preset(6, 2, 4, 2);
        assert_eq!(SizePreset::matching(&size), SizePreset::Wide);
        let odd = WidgetSize::preset(3, 3, 1, 1);
        assert_eq!(SizePreset::matching(&odd), SizePreset::Medium);
    }

    #[test]
    fn wire_shape_uses_camel_case_and_omits_absent_fields() {
        let mut widget = WidgetConfig::new(WidgetType::StatCard, "Cameras", SizePreset::Medium.size());
        widget.id = "w1".into();
        widget.x = Some(0);
        widget.y = Some(0);

        let value = serde_json::to_value(&widget).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "w1",
                "type": "stat-card",
                "title": "Cameras",
                "x": 0,
                "y": 0,
                "w": 4,
                "h": 2,
                "minW": 2,
                "minH": 2
            })
        );
    }

    #[test]
    fn unknown_type_still_deserializes() {
        let widget: WidgetConfig = serde_json::from_value(json!({
            "id": "legacy",
            "type": "heatmap",
            "title": "Old",
            "w": 2,
            "h": 2
        }))
        .unwrap();
        assert_eq!(widget.kind(), None);
        assert_eq!(widget.x, None);
        assert!(!widget.is_locked());
    }

    #[test]
    fn new_widgets_get_distinct_ids() {
        let a = WidgetConfig::new(WidgetType::Occupancy, "A", SizePreset::Large.size());
        let b = WidgetConfig::new(WidgetType::Occupancy, "B", SizePreset::Large.size());
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("widget-"));
    }

    #[test]
    fn validate_widgets_rejects_duplicates_and_oversize() {
        let mut a = WidgetConfig::new(WidgetType::BarChart, "A", SizePreset::Small.size());
        let b = a.clone();
        assert_matches!(
            validate_widgets(&[a.clone(), b]),
            Err(CoreError::Validation(msg)) if msg.contains("Duplicate")
        );

        a.w = 13;
        assert_matches!(validate_widgets(&[a]), Err(CoreError::Validation(_)));
        assert!(validate_widgets(&[]).is_ok());
    }

    #[test]
    fn validate_widgets_bounds_geometry() {
        let mut w = WidgetConfig::new(WidgetType::StatCard, "A", SizePreset::Medium.size());
        w.x = Some(8);
        w.y = Some(MAX_GRID_ROWS - 2);
        assert!(validate_widgets(std::slice::from_ref(&w)).is_ok());

        w.x = Some(9);
        assert_matches!(
            validate_widgets(std::slice::from_ref(&w)),
            Err(CoreError::Validation(msg)) if msg.contains("column")
        );

        w.x = Some(0);
        w.y = Some(MAX_GRID_ROWS - 1);
        assert_matches!(
            validate_widgets(std::slice::from_ref(&w)),
            Err(CoreError::Validation(msg)) if msg.contains("row")
        );

        w.y = Some(0);
        w.h = u32::MAX;
        assert_matches!(validate_widgets(std::slice::from_ref(&w)), Err(CoreError::Validation(_)));

        w.h = 2;
        w.x = Some(u32::MAX);
        assert_matches!(validate_widgets(std::slice::from_ref(&w)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_layout_starts_at_version_one() {
        let layout = DashboardLayout::default();
        assert!(layout.widgets.is_empty());
        assert_eq!(layout.version, INITIAL_LAYOUT_VERSION);
    }
}
