//! Widget registry: the static catalog of widget kinds.
//!
//! Built once on first access and never mutated. Categories exist only to
//! group widgets in the picker; they never restrict placement.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{json, Value};

use crate::render::{self, WidgetView};
use crate::widgets::{SizePreset, WidgetConfig, WidgetSize, WidgetType};

/// Renders the full tile for a placed widget.
pub type ContentRenderer = fn(&WidgetConfig) -> WidgetView;

/// Renders the picker preview from optional preview data.
pub type PreviewRenderer = fn(Option<&Value>) -> WidgetView;

/// Picker grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetCategory {
    Overview,
    Analytics,
    Monitoring,
}

impl WidgetCategory {
    pub const ALL: [WidgetCategory; 3] = [
        WidgetCategory::Overview,
        WidgetCategory::Analytics,
        WidgetCategory::Monitoring,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WidgetCategory::Overview => "Business Overview",
            WidgetCategory::Analytics => "Analytics",
            WidgetCategory::Monitoring => "Monitoring",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WidgetCategory::Overview => "Key metrics and insights",
            WidgetCategory::Analytics => "Charts and analysis",
            WidgetCategory::Monitoring => "Live feeds and logs",
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetDefinition {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub icon: Option<&'static str>,
    #[serde(rename = "defaultSize")]
    pub default_size: WidgetSize,
    pub configurable: bool,
    pub category: WidgetCategory,
    #[serde(rename = "previewData", skip_serializing_if = "Option::is_none")]
    pub preview_data: Option<Value>,
    #[serde(skip)]
    pub preview: PreviewRenderer,
    #[serde(skip)]
    pub content: ContentRenderer,
}

impl WidgetConfig {
    /// Build a new placed widget from a definition ("configure, then add").
    ///
    /// `title` defaults to the definition label and `size` to the preset
    /// matching the default size. Preview data seeds the data bag.
    pub fn from_definition(
        def: &WidgetDefinition,
        title: Option<&str>,
        size: Option<SizePreset>,
    ) -> Self {
        let preset = size.unwrap_or_else(|| SizePreset::matching(&def.default_size));
        let mut config = WidgetConfig::new(def.widget_type, title.unwrap_or(def.label), preset.size());
        config.data = def.preview_data.as_ref().and_then(Value::as_object).cloned();
        config
    }
}

static WIDGET_DEFINITIONS: LazyLock<Vec<WidgetDefinition>> = LazyLock::new(|| {
    vec![
        WidgetDefinition {
            widget_type: WidgetType::StatCard,
            label: "Stat Card",
            description: Some("Display key metrics"),
            icon: Some("layout-grid"),
            default_size: SizePreset::Medium.size(),
            configurable: true,
            category: WidgetCategory::Overview,
            preview_data: Some(json!({ "value": 127, "subtitle": "Configured cameras" })),
            preview: render::stat_preview,
            content: render::stat_content,
        },
        WidgetDefinition {
            widget_type: WidgetType::Occupancy,
            label: "Occupancy",
            description: Some("Real-time occupancy"),
            icon: Some("users"),
            default_size: SizePreset::Large.size(),
            configurable: true,
            category: WidgetCategory::Overview,
            preview_data: None,
            preview: render::occupancy_preview,
            content: render::occupancy_content,
        },
        WidgetDefinition {
            widget_type: WidgetType::LineCrossing,
            label: "Line Crossing",
            description: Some("Line crossing chart"),
            icon: Some("activity"),
            default_size: SizePreset::Medium.size(),
            configurable: true,
            category: WidgetCategory::Analytics,
            preview_data: None,
            preview: render::line_crossing_preview,
            content: render::line_crossing_content,
        },
        WidgetDefinition {
            widget_type: WidgetType::ZoneCounting,
            label: "Zone Counting",
            description: Some("Zone analysis"),
            icon: Some("layout-grid"),
            default_size: SizePreset::Medium.size(),
            configurable: true,
            category: WidgetCategory::Analytics,
            preview_data: None,
            preview: render::zone_counting_preview,
            content: render::zone_counting_content,
        },
        WidgetDefinition {
            widget_type: WidgetType::LineChart,
            label: "Line Chart",
            description: Some("Trend visualization"),
            icon: Some("line-chart"),
            default_size: SizePreset::Wide.size(),
            configurable: true,
            category: WidgetCategory::Analytics,
            preview_data: None,
            preview: render::line_chart_preview,
            content: render::line_chart_content,
        },
        WidgetDefinition {
            widget_type: WidgetType::BarChart,
            label: "Bar Chart",
            description: Some("Bar visualization"),
            icon: Some("bar-chart-3"),
            default_size: SizePreset::Medium.size(),
            configurable: true,
            category: WidgetCategory::Analytics,
            preview_data: None,
            preview: render::bar_chart_preview,
            content: render::bar_chart_content,
        },
        WidgetDefinition {
            widget_type: WidgetType::CameraFeed,
            label: "Camera Feed",
            description: Some("Live camera stream"),
            icon: Some("camera"),
            default_size: SizePreset::Large.size(),
            configurable: true,
            category: WidgetCategory::Monitoring,
            preview_data: None,
            preview: render::camera_feed_preview,
            content: render::camera_feed_content,
        },
        WidgetDefinition {
            widget_type: WidgetType::EventList,
            label: "Event List",
            description: Some("Recent events"),
            icon: Some("list"),
            default_size: SizePreset::Tall.size(),
            configurable: true,
            category: WidgetCategory::Monitoring,
            preview_data: None,
            preview: render::event_list_preview,
            content: render::event_list_content,
        },
    ]
});

/// All definitions in catalog order.
pub fn definitions() -> &'static [WidgetDefinition] {
    &WIDGET_DEFINITIONS
}

/// Find a definition by its wire type string. `None` is not an error.
pub fn lookup(widget_type: &str) -> Option<&'static WidgetDefinition> {
    WIDGET_DEFINITIONS
        .iter()
        .find(|d| d.widget_type.as_str() == widget_type)
}

/// A category with its member definitions, for the picker.
#[derive(Debug, Serialize)]
pub struct CategoryListing {
    pub id: WidgetCategory,
    pub label: &'static str,
    pub description: &'static str,
    pub widgets: Vec<&'static WidgetDefinition>,
}

/// Definitions grouped by category, in category order.
pub fn categories() -> Vec<CategoryListing> {
    WidgetCategory::ALL
        .into_iter()
        .map(|category| CategoryListing {
            id: category,
            label: category.label(),
            description: category.description(),
            widgets: WIDGET_DEFINITIONS
                .iter()
                .filter(|d| d.category == category)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_widget_type_is_registered_once() {
        for kind in WidgetType::ALL {
            let matches = definitions().iter().filter(|d| d.widget_type == kind).count();
            assert_eq!(matches, 1, "{kind} should be registered exactly once");
            assert!(lookup(kind.as_str()).is_some());
        }
        assert_eq!(definitions().len(), 8);
    }

    #[test]
    fn lookup_of_unknown_type_is_none() {
        assert!(lookup("pie-chart").is_none());
        assert!(lookup("").is_none());
        assert!(lookup("Stat-Card").is_none());
    }

    #[test]
    fn default_sizes_are_valid() {
        for def in definitions() {
            assert!(def.default_size.validate().is_ok(), "{}", def.label);
        }
    }

    #[test]
    fn categories_partition_the_catalog() {
        let listings = categories();
        assert_eq!(listings.len(), 3);
        let counts: Vec<usize> = listings.iter().map(|c| c.widgets.len()).collect();
        assert_eq!(counts, vec![2, 4, 2]);
        let total: usize = counts.iter().sum();
        assert_eq!(total, definitions().len());
    }

    #[test]
    fn from_definition_uses_label_and_matching_preset() {
        let def = lookup("line-chart").unwrap();
        let widget = WidgetConfig::from_definition(def, None, None);
        assert_eq!(widget.title, "Line Chart");
        assert_eq!(widget.widget_type, "line-chart");
        assert_eq!((widget.w, widget.h), (6, 2));
        assert_eq!(widget.min_w, Some(4));
        assert_eq!(widget.x, None);
    }

    #[test]
    fn from_definition_copies_preview_data_into_bag() {
        let def = lookup("stat-card").unwrap();
        let widget = WidgetConfig::from_definition(def, Some("Cameras"), Some(SizePreset::Small));
        assert_eq!(widget.title, "Cameras");
        assert_eq!((widget.w, widget.h), (2, 2));
        assert_eq!(widget.data_f64("value"), Some(127.0));
    }
}
