use foundation::ids::RegionId;
use foundation::math::Vec2;
use scene::RegionSet;

use crate::layer::{Layer, LayerId};
use crate::vector::RegionShape;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size_px: f64,
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    pub stroke_color: String,
    pub stroke_width_px: f64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_px: 10.0,
            font_family: "Arial, sans-serif".to_string(),
            font_weight: "normal".to_string(),
            color: "#333333".to_string(),
            stroke_color: "#ffffff".to_string(),
            stroke_width_px: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelsConfig {
    pub max_label_length: usize,
    /// Vertical shift applied to every anchor, in pixels.
    pub offset_y: f64,
    pub min_zoom_level: f64,
    pub enabled: bool,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            max_label_length: 15,
            offset_y: 0.0,
            min_zoom_level: 2.0,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub region: RegionId,
    pub text: String,
    pub position: Vec2,
}

/// Whether labels show at a zoom level, plus the style values used to hide them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelVisibility {
    pub visible: bool,
}

impl LabelVisibility {
    pub fn at_zoom(config: &LabelsConfig, k: f64) -> Self {
        Self {
            visible: config.enabled && k >= config.min_zoom_level,
        }
    }

    pub fn opacity(&self) -> f64 {
        if self.visible { 1.0 } else { 0.0 }
    }

    pub fn display(&self) -> &'static str {
        if self.visible { "block" } else { "none" }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelsLayer {
    id: LayerId,
    config: LabelsConfig,
}

impl LabelsLayer {
    pub fn new(id: u64, config: LabelsConfig) -> Self {
        Self {
            id: LayerId(id),
            config,
        }
    }

    pub fn config(&self) -> &LabelsConfig {
        &self.config
    }

    /// One label per named region with a centroid, in region order.
    pub fn build(&self, regions: &RegionSet, shapes: &[RegionShape]) -> Vec<Label> {
        shapes
            .iter()
            .filter_map(|shape| {
                let name = regions.feature(shape.id)?.name()?;
                let centroid = shape.centroid?;
                Some(Label {
                    region: shape.id,
                    text: truncate_label(name, self.config.max_label_length),
                    position: Vec2::new(centroid.x, centroid.y + self.config.offset_y),
                })
            })
            .collect()
    }

    pub fn visibility(&self, k: f64) -> LabelVisibility {
        LabelVisibility::at_zoom(&self.config, k)
    }
}

impl Layer for LabelsLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

/// Truncates by characters: names longer than `max` keep `max - 3` chars plus "...".
pub fn truncate_label(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = name.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
