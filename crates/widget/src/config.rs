//! Typed map configuration with JSON deep-merge updates.
//!
//! The configuration is a tree of option groups. Partial updates arrive as
//! JSON objects using the camelCase option names; they are merged into the
//! JSON form of the current configuration and deserialized back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use layers::labels::{LabelStyle, LabelsConfig};
use layers::symbology::RegionPalette;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOptions {
    #[serde(rename = "default")]
    pub default_fill: String,
    pub hover: String,
    pub selected: String,
    pub stroke: String,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeOptions {
    pub width: f64,
    pub hover_width: f64,
    pub selected_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomOptions {
    pub min: f64,
    pub max: f64,
    /// Programmatic zoom animation length in milliseconds.
    pub duration: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipOffset {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub enabled: bool,
    pub offset: TooltipOffset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOptions {
    pub enabled: bool,
    pub font_size: f64,
    pub font_family: String,
    pub color: String,
    pub font_weight: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub min_zoom_level: f64,
    pub max_label_length: usize,
    pub offset_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationOptions {
    pub enabled: bool,
    /// Hover/selection paint transition in milliseconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOptions {
    pub enabled: bool,
    pub clear_on_background_click: bool,
    pub clear_on_esc_key: bool,
    pub clear_on_double_click: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub colors: ColorOptions,
    pub stroke: StrokeOptions,
    pub zoom: ZoomOptions,
    pub tooltip: TooltipOptions,
    pub labels: LabelOptions,
    pub animations: AnimationOptions,
    pub selection: SelectionOptions,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            colors: ColorOptions {
                default_fill: "#69b3a2".to_string(),
                hover: "#4a9b8e".to_string(),
                selected: "#ff6b6b".to_string(),
                stroke: "#ffffff".to_string(),
                background: "#f5f5f5".to_string(),
            },
            stroke: StrokeOptions {
                width: 1.0,
                hover_width: 2.0,
                selected_width: 2.0,
            },
            zoom: ZoomOptions {
                min: 0.5,
                max: 10.0,
                duration: 750.0,
            },
            tooltip: TooltipOptions {
                enabled: true,
                offset: TooltipOffset { x: 10.0, y: -10.0 },
            },
            labels: LabelOptions {
                enabled: false,
                font_size: 10.0,
                font_family: "Arial, sans-serif".to_string(),
                color: "#333333".to_string(),
                font_weight: "normal".to_string(),
                stroke_color: "#ffffff".to_string(),
                stroke_width: 0.5,
                min_zoom_level: 2.0,
                max_label_length: 15,
                offset_y: 0.0,
            },
            animations: AnimationOptions {
                enabled: true,
                duration: 300.0,
            },
            selection: SelectionOptions {
                enabled: true,
                clear_on_background_click: true,
                clear_on_esc_key: true,
                clear_on_double_click: false,
            },
        }
    }
}

impl MapConfig {
    pub fn palette(&self) -> RegionPalette {
        RegionPalette {
            default_fill: self.colors.default_fill.clone(),
            hover_fill: self.colors.hover.clone(),
            selected_fill: self.colors.selected.clone(),
            stroke: self.colors.stroke.clone(),
            stroke_width: self.stroke.width,
            hover_stroke_width: self.stroke.hover_width,
            selected_stroke_width: self.stroke.selected_width,
            transition_ms: self.paint_transition_ms(),
        }
    }

    pub fn label_style(&self) -> LabelStyle {
        LabelStyle {
            font_size_px: self.labels.font_size,
            font_family: self.labels.font_family.clone(),
            font_weight: self.labels.font_weight.clone(),
            color: self.labels.color.clone(),
            stroke_color: self.labels.stroke_color.clone(),
            stroke_width_px: self.labels.stroke_width,
        }
    }

    pub fn labels_config(&self) -> LabelsConfig {
        LabelsConfig {
            max_label_length: self.labels.max_label_length,
            offset_y: self.labels.offset_y,
            min_zoom_level: self.labels.min_zoom_level,
            enabled: self.labels.enabled,
        }
    }

    pub fn paint_transition_ms(&self) -> Option<u32> {
        self.animations
            .enabled
            .then(|| duration_ms(self.animations.duration))
    }

    /// Transition for programmatic zoom changes; `None` when animations are off.
    pub fn zoom_transition_ms(&self) -> Option<u32> {
        self.animations
            .enabled
            .then(|| duration_ms(self.zoom.duration))
    }
}

fn duration_ms(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// The patch was not a JSON object.
    NotAnObject,
    /// The merged tree does not describe a valid configuration.
    Invalid(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotAnObject => write!(f, "config patch must be a JSON object"),
            ConfigError::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotAnObject => None,
            ConfigError::Invalid(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    current: MapConfig,
}

impl ConfigStore {
    pub fn new(config: MapConfig) -> Self {
        Self { current: config }
    }

    pub fn get(&self) -> &MapConfig {
        &self.current
    }

    /// Deep-merges `patch` into the current configuration.
    ///
    /// On error the configuration is left unchanged.
    pub fn update(&mut self, patch: &Value) -> Result<(), ConfigError> {
        if !patch.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let mut tree = serde_json::to_value(&self.current).map_err(ConfigError::Invalid)?;
        deep_merge(&mut tree, patch);
        self.current = serde_json::from_value(tree).map_err(ConfigError::Invalid)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current = MapConfig::default();
    }
}

/// Merges `patch` into `target`: objects recurse key by key, any other
/// value (scalar, array, null) replaces the target wholesale.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_object() {
                deep_merge(target.entry(key.clone()).or_insert(Value::Null), value);
            } else {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
