use foundation::ids::RegionId;
use foundation::math::Vec2;
use layers::LayerKind;
use layers::labels::{Label, LabelStyle, LabelVisibility};
use layers::symbology::RegionPaint;
use layers::vector::RegionShape;
use scene::ZoomTransform;

use crate::loader::ErrorPanel;

/// Rendering substrate driven by `MapContext`.
///
/// Region elements are keyed by `RegionId`. Labels sit in their own layer
/// above the regions and never receive pointer input.
pub trait Surface {
    fn set_size(&mut self, width: f64, height: f64);
    fn set_background(&mut self, color: &str);

    /// Replaces every region element.
    fn draw_regions(&mut self, shapes: &[RegionShape]);
    /// Updates path data of existing region elements in place.
    fn reshape_regions(&mut self, shapes: &[RegionShape]);
    fn style_region(&mut self, id: RegionId, paint: &RegionPaint);

    /// Replaces every label; an empty slice removes them all.
    fn draw_labels(&mut self, labels: &[Label], style: &LabelStyle);
    fn set_labels_visibility(&mut self, visibility: LabelVisibility);

    fn apply_transform(&mut self, layer: LayerKind, transform: ZoomTransform, transition_ms: Option<u32>);

    fn show_tooltip(&mut self, content: &str, at: Vec2);
    fn move_tooltip(&mut self, at: Vec2);
    /// Fades the tooltip out; the element itself is kept.
    fn hide_tooltip(&mut self);

    /// Replaces the map with an error panel.
    fn show_error(&mut self, panel: &ErrorPanel);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Command {
        Size(f64, f64),
        Background(String),
        DrawRegions(usize),
        ReshapeRegions(usize),
        Style(RegionId, RegionPaint),
        DrawLabels(Vec<String>),
        LabelsVisible(bool),
        Transform(LayerKind, ZoomTransform, Option<u32>),
        ShowTooltip(String, Vec2),
        MoveTooltip(Vec2),
        HideTooltip,
        Error(ErrorPanel),
    }

    /// Surface double that records every command it receives.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub commands: Vec<Command>,
    }

    impl RecordingSurface {
        pub fn last_style(&self, id: RegionId) -> Option<&RegionPaint> {
            self.commands.iter().rev().find_map(|c| match c {
                Command::Style(rid, paint) if *rid == id => Some(paint),
                _ => None,
            })
        }

        pub fn last_transform(&self, layer: LayerKind) -> Option<(ZoomTransform, Option<u32>)> {
            self.commands.iter().rev().find_map(|c| match c {
                Command::Transform(l, t, ms) if *l == layer => Some((*t, *ms)),
                _ => None,
            })
        }

        pub fn last_labels_visible(&self) -> Option<bool> {
            self.commands.iter().rev().find_map(|c| match c {
                Command::LabelsVisible(v) => Some(*v),
                _ => None,
            })
        }

        pub fn last_labels(&self) -> Option<&[String]> {
            self.commands.iter().rev().find_map(|c| match c {
                Command::DrawLabels(texts) => Some(texts.as_slice()),
                _ => None,
            })
        }

        pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
            self.commands.iter().filter(|c| pred(*c)).count()
        }

        pub fn clear(&mut self) {
            self.commands.clear();
        }
    }

    impl Surface for RecordingSurface {
        fn set_size(&mut self, width: f64, height: f64) {
            self.commands.push(Command::Size(width, height));
        }

        fn set_background(&mut self, color: &str) {
            self.commands.push(Command::Background(color.to_string()));
        }

        fn draw_regions(&mut self, shapes: &[RegionShape]) {
            self.commands.push(Command::DrawRegions(shapes.len()));
        }

        fn reshape_regions(&mut self, shapes: &[RegionShape]) {
            self.commands.push(Command::ReshapeRegions(shapes.len()));
        }

        fn style_region(&mut self, id: RegionId, paint: &RegionPaint) {
            self.commands.push(Command::Style(id, paint.clone()));
        }

        fn draw_labels(&mut self, labels: &[Label], _style: &LabelStyle) {
            self.commands
                .push(Command::DrawLabels(labels.iter().map(|l| l.text.clone()).collect()));
        }

        fn set_labels_visibility(&mut self, visibility: LabelVisibility) {
            self.commands.push(Command::LabelsVisible(visibility.visible));
        }

        fn apply_transform(&mut self, layer: LayerKind, transform: ZoomTransform, transition_ms: Option<u32>) {
            self.commands
                .push(Command::Transform(layer, transform, transition_ms));
        }

        fn show_tooltip(&mut self, content: &str, at: Vec2) {
            self.commands
                .push(Command::ShowTooltip(content.to_string(), at));
        }

        fn move_tooltip(&mut self, at: Vec2) {
            self.commands.push(Command::MoveTooltip(at));
        }

        fn hide_tooltip(&mut self) {
            self.commands.push(Command::HideTooltip);
        }

        fn show_error(&mut self, panel: &ErrorPanel) {
            self.commands.push(Command::Error(panel.clone()));
        }
    }
}
