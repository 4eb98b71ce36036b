use std::fmt::Write as _;

use foundation::ids::RegionId;
use foundation::math::Vec2;
use layers::LayerKind;
use layers::labels::{Label, LabelStyle, LabelVisibility};
use layers::symbology::RegionPaint;
use layers::vector::RegionShape;
use scene::ZoomTransform;
use widget::tooltip::escape_html;
use widget::{ErrorPanel, Surface};

#[derive(Debug, Clone, PartialEq)]
struct RegionElement {
    id: RegionId,
    path: String,
    paint: Option<RegionPaint>,
}

/// Static SVG document built from surface commands. Tooltip commands are
/// ignored since a snapshot has no pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    background: String,
    regions: Vec<RegionElement>,
    labels: Vec<Label>,
    label_style: LabelStyle,
    labels_visible: bool,
    region_transform: ZoomTransform,
    label_transform: ZoomTransform,
    error: Option<ErrorPanel>,
}

impl Default for SvgDocument {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            background: "#ffffff".to_string(),
            regions: Vec::new(),
            labels: Vec::new(),
            label_style: LabelStyle::default(),
            labels_visible: false,
            region_transform: ZoomTransform::identity(),
            label_transform: ZoomTransform::identity(),
            error: None,
        }
    }
}

impl SvgDocument {
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn visible_label_count(&self) -> usize {
        if self.labels_visible { self.labels.len() } else { 0 }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            escape_html(&self.background)
        );

        if let Some(panel) = &self.error {
            let _ = writeln!(
                out,
                r##"  <text x="50%" y="45%" text-anchor="middle" fill="#e74c3c">{}</text>"##,
                escape_html(&panel.title)
            );
            let _ = writeln!(
                out,
                r##"  <text x="50%" y="55%" text-anchor="middle" fill="#666">{}</text>"##,
                escape_html(&panel.message)
            );
            out.push_str("</svg>\n");
            return out;
        }

        let _ = writeln!(
            out,
            r#"  <g class="map-group" transform="{}">"#,
            self.region_transform.to_svg()
        );
        for region in &self.regions {
            let style = region
                .paint
                .as_ref()
                .map(|p| format!("fill: {}; stroke: {}; stroke-width: {}px", p.fill, p.stroke, p.stroke_width))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                r#"    <path class="municipio" data-region="{}" d="{}" style="{}"/>"#,
                region.id.index(),
                region.path,
                escape_html(&style)
            );
        }
        out.push_str("  </g>\n");

        if self.visible_label_count() > 0 {
            let s = &self.label_style;
            let style = format!(
                "font-size: {}px; font-family: {}; font-weight: {}; fill: {}; stroke: {}; stroke-width: {}px; text-anchor: middle; dominant-baseline: central",
                s.font_size_px, s.font_family, s.font_weight, s.color, s.stroke_color, s.stroke_width_px
            );
            let _ = writeln!(
                out,
                r#"  <g class="labels-group" transform="{}" style="{}">"#,
                self.label_transform.to_svg(),
                escape_html(&style)
            );
            for label in &self.labels {
                let _ = writeln!(
                    out,
                    r#"    <text class="municipio-label" x="{}" y="{}">{}</text>"#,
                    label.position.x,
                    label.position.y,
                    escape_html(&label.text)
                );
            }
            out.push_str("  </g>\n");
        }

        out.push_str("</svg>\n");
        out
    }
}

impl Surface for SvgDocument {
    fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn set_background(&mut self, color: &str) {
        self.background = color.to_string();
    }

    fn draw_regions(&mut self, shapes: &[RegionShape]) {
        self.error = None;
        self.regions = shapes
            .iter()
            .map(|s| RegionElement {
                id: s.id,
                path: s.path.clone(),
                paint: None,
            })
            .collect();
    }

    fn reshape_regions(&mut self, shapes: &[RegionShape]) {
        for shape in shapes {
            if let Some(region) = self.regions.get_mut(shape.id.index() as usize) {
                region.path = shape.path.clone();
            }
        }
    }

    fn style_region(&mut self, id: RegionId, paint: &RegionPaint) {
        if let Some(region) = self.regions.get_mut(id.index() as usize) {
            region.paint = Some(paint.clone());
        }
    }

    fn draw_labels(&mut self, labels: &[Label], style: &LabelStyle) {
        self.labels = labels.to_vec();
        self.label_style = style.clone();
    }

    fn set_labels_visibility(&mut self, visibility: LabelVisibility) {
        self.labels_visible = visibility.visible;
    }

    fn apply_transform(&mut self, layer: LayerKind, transform: ZoomTransform, _transition_ms: Option<u32>) {
        match layer {
            LayerKind::Regions => self.region_transform = transform,
            LayerKind::Labels => self.label_transform = transform,
        }
    }

    fn show_tooltip(&mut self, _content: &str, _at: Vec2) {}

    fn move_tooltip(&mut self, _at: Vec2) {}

    fn hide_tooltip(&mut self) {}

    fn show_error(&mut self, panel: &ErrorPanel) {
        self.regions.clear();
        self.labels.clear();
        self.error = Some(panel.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use widget::{FetchError, MapContext};

    const SAMPLE: &str = include_str!("../../apps/viewer_web/assets/tocantins-sample.geojson");

    fn loaded() -> MapContext<SvgDocument> {
        let mut ctx = MapContext::new(SvgDocument::default(), 960.0, 600.0);
        ctx.complete_load("sample.geojson", Ok(SAMPLE.to_string()))
            .expect("load");
        ctx
    }

    #[test]
    fn renders_every_region_with_paint() {
        let mut ctx = loaded();
        ctx.select_by_name("gurupi").expect("gurupi");
        let svg = ctx.into_surface().render();

        assert_eq!(svg.matches("<path ").count(), 5);
        assert_eq!(svg.matches("fill: #ff6b6b").count(), 1);
        assert_eq!(svg.matches("fill: #69b3a2").count(), 4);
        assert!(svg.contains(r##"fill="#f5f5f5""##));
        assert!(!svg.contains("municipio-label"));
    }

    #[test]
    fn labels_render_once_zoomed_in() {
        let mut ctx = loaded();
        ctx.set_labels(json!({"enabled": true})).expect("labels");
        assert_eq!(ctx.surface().visible_label_count(), 0);

        ctx.scale_to(3.0);
        let doc = ctx.into_surface();
        assert_eq!(doc.visible_label_count(), 4);
        let svg = doc.render();
        assert!(svg.contains(">Santa Rosa d...</text>"));
        assert!(svg.contains("scale(3)"));
    }

    #[test]
    fn failed_load_renders_error_panel() {
        let mut ctx = MapContext::new(SvgDocument::default(), 100.0, 100.0);
        assert!(ctx
            .complete_load("missing.json", Err(FetchError::new("not found")))
            .is_err());
        let svg = ctx.into_surface().render();
        assert!(svg.contains("Erro ao carregar o mapa"));
        assert!(svg.contains("missing.json"));
        assert!(!svg.contains("<path "));
    }
}
