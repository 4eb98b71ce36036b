use formats::Feature;
use foundation::math::Vec2;

use crate::config::TooltipOffset;
use crate::surface::Surface;

pub const NAME_PLACEHOLDER: &str = "Nome não disponível";
pub const ID_PLACEHOLDER: &str = "N/A";

/// The single shared tooltip overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    visible: bool,
    position: Vec2,
}

impl Tooltip {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn show(&mut self, surface: &mut impl Surface, content: &str, pointer: Vec2, offset: TooltipOffset) {
        self.visible = true;
        self.position = offset_point(pointer, offset);
        surface.show_tooltip(content, self.position);
    }

    pub fn reposition(&mut self, surface: &mut impl Surface, pointer: Vec2, offset: TooltipOffset) {
        self.position = offset_point(pointer, offset);
        surface.move_tooltip(self.position);
    }

    pub fn hide(&mut self, surface: &mut impl Surface) {
        self.visible = false;
        surface.hide_tooltip();
    }
}

fn offset_point(pointer: Vec2, offset: TooltipOffset) -> Vec2 {
    Vec2::new(pointer.x + offset.x, pointer.y + offset.y)
}

/// Bold name line followed by an `ID:` line.
pub fn default_content(feature: &Feature) -> String {
    let name = feature.name().unwrap_or(NAME_PLACEHOLDER);
    let id = feature
        .display_id()
        .unwrap_or_else(|| ID_PLACEHOLDER.to_string());
    format!(
        r#"<div style="font-weight: bold; margin-bottom: 4px;">{}</div><div style="font-size: 12px; opacity: 0.8;">ID: {}</div>"#,
        escape_html(name),
        escape_html(&id)
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
