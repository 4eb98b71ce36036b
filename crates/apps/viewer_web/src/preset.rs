//! Page preset applied over the widget defaults at start-up.

use serde_json::{Value, json};

use widget::tooltip::escape_html;

pub fn tocantins_preset() -> Value {
    json!({
        "colors": { "selected": "#e2af05ff" },
        "labels": {
            "enabled": true,
            "fontSize": 5,
            "color": "#000000ff",
            "strokeColor": "#000000ff",
            "strokeWidth": 0.2
        }
    })
}

pub fn preset_tooltip(name: Option<&str>) -> String {
    format!("<strong>🏛️ {}</strong>", escape_html(name.unwrap_or_default()))
}

pub fn preset_click_message(name: Option<&str>) -> String {
    format!("Você clicou em {}", name.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use widget::ConfigStore;

    #[test]
    fn preset_merges_over_defaults() {
        let mut store = ConfigStore::default();
        store.update(&tocantins_preset()).expect("preset");
        let config = store.get();
        assert!(config.labels.enabled);
        assert_eq!(config.labels.font_size, 5.0);
        assert_eq!(config.labels.stroke_width, 0.2);
        assert_eq!(config.colors.selected, "#e2af05ff");
        assert_eq!(config.colors.default_fill, "#69b3a2");
        assert_eq!(config.labels.min_zoom_level, 2.0);
    }

    #[test]
    fn tooltip_escapes_name() {
        assert_eq!(preset_tooltip(Some("A&B")), "<strong>🏛️ A&amp;B</strong>");
        assert_eq!(preset_click_message(Some("Palmas")), "Você clicou em Palmas");
    }
}
