use scene::RegionState;

/// Visual attributes applied to one region element.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPaint {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    /// CSS transition duration for paint changes; `None` disables it.
    pub transition_ms: Option<u32>,
}

impl RegionPaint {
    pub fn transition_css(&self) -> String {
        match self.transition_ms {
            Some(ms) => format!("all {ms}ms ease"),
            None => "none".to_string(),
        }
    }
}

/// Fill and stroke choices per interaction state.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPalette {
    pub default_fill: String,
    pub hover_fill: String,
    pub selected_fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub hover_stroke_width: f64,
    pub selected_stroke_width: f64,
    pub transition_ms: Option<u32>,
}

impl RegionPalette {
    pub fn paint(&self, state: RegionState) -> RegionPaint {
        let (fill, stroke_width) = match state {
            RegionState::Default => (&self.default_fill, self.stroke_width),
            RegionState::Hovered => (&self.hover_fill, self.hover_stroke_width),
            RegionState::Selected => (&self.selected_fill, self.selected_stroke_width),
        };
        RegionPaint {
            fill: fill.clone(),
            stroke: self.stroke.clone(),
            stroke_width,
            transition_ms: self.transition_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> RegionPalette {
        RegionPalette {
            default_fill: "#69b3a2".into(),
            hover_fill: "#4a9b8e".into(),
            selected_fill: "#ff6b6b".into(),
            stroke: "#ffffff".into(),
            stroke_width: 1.0,
            hover_stroke_width: 2.0,
            selected_stroke_width: 3.0,
            transition_ms: Some(300),
        }
    }

    #[test]
    fn paint_follows_state() {
        let p = palette();
        assert_eq!(p.paint(RegionState::Default).fill, "#69b3a2");
        assert_eq!(p.paint(RegionState::Hovered).stroke_width, 2.0);
        let selected = p.paint(RegionState::Selected);
        assert_eq!(selected.fill, "#ff6b6b");
        assert_eq!(selected.stroke_width, 3.0);
        assert_eq!(selected.stroke, "#ffffff");
    }

    #[test]
    fn transition_css() {
        let mut p = palette();
        assert_eq!(p.paint(RegionState::Default).transition_css(), "all 300ms ease");
        p.transition_ms = None;
        assert_eq!(p.paint(RegionState::Default).transition_css(), "none");
    }
}
