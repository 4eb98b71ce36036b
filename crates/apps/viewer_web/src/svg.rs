use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, MouseEvent};

use foundation::ids::RegionId;
use foundation::math::Vec2;
use layers::LayerKind;
use layers::labels::{Label, LabelStyle, LabelVisibility};
use layers::symbology::RegionPaint;
use layers::vector::RegionShape;
use runtime::{ClickTarget, MapEvent, PointerEvent};
use scene::ZoomTransform;
use widget::tooltip::escape_html;
use widget::{ErrorPanel, Surface};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Callback the surface uses to hand DOM input back to the map.
pub type EventSink = fn(MapEvent);

/// Browser SVG DOM backend.
pub struct SvgSurface {
    document: Document,
    container: Element,
    svg: Element,
    regions_group: Element,
    labels_group: Element,
    tooltip: HtmlElement,
    tooltip_opacity: f64,
    tooltip_at: Vec2,
    paths: Vec<Element>,
    labels: Vec<Element>,
    label_css: String,
    region_listeners: Vec<EventListener>,
    sink: EventSink,
    /// The error panel replaced the svg in the container.
    detached: bool,
}

impl SvgSurface {
    /// Builds the svg, both layer groups and the tooltip inside `container`.
    pub fn mount(document: Document, container: Element, sink: EventSink) -> Result<Self, wasm_bindgen::JsValue> {
        let svg = document.create_element_ns(Some(SVG_NS), "svg")?;
        svg.set_attribute("id", "map")?;
        let regions_group = document.create_element_ns(Some(SVG_NS), "g")?;
        regions_group.set_attribute("class", "map-group")?;
        let labels_group = document.create_element_ns(Some(SVG_NS), "g")?;
        labels_group.set_attribute("class", "labels-group")?;
        svg.append_child(&regions_group)?;
        svg.append_child(&labels_group)?;
        container.append_child(&svg)?;

        let tooltip: HtmlElement = document.create_element("div")?.dyn_into()?;
        tooltip.set_class_name("tooltip");
        if let Some(body) = document.body() {
            body.append_child(&tooltip)?;
        }

        let surface = Self {
            document,
            container,
            svg,
            regions_group,
            labels_group,
            tooltip,
            tooltip_opacity: 0.0,
            tooltip_at: Vec2::ZERO,
            paths: Vec::new(),
            labels: Vec::new(),
            label_css: String::new(),
            region_listeners: Vec::new(),
            sink,
            detached: false,
        };
        surface.restyle_tooltip();
        Ok(surface)
    }

    pub fn svg(&self) -> &Element {
        &self.svg
    }

    fn restyle_tooltip(&self) {
        let css = format!(
            "position: absolute; pointer-events: none; opacity: {}; left: {}px; top: {}px;",
            self.tooltip_opacity, self.tooltip_at.x, self.tooltip_at.y
        );
        let _ = self.tooltip.set_attribute("style", &css);
    }

    fn create(&self, tag: &str) -> Option<Element> {
        self.document.create_element_ns(Some(SVG_NS), tag).ok()
    }

    fn listen_region(&mut self, path: &Element, id: RegionId) {
        let sink = self.sink;
        let on = |name: &'static str, make: fn(RegionId, PointerEvent) -> MapEvent| {
            EventListener::new(path, name, move |event: &Event| {
                if let Some(pointer) = pointer_of(event) {
                    sink(make(id, pointer));
                }
            })
        };
        self.region_listeners.push(on("mouseover", |region, pointer| MapEvent::PointerEnter { region, pointer }));
        self.region_listeners.push(on("mouseout", |region, pointer| MapEvent::PointerLeave { region, pointer }));
        self.region_listeners.push(on("mousemove", |region, pointer| MapEvent::PointerMove {
            region: Some(region),
            pointer,
        }));
        self.region_listeners.push(on("click", |region, pointer| MapEvent::Click {
            target: ClickTarget::Region(region),
            pointer,
        }));
    }
}

/// `client` relative to the element whose client rect starts at `origin`.
pub fn local_point(client: Vec2, origin: Vec2) -> Vec2 {
    client - origin
}

/// Page coordinates and event time of a mouse event.
pub fn pointer_of(event: &Event) -> Option<PointerEvent> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(PointerEvent::new(
        f64::from(mouse.page_x()),
        f64::from(mouse.page_y()),
        event.time_stamp(),
    ))
}

fn layer_transform_css(transform: ZoomTransform, transition_ms: Option<u32>) -> String {
    let transition = match transition_ms {
        Some(ms) => format!("transform {ms}ms ease"),
        None => "none".to_string(),
    };
    format!(
        "transform-origin: 0 0; transform: translate({}px, {}px) scale({}); transition: {transition};",
        transform.x, transform.y, transform.k
    )
}

impl Surface for SvgSurface {
    fn set_size(&mut self, width: f64, height: f64) {
        let _ = self.svg.set_attribute("width", &width.to_string());
        let _ = self.svg.set_attribute("height", &height.to_string());
    }

    fn set_background(&mut self, color: &str) {
        if let Some(body) = self.document.body() {
            let _ = body.style().set_property("background-color", color);
        }
    }

    fn draw_regions(&mut self, shapes: &[RegionShape]) {
        if self.detached {
            self.container.set_inner_html("");
            if self.container.append_child(&self.svg).is_ok() {
                self.detached = false;
            }
        }
        self.region_listeners.clear();
        self.paths.clear();
        self.regions_group.set_inner_html("");
        for shape in shapes {
            let Some(path) = self.create("path") else {
                continue;
            };
            let _ = path.set_attribute("class", "municipio");
            let _ = path.set_attribute("d", &shape.path);
            let _ = path.set_attribute("data-region", &shape.id.index().to_string());
            let _ = self.regions_group.append_child(&path);
            self.listen_region(&path, shape.id);
            self.paths.push(path);
        }
    }

    fn reshape_regions(&mut self, shapes: &[RegionShape]) {
        for shape in shapes {
            if let Some(path) = self.paths.get(shape.id.index() as usize) {
                let _ = path.set_attribute("d", &shape.path);
            }
        }
    }

    fn style_region(&mut self, id: RegionId, paint: &RegionPaint) {
        let Some(path) = self.paths.get(id.index() as usize) else {
            return;
        };
        let css = format!(
            "fill: {}; stroke: {}; stroke-width: {}px; cursor: pointer; transition: {};",
            paint.fill,
            paint.stroke,
            paint.stroke_width,
            paint.transition_css()
        );
        let _ = path.set_attribute("style", &css);
    }

    fn draw_labels(&mut self, labels: &[Label], style: &LabelStyle) {
        self.labels.clear();
        self.labels_group.set_inner_html("");
        self.label_css = format!(
            "font-size: {}px; font-family: {}; font-weight: {}; fill: {}; stroke: {}; stroke-width: {}px; \
             text-anchor: middle; dominant-baseline: central; pointer-events: none; user-select: none;",
            style.font_size_px,
            style.font_family,
            style.font_weight,
            style.color,
            style.stroke_color,
            style.stroke_width_px
        );
        for label in labels {
            let Some(text) = self.create("text") else {
                continue;
            };
            let _ = text.set_attribute("class", "municipio-label");
            let _ = text.set_attribute("x", &label.position.x.to_string());
            let _ = text.set_attribute("y", &label.position.y.to_string());
            let _ = text.set_attribute("style", &self.label_css);
            text.set_text_content(Some(&label.text));
            let _ = self.labels_group.append_child(&text);
            self.labels.push(text);
        }
    }

    fn set_labels_visibility(&mut self, visibility: LabelVisibility) {
        let css = format!(
            "{} opacity: {}; display: {};",
            self.label_css,
            visibility.opacity(),
            visibility.display()
        );
        for text in &self.labels {
            let _ = text.set_attribute("style", &css);
        }
    }

    fn apply_transform(&mut self, layer: LayerKind, transform: ZoomTransform, transition_ms: Option<u32>) {
        let group = match layer {
            LayerKind::Regions => &self.regions_group,
            LayerKind::Labels => &self.labels_group,
        };
        let _ = group.set_attribute("style", &layer_transform_css(transform, transition_ms));
    }

    fn show_tooltip(&mut self, content: &str, at: Vec2) {
        self.tooltip.set_inner_html(content);
        self.tooltip_opacity = 1.0;
        self.tooltip_at = at;
        self.restyle_tooltip();
    }

    fn move_tooltip(&mut self, at: Vec2) {
        self.tooltip_at = at;
        self.restyle_tooltip();
    }

    fn hide_tooltip(&mut self) {
        self.tooltip_opacity = 0.0;
        self.restyle_tooltip();
    }

    fn show_error(&mut self, panel: &ErrorPanel) {
        self.region_listeners.clear();
        self.paths.clear();
        self.labels.clear();
        let markup = format!(
            r#"<div style="display: flex; align-items: center; justify-content: center; height: 100vh; text-align: center; padding: 20px;">
    <div>
        <h3 style="color: #e74c3c; margin-bottom: 10px;">{}</h3>
        <p style="color: #666;">{}</p>
        <button onclick="location.reload()" style="margin-top: 15px; padding: 10px 20px; background: #667eea; color: white; border: none; border-radius: 5px; cursor: pointer;">{}</button>
    </div>
</div>"#,
            escape_html(&panel.title),
            escape_html(&panel.message),
            escape_html(&panel.retry_label)
        );
        self.container.set_inner_html(&markup);
        self.detached = true;
    }
}
