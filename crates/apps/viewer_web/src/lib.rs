use std::cell::{Cell, RefCell};

use console_error_panic_hook::set_once;
use gloo_events::{EventListener, EventListenerOptions};
use gloo_net::http::Request;
use js_sys::{Array, Function, JSON};
use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent, WheelEvent, Window};

use formats::Feature;
use foundation::math::Vec2;
use runtime::{ClickTarget, MapEvent, PointerEvent};
use widget::{DEFAULT_DATASET_URI, FetchError, MapContext};

mod deferred;
mod preset;
mod svg;

pub use svg::SvgSurface;

#[derive(Debug, Copy, Clone)]
struct DragState {
    last: Vec2,
    moved: bool,
}

thread_local! {
    static MAP: RefCell<Option<MapContext<SvgSurface>>> = const { RefCell::new(None) };
    static PAGE_LISTENERS: RefCell<Vec<EventListener>> = const { RefCell::new(Vec::new()) };
    static DRAG: Cell<Option<DragState>> = const { Cell::new(None) };
    static SUPPRESS_CLICK: Cell<bool> = const { Cell::new(false) };
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Runs `f` against the map, then runs the page callbacks it queued.
/// Fails instead of panicking when the map is missing or already borrowed.
fn with_map<R>(f: impl FnOnce(&mut MapContext<SvgSurface>) -> R) -> Result<R, JsValue> {
    MAP.with(|map| deferred::with_released(map, f)).map_err(JsValue::from_str)
}

/// Queues a page callback so it runs after the map borrow is released.
fn call_later(f: &Function, args: Array) {
    let f = f.clone();
    deferred::defer(move || {
        if let Err(err) = f.apply(&JsValue::NULL, &args) {
            web_sys::console::error_1(&err);
        }
    });
}

fn dispatch(event: MapEvent) {
    if matches!(event, MapEvent::Click { .. }) && SUPPRESS_CLICK.with(|s| s.replace(false)) {
        return;
    }
    if let Err(err) = with_map(|ctx| ctx.dispatch(event)) {
        web_sys::console::error_1(&err);
    }
}

fn json_of(value: &JsValue) -> Result<serde_json::Value, JsValue> {
    let text: String = JSON::stringify(value)?.into();
    serde_json::from_str(&text).map_err(js_err)
}

fn to_js(value: &serde_json::Value) -> JsValue {
    JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

fn feature_js(feature: &Feature) -> JsValue {
    to_js(&feature.to_geojson_value())
}

fn pointer_js(pointer: &PointerEvent) -> JsValue {
    to_js(&json!({
        "x": pointer.position.x,
        "y": pointer.position.y,
        "timestamp": pointer.timestamp.as_millis(),
    }))
}

fn window_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mounts the map into `#container_id`, applies the page preset and starts
/// loading the dataset.
#[wasm_bindgen(js_name = initMap)]
pub fn init_map(container_id: &str, dataset_uri: Option<String>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| js_err(format!("missing element #{container_id}")))?;

    let (width, height) = window_size(&window);
    let surface = SvgSurface::mount(document.clone(), container, dispatch)?;
    let svg = surface.svg().clone();

    let mut ctx = MapContext::new(surface, width, height);
    ctx.update_config(&preset::tocantins_preset()).map_err(js_err)?;
    ctx.set_tooltip_builder(|feature| preset::preset_tooltip(feature.name()));
    ctx.on_region_click(|feature, _, _, _| {
        let message = preset::preset_click_message(feature.name());
        deferred::defer(move || {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(&message);
            }
        });
    });

    MAP.with(|map| {
        map.try_borrow_mut()
            .map(|mut map| *map = Some(ctx))
            .map_err(|_| JsValue::from_str("map is busy"))
    })?;

    install_page_listeners(&window, &svg);
    load_dataset(dataset_uri.unwrap_or_else(|| DEFAULT_DATASET_URI.to_string()));
    Ok(())
}

fn install_page_listeners(window: &Window, svg: &Element) {
    let mut listeners = Vec::new();

    let svg_for_click = svg.clone();
    listeners.push(EventListener::new(svg, "click", move |event: &Event| {
        let on_background = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|el| el == svg_for_click);
        if !on_background {
            return;
        }
        if let Some(pointer) = svg::pointer_of(event) {
            dispatch(MapEvent::Click {
                target: ClickTarget::Background,
                pointer,
            });
        }
    }));

    let svg_for_wheel = svg.clone();
    listeners.push(EventListener::new_with_options(
        svg,
        "wheel",
        EventListenerOptions::enable_prevent_default(),
        move |event: &Event| {
            let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            event.prevent_default();
            let rect = svg_for_wheel.get_bounding_client_rect();
            let anchor = svg::local_point(
                Vec2::new(f64::from(wheel.client_x()), f64::from(wheel.client_y())),
                Vec2::new(rect.left(), rect.top()),
            );
            dispatch(MapEvent::Wheel {
                delta_y: wheel.delta_y(),
                anchor,
            });
        },
    ));

    listeners.push(EventListener::new(svg, "mousedown", move |event: &Event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        SUPPRESS_CLICK.with(|s| s.set(false));
        DRAG.with(|d| {
            d.set(Some(DragState {
                last: Vec2::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())),
                moved: false,
            }))
        });
    }));

    listeners.push(EventListener::new(window, "mousemove", move |event: &Event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let Some(mut drag) = DRAG.with(|d| d.get()) else {
            return;
        };
        let at = Vec2::new(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
        let delta = at - drag.last;
        if delta == Vec2::ZERO {
            return;
        }
        drag.last = at;
        drag.moved = true;
        DRAG.with(|d| d.set(Some(drag)));
        dispatch(MapEvent::Drag { delta });
    }));

    listeners.push(EventListener::new(window, "mouseup", move |_event: &Event| {
        if let Some(drag) = DRAG.with(|d| d.take()) {
            SUPPRESS_CLICK.with(|s| s.set(drag.moved));
        }
    }));

    listeners.push(EventListener::new(window, "keydown", move |event: &Event| {
        if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
            dispatch(MapEvent::Key { key: key.key() });
        }
    }));

    let window_for_resize = window.clone();
    listeners.push(EventListener::new(window, "resize", move |_event: &Event| {
        let (width, height) = window_size(&window_for_resize);
        dispatch(MapEvent::Resize { width, height });
    }));

    PAGE_LISTENERS.with(|page| page.borrow_mut().extend(listeners));
}

async fn fetch_text(uri: &str) -> Result<String, FetchError> {
    let resp = Request::get(uri)
        .send()
        .await
        .map_err(|e| FetchError::new(e.to_string()))?;
    if !resp.ok() {
        return Err(FetchError::new(format!(
            "HTTP {} {}",
            resp.status(),
            resp.status_text()
        )));
    }
    resp.text().await.map_err(|e| FetchError::new(e.to_string()))
}

/// Fetches `uri` and replaces the current regions with its features.
#[wasm_bindgen(js_name = loadDataset)]
pub fn load_dataset(uri: String) {
    spawn_local(async move {
        let fetched = fetch_text(&uri).await;
        let outcome = with_map(|ctx| {
            ctx.complete_load(&uri, fetched)
                .map(|regions| regions.len())
                .map_err(|e| e.to_string())
        });
        match outcome {
            Ok(Ok(count)) => {
                web_sys::console::log_1(&JsValue::from_str(&format!("loaded {count} regions from {uri}")));
            }
            Ok(Err(msg)) => web_sys::console::error_1(&JsValue::from_str(&msg)),
            Err(err) => web_sys::console::error_1(&err),
        }
    });
}

// ---- configuration ----

#[wasm_bindgen(js_name = updateConfig)]
pub fn update_config(patch: JsValue) -> Result<(), JsValue> {
    let patch = json_of(&patch)?;
    with_map(|ctx| ctx.update_config(&patch))?.map_err(js_err)
}

#[wasm_bindgen(js_name = setColors)]
pub fn set_colors(colors: JsValue) -> Result<(), JsValue> {
    let colors = json_of(&colors)?;
    with_map(|ctx| ctx.set_colors(colors))?.map_err(js_err)
}

#[wasm_bindgen(js_name = setStroke)]
pub fn set_stroke(stroke: JsValue) -> Result<(), JsValue> {
    let stroke = json_of(&stroke)?;
    with_map(|ctx| ctx.set_stroke(stroke))?.map_err(js_err)
}

#[wasm_bindgen(js_name = setZoom)]
pub fn set_zoom(zoom: JsValue) -> Result<(), JsValue> {
    let zoom = json_of(&zoom)?;
    with_map(|ctx| ctx.set_zoom(zoom))?.map_err(js_err)
}

#[wasm_bindgen(js_name = setTooltip)]
pub fn set_tooltip(tooltip: JsValue) -> Result<(), JsValue> {
    let tooltip = json_of(&tooltip)?;
    with_map(|ctx| ctx.set_tooltip(tooltip))?.map_err(js_err)
}

#[wasm_bindgen(js_name = setLabels)]
pub fn set_labels(labels: JsValue) -> Result<(), JsValue> {
    let labels = json_of(&labels)?;
    with_map(|ctx| ctx.set_labels(labels))?.map_err(js_err)
}

/// Restores defaults and drops every handler, the preset ones included.
#[wasm_bindgen(js_name = resetConfig)]
pub fn reset_config() -> Result<(), JsValue> {
    with_map(|ctx| ctx.reset_config())
}

// ---- handlers ----

#[wasm_bindgen(js_name = onMunicipioClick)]
pub fn on_region_click(f: Function) -> Result<(), JsValue> {
    with_map(|ctx| {
        ctx.on_region_click(move |feature, pointer, id, selected| {
            let args = Array::of4(
                &feature_js(feature),
                &pointer_js(pointer),
                &JsValue::from(id.index()),
                &JsValue::from_bool(selected),
            );
            call_later(&f, args);
        })
    })
}

#[wasm_bindgen(js_name = clearMunicipioClick)]
pub fn clear_region_click() -> Result<(), JsValue> {
    with_map(|ctx| ctx.clear_region_click())
}

#[wasm_bindgen(js_name = onMunicipioHover)]
pub fn on_region_hover(f: Function) -> Result<(), JsValue> {
    with_map(|ctx| {
        ctx.on_region_hover(move |feature, pointer, id| {
            let args = Array::of3(
                &feature_js(feature),
                &pointer_js(pointer),
                &JsValue::from(id.index()),
            );
            call_later(&f, args);
        })
    })
}

#[wasm_bindgen(js_name = clearMunicipioHover)]
pub fn clear_region_hover() -> Result<(), JsValue> {
    with_map(|ctx| ctx.clear_region_hover())
}

/// `f(dataset, regionCount)` after every successful load.
#[wasm_bindgen(js_name = onMapLoad)]
pub fn on_map_load(f: Function) -> Result<(), JsValue> {
    with_map(|ctx| {
        ctx.on_map_load(move |dataset, regions| {
            let args = Array::of2(
                &to_js(&dataset.to_geojson_value()),
                &JsValue::from(regions.len() as u32),
            );
            call_later(&f, args);
        })
    })
}

#[wasm_bindgen(js_name = clearMapLoad)]
pub fn clear_map_load() -> Result<(), JsValue> {
    with_map(|ctx| ctx.clear_map_load())
}

#[wasm_bindgen(js_name = onSelectionCleared)]
pub fn on_selection_cleared(f: Function) -> Result<(), JsValue> {
    with_map(|ctx| {
        ctx.on_selection_cleared(move || call_later(&f, Array::new()))
    })
}

#[wasm_bindgen(js_name = clearSelectionCleared)]
pub fn clear_selection_cleared() -> Result<(), JsValue> {
    with_map(|ctx| ctx.clear_selection_cleared())
}

#[wasm_bindgen(js_name = setTooltipBuilder)]
pub fn set_tooltip_builder(f: Function) -> Result<(), JsValue> {
    with_map(|ctx| {
        ctx.set_tooltip_builder(move |feature| match f.call1(&JsValue::NULL, &feature_js(feature)) {
            Ok(markup) => markup.as_string().unwrap_or_default(),
            Err(err) => {
                web_sys::console::error_1(&err);
                String::new()
            }
        })
    })
}

#[wasm_bindgen(js_name = clearTooltipBuilder)]
pub fn clear_tooltip_builder() -> Result<(), JsValue> {
    with_map(|ctx| ctx.clear_tooltip_builder())
}

// ---- selection ----

#[wasm_bindgen(js_name = getMunicipioByName)]
pub fn find_by_name(name: &str) -> Result<JsValue, JsValue> {
    with_map(|ctx| ctx.find_by_name(name).map_or(JsValue::NULL, feature_js))
}

#[wasm_bindgen(js_name = getMunicipiosByName)]
pub fn find_all_by_name(name: &str) -> Result<Array, JsValue> {
    with_map(|ctx| ctx.find_all_by_name(name).into_iter().map(feature_js).collect())
}

#[wasm_bindgen(js_name = selectMunicipio)]
pub fn select_by_name(name: &str) -> Result<JsValue, JsValue> {
    with_map(|ctx| ctx.select_by_name(name).map_or(JsValue::NULL, feature_js))
}

#[wasm_bindgen(js_name = clearSelection)]
pub fn clear_selection() -> Result<(), JsValue> {
    with_map(|ctx| ctx.clear_selection())
}

#[wasm_bindgen(js_name = getSelectedMunicipio)]
pub fn selected() -> Result<JsValue, JsValue> {
    with_map(|ctx| ctx.selected().map_or(JsValue::NULL, feature_js))
}

#[wasm_bindgen(js_name = isMunicipioSelected)]
pub fn is_selected(name: &str) -> Result<bool, JsValue> {
    with_map(|ctx| ctx.is_selected(name))
}

// ---- viewport ----

/// Returns the applied (clamped) scale.
#[wasm_bindgen(js_name = scaleTo)]
pub fn scale_to(k: f64) -> Result<f64, JsValue> {
    with_map(|ctx| ctx.scale_to(k).k)
}

#[wasm_bindgen(js_name = resetZoom)]
pub fn reset_zoom() -> Result<(), JsValue> {
    with_map(|ctx| {
        ctx.reset_zoom();
    })
}

#[wasm_bindgen]
pub fn resize(width: f64, height: f64) -> Result<(), JsValue> {
    with_map(|ctx| ctx.resize(width, height))
}
