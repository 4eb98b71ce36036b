use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use formats::{Feature, FeatureCollection, FeatureCollectionError};
use foundation::ids::RegionId;
use foundation::math::Mercator;
use layers::LayerKind;
use layers::labels::{Label, LabelsLayer};
use layers::vector::{RegionLayer, RegionShape};
use runtime::{ClickTarget, EventBus, EventKind, MapEvent, PointerEvent};
use scene::{RegionSet, ZoomTransform};

use crate::callbacks::Callbacks;
use crate::config::{ConfigError, ConfigStore, MapConfig, ZoomOptions};
use crate::interaction::{ClickOutcome, resolve_click};
use crate::loader::{DatasetFetcher, ErrorPanel, FetchError, LoadError};
use crate::surface::Surface;
use crate::tooltip::{Tooltip, default_content};
use crate::viewport::Viewport;

const REGION_LAYER_ID: u64 = 1;
const LABEL_LAYER_ID: u64 = 2;

/// Controllers that receive events from the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Subscriber {
    Interaction,
    Viewport,
}

impl Subscriber {
    pub fn kinds(self) -> &'static [EventKind] {
        match self {
            Subscriber::Interaction => &[
                EventKind::PointerEnter,
                EventKind::PointerLeave,
                EventKind::PointerMove,
                EventKind::Click,
                EventKind::Key,
            ],
            Subscriber::Viewport => &[
                EventKind::Wheel,
                EventKind::Drag,
                EventKind::TransformChanged,
                EventKind::Resize,
            ],
        }
    }
}

/// Owns every piece of map state and drives a rendering `Surface`.
pub struct MapContext<S: Surface> {
    surface: S,
    config: ConfigStore,
    callbacks: Callbacks,
    regions: RegionSet,
    loaded: bool,
    projection: Mercator,
    region_layer: RegionLayer,
    shapes: Vec<RegionShape>,
    labels: Vec<Label>,
    viewport: Viewport,
    tooltip: Tooltip,
    bus: EventBus<Subscriber>,
}

impl<S: Surface> MapContext<S> {
    pub fn new(surface: S, width: f64, height: f64) -> Self {
        Self::with_config(surface, MapConfig::default(), width, height)
    }

    pub fn with_config(mut surface: S, config: MapConfig, width: f64, height: f64) -> Self {
        surface.set_size(width, height);
        surface.set_background(&config.colors.background);
        let viewport = Viewport::new(config.zoom.min, config.zoom.max, width, height);

        let mut bus = EventBus::new();
        for subscriber in [Subscriber::Interaction, Subscriber::Viewport] {
            for kind in subscriber.kinds() {
                bus.subscribe(*kind, subscriber);
            }
        }

        Self {
            surface,
            config: ConfigStore::new(config),
            callbacks: Callbacks::default(),
            regions: RegionSet::new(),
            loaded: false,
            projection: Mercator::default(),
            region_layer: RegionLayer::new(REGION_LAYER_ID),
            shapes: Vec::new(),
            labels: Vec::new(),
            viewport,
            tooltip: Tooltip::default(),
            bus,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn config(&self) -> &MapConfig {
        self.config.get()
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn projection(&self) -> &Mercator {
        &self.projection
    }

    pub fn shapes(&self) -> &[RegionShape] {
        &self.shapes
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn transform(&self) -> ZoomTransform {
        self.viewport.transform()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn bus(&self) -> &EventBus<Subscriber> {
        &self.bus
    }

    // ---- configuration ----

    /// Deep-merges `patch` and repaints. A rejected patch leaves everything
    /// as it was.
    pub fn update_config(&mut self, patch: &Value) -> Result<(), ConfigError> {
        let previous_zoom = self.config.get().zoom.clone();
        if let Err(err) = self.config.update(patch) {
            warn!(%err, "rejected config update");
            return Err(err);
        }
        self.after_config_change(&previous_zoom);
        Ok(())
    }

    pub fn set_colors(&mut self, colors: Value) -> Result<(), ConfigError> {
        self.update_config(&json!({ "colors": colors }))
    }

    pub fn set_stroke(&mut self, stroke: Value) -> Result<(), ConfigError> {
        self.update_config(&json!({ "stroke": stroke }))
    }

    pub fn set_zoom(&mut self, zoom: Value) -> Result<(), ConfigError> {
        self.update_config(&json!({ "zoom": zoom }))
    }

    pub fn set_tooltip(&mut self, tooltip: Value) -> Result<(), ConfigError> {
        self.update_config(&json!({ "tooltip": tooltip }))
    }

    pub fn set_labels(&mut self, labels: Value) -> Result<(), ConfigError> {
        self.update_config(&json!({ "labels": labels }))
    }

    /// Restores default options and drops every registered handler.
    pub fn reset_config(&mut self) {
        let previous_zoom = self.config.get().zoom.clone();
        self.config.reset();
        self.callbacks.clear_all();
        self.after_config_change(&previous_zoom);
    }

    fn after_config_change(&mut self, previous_zoom: &ZoomOptions) {
        let zoom = &self.config.get().zoom;
        if zoom.min != previous_zoom.min || zoom.max != previous_zoom.max {
            let (min, max) = (zoom.min, zoom.max);
            debug!(min, max, "rebuilding zoom behaviour");
            if self.viewport.rebuild(min, max) {
                self.apply_transform(None);
            }
        }
        self.surface
            .set_background(&self.config.get().colors.background);
        if self.loaded {
            self.repaint_all();
            self.rebuild_labels();
        }
    }

    // ---- handlers ----

    pub fn on_region_click(&mut self, f: impl FnMut(&Feature, &PointerEvent, RegionId, bool) + 'static) {
        self.callbacks.set_region_click(f);
    }

    pub fn clear_region_click(&mut self) {
        self.callbacks.clear_region_click();
    }

    pub fn on_region_hover(&mut self, f: impl FnMut(&Feature, &PointerEvent, RegionId) + 'static) {
        self.callbacks.set_region_hover(f);
    }

    pub fn clear_region_hover(&mut self) {
        self.callbacks.clear_region_hover();
    }

    pub fn on_map_load(&mut self, f: impl FnMut(&FeatureCollection, &RegionSet) + 'static) {
        self.callbacks.set_map_load(f);
    }

    pub fn clear_map_load(&mut self) {
        self.callbacks.clear_map_load();
    }

    pub fn on_selection_cleared(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.set_selection_cleared(f);
    }

    pub fn clear_selection_cleared(&mut self) {
        self.callbacks.clear_selection_cleared();
    }

    pub fn set_tooltip_builder(&mut self, f: impl Fn(&Feature) -> String + 'static) {
        self.callbacks.set_tooltip_builder(f);
    }

    pub fn clear_tooltip_builder(&mut self) {
        self.callbacks.clear_tooltip_builder();
    }

    // ---- selection queries ----

    pub fn find_by_name(&self, needle: &str) -> Option<&Feature> {
        self.regions
            .find_by_name(needle)
            .and_then(|id| self.regions.feature(id))
    }

    pub fn find_all_by_name(&self, needle: &str) -> Vec<&Feature> {
        self.regions
            .find_all_by_name(needle)
            .filter_map(|id| self.regions.feature(id))
            .collect()
    }

    pub fn selected(&self) -> Option<&Feature> {
        self.regions
            .selected()
            .and_then(|id| self.regions.feature(id))
    }

    pub fn is_selected(&self, needle: &str) -> bool {
        self.regions
            .find_by_name(needle)
            .and_then(|id| self.regions.region(id))
            .is_some_and(|region| region.is_selected())
    }

    /// Selects the first region whose name contains `needle`.
    pub fn select_by_name(&mut self, needle: &str) -> Option<&Feature> {
        if !self.config.get().selection.enabled {
            return None;
        }
        let id = self.regions.find_by_name(needle)?;
        self.clear_selection();
        self.regions.select_exclusive(id);
        self.paint_region(id);
        debug!(%id, needle, "region selected by name");
        self.regions.feature(id)
    }

    /// Strips the selection from every region and notifies
    /// `on_selection_cleared`. No-op before a dataset is loaded.
    pub fn clear_selection(&mut self) {
        if !self.loaded {
            return;
        }
        self.regions.reset_states();
        self.repaint_all();
        self.callbacks.selection_cleared();
    }

    // ---- viewport ----

    pub fn scale_to(&mut self, k: f64) -> ZoomTransform {
        let transform = self.viewport.scale_to(k);
        self.apply_transform(self.config.get().zoom_transition_ms());
        transform
    }

    pub fn reset_zoom(&mut self) -> ZoomTransform {
        let transform = self.viewport.reset();
        self.apply_transform(self.config.get().zoom_transition_ms());
        transform
    }

    /// Updates the viewport size; a loaded map is re-fit and redrawn in
    /// place without reloading.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
        self.surface.set_size(width, height);
        if !self.loaded {
            return;
        }
        self.fit_projection();
        self.shapes = self.region_layer.extract(&self.regions, &self.projection);
        self.surface.reshape_regions(&self.shapes);
        self.rebuild_labels();
        debug!(width, height, "map resized");
    }

    fn apply_transform(&mut self, transition_ms: Option<u32>) {
        let transform = self.viewport.transform();
        for layer in LayerKind::ALL {
            self.surface.apply_transform(layer, transform, transition_ms);
        }
        self.update_label_visibility();
        debug!(x = transform.x, y = transform.y, k = transform.k, "transform changed");
    }

    // ---- loading ----

    pub async fn load<F: DatasetFetcher>(&mut self, fetcher: &F, uri: &str) -> Result<&RegionSet, LoadError> {
        let fetched = fetcher.fetch(uri).await;
        self.complete_load(uri, fetched)
    }

    /// Finishes a load whose fetch was performed by the host.
    pub fn complete_load(
        &mut self,
        uri: &str,
        fetched: Result<String, FetchError>,
    ) -> Result<&RegionSet, LoadError> {
        let parsed = fetched
            .map_err(|source| LoadError::Fetch {
                uri: uri.to_string(),
                source,
            })
            .and_then(|text| {
                FeatureCollection::from_geojson_str(&text).map_err(|source: FeatureCollectionError| {
                    LoadError::Parse {
                        uri: uri.to_string(),
                        source,
                    }
                })
            });

        match parsed {
            Ok(collection) => {
                self.install(collection);
                info!(uri, regions = self.regions.len(), "map data loaded");
                Ok(&self.regions)
            }
            Err(err) => {
                error!(%err, "failed to load map data");
                self.loaded = false;
                self.regions = RegionSet::new();
                self.shapes.clear();
                self.labels.clear();
                self.surface.show_error(&ErrorPanel::for_dataset(uri));
                Err(err)
            }
        }
    }

    fn install(&mut self, collection: FeatureCollection) {
        self.regions = RegionSet::from_collection(collection);
        self.loaded = true;
        self.fit_projection();
        self.shapes = self.region_layer.extract(&self.regions, &self.projection);
        self.surface.draw_regions(&self.shapes);
        self.repaint_all();
        self.rebuild_labels();
        self.callbacks
            .map_load(self.regions.collection(), &self.regions);
    }

    fn fit_projection(&mut self) {
        let bounds = self
            .regions
            .collection()
            .projected_bounds(|p| Mercator::raw(p.lon_deg, p.lat_deg));
        let (width, height) = self.viewport.size();
        self.projection = Mercator::fit_size(width, height, bounds);
    }

    // ---- painting ----

    fn repaint_all(&mut self) {
        let palette = self.config.get().palette();
        for (region, _) in self.regions.iter() {
            self.surface
                .style_region(region.id(), &palette.paint(region.state()));
        }
    }

    fn paint_region(&mut self, id: RegionId) {
        if let Some(region) = self.regions.region(id) {
            let paint = self.config.get().palette().paint(region.state());
            self.surface.style_region(id, &paint);
        }
    }

    fn rebuild_labels(&mut self) {
        if !self.loaded {
            return;
        }
        let config = self.config.get();
        let layer = LabelsLayer::new(LABEL_LAYER_ID, config.labels_config());
        let style = config.label_style();
        if !config.labels.enabled {
            self.labels.clear();
            self.surface.draw_labels(&[], &style);
            return;
        }
        self.labels = layer.build(&self.regions, &self.shapes);
        self.surface.draw_labels(&self.labels, &style);
        self.surface
            .set_labels_visibility(layer.visibility(self.viewport.transform().k));
    }

    fn update_label_visibility(&mut self) {
        let config = self.config.get();
        if !self.loaded || !config.labels.enabled {
            return;
        }
        let layer = LabelsLayer::new(LABEL_LAYER_ID, config.labels_config());
        self.surface
            .set_labels_visibility(layer.visibility(self.viewport.transform().k));
    }

    // ---- events ----

    /// Routes an event to every controller subscribed to its kind.
    pub fn dispatch(&mut self, event: MapEvent) {
        let kind = event.kind();
        let subscribers = self.bus.subscribers(kind);
        if subscribers.is_empty() {
            return;
        }
        self.bus.emit(kind, format!("{event:?}"));
        for subscriber in subscribers {
            match subscriber {
                Subscriber::Interaction => self.handle_interaction(&event),
                Subscriber::Viewport => self.handle_viewport(&event),
            }
        }
    }

    fn handle_interaction(&mut self, event: &MapEvent) {
        match event {
            MapEvent::PointerEnter { region, pointer } => self.pointer_enter(*region, pointer),
            MapEvent::PointerLeave { region, .. } => self.pointer_leave(*region),
            MapEvent::PointerMove { pointer, .. } => {
                let tooltip = &self.config.get().tooltip;
                if tooltip.enabled {
                    self.tooltip
                        .reposition(&mut self.surface, pointer.position, tooltip.offset);
                }
            }
            MapEvent::Click {
                target: ClickTarget::Region(id),
                pointer,
            } => self.region_click(*id, pointer),
            MapEvent::Click {
                target: ClickTarget::Background,
                ..
            } => {
                if self.config.get().selection.clear_on_background_click {
                    self.clear_selection();
                }
            }
            MapEvent::Key { key } => {
                if key == "Escape" && self.config.get().selection.clear_on_esc_key {
                    self.clear_selection();
                }
            }
            _ => {}
        }
    }

    fn handle_viewport(&mut self, event: &MapEvent) {
        match event {
            MapEvent::Wheel { delta_y, anchor } => {
                self.viewport.wheel(*delta_y, *anchor);
                self.apply_transform(None);
            }
            MapEvent::Drag { delta } => {
                self.viewport.drag(*delta);
                self.apply_transform(None);
            }
            MapEvent::TransformChanged { transform } => {
                self.viewport.set_transform(*transform);
                self.apply_transform(None);
            }
            MapEvent::Resize { width, height } => self.resize(*width, *height),
            _ => {}
        }
    }

    fn pointer_enter(&mut self, id: RegionId, pointer: &PointerEvent) {
        if self.regions.region(id).is_none() {
            return;
        }
        if self.regions.set_hovered(id, true) {
            self.paint_region(id);
        }
        let Some(feature) = self.regions.feature(id) else {
            return;
        };
        let tooltip = &self.config.get().tooltip;
        if tooltip.enabled {
            let content = match self.callbacks.tooltip_builder() {
                Some(build) => build(feature),
                None => default_content(feature),
            };
            self.tooltip
                .show(&mut self.surface, &content, pointer.position, tooltip.offset);
        }
        self.callbacks.region_hover(feature, pointer, id);
    }

    fn pointer_leave(&mut self, id: RegionId) {
        if self.regions.set_hovered(id, false) {
            self.paint_region(id);
        }
        if self.config.get().tooltip.enabled {
            self.tooltip.hide(&mut self.surface);
        }
    }

    fn region_click(&mut self, id: RegionId, pointer: &PointerEvent) {
        let options = self.config.get().selection.clone();
        match resolve_click(&mut self.regions, &options, id, pointer.timestamp) {
            ClickOutcome::Ignored => {}
            ClickOutcome::Cleared => {
                self.repaint_all();
                self.callbacks.selection_cleared();
            }
            ClickOutcome::Toggled { selected } => {
                self.repaint_all();
                if let Some(feature) = self.regions.feature(id) {
                    self.callbacks.region_click(feature, pointer, id, selected);
                }
            }
        }
    }
}
