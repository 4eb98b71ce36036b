use formats::{Feature, FeatureCollection};
use foundation::ids::RegionId;
use runtime::PointerEvent;
use scene::RegionSet;

pub type ClickHandler = Box<dyn FnMut(&Feature, &PointerEvent, RegionId, bool)>;
pub type HoverHandler = Box<dyn FnMut(&Feature, &PointerEvent, RegionId)>;
pub type MapLoadHandler = Box<dyn FnMut(&FeatureCollection, &RegionSet)>;
pub type SelectionClearedHandler = Box<dyn FnMut()>;
pub type TooltipBuilder = Box<dyn Fn(&Feature) -> String>;

/// Optional user handlers. Each slot is registered and cleared explicitly.
#[derive(Default)]
pub struct Callbacks {
    region_click: Option<ClickHandler>,
    region_hover: Option<HoverHandler>,
    map_load: Option<MapLoadHandler>,
    selection_cleared: Option<SelectionClearedHandler>,
    tooltip_builder: Option<TooltipBuilder>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("region_click", &self.region_click.is_some())
            .field("region_hover", &self.region_hover.is_some())
            .field("map_load", &self.map_load.is_some())
            .field("selection_cleared", &self.selection_cleared.is_some())
            .field("tooltip_builder", &self.tooltip_builder.is_some())
            .finish()
    }
}

impl Callbacks {
    pub fn set_region_click(&mut self, f: impl FnMut(&Feature, &PointerEvent, RegionId, bool) + 'static) {
        self.region_click = Some(Box::new(f));
    }

    pub fn clear_region_click(&mut self) {
        self.region_click = None;
    }

    pub fn set_region_hover(&mut self, f: impl FnMut(&Feature, &PointerEvent, RegionId) + 'static) {
        self.region_hover = Some(Box::new(f));
    }

    pub fn clear_region_hover(&mut self) {
        self.region_hover = None;
    }

    pub fn set_map_load(&mut self, f: impl FnMut(&FeatureCollection, &RegionSet) + 'static) {
        self.map_load = Some(Box::new(f));
    }

    pub fn clear_map_load(&mut self) {
        self.map_load = None;
    }

    pub fn set_selection_cleared(&mut self, f: impl FnMut() + 'static) {
        self.selection_cleared = Some(Box::new(f));
    }

    pub fn clear_selection_cleared(&mut self) {
        self.selection_cleared = None;
    }

    pub fn set_tooltip_builder(&mut self, f: impl Fn(&Feature) -> String + 'static) {
        self.tooltip_builder = Some(Box::new(f));
    }

    pub fn clear_tooltip_builder(&mut self) {
        self.tooltip_builder = None;
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn region_click(&mut self, feature: &Feature, event: &PointerEvent, id: RegionId, selected: bool) {
        if let Some(f) = self.region_click.as_mut() {
            f(feature, event, id, selected);
        }
    }

    pub(crate) fn region_hover(&mut self, feature: &Feature, event: &PointerEvent, id: RegionId) {
        if let Some(f) = self.region_hover.as_mut() {
            f(feature, event, id);
        }
    }

    pub(crate) fn map_load(&mut self, dataset: &FeatureCollection, regions: &RegionSet) {
        if let Some(f) = self.map_load.as_mut() {
            f(dataset, regions);
        }
    }

    pub(crate) fn selection_cleared(&mut self) {
        if let Some(f) = self.selection_cleared.as_mut() {
            f();
        }
    }

    pub(crate) fn tooltip_builder(&self) -> Option<&TooltipBuilder> {
        self.tooltip_builder.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn cleared_handlers_are_not_invoked() {
        let hits = Rc::new(Cell::new(0));
        let mut callbacks = Callbacks::default();
        let h = hits.clone();
        callbacks.set_selection_cleared(move || h.set(h.get() + 1));

        callbacks.selection_cleared();
        callbacks.clear_selection_cleared();
        callbacks.selection_cleared();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn clear_all_drops_every_slot() {
        let mut callbacks = Callbacks::default();
        callbacks.set_tooltip_builder(|_| "x".to_string());
        callbacks.set_selection_cleared(|| {});
        callbacks.clear_all();
        assert!(callbacks.tooltip_builder().is_none());
        assert_eq!(
            format!("{callbacks:?}"),
            "Callbacks { region_click: false, region_hover: false, map_load: false, selection_cleared: false, tooltip_builder: false }"
        );
    }
}
