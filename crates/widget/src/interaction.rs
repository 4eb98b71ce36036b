//! Click state machine over a `RegionSet`.
//!
//! `resolve_click` only mutates region records; repainting and callbacks are
//! left to the caller, driven by the returned `ClickOutcome`.

use foundation::ids::RegionId;
use foundation::time::Timestamp;
use scene::RegionSet;
use tracing::debug;

use crate::config::SelectionOptions;

/// Two clicks on the selected region closer than this clear the selection
/// when double-click clearing is enabled.
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 300.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Selection is disabled or the region is unknown.
    Ignored,
    /// The click callback should fire with `selected`.
    Toggled { selected: bool },
    /// A double click cleared the selection.
    Cleared,
}

pub fn resolve_click(
    regions: &mut RegionSet,
    options: &SelectionOptions,
    id: RegionId,
    at: Timestamp,
) -> ClickOutcome {
    if !options.enabled {
        return ClickOutcome::Ignored;
    }
    let Some(region) = regions.region_mut(id) else {
        return ClickOutcome::Ignored;
    };
    let was_selected = region.is_selected();

    if was_selected && options.clear_on_double_click {
        let within_window = region
            .record
            .last_click
            .is_some_and(|last| at.since(last) < DOUBLE_CLICK_WINDOW_MS);
        if within_window {
            region.record.last_click = None;
            regions.reset_states();
            debug!(%id, "double click cleared selection");
            return ClickOutcome::Cleared;
        }
        region.record.last_click = Some(at);
        return ClickOutcome::Toggled { selected: true };
    }

    if was_selected {
        regions.reset_states();
        debug!(%id, "region deselected");
        return ClickOutcome::Toggled { selected: false };
    }

    regions.select_exclusive(id);
    if options.clear_on_double_click {
        if let Some(region) = regions.region_mut(id) {
            region.record.last_click = Some(at);
        }
    }
    debug!(%id, "region selected");
    ClickOutcome::Toggled { selected: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use formats::{Feature, FeatureCollection, Geometry};
    use proptest::prelude::*;

    fn set_of(n: usize) -> RegionSet {
        let features = (0..n)
            .map(|_| Feature {
                id: None,
                properties: serde_json::Map::new(),
                geometry: Geometry::Empty,
            })
            .collect();
        RegionSet::from_collection(FeatureCollection { features })
    }

    fn options() -> SelectionOptions {
        MapConfig::default().selection
    }

    fn ms(v: f64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    #[test]
    fn disabled_selection_ignores_clicks() {
        let mut set = set_of(2);
        let opts = SelectionOptions { enabled: false, ..options() };
        assert_eq!(resolve_click(&mut set, &opts, RegionId(0), ms(0.0)), ClickOutcome::Ignored);
        assert_eq!(set.selected(), None);
    }

    #[test]
    fn click_toggles_and_moves_selection() {
        let mut set = set_of(3);
        let opts = options();
        assert_eq!(
            resolve_click(&mut set, &opts, RegionId(0), ms(0.0)),
            ClickOutcome::Toggled { selected: true }
        );
        assert_eq!(
            resolve_click(&mut set, &opts, RegionId(2), ms(10.0)),
            ClickOutcome::Toggled { selected: true }
        );
        assert_eq!(set.selected(), Some(RegionId(2)));
        assert_eq!(
            resolve_click(&mut set, &opts, RegionId(2), ms(20.0)),
            ClickOutcome::Toggled { selected: false }
        );
        assert_eq!(set.selected(), None);
    }

    #[test]
    fn double_click_window() {
        let opts = SelectionOptions { clear_on_double_click: true, ..options() };
        let id = RegionId(1);

        let mut set = set_of(2);
        resolve_click(&mut set, &opts, id, ms(1_000.0));
        assert_eq!(resolve_click(&mut set, &opts, id, ms(1_200.0)), ClickOutcome::Cleared);
        assert_eq!(set.selected(), None);
        assert_eq!(set.region(id).and_then(|r| r.record.last_click), None);

        let mut set = set_of(2);
        resolve_click(&mut set, &opts, id, ms(1_000.0));
        assert_eq!(
            resolve_click(&mut set, &opts, id, ms(1_400.0)),
            ClickOutcome::Toggled { selected: true }
        );
        assert_eq!(set.selected(), Some(id));
        assert_eq!(set.region(id).and_then(|r| r.record.last_click), Some(ms(1_400.0)));
    }

    proptest! {
        #[test]
        fn at_most_one_selected_for_any_click_sequence(
            clicks in proptest::collection::vec((0u32..5, 0.0f64..1_000.0, any::<bool>()), 0..40)
        ) {
            let mut set = set_of(5);
            let mut now = 0.0;
            for (idx, gap, double) in clicks {
                now += gap;
                let opts = SelectionOptions { clear_on_double_click: double, ..options() };
                resolve_click(&mut set, &opts, RegionId(idx), ms(now));
                prop_assert!(set.selected_count() <= 1);
            }
        }
    }
}
