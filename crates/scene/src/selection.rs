//! Single-selection helpers over `RegionSet`.
//!
//! Invariant: at most one region is `Selected` at any time. Every path that
//! marks a region selected goes through `select_exclusive`, which resets all
//! other regions first.

use foundation::ids::RegionId;

use crate::region::RegionState;
use crate::regions::RegionSet;

impl RegionSet {
    pub fn selected(&self) -> Option<RegionId> {
        self.iter()
            .find(|(region, _)| region.is_selected())
            .map(|(region, _)| region.id())
    }

    /// Resets every region to `Default`, returning the previously selected one.
    ///
    /// Click timestamps are kept.
    pub fn reset_states(&mut self) -> Option<RegionId> {
        let mut previous = None;
        for region in self.regions_mut() {
            if region.is_selected() {
                previous = Some(region.id());
            }
            region.record.state = RegionState::Default;
        }
        previous
    }

    /// Clears every region's state, then marks `id` selected.
    ///
    /// Returns `false` (and leaves the set untouched) when `id` is unknown.
    pub fn select_exclusive(&mut self, id: RegionId) -> bool {
        if self.region(id).is_none() {
            return false;
        }
        self.reset_states();
        if let Some(region) = self.region_mut(id) {
            region.record.state = RegionState::Selected;
        }
        true
    }

    /// Sets `Hovered` / `Default` on a region that is not selected.
    ///
    /// Returns `true` if the state changed.
    pub fn set_hovered(&mut self, id: RegionId, hovered: bool) -> bool {
        let Some(region) = self.region_mut(id) else {
            return false;
        };
        if region.is_selected() {
            return false;
        }
        let next = if hovered {
            RegionState::Hovered
        } else {
            RegionState::Default
        };
        let changed = region.record.state != next;
        region.record.state = next;
        changed
    }

    pub fn selected_count(&self) -> usize {
        self.iter().filter(|(region, _)| region.is_selected()).count()
    }
}

#[cfg(test)]
mod tests {
    use crate::region::RegionState;
    use crate::regions::RegionSet;
    use formats::{Feature, FeatureCollection, Geometry};
    use foundation::ids::RegionId;
    use proptest::prelude::*;

    fn set_of(n: usize) -> RegionSet {
        let features = (0..n)
            .map(|i| {
                let mut properties = serde_json::Map::new();
                properties.insert("name".into(), format!("Region {i}").into());
                Feature {
                    id: None,
                    properties,
                    geometry: Geometry::Empty,
                }
            })
            .collect();
        RegionSet::from_collection(FeatureCollection { features })
    }

    #[test]
    fn select_exclusive_moves_selection() {
        let mut set = set_of(3);
        assert!(set.select_exclusive(RegionId::new(0)));
        assert!(set.select_exclusive(RegionId::new(2)));
        assert_eq!(set.selected(), Some(RegionId::new(2)));
        assert_eq!(set.selected_count(), 1);
        assert!(!set.select_exclusive(RegionId::new(7)));
        assert_eq!(set.selected(), Some(RegionId::new(2)));
    }

    #[test]
    fn hover_never_overrides_selection() {
        let mut set = set_of(2);
        set.select_exclusive(RegionId::new(1));
        assert!(!set.set_hovered(RegionId::new(1), true));
        assert_eq!(
            set.region(RegionId::new(1)).map(|r| r.state()),
            Some(RegionState::Selected)
        );
        assert!(set.set_hovered(RegionId::new(0), true));
        assert!(set.set_hovered(RegionId::new(0), false));
    }

    #[test]
    fn reset_reports_previous_selection() {
        let mut set = set_of(2);
        set.select_exclusive(RegionId::new(1));
        assert_eq!(set.reset_states(), Some(RegionId::new(1)));
        assert_eq!(set.selected(), None);
        assert_eq!(set.reset_states(), None);
    }

    proptest! {
        #[test]
        fn at_most_one_selected(ops in proptest::collection::vec((0u32..6, any::<bool>()), 0..64)) {
            let mut set = set_of(5);
            for (idx, reset) in ops {
                if reset {
                    set.reset_states();
                } else {
                    set.select_exclusive(RegionId::new(idx));
                }
                prop_assert!(set.selected_count() <= 1);
            }
        }
    }
}
