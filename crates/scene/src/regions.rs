use formats::{Feature, FeatureCollection};
use foundation::ids::RegionId;

use crate::region::Region;

/// The rendered region collection: the loaded features plus one `Region`
/// per feature, indexed by `RegionId`.
///
/// Ordering contract:
/// - `RegionId(i)` is bound to `collection().features[i]`.
/// - Name queries return matches in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionSet {
    collection: FeatureCollection,
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collection(collection: FeatureCollection) -> Self {
        let regions = (0..collection.features.len())
            .map(|i| Region::new(RegionId::new(i as u32)))
            .collect();
        Self {
            collection,
            regions,
        }
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.iter().map(Region::id)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index() as usize)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.index() as usize)
    }

    pub fn feature(&self, id: RegionId) -> Option<&Feature> {
        self.collection.features.get(id.index() as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Region, &Feature)> {
        self.regions.iter().zip(self.collection.features.iter())
    }

    pub(crate) fn regions_mut(&mut self) -> impl Iterator<Item = &mut Region> {
        self.regions.iter_mut()
    }

    /// First region (lowest id) whose name contains `needle`, ignoring case.
    pub fn find_by_name(&self, needle: &str) -> Option<RegionId> {
        self.find_all_by_name(needle).next()
    }

    pub fn find_all_by_name<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = RegionId> + 'a {
        self.iter()
            .filter(move |(_, feature)| feature.name_contains(needle))
            .map(|(region, _)| region.id())
    }
}
