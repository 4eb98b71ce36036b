use foundation::ids::RegionId;
use foundation::time::Timestamp;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub enum RegionState {
    #[default]
    Default,
    Hovered,
    Selected,
}

/// Per-region interaction bookkeeping.
///
/// `last_click` is only consulted in clear-on-double-click mode.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct InteractionRecord {
    pub state: RegionState,
    pub last_click: Option<Timestamp>,
}

impl InteractionRecord {
    pub fn is_selected(&self) -> bool {
        self.state == RegionState::Selected
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: RegionId,
    pub record: InteractionRecord,
}

impl Region {
    pub fn new(id: RegionId) -> Self {
        Self {
            id,
            record: InteractionRecord::default(),
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn state(&self) -> RegionState {
        self.record.state
    }

    pub fn is_selected(&self) -> bool {
        self.record.is_selected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_region_starts_default_without_click() {
        let r = Region::new(RegionId::new(3));
        assert_eq!(r.id().index(), 3);
        assert_eq!(r.state(), RegionState::Default);
        assert!(r.record.last_click.is_none());
        assert!(!r.is_selected());
    }
}
