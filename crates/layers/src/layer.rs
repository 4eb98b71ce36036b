#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

pub trait Layer {
    fn id(&self) -> LayerId;
}

/// The two transformable layers of the map; labels sit above regions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Regions,
    Labels,
}

impl LayerKind {
    pub const ALL: [LayerKind; 2] = [LayerKind::Regions, LayerKind::Labels];
}
