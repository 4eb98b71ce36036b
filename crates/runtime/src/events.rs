use foundation::ids::RegionId;
use foundation::math::Vec2;
use foundation::time::Timestamp;
use scene::ZoomTransform;

/// Pointer position (page coordinates) and event time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub position: Vec2,
    pub timestamp: Timestamp,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            timestamp: Timestamp::from_millis(timestamp_ms),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Region(RegionId),
    /// The viewport surface itself, not any region drawn on it.
    Background,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    PointerEnter,
    PointerLeave,
    PointerMove,
    Click,
    Key,
    Wheel,
    Drag,
    TransformChanged,
    Resize,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::PointerEnter => "pointer-enter",
            EventKind::PointerLeave => "pointer-leave",
            EventKind::PointerMove => "pointer-move",
            EventKind::Click => "click",
            EventKind::Key => "key",
            EventKind::Wheel => "wheel",
            EventKind::Drag => "drag",
            EventKind::TransformChanged => "transform-changed",
            EventKind::Resize => "resize",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Input delivered by the event substrate.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    PointerEnter {
        region: RegionId,
        pointer: PointerEvent,
    },
    PointerLeave {
        region: RegionId,
        pointer: PointerEvent,
    },
    PointerMove {
        region: Option<RegionId>,
        pointer: PointerEvent,
    },
    Click {
        target: ClickTarget,
        pointer: PointerEvent,
    },
    Key {
        key: String,
    },
    /// Wheel zoom; `anchor` is in viewport pixels.
    Wheel {
        delta_y: f64,
        anchor: Vec2,
    },
    /// Pan by a pointer drag delta in viewport pixels.
    Drag {
        delta: Vec2,
    },
    /// A transform computed by the substrate's own zoom handling.
    TransformChanged {
        transform: ZoomTransform,
    },
    Resize {
        width: f64,
        height: f64,
    },
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::PointerEnter { .. } => EventKind::PointerEnter,
            MapEvent::PointerLeave { .. } => EventKind::PointerLeave,
            MapEvent::PointerMove { .. } => EventKind::PointerMove,
            MapEvent::Click { .. } => EventKind::Click,
            MapEvent::Key { .. } => EventKind::Key,
            MapEvent::Wheel { .. } => EventKind::Wheel,
            MapEvent::Drag { .. } => EventKind::Drag,
            MapEvent::TransformChanged { .. } => EventKind::TransformChanged,
            MapEvent::Resize { .. } => EventKind::Resize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_stable_names() {
        let ev = MapEvent::Key {
            key: "Escape".into(),
        };
        assert_eq!(ev.kind(), EventKind::Key);
        assert_eq!(EventKind::TransformChanged.to_string(), "transform-changed");
        assert_eq!(EventKind::PointerEnter.name(), "pointer-enter");
    }
}
