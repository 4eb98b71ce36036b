/// Event timestamp in milliseconds, as reported by the event substrate.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Timestamp(pub f64); // milliseconds

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(&self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`; negative if `earlier` is later.
    pub fn since(&self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }
}
