//! Interactive choropleth map widget core.
//!
//! `MapContext` owns the configuration, region set, viewport and tooltip and
//! renders through a `Surface`. Hosts feed it `runtime::MapEvent`s.

pub mod callbacks;
pub mod config;
pub mod context;
pub mod interaction;
pub mod loader;
pub mod surface;
pub mod tooltip;
pub mod viewport;

pub use callbacks::Callbacks;
pub use config::{ConfigError, ConfigStore, MapConfig, deep_merge};
pub use context::{MapContext, Subscriber};
pub use interaction::{ClickOutcome, DOUBLE_CLICK_WINDOW_MS, resolve_click};
pub use loader::{DEFAULT_DATASET_URI, DatasetFetcher, ErrorPanel, FetchError, LoadError};
pub use surface::Surface;
pub use tooltip::Tooltip;
pub use viewport::Viewport;
