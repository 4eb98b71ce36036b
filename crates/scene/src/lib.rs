pub mod region;
pub mod regions;
pub mod selection;
pub mod transform;

pub use foundation::ids::RegionId;
pub use region::*;
pub use regions::*;
pub use transform::*;
