pub mod error;
pub mod morton;
pub mod quadtree;

pub use error::{QuadtreeError, QuadtreeResult};
pub use quadtree::{CollisionPair, Config, RecordId, Region, SpatialIndex};
