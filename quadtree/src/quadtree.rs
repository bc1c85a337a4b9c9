mod collision_pairs;
mod config;
mod membership;
mod placement;
mod stack;
mod storage;
mod types;

pub use config::{Config, Region, MAX_LEVEL};
pub use placement::{child_index, depth_of, depth_offset, parent_index};
pub use types::{CollisionPair, RecordId};

use crate::error::QuadtreeResult;
use common::shapes::Rectangle;
use storage::RecordArena;
use tracing::debug;
use types::Cell;

/// Linear quadtree over a fixed region.
///
/// Records live in an arena owned by the index and are addressed by
/// [`RecordId`]. A registered record belongs to exactly one node: the
/// deepest one whose area fully contains its bounding box. Nodes are stored
/// in one flat array indexed by depth offset plus Morton code and are only
/// materialised once something is registered at or below them.
#[derive(Debug)]
pub struct SpatialIndex<T> {
    region: Region,
    cells: Vec<Option<Cell>>,
    records: RecordArena<T>,
    live_cells: usize,
}

impl<T> SpatialIndex<T> {
    pub fn new(bounding_box: Rectangle) -> QuadtreeResult<Self> {
        Self::new_with_config(bounding_box, Config::default())
    }

    pub fn new_with_config(bounding_box: Rectangle, config: Config) -> QuadtreeResult<Self> {
        let region = Region::new(&bounding_box, config.level)?;
        debug!(
            level = region.level(),
            cell_count = region.cell_count(),
            "spatial index configured"
        );
        Ok(Self {
            cells: vec![None; region.cell_count()],
            records: RecordArena::with_capacity(config.pool_size),
            live_cells: 0,
            region,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn level(&self) -> u32 {
        self.region.level()
    }

    /// Number of node slots, materialised or not.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn live_cell_count(&self) -> usize {
        self.live_cells
    }

    pub fn has_cell(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(Some(_)))
    }

    /// Records registered directly at node `index`, or `None` if the node
    /// has not been materialised.
    pub fn cell_population(&self, index: usize) -> Option<usize> {
        self.cells
            .get(index)
            .copied()
            .flatten()
            .map(|cell| cell.len as usize)
    }

    /// Records in the arena, registered or detached.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(node slots, materialised nodes, records)`.
    pub fn storage_counts(&self) -> (usize, usize, usize) {
        (self.cells.len(), self.live_cells, self.records.len())
    }

    pub fn point_to_leaf(&self, x: f32, y: f32) -> Option<u32> {
        self.region.point_to_leaf(x, y)
    }

    pub fn placement_index(
        &self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> QuadtreeResult<usize> {
        self.region.placement_index(left, top, right, bottom)
    }

    /// Drops every node and record. Geometry is kept.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.records.clear();
        self.live_cells = 0;
    }
}
