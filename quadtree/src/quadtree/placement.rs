use super::{Region, SpatialIndex};
use crate::error::{QuadtreeError, QuadtreeResult};
use crate::morton;
use tracing::debug;

use super::types::Cell;

/// Number of nodes at depths `0..depth`, i.e. the flat index of the first
/// node at `depth`.
#[inline(always)]
pub fn depth_offset(depth: u32) -> usize {
    ((1usize << (2 * depth)) - 1) / 3
}

/// Depth of node `index`.
pub fn depth_of(index: usize) -> u32 {
    let mut depth = 0;
    while depth_offset(depth + 1) <= index {
        depth += 1;
    }
    depth
}

#[inline(always)]
pub fn parent_index(index: usize) -> Option<usize> {
    if index == 0 {
        None
    } else {
        Some((index - 1) >> 2)
    }
}

/// Flat index of child `quadrant` (0..4, Morton order) of node `index`.
#[inline(always)]
pub fn child_index(index: usize, quadrant: usize) -> usize {
    debug_assert!(quadrant < 4, "quadrant {} out of 0..4", quadrant);
    index * 4 + 1 + quadrant
}

impl Region {
    /// Morton code of the leaf cell holding `(x, y)`.
    ///
    /// Points at or past the far edge are not clamped and produce codes at
    /// or beyond `4^level`. Returns `None` only for points that have no grid
    /// coordinate at all: left/above the origin, non-finite, or past `u16`.
    pub fn point_to_leaf(&self, x: f32, y: f32) -> Option<u32> {
        let gx = ((x - self.left()) / self.unit_width()).floor();
        let gy = ((y - self.top()) / self.unit_height()).floor();
        let max = f32::from(u16::MAX);
        // Written so that NaN fails the check.
        if !((0.0..=max).contains(&gx) && (0.0..=max).contains(&gy)) {
            return None;
        }
        Some(morton::morton(gx as u16, gy as u16))
    }

    /// Flat index of the deepest node that fully contains the box.
    pub fn placement_index(
        &self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> QuadtreeResult<usize> {
        if !(left.is_finite() && top.is_finite() && right.is_finite() && bottom.is_finite())
            || left > right
            || top > bottom
        {
            return Err(QuadtreeError::InvalidRectExtent {
                left,
                top,
                right,
                bottom,
            });
        }
        let out_of_range = QuadtreeError::OutOfRange {
            left,
            top,
            right,
            bottom,
        };

        let leaf_count = 1u32 << (2 * self.level());
        let (top_left, bottom_right) =
            match (self.point_to_leaf(left, top), self.point_to_leaf(right, bottom)) {
                (Some(a), Some(b)) if a < leaf_count && b < leaf_count => (a, b),
                _ => return Err(out_of_range),
            };

        // Both codes are below 4^level, so every differing 2-bit group is a
        // level of the tree. The highest one is where the corners split.
        let diff = top_left ^ bottom_right;
        let shift = (u32::BITS - diff.leading_zeros()).div_ceil(2);
        let index = (bottom_right >> (2 * shift)) as usize + depth_offset(self.level() - shift);
        if index >= self.cell_count() {
            return Err(out_of_range);
        }
        Ok(index)
    }
}

impl<T> SpatialIndex<T> {
    /// Materialises node `index` and any missing ancestors.
    ///
    /// Stops at the first node that already exists: every existing node has
    /// all of its ancestors.
    pub(crate) fn create_cell_chain(&mut self, index: usize) {
        debug_assert!(
            index < self.cells.len(),
            "cell index {} exceeds cell count {}",
            index,
            self.cells.len()
        );
        let mut current = Some(index);
        let mut created = 0usize;
        while let Some(idx) = current {
            let slot = &mut self.cells[idx];
            if slot.is_some() {
                break;
            }
            *slot = Some(Cell::default());
            created += 1;
            current = parent_index(idx);
        }
        if created > 0 {
            self.live_cells += created;
            debug!(index, created, "materialised cell chain");
        }
        debug_assert!(
            self.ancestors_exist(index),
            "ancestor missing for cell {}",
            index
        );
    }

    fn ancestors_exist(&self, index: usize) -> bool {
        let mut current = parent_index(index);
        while let Some(idx) = current {
            if self.cells[idx].is_none() {
                return false;
            }
            current = parent_index(idx);
        }
        true
    }
}
