use crate::error::{QuadtreeError, QuadtreeResult};
use crate::morton;
use common::shapes::Rectangle;

use super::placement::{depth_of, depth_offset};

/// Deepest supported subdivision. Leaf grids are `2^MAX_LEVEL` cells wide,
/// which keeps leaf Morton codes within `u32` and node indices within `u32`.
pub const MAX_LEVEL: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Subdivision depth. Level 0 is a single root node.
    pub level: u32,
    /// Records reserved up front in the arena.
    pub pool_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            // With a level of 6 there are 5461 node slots.
            level: 6,
            pool_size: 4000,
        }
    }
}

/// Geometry of an index: the covered area and its leaf quantisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    level: u32,
    unit_width: f32,
    unit_height: f32,
    cell_count: usize,
}

impl Region {
    pub fn new(bounds: &Rectangle, level: u32) -> QuadtreeResult<Self> {
        if level > MAX_LEVEL {
            return Err(QuadtreeError::InvalidLevel {
                level,
                max: MAX_LEVEL,
            });
        }
        let width = bounds.width();
        let height = bounds.height();
        let side = (1u32 << level) as f32;
        let unit_width = width / side;
        let unit_height = height / side;
        // Finite edges can still overflow to an infinite extent.
        if !(width.is_finite() && height.is_finite() && unit_width > 0.0 && unit_height > 0.0) {
            return Err(QuadtreeError::InvalidRegion {
                left: bounds.left,
                top: bounds.top,
                right: bounds.right,
                bottom: bounds.bottom,
            });
        }
        Ok(Self {
            left: bounds.left,
            top: bounds.top,
            width,
            height,
            level,
            unit_width,
            unit_height,
            cell_count: depth_offset(level + 1),
        })
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn unit_width(&self) -> f32 {
        self.unit_width
    }

    pub fn unit_height(&self) -> f32 {
        self.unit_height
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Leaf cells along each axis.
    pub fn leaf_side(&self) -> u32 {
        1 << self.level
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }

    /// Area covered by node `index`, or `None` past the last node.
    pub fn node_bounds(&self, index: usize) -> Option<Rectangle> {
        if index >= self.cell_count {
            return None;
        }
        let depth = depth_of(index);
        let (x, y) = morton::decode((index - depth_offset(depth)) as u32);
        let side = (1u32 << depth) as f32;
        let w = self.width / side;
        let h = self.height / side;
        let left = self.left + f32::from(x) * w;
        let top = self.top + f32::from(y) * h;
        Some(Rectangle::new(left, top, left + w, top + h))
    }
}
