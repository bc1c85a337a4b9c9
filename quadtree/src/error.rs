use crate::quadtree::RecordId;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QuadtreeError {
    #[error("tree level must be at most {max} (level: {level})")]
    InvalidLevel { level: u32, max: u32 },
    #[error(
        "region extents must be finite and positive (left: {left}, top: {top}, right: {right}, bottom: {bottom})"
    )]
    InvalidRegion {
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    },
    #[error(
        "rectangle extents must be finite with min <= max (left: {left}, top: {top}, right: {right}, bottom: {bottom})"
    )]
    InvalidRectExtent {
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    },
    #[error(
        "rectangle does not fit in the index region (left: {left}, top: {top}, right: {right}, bottom: {bottom})"
    )]
    OutOfRange {
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    },
    #[error("record {id} does not exist")]
    UnknownRecord { id: RecordId },
    #[error("record {id} is already registered in cell {cell}")]
    RecordAttached { id: RecordId, cell: usize },
}

pub type QuadtreeResult<T> = Result<T, QuadtreeError>;
