//! Errors reported by inventory operations.

use satchel_utils::CellPos;
use thiserror::Error;

use crate::item::ItemId;

/// Every recoverable failure of a grid operation.
///
/// None of these leave the grid in a partially mutated state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The grid was asked for zero or negative dimensions.
    #[error("invalid grid dimensions {columns}x{rows} with cell size {cell_size}")]
    InvalidDimensions {
        /// Requested columns.
        columns: i32,
        /// Requested rows.
        rows: i32,
        /// Requested cell size in pixels.
        cell_size: u32,
    },
    /// A footprint with a side smaller than one cell.
    #[error("invalid footprint {width}x{height}")]
    InvalidFootprint {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// An item kind with a zero maximum stack size.
    #[error("item kind `{kind}` has invalid max stack size {max}")]
    InvalidStackSize {
        /// The offending kind.
        kind: String,
        /// The rejected maximum.
        max: u32,
    },
    /// A cell outside the grid.
    #[error("cell {0} is outside the grid")]
    OutOfBounds(CellPos),
    /// No mergeable stack and no free region large enough.
    #[error("no space for `{kind}`")]
    NoSpace {
        /// The kind that could not be placed.
        kind: String,
    },
    /// An acquisition request for zero items.
    #[error("acquisition of `{kind}` requested zero items")]
    EmptyRequest {
        /// The requested kind.
        kind: String,
    },
    /// A move target that is out of bounds or blocked by another item.
    #[error("item {item} cannot be moved to {target}")]
    InvalidMoveTarget {
        /// The item that stays where it was.
        item: ItemId,
        /// The rejected origin.
        target: CellPos,
    },
    /// No item with this id lives in the grid.
    #[error("no item {0} in the grid")]
    UnknownItem(ItemId),
    /// No item kind with this id is known.
    #[error("unknown item kind `{0}`")]
    UnknownKind(String),
    /// A hover or drop arrived while nothing is being dragged.
    #[error("no drag in progress")]
    NoActiveDrag,
    /// A drag was started while another one is still open.
    #[error("item {0} is already being dragged")]
    DragInProgress(ItemId),
    /// Every item id has been handed out.
    #[error("no item ids left")]
    IdsExhausted,
    /// Slot back-references disagree with an item's recorded footprint.
    #[error("occupancy is inconsistent: {0}")]
    Inconsistent(String),
}
