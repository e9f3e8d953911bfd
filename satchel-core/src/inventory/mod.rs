//! This module contains the inventory grid.

pub mod bounds;
mod grid_store;
mod inventory_grid;
pub mod occupancy;
mod placement;
mod relocation;
mod slot;

pub use grid_store::GridStore;
pub use inventory_grid::InventoryGrid;
pub use occupancy::{CellHighlight, OccupancySnapshot};
pub use placement::{Acquired, StackAction};
pub use relocation::{DragState, DropOutcome, HoverCandidate, RelocationController};
pub use slot::Slot;
