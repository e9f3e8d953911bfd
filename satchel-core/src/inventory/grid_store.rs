//! The fixed-size slot array backing an inventory grid.

use satchel_utils::{CellPos, Footprint, ScreenPos};

use super::{Slot, bounds};
use crate::error::InventoryError;

/// A grid of `columns` x `rows` slots stored row-major.
///
/// The store is sized once at construction and never resized.
#[derive(Debug, Clone)]
pub struct GridStore {
    columns: i32,
    rows: i32,
    /// Side length of one cell in pixels. Only used for coordinate mapping.
    cell_size: u32,
    slots: Vec<Slot>,
}

impl GridStore {
    /// Allocates a grid with every slot unoccupied.
    pub fn new(columns: i32, rows: i32, cell_size: u32) -> Result<Self, InventoryError> {
        if columns <= 0 || rows <= 0 || cell_size == 0 {
            return Err(InventoryError::InvalidDimensions {
                columns,
                rows,
                cell_size,
            });
        }

        let slots = (0..rows)
            .flat_map(|row| (0..columns).map(move |col| Slot::new(CellPos::new(col, row))))
            .collect();

        Ok(Self {
            columns,
            rows,
            cell_size,
            slots,
        })
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Returns the cell size in pixels.
    #[must_use]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Returns the total number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; a grid has at least one slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns whether `cell` lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellPos) -> bool {
        bounds::contains(self.columns, self.rows, cell)
    }

    /// Returns whether `footprint` anchored at `origin` lies fully inside the grid.
    #[must_use]
    pub fn fits(&self, origin: CellPos, footprint: Footprint) -> bool {
        bounds::fits(self.columns, self.rows, origin, footprint)
    }

    fn index_of(&self, cell: CellPos) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.row as usize * self.columns as usize + cell.col as usize)
    }

    /// Returns the slot at `cell`.
    pub fn slot_at(&self, cell: CellPos) -> Result<&Slot, InventoryError> {
        self.index_of(cell)
            .map(|index| &self.slots[index])
            .ok_or(InventoryError::OutOfBounds(cell))
    }

    pub(crate) fn slot_at_mut(&mut self, cell: CellPos) -> Result<&mut Slot, InventoryError> {
        match self.index_of(cell) {
            Some(index) => Ok(&mut self.slots[index]),
            None => Err(InventoryError::OutOfBounds(cell)),
        }
    }

    /// Iterates all slots in row-major order (rows outer, columns inner).
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Maps a cell to its top-left corner in the grid's local render space.
    ///
    /// The grid's top-left corner is the origin and y grows upward, so rows map to
    /// increasingly negative y.
    #[must_use]
    pub fn position_for_cell(&self, cell: CellPos) -> ScreenPos {
        let size = self.cell_size as f32;
        ScreenPos::new(cell.col as f32 * size, -(cell.row as f32) * size)
    }

    /// Returns the pixel extent of a footprint, for sizing an item's visual.
    #[must_use]
    pub fn footprint_extent(&self, footprint: Footprint) -> (f32, f32) {
        let size = self.cell_size as f32;
        (
            footprint.width() as f32 * size,
            footprint.height() as f32 * size,
        )
    }
}
