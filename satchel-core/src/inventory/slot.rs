//! A single cell of the grid.

use satchel_utils::CellPos;

use crate::item::ItemId;

/// One cell of the inventory grid.
///
/// A slot never owns its occupant. It records the occupant's id, which the grid resolves
/// against its item arena. Occupancy is derived from the occupant, so a slot can't claim to
/// be occupied without naming who occupies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pos: CellPos,
    occupant: Option<ItemId>,
}

impl Slot {
    /// Creates an unoccupied slot.
    #[must_use]
    pub fn new(pos: CellPos) -> Self {
        Self {
            pos,
            occupant: None,
        }
    }

    /// Returns the slot's grid position.
    #[must_use]
    pub fn pos(&self) -> CellPos {
        self.pos
    }

    /// Returns whether an item occupies this slot.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Returns the occupying item, if any.
    #[must_use]
    pub fn occupant(&self) -> Option<ItemId> {
        self.occupant
    }

    /// Returns whether this slot is free for `item`: empty, or already held by `item` itself.
    #[must_use]
    pub fn is_free_for(&self, item: Option<ItemId>) -> bool {
        match self.occupant {
            None => true,
            Some(occupant) => Some(occupant) == item,
        }
    }

    pub(crate) fn set_occupant(&mut self, item: ItemId) {
        self.occupant = Some(item);
    }

    pub(crate) fn clear(&mut self) {
        self.occupant = None;
    }
}
