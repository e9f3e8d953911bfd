//! The inventory grid: slots, resident items and the drag controller in one place.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use satchel_utils::{CellPos, Footprint, ScreenPos};
use smallvec::SmallVec;

use super::{GridStore, OccupancySnapshot, RelocationController, occupancy};
use crate::error::InventoryError;
use crate::events::{EventChannel, InventoryEvent, Subscription};
use crate::item::{ItemId, ItemKind, PlacedItem};

/// A fixed-size grid of slots holding multi-cell item stacks.
///
/// This is the only mutation surface: placement, relocation and removal all go through it, and
/// each call runs to completion before returning. Construct one explicitly and hand collaborators
/// a reference (or a [`SharedInventory`](crate::SharedInventory) when several threads need it).
#[derive(Debug)]
pub struct InventoryGrid {
    pub(super) store: GridStore,
    pub(super) items: FxHashMap<ItemId, PlacedItem>,
    next_item_id: u32,
    pub(super) drag: RelocationController,
    pub(super) events: EventChannel,
    /// Bumped on every committed mutation.
    times_changed: u32,
}

impl InventoryGrid {
    /// Creates an empty grid of `columns` x `rows` cells, each `cell_size` pixels wide.
    pub fn new(columns: i32, rows: i32, cell_size: u32) -> Result<Self, InventoryError> {
        Ok(Self::with_store(GridStore::new(columns, rows, cell_size)?))
    }

    /// Creates an empty grid over an existing store.
    ///
    /// The store must not have any occupied slots.
    #[must_use]
    pub fn with_store(store: GridStore) -> Self {
        debug_assert!(store.slots().all(|slot| !slot.is_occupied()));
        Self {
            store,
            items: FxHashMap::default(),
            next_item_id: 1,
            drag: RelocationController::default(),
            events: EventChannel::new(),
            times_changed: 0,
        }
    }

    /// Replaces the event channel, e.g. to share one channel between several grids.
    #[must_use]
    pub fn with_events(mut self, events: EventChannel) -> Self {
        self.events = events;
        self
    }

    /// Returns the slot store.
    #[must_use]
    pub fn store(&self) -> &GridStore {
        &self.store
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn columns(&self) -> i32 {
        self.store.columns()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> i32 {
        self.store.rows()
    }

    /// Returns the event channel this grid publishes on.
    #[must_use]
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    /// Subscribes to this grid's events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    /// Returns how many committed mutations the grid has seen.
    #[must_use]
    pub fn times_changed(&self) -> u32 {
        self.times_changed
    }

    /// Returns whether `footprint` at `origin` lies fully inside the grid.
    #[must_use]
    pub fn fits(&self, origin: CellPos, footprint: Footprint) -> bool {
        self.store.fits(origin, footprint)
    }

    /// Maps a cell to its render position. See [`GridStore::position_for_cell`].
    #[must_use]
    pub fn position_for_cell(&self, cell: CellPos) -> ScreenPos {
        self.store.position_for_cell(cell)
    }

    /// Returns the item with the given id.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.get(&id)
    }

    /// Returns the number of resident items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns every resident item ordered by origin, row-major.
    #[must_use]
    pub fn items(&self) -> Vec<&PlacedItem> {
        let mut items: Vec<_> = self.items.values().collect();
        items.sort_by_key(|item| (item.origin().row, item.origin().col));
        items
    }

    /// Returns the total count of `kind` across all stacks.
    #[must_use]
    pub fn total_of(&self, kind: &ItemKind) -> u32 {
        self.items
            .values()
            .filter(|item| **item.kind() == *kind)
            .map(PlacedItem::count)
            .sum()
    }

    /// Returns the item occupying `cell`.
    pub fn occupant_at(&self, cell: CellPos) -> Result<Option<&PlacedItem>, InventoryError> {
        let slot = self.store.slot_at(cell)?;
        Ok(slot.occupant().and_then(|id| self.items.get(&id)))
    }

    /// Returns whether `cell` is occupied.
    pub fn is_occupied(&self, cell: CellPos) -> Result<bool, InventoryError> {
        Ok(self.store.slot_at(cell)?.is_occupied())
    }

    /// Returns the number of free cells.
    #[must_use]
    pub fn free_cell_count(&self) -> usize {
        occupancy::free_cell_count(&self.store)
    }

    /// Captures which item holds each cell.
    #[must_use]
    pub fn snapshot(&self) -> OccupancySnapshot {
        OccupancySnapshot::capture(&self.store)
    }

    /// Checks that every slot back-reference matches its item's recorded footprint.
    pub fn verify(&self) -> Result<(), InventoryError> {
        occupancy::verify(&self.store, &self.items)
    }

    /// Takes an item out of the grid, freeing its cells.
    ///
    /// If the item is being dragged, the drag is cancelled.
    pub fn remove_item(&mut self, id: ItemId) -> Result<PlacedItem, InventoryError> {
        let Some(mut item) = self.items.remove(&id) else {
            log::warn!("Tried to remove {id}, which is not in the grid");
            return Err(InventoryError::UnknownItem(id));
        };

        occupancy::unoccupy_all(&mut self.store, &mut item);
        if self.drag.dragged_item() == Some(id) {
            self.drag.reset();
        }
        self.mark_changed();

        log::debug!("Removed {id} ({} x{})", item.kind(), item.count());
        self.events.publish(InventoryEvent::ItemRemoved {
            item: id,
            kind: item.kind().id().to_owned(),
            count: item.count(),
        });
        Ok(item)
    }

    /// Removes every item.
    pub fn clear(&mut self) -> Vec<PlacedItem> {
        let ids: Vec<ItemId> = self.items().iter().map(|item| item.id()).collect();
        ids.into_iter()
            .filter_map(|id| self.remove_item(id).ok())
            .collect()
    }

    /// Creates a new stack at `origin` and claims its cells.
    ///
    /// The caller has already validated the region.
    pub(super) fn insert_new(
        &mut self,
        kind: Arc<ItemKind>,
        count: u32,
        origin: CellPos,
    ) -> Result<ItemId, InventoryError> {
        let id = ItemId(self.next_item_id);
        let next_item_id = self
            .next_item_id
            .checked_add(1)
            .ok_or(InventoryError::IdsExhausted)?;
        let cells: SmallVec<[CellPos; 4]> = kind.footprint().cells_at(origin).collect();
        let mut item = PlacedItem::new(id, kind, count, origin);
        occupancy::occupy(&mut self.store, &mut item, &cells)?;

        self.next_item_id = next_item_id;
        self.items.insert(id, item);
        self.mark_changed();
        Ok(id)
    }

    pub(super) fn mark_changed(&mut self) {
        self.times_changed = self.times_changed.wrapping_add(1);
        debug_assert_eq!(self.verify(), Ok(()));
    }
}
