//! Occupancy bookkeeping between slots and placed items.
//!
//! These are standalone functions since slots don't own their occupants: each call takes the
//! store and the item it relates. Every mutating function validates its whole input before
//! touching a single slot, so a failed call leaves no trace.

use rustc_hash::FxHashMap;
use satchel_utils::{CellPos, Footprint};
use serde::Serialize;
use smallvec::SmallVec;

use super::{GridStore, Slot, bounds};
use crate::error::InventoryError;
use crate::item::{ItemId, PlacedItem};

/// How a cell under a hover candidate should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellHighlight {
    /// The cell is free (or already held by the item being moved).
    Available,
    /// Another item holds the cell.
    Blocked,
}

/// Marks every cell in `cells` as occupied by `item` and records the back-references.
///
/// Fails without mutating anything if a cell is outside the grid or held by another item.
pub fn occupy(
    store: &mut GridStore,
    item: &mut PlacedItem,
    cells: &[CellPos],
) -> Result<(), InventoryError> {
    let id = item.id();
    for &cell in cells {
        let slot = store.slot_at(cell)?;
        if !slot.is_free_for(Some(id)) {
            return Err(InventoryError::Inconsistent(format!(
                "cell {cell} is held by {:?}, cannot assign it to {id}",
                slot.occupant()
            )));
        }
    }

    for &cell in cells {
        store.slot_at_mut(cell)?.set_occupant(id);
        if !item.cells.contains(&cell) {
            item.cells.push(cell);
        }
    }
    Ok(())
}

/// Clears every slot recorded by `item`, then forgets the recorded cells.
pub fn unoccupy_all(store: &mut GridStore, item: &mut PlacedItem) {
    let id = item.id();
    for cell in item.cells.drain(..) {
        if let Ok(slot) = store.slot_at_mut(cell)
            && slot.occupant() == Some(id)
        {
            slot.clear();
        }
    }
}

/// Returns whether `footprint` at `origin` is inside the grid and every cell is free.
///
/// Cells held by `ignoring` count as free, so an item never blocks its own move.
#[must_use]
pub fn is_region_free(
    store: &GridStore,
    origin: CellPos,
    footprint: Footprint,
    ignoring: Option<ItemId>,
) -> bool {
    if !store.fits(origin, footprint) {
        return false;
    }

    footprint.cells_at(origin).all(|cell| {
        store
            .slot_at(cell)
            .is_ok_and(|slot| slot.is_free_for(ignoring))
    })
}

/// Returns the in-bounds cells of `footprint` at `origin` with their highlight state.
///
/// Cells past the grid edge are left out.
#[must_use]
pub fn region_highlights(
    store: &GridStore,
    origin: CellPos,
    footprint: Footprint,
    ignoring: Option<ItemId>,
) -> SmallVec<[(CellPos, CellHighlight); 4]> {
    footprint
        .cells_at(origin)
        .filter_map(|cell| {
            let slot = store.slot_at(cell).ok()?;
            let highlight = if slot.is_free_for(ignoring) {
                CellHighlight::Available
            } else {
                CellHighlight::Blocked
            };
            Some((cell, highlight))
        })
        .collect()
}

/// Moves `item` so its footprint starts at `target`.
///
/// The target region is validated first; only then are the old cells cleared and the new
/// ones claimed. Fails with `InvalidMoveTarget` and no mutation if the target is out of
/// bounds or overlaps another item.
pub fn relocate(
    store: &mut GridStore,
    item: &mut PlacedItem,
    target: CellPos,
) -> Result<(), InventoryError> {
    let footprint = item.footprint();
    if !is_region_free(store, target, footprint, Some(item.id())) {
        return Err(InventoryError::InvalidMoveTarget {
            item: item.id(),
            target,
        });
    }

    let cells: SmallVec<[CellPos; 4]> = footprint.cells_at(target).collect();
    unoccupy_all(store, item);
    occupy(store, item, &cells)?;
    item.set_origin(target);
    Ok(())
}

/// Returns the number of unoccupied slots.
#[must_use]
pub fn free_cell_count(store: &GridStore) -> usize {
    store.slots().filter(|slot| !slot.is_occupied()).count()
}

/// Checks that slot back-references and recorded footprints agree exactly.
pub fn verify(
    store: &GridStore,
    items: &FxHashMap<ItemId, PlacedItem>,
) -> Result<(), InventoryError> {
    for slot in store.slots() {
        let Some(id) = slot.occupant() else {
            continue;
        };
        let Some(item) = items.get(&id) else {
            return Err(InventoryError::Inconsistent(format!(
                "cell {} refers to missing item {id}",
                slot.pos()
            )));
        };
        if !item.cells().contains(&slot.pos()) {
            return Err(InventoryError::Inconsistent(format!(
                "cell {} refers to {id}, which does not record it",
                slot.pos()
            )));
        }
    }

    for item in items.values() {
        let expected: SmallVec<[CellPos; 4]> = item.footprint().cells_at(item.origin()).collect();
        if item.cells() != expected.as_slice() {
            return Err(InventoryError::Inconsistent(format!(
                "{} records {:?} but its footprint at {} covers {:?}",
                item.id(),
                item.cells(),
                item.origin(),
                expected
            )));
        }
        for &cell in item.cells() {
            if store.slot_at(cell)?.occupant() != Some(item.id()) {
                return Err(InventoryError::Inconsistent(format!(
                    "{} records {cell}, which does not refer back to it",
                    item.id()
                )));
            }
        }
        let max = item.kind().effective_max_stack();
        if item.count() == 0 || item.count() > max {
            return Err(InventoryError::Inconsistent(format!(
                "{} holds {} items, allowed 1..={max}",
                item.id(),
                item.count()
            )));
        }
    }

    Ok(())
}

/// A point-in-time copy of which item holds each cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancySnapshot {
    columns: i32,
    rows: i32,
    /// Row-major occupants.
    cells: Vec<Option<ItemId>>,
}

impl OccupancySnapshot {
    /// Captures the current occupancy of `store`.
    #[must_use]
    pub fn capture(store: &GridStore) -> Self {
        Self {
            columns: store.columns(),
            rows: store.rows(),
            cells: store.slots().map(Slot::occupant).collect(),
        }
    }

    /// Returns the occupant recorded for `cell`, or `None` if free or out of bounds.
    #[must_use]
    pub fn occupant_at(&self, cell: CellPos) -> Option<ItemId> {
        if !bounds::contains(self.columns, self.rows, cell) {
            return None;
        }
        self.cells[cell.row as usize * self.columns as usize + cell.col as usize]
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Iterates rows, each as a slice of occupants.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<ItemId>]> {
        self.cells.chunks(self.columns as usize)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::item::ItemKind;

    fn placed(id: u32, w: i32, h: i32, origin: CellPos) -> PlacedItem {
        let footprint = Footprint::new(w, h).unwrap();
        let kind = Arc::new(ItemKind::new(format!("kind{id}"), footprint, false, 1).unwrap());
        PlacedItem::new(ItemId(id), kind, 1, origin)
    }

    fn cells_of(item: &PlacedItem) -> Vec<CellPos> {
        item.footprint().cells_at(item.origin()).collect()
    }

    #[test]
    fn test_occupy_and_unoccupy() {
        let mut store = GridStore::new(4, 4, 32).unwrap();
        let mut item = placed(1, 2, 2, CellPos::new(1, 1));
        let cells = cells_of(&item);

        occupy(&mut store, &mut item, &cells).unwrap();
        assert_eq!(item.cells(), cells.as_slice());
        assert_eq!(free_cell_count(&store), 12);
        assert_eq!(
            store.slot_at(CellPos::new(2, 2)).unwrap().occupant(),
            Some(ItemId(1))
        );

        unoccupy_all(&mut store, &mut item);
        assert!(item.cells().is_empty());
        assert_eq!(free_cell_count(&store), 16);
    }

    #[test]
    fn test_occupy_refuses_foreign_cells_without_mutation() {
        let mut store = GridStore::new(4, 4, 32).unwrap();
        let mut first = placed(1, 1, 1, CellPos::new(1, 0));
        let first_cells = cells_of(&first);
        occupy(&mut store, &mut first, &first_cells).unwrap();
        let before = OccupancySnapshot::capture(&store);

        let mut second = placed(2, 2, 1, CellPos::new(0, 0));
        let second_cells = cells_of(&second);
        assert!(matches!(
            occupy(&mut store, &mut second, &second_cells),
            Err(InventoryError::Inconsistent(_))
        ));
        assert!(second.cells().is_empty());
        assert_eq!(OccupancySnapshot::capture(&store), before);
    }

    #[test]
    fn test_occupy_out_of_bounds_fails_cleanly() {
        let mut store = GridStore::new(2, 2, 32).unwrap();
        let mut item = placed(1, 2, 2, CellPos::new(1, 1));
        let cells = cells_of(&item);
        assert_eq!(
            occupy(&mut store, &mut item, &cells),
            Err(InventoryError::OutOfBounds(CellPos::new(2, 1)))
        );
        assert_eq!(free_cell_count(&store), 4);
    }

    #[test]
    fn test_unoccupy_then_occupy_round_trip() {
        let mut store = GridStore::new(4, 4, 32).unwrap();
        let mut a = placed(1, 2, 1, CellPos::new(0, 0));
        let mut b = placed(2, 1, 3, CellPos::new(3, 1));
        let a_cells = cells_of(&a);
        let b_cells = cells_of(&b);
        occupy(&mut store, &mut a, &a_cells).unwrap();
        occupy(&mut store, &mut b, &b_cells).unwrap();
        let before = OccupancySnapshot::capture(&store);

        unoccupy_all(&mut store, &mut b);
        occupy(&mut store, &mut b, &b_cells).unwrap();

        assert_eq!(OccupancySnapshot::capture(&store), before);
        assert_eq!(b.cells(), b_cells.as_slice());
    }

    #[test]
    fn test_region_free_ignores_self() {
        let mut store = GridStore::new(4, 4, 32).unwrap();
        let mut item = placed(1, 2, 2, CellPos::new(0, 0));
        let cells = cells_of(&item);
        occupy(&mut store, &mut item, &cells).unwrap();

        let footprint = item.footprint();
        assert!(!is_region_free(&store, CellPos::new(1, 1), footprint, None));
        assert!(is_region_free(&store, CellPos::new(1, 1), footprint, Some(ItemId(1))));
        assert!(!is_region_free(&store, CellPos::new(3, 3), footprint, Some(ItemId(1))));
    }

    #[test]
    fn test_relocate_validates_before_mutating() {
        let mut store = GridStore::new(4, 4, 32).unwrap();
        let mut mover = placed(1, 2, 1, CellPos::new(0, 0));
        let mut wall = placed(2, 1, 1, CellPos::new(3, 0));
        let mover_cells = cells_of(&mover);
        let wall_cells = cells_of(&wall);
        occupy(&mut store, &mut mover, &mover_cells).unwrap();
        occupy(&mut store, &mut wall, &wall_cells).unwrap();
        let before = OccupancySnapshot::capture(&store);

        assert_eq!(
            relocate(&mut store, &mut mover, CellPos::new(2, 0)),
            Err(InventoryError::InvalidMoveTarget {
                item: ItemId(1),
                target: CellPos::new(2, 0)
            })
        );
        assert_eq!(OccupancySnapshot::capture(&store), before);
        assert_eq!(mover.origin(), CellPos::new(0, 0));

        relocate(&mut store, &mut mover, CellPos::new(1, 0)).unwrap();
        assert_eq!(mover.origin(), CellPos::new(1, 0));
        assert_eq!(mover.cells(), &[CellPos::new(1, 0), CellPos::new(2, 0)]);
        assert_eq!(store.slot_at(CellPos::new(0, 0)).unwrap().occupant(), None);
    }

    #[test]
    fn test_verify_detects_stale_reference() {
        let mut store = GridStore::new(3, 3, 32).unwrap();
        let mut item = placed(1, 1, 1, CellPos::new(0, 0));
        let cells = cells_of(&item);
        occupy(&mut store, &mut item, &cells).unwrap();

        let mut items = FxHashMap::default();
        items.insert(item.id(), item.clone());
        assert!(verify(&store, &items).is_ok());

        // A slot pointing at an item that is no longer in the arena.
        items.clear();
        assert!(matches!(
            verify(&store, &items),
            Err(InventoryError::Inconsistent(_))
        ));

        // An item whose recorded cells no longer match its origin.
        item.set_origin(CellPos::new(1, 1));
        items.insert(item.id(), item);
        assert!(matches!(
            verify(&store, &items),
            Err(InventoryError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_region_highlights_clip_to_grid() {
        let mut store = GridStore::new(3, 3, 32).unwrap();
        let mut item = placed(1, 1, 1, CellPos::new(2, 2));
        let cells = cells_of(&item);
        occupy(&mut store, &mut item, &cells).unwrap();

        let footprint = Footprint::new(2, 2).unwrap();
        let highlights = region_highlights(&store, CellPos::new(1, 1), footprint, None);
        assert_eq!(
            highlights.as_slice(),
            &[
                (CellPos::new(1, 1), CellHighlight::Available),
                (CellPos::new(2, 1), CellHighlight::Available),
                (CellPos::new(1, 2), CellHighlight::Available),
                (CellPos::new(2, 2), CellHighlight::Blocked),
            ]
        );

        let clipped = region_highlights(&store, CellPos::new(2, 0), footprint, None);
        assert_eq!(clipped.len(), 2);
    }

    #[test]
    fn test_snapshot_rows() {
        let mut store = GridStore::new(2, 2, 32).unwrap();
        let mut item = placed(4, 1, 2, CellPos::new(1, 0));
        let cells = cells_of(&item);
        occupy(&mut store, &mut item, &cells).unwrap();

        let snapshot = OccupancySnapshot::capture(&store);
        let rows: Vec<_> = snapshot.rows().collect();
        assert_eq!(rows[0], &[None, Some(ItemId(4))]);
        assert_eq!(rows[1], &[None, Some(ItemId(4))]);
        assert_eq!(snapshot.occupied_count(), 2);
        assert_eq!(snapshot.occupant_at(CellPos::new(1, 1)), Some(ItemId(4)));
        assert_eq!(snapshot.occupant_at(CellPos::new(5, 1)), None);
    }
}
