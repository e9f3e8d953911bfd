//! Drag-and-drop relocation of resident items.

use std::mem;

use satchel_utils::CellPos;
use smallvec::SmallVec;

use super::{CellHighlight, InventoryGrid, occupancy};
use crate::error::InventoryError;
use crate::events::InventoryEvent;
use crate::item::ItemId;

/// A validated drop target under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverCandidate {
    origin: CellPos,
    can_drop: bool,
    highlights: SmallVec<[(CellPos, CellHighlight); 4]>,
}

impl HoverCandidate {
    /// Returns the origin the item would move to.
    #[must_use]
    pub fn origin(&self) -> CellPos {
        self.origin
    }

    /// Returns whether dropping here would commit.
    #[must_use]
    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    /// Returns the in-bounds cells under the candidate and how to highlight them.
    #[must_use]
    pub fn highlights(&self) -> &[(CellPos, CellHighlight)] {
        &self.highlights
    }
}

/// Where a drag currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// An item was picked up but is not over the grid.
    Dragging {
        /// The item being dragged.
        item: ItemId,
    },
    /// An item is held over a cell.
    Hovering {
        /// The item being dragged.
        item: ItemId,
        /// The validated target under the pointer.
        candidate: HoverCandidate,
    },
}

/// Tracks the drag in progress. The grid drives it; it never touches slots itself.
#[derive(Debug, Clone, Default)]
pub struct RelocationController {
    state: DragState,
}

impl RelocationController {
    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Returns true unless idle.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Returns the item being dragged.
    #[must_use]
    pub fn dragged_item(&self) -> Option<ItemId> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { item } | DragState::Hovering { item, .. } => Some(item),
        }
    }

    /// Returns the hover candidate, if the item is over the grid.
    #[must_use]
    pub fn candidate(&self) -> Option<&HoverCandidate> {
        match &self.state {
            DragState::Hovering { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    pub(super) fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    fn active_item(&self) -> Result<ItemId, InventoryError> {
        self.dragged_item().ok_or(InventoryError::NoActiveDrag)
    }
}

/// The result of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The item moved.
    Committed {
        /// The moved item.
        item: ItemId,
        /// Its previous origin.
        from: CellPos,
        /// Its new origin.
        to: CellPos,
    },
    /// Nothing changed; the item should be shown back at `origin`.
    NotCommitted {
        /// The dragged item.
        item: ItemId,
        /// The item's unchanged origin.
        origin: CellPos,
        /// The refused target, if one was hovered.
        target: Option<CellPos>,
    },
}

impl DropOutcome {
    /// Returns true if the item moved.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Returns the dragged item.
    #[must_use]
    pub fn item(&self) -> ItemId {
        match *self {
            Self::Committed { item, .. } | Self::NotCommitted { item, .. } => item,
        }
    }

    /// Converts a refused drop into `InvalidMoveTarget`.
    pub fn into_result(self) -> Result<CellPos, InventoryError> {
        match self {
            Self::Committed { to, .. } => Ok(to),
            Self::NotCommitted {
                item,
                origin,
                target,
            } => Err(InventoryError::InvalidMoveTarget {
                item,
                target: target.unwrap_or(origin),
            }),
        }
    }
}

impl InventoryGrid {
    /// Returns the drag controller.
    #[must_use]
    pub fn drag(&self) -> &RelocationController {
        &self.drag
    }

    /// Picks up `item` to start a drag. Nothing moves until [`commit_drop`](Self::commit_drop).
    pub fn begin_drag(&mut self, item: ItemId) -> Result<(), InventoryError> {
        if let Some(current) = self.drag.dragged_item() {
            log::warn!("Tried to drag {item} while {current} is being dragged");
            return Err(InventoryError::DragInProgress(current));
        }
        if !self.items.contains_key(&item) {
            log::warn!("Tried to drag {item}, which is not in the grid");
            return Err(InventoryError::UnknownItem(item));
        }

        self.drag.state = DragState::Dragging { item };
        Ok(())
    }

    /// Holds the dragged item over `cell`, which becomes the candidate origin.
    ///
    /// Validates bounds and occupancy, treating the item's own cells as free, and returns
    /// whether a drop here would commit. Replaces any previous candidate. Never mutates slots.
    pub fn begin_hover(&mut self, cell: CellPos) -> Result<bool, InventoryError> {
        let id = self.drag.active_item()?;
        let item = self.items.get(&id).ok_or(InventoryError::UnknownItem(id))?;
        let footprint = item.footprint();

        let can_drop = occupancy::is_region_free(&self.store, cell, footprint, Some(id));
        let highlights = occupancy::region_highlights(&self.store, cell, footprint, Some(id));
        log::trace!("Hovering {id} at {cell}: can_drop={can_drop}");

        self.drag.state = DragState::Hovering {
            item: id,
            candidate: HoverCandidate {
                origin: cell,
                can_drop,
                highlights,
            },
        };
        Ok(can_drop)
    }

    /// Moves the pointer off the candidate, discarding it.
    pub fn end_hover(&mut self) -> Result<(), InventoryError> {
        let item = self.drag.active_item()?;
        self.drag.state = DragState::Dragging { item };
        Ok(())
    }

    /// Drops the dragged item on the current candidate.
    ///
    /// The drag ends either way. If there is no candidate or it cannot take the item, the
    /// grid is unchanged and the outcome tells the caller where to put the item back.
    pub fn commit_drop(&mut self) -> Result<DropOutcome, InventoryError> {
        let (id, candidate) = match mem::take(&mut self.drag.state) {
            DragState::Idle => return Err(InventoryError::NoActiveDrag),
            DragState::Dragging { item } => (item, None),
            DragState::Hovering { item, candidate } => (item, Some(candidate)),
        };
        let Some(item) = self.items.get_mut(&id) else {
            return Err(InventoryError::UnknownItem(id));
        };

        let from = item.origin();
        let target = candidate.as_ref().map(HoverCandidate::origin);
        // Validated on hover, but the grid may have changed since.
        let committed = match &candidate {
            Some(candidate) if candidate.can_drop => {
                occupancy::relocate(&mut self.store, item, candidate.origin).is_ok()
            }
            _ => false,
        };

        if committed && let Some(to) = target {
            self.mark_changed();
            log::debug!("Moved {id} from {from} to {to}");
            self.events.publish(InventoryEvent::ItemMoved { item: id, from, to });
            return Ok(DropOutcome::Committed { item: id, from, to });
        }

        log::debug!("Drop of {id} refused, target {target:?}");
        self.events
            .publish(InventoryEvent::MoveRejected { item: id, target });
        Ok(DropOutcome::NotCommitted {
            item: id,
            origin: from,
            target,
        })
    }

    /// Abandons the drag without touching the grid. Returns the item that was being dragged.
    pub fn cancel_drag(&mut self) -> Result<ItemId, InventoryError> {
        let item = self.drag.active_item()?;
        self.drag.reset();
        Ok(item)
    }

    /// Returns the current hover candidate.
    #[must_use]
    pub fn hover(&self) -> Option<&HoverCandidate> {
        self.drag.candidate()
    }

    /// Returns the cells to highlight for the current hover, empty if not hovering.
    #[must_use]
    pub fn hover_highlights(&self) -> &[(CellPos, CellHighlight)] {
        self.drag
            .candidate()
            .map(HoverCandidate::highlights)
            .unwrap_or_default()
    }

    /// Returns where the dragged item would end up if dropped now.
    ///
    /// That is the hovered origin when it can take the item, otherwise the item's last
    /// committed origin. `None` when no drag is in progress.
    #[must_use]
    pub fn pending_origin(&self) -> Option<CellPos> {
        let id = self.drag.dragged_item()?;
        match self.drag.candidate() {
            Some(candidate) if candidate.can_drop => Some(candidate.origin),
            _ => self.items.get(&id).map(|item| item.origin()),
        }
    }

    /// Moves `item` to `target` in one step, bypassing the drag gestures.
    ///
    /// Fails with `InvalidMoveTarget` and no mutation if the target is out of bounds or
    /// overlaps another item.
    pub fn move_item(&mut self, id: ItemId, target: CellPos) -> Result<(), InventoryError> {
        if let Some(current) = self.drag.dragged_item() {
            return Err(InventoryError::DragInProgress(current));
        }
        let Some(item) = self.items.get_mut(&id) else {
            log::warn!("Tried to move {id}, which is not in the grid");
            return Err(InventoryError::UnknownItem(id));
        };

        let from = item.origin();
        if let Err(err) = occupancy::relocate(&mut self.store, item, target) {
            log::debug!("Move of {id} to {target} refused");
            self.events.publish(InventoryEvent::MoveRejected {
                item: id,
                target: Some(target),
            });
            return Err(err);
        }

        self.mark_changed();
        log::debug!("Moved {id} from {from} to {target}");
        self.events.publish(InventoryEvent::ItemMoved {
            item: id,
            from,
            to: target,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use satchel_utils::Footprint;

    use super::*;
    use crate::item::ItemKind;

    fn kind(id: &str, w: i32, h: i32) -> Arc<ItemKind> {
        Arc::new(ItemKind::new(id, Footprint::new(w, h).unwrap(), false, 1).unwrap())
    }

    /// A 4x4 grid with a 2x2 crate at (0,0) and a 1x1 rock at (3,3).
    fn setup() -> (InventoryGrid, ItemId, ItemId) {
        let mut grid = InventoryGrid::new(4, 4, 32).unwrap();
        let crate_id = grid.insert_new(kind("crate", 2, 2), 1, CellPos::ORIGIN).unwrap();
        let rock = grid.insert_new(kind("rock", 1, 1), 1, CellPos::new(3, 3)).unwrap();
        (grid, crate_id, rock)
    }

    #[test]
    fn test_drag_and_drop_commits() {
        let (mut grid, crate_id, _) = setup();
        let events = grid.subscribe();

        grid.begin_drag(crate_id).unwrap();
        assert!(grid.begin_hover(CellPos::new(2, 0)).unwrap());
        assert_eq!(grid.pending_origin(), Some(CellPos::new(2, 0)));

        let outcome = grid.commit_drop().unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Committed {
                item: crate_id,
                from: CellPos::ORIGIN,
                to: CellPos::new(2, 0)
            }
        );
        assert!(!grid.drag().is_dragging());
        assert_eq!(grid.item(crate_id).unwrap().origin(), CellPos::new(2, 0));
        assert!(!grid.is_occupied(CellPos::ORIGIN).unwrap());
        assert_eq!(
            grid.occupant_at(CellPos::new(3, 1)).unwrap().map(|item| item.id()),
            Some(crate_id)
        );
        assert_eq!(
            events.drain(),
            vec![InventoryEvent::ItemMoved {
                item: crate_id,
                from: CellPos::ORIGIN,
                to: CellPos::new(2, 0)
            }]
        );
    }

    #[test]
    fn test_move_onto_own_cells_succeeds() {
        let (mut grid, crate_id, _) = setup();
        grid.begin_drag(crate_id).unwrap();
        // Overlaps its own cells at (1,0) and (1,1).
        assert!(grid.begin_hover(CellPos::new(1, 0)).unwrap());
        assert!(
            grid.hover_highlights()
                .iter()
                .all(|(_, highlight)| *highlight == CellHighlight::Available)
        );
        assert!(grid.commit_drop().unwrap().is_committed());
        assert_eq!(
            grid.item(crate_id).unwrap().cells(),
            &[
                CellPos::new(1, 0),
                CellPos::new(2, 0),
                CellPos::new(1, 1),
                CellPos::new(2, 1)
            ]
        );
        assert_eq!(grid.free_cell_count(), 11);

        // Dropping back onto the exact same origin is also fine.
        grid.begin_drag(crate_id).unwrap();
        grid.begin_hover(CellPos::new(1, 0)).unwrap();
        assert!(grid.commit_drop().unwrap().is_committed());
    }

    #[test]
    fn test_blocked_drop_is_not_committed() {
        let (mut grid, crate_id, rock) = setup();
        let events = grid.subscribe();
        let before = grid.snapshot();

        grid.begin_drag(crate_id).unwrap();
        assert!(!grid.begin_hover(CellPos::new(2, 2)).unwrap());
        assert_eq!(
            grid.hover_highlights()
                .iter()
                .filter(|(_, highlight)| *highlight == CellHighlight::Blocked)
                .count(),
            1
        );
        assert_eq!(grid.pending_origin(), Some(CellPos::ORIGIN));

        let outcome = grid.commit_drop().unwrap();
        assert_eq!(
            outcome,
            DropOutcome::NotCommitted {
                item: crate_id,
                origin: CellPos::ORIGIN,
                target: Some(CellPos::new(2, 2))
            }
        );
        assert_eq!(
            outcome.into_result(),
            Err(InventoryError::InvalidMoveTarget {
                item: crate_id,
                target: CellPos::new(2, 2)
            })
        );
        assert_eq!(grid.snapshot(), before);
        assert_eq!(grid.item(rock).unwrap().origin(), CellPos::new(3, 3));
        assert!(!grid.drag().is_dragging());
        assert_eq!(
            events.drain(),
            vec![InventoryEvent::MoveRejected {
                item: crate_id,
                target: Some(CellPos::new(2, 2))
            }]
        );
    }

    #[test]
    fn test_drop_past_the_edge_is_refused() {
        let (mut grid, crate_id, _) = setup();
        grid.begin_drag(crate_id).unwrap();
        assert!(!grid.begin_hover(CellPos::new(3, 3)).unwrap());
        // Only the in-bounds cell is highlighted.
        assert_eq!(grid.hover_highlights().len(), 1);
        assert!(!grid.commit_drop().unwrap().is_committed());
        assert_eq!(grid.item(crate_id).unwrap().origin(), CellPos::ORIGIN);
    }

    #[test]
    fn test_hover_at_extreme_coordinates_is_refused() {
        let (mut grid, crate_id, _) = setup();
        grid.begin_drag(crate_id).unwrap();

        for cell in [
            CellPos::new(i32::MAX, 0),
            CellPos::new(0, i32::MAX),
            CellPos::new(i32::MAX, i32::MAX),
            CellPos::new(i32::MIN, i32::MIN),
        ] {
            assert_eq!(grid.begin_hover(cell), Ok(false));
            assert!(grid.hover_highlights().is_empty());
        }

        assert!(!grid.commit_drop().unwrap().is_committed());
        assert_eq!(grid.item(crate_id).unwrap().origin(), CellPos::ORIGIN);
        assert_eq!(
            grid.move_item(crate_id, CellPos::new(i32::MAX, i32::MAX)),
            Err(InventoryError::InvalidMoveTarget {
                item: crate_id,
                target: CellPos::new(i32::MAX, i32::MAX)
            })
        );
    }

    #[test]
    fn test_hover_exit_reverts_pending_origin() {
        let (mut grid, crate_id, _) = setup();
        grid.begin_drag(crate_id).unwrap();
        grid.begin_hover(CellPos::new(0, 2)).unwrap();
        assert_eq!(grid.pending_origin(), Some(CellPos::new(0, 2)));

        grid.end_hover().unwrap();
        assert_eq!(grid.pending_origin(), Some(CellPos::ORIGIN));
        assert!(grid.hover().is_none());
        assert!(grid.hover_highlights().is_empty());

        let outcome = grid.commit_drop().unwrap();
        assert_eq!(
            outcome,
            DropOutcome::NotCommitted {
                item: crate_id,
                origin: CellPos::ORIGIN,
                target: None
            }
        );
    }

    #[test]
    fn test_cancel_leaves_grid_untouched() {
        let (mut grid, crate_id, _) = setup();
        let before = grid.snapshot();
        let changes = grid.times_changed();

        grid.begin_drag(crate_id).unwrap();
        grid.begin_hover(CellPos::new(2, 0)).unwrap();
        assert_eq!(grid.cancel_drag(), Ok(crate_id));

        assert_eq!(grid.snapshot(), before);
        assert_eq!(grid.times_changed(), changes);
        assert_eq!(grid.pending_origin(), None);
    }

    #[test]
    fn test_drag_caller_errors() {
        let (mut grid, crate_id, rock) = setup();
        assert_eq!(grid.begin_hover(CellPos::ORIGIN), Err(InventoryError::NoActiveDrag));
        assert_eq!(grid.end_hover(), Err(InventoryError::NoActiveDrag));
        assert_eq!(grid.commit_drop(), Err(InventoryError::NoActiveDrag));
        assert_eq!(grid.cancel_drag(), Err(InventoryError::NoActiveDrag));
        assert_eq!(
            grid.begin_drag(ItemId(99)),
            Err(InventoryError::UnknownItem(ItemId(99)))
        );

        grid.begin_drag(crate_id).unwrap();
        assert_eq!(
            grid.begin_drag(rock),
            Err(InventoryError::DragInProgress(crate_id))
        );
        assert_eq!(
            grid.move_item(rock, CellPos::new(2, 2)),
            Err(InventoryError::DragInProgress(crate_id))
        );
    }

    #[test]
    fn test_removing_dragged_item_cancels_drag() {
        let (mut grid, crate_id, _) = setup();
        grid.begin_drag(crate_id).unwrap();
        grid.begin_hover(CellPos::new(2, 0)).unwrap();
        grid.remove_item(crate_id).unwrap();

        assert!(!grid.drag().is_dragging());
        assert_eq!(grid.commit_drop(), Err(InventoryError::NoActiveDrag));
    }

    #[test]
    fn test_stale_candidate_is_revalidated_on_drop() {
        let (mut grid, crate_id, _) = setup();
        grid.begin_drag(crate_id).unwrap();
        assert!(grid.begin_hover(CellPos::new(2, 0)).unwrap());

        // Something lands in the target while the crate is still held.
        grid.insert_new(kind("pebble", 1, 1), 1, CellPos::new(3, 1))
            .unwrap();

        assert!(!grid.commit_drop().unwrap().is_committed());
        assert_eq!(grid.item(crate_id).unwrap().origin(), CellPos::ORIGIN);
        assert!(grid.verify().is_ok());
    }

    #[test]
    fn test_move_item() {
        let (mut grid, crate_id, rock) = setup();
        grid.move_item(rock, CellPos::new(0, 3)).unwrap();
        assert_eq!(grid.item(rock).unwrap().origin(), CellPos::new(0, 3));

        assert_eq!(
            grid.move_item(crate_id, CellPos::new(3, 3)),
            Err(InventoryError::InvalidMoveTarget {
                item: crate_id,
                target: CellPos::new(3, 3)
            })
        );
        assert_eq!(
            grid.move_item(crate_id, CellPos::new(0, 2)),
            Err(InventoryError::InvalidMoveTarget {
                item: crate_id,
                target: CellPos::new(0, 2)
            })
        );
        grid.move_item(crate_id, CellPos::new(2, 2)).unwrap();
        assert!(grid.verify().is_ok());
    }
}
