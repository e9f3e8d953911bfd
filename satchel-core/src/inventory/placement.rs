//! Placement of acquired items: merge into an existing stack, else first-fit a new one.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use satchel_utils::{CellPos, Footprint};

use super::{GridStore, InventoryGrid, Slot, occupancy};
use crate::error::InventoryError;
use crate::events::InventoryEvent;
use crate::item::{AcquisitionRequest, ItemId, ItemKind, PlacedItem};

/// How an acquisition was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    /// The items were added to an existing stack.
    Merged,
    /// A new stack was created.
    Created,
}

/// The result of a successful acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    /// The stack that now holds the items.
    pub item: ItemId,
    /// Whether the stack was merged into or created.
    pub action: StackAction,
    /// How many of the requested items were taken. The source should shrink by this much.
    pub accepted: u32,
    /// How many requested items did not fit into the new stack and were left with the source.
    pub rejected: u32,
    /// The stack's count after the acquisition.
    pub count: u32,
}

impl Acquired {
    /// Returns true if some of the requested items were left over.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.rejected > 0
    }
}

/// Finds the first stack, in row-major cell order, that can take `count` more of `kind`.
///
/// Stacks that would overflow are skipped rather than partially filled.
fn find_merge_target(
    store: &GridStore,
    items: &FxHashMap<ItemId, PlacedItem>,
    kind: &ItemKind,
    count: u32,
) -> Option<ItemId> {
    if !kind.is_stackable() {
        return None;
    }

    let mut checked = FxHashSet::default();
    store
        .slots()
        .filter_map(Slot::occupant)
        .filter(|id| checked.insert(*id))
        .find(|id| items.get(id).is_some_and(|item| item.can_merge(kind, count)))
}

/// Finds the first origin, in row-major order, where `footprint` fits on free cells.
fn find_first_fit(store: &GridStore, footprint: Footprint) -> Option<CellPos> {
    store
        .slots()
        .map(Slot::pos)
        .find(|&origin| occupancy::is_region_free(store, origin, footprint, None))
}

impl InventoryGrid {
    /// Puts the requested items into the grid.
    ///
    /// Tries, in order: merging into the first compatible stack that has room for the whole
    /// request, then creating a new stack at the first free region that fits the footprint.
    /// A new stack holds at most the kind's stack limit; anything beyond that is reported in
    /// [`Acquired::rejected`] and stays with the caller.
    ///
    /// Fails with `NoSpace`, leaving the grid untouched, when neither works.
    pub fn try_acquire(&mut self, request: &AcquisitionRequest) -> Result<Acquired, InventoryError> {
        let kind = &request.kind;
        if request.count == 0 {
            return Err(InventoryError::EmptyRequest {
                kind: kind.id().to_owned(),
            });
        }

        if let Some(id) = find_merge_target(&self.store, &self.items, kind, request.count)
            && let Some(item) = self.items.get_mut(&id)
        {
            item.grow(request.count);
            let count = item.count();
            self.mark_changed();

            log::debug!("Merged {} x{} into {id}, now {count}", kind, request.count);
            self.events.publish(InventoryEvent::StackMerged {
                item: id,
                added: request.count,
                count,
            });
            return Ok(Acquired {
                item: id,
                action: StackAction::Merged,
                accepted: request.count,
                rejected: 0,
                count,
            });
        }

        let Some(origin) = find_first_fit(&self.store, kind.footprint()) else {
            log::debug!("No space for {} x{}", kind, request.count);
            self.events.publish(InventoryEvent::AcquireRejected {
                kind: kind.id().to_owned(),
                requested: request.count,
            });
            return Err(InventoryError::NoSpace {
                kind: kind.id().to_owned(),
            });
        };

        let accepted = request.count.min(kind.effective_max_stack());
        let rejected = request.count - accepted;
        let id = self.insert_new(Arc::clone(kind), accepted, origin)?;

        log::debug!("Placed {} x{accepted} as {id} at {origin}", kind);
        if rejected > 0 {
            log::debug!("Left {rejected} of {} with the source, over the stack limit", kind);
        }
        self.events.publish(InventoryEvent::ItemPlaced {
            item: id,
            kind: kind.id().to_owned(),
            origin,
            count: accepted,
        });
        Ok(Acquired {
            item: id,
            action: StackAction::Created,
            accepted,
            rejected,
            count: accepted,
        })
    }

    /// Returns whether [`try_acquire`](Self::try_acquire) would succeed, without mutating.
    #[must_use]
    pub fn can_acquire(&self, request: &AcquisitionRequest) -> bool {
        request.count > 0
            && (find_merge_target(&self.store, &self.items, &request.kind, request.count)
                .is_some()
                || find_first_fit(&self.store, request.kind.footprint()).is_some())
    }

    /// Returns the first free origin for `footprint`, in row-major order.
    #[must_use]
    pub fn first_fit(&self, footprint: Footprint) -> Option<CellPos> {
        find_first_fit(&self.store, footprint)
    }
}
