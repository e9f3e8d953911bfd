//! A grid shared between threads.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RawMutex, lock_api::ArcMutexGuard};
use satchel_utils::CellPos;

use crate::error::InventoryError;
use crate::events::Subscription;
use crate::inventory::{Acquired, DropOutcome, InventoryGrid};
use crate::item::{AcquisitionRequest, ItemId};

/// A cloneable handle to one grid behind a single writer lock.
///
/// Each method holds the lock for the whole operation, so other threads never see a
/// half-applied mutation. Use [`with`](Self::with) to run several steps under one lock.
#[derive(Debug, Clone)]
pub struct SharedInventory {
    grid: Arc<Mutex<InventoryGrid>>,
}

impl SharedInventory {
    /// Wraps `grid`.
    #[must_use]
    pub fn new(grid: InventoryGrid) -> Self {
        Self {
            grid: Arc::new(Mutex::new(grid)),
        }
    }

    /// Runs `f` with exclusive access to the grid.
    pub fn with<R>(&self, f: impl FnOnce(&mut InventoryGrid) -> R) -> R {
        f(&mut self.grid.lock())
    }

    /// Locks the grid for the lifetime of the guard.
    pub fn lock(&self) -> MutexGuard<'_, InventoryGrid> {
        self.grid.lock()
    }

    /// Locks the grid with a guard that keeps the handle alive, so it can be moved across
    /// threads or stored.
    #[must_use]
    pub fn lock_arc(&self) -> ArcMutexGuard<RawMutex, InventoryGrid> {
        self.grid.lock_arc()
    }

    /// Subscribes to the grid's events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.grid.lock().subscribe()
    }

    /// See [`InventoryGrid::try_acquire`].
    pub fn try_acquire(&self, request: &AcquisitionRequest) -> Result<Acquired, InventoryError> {
        self.grid.lock().try_acquire(request)
    }

    /// See [`InventoryGrid::move_item`].
    pub fn move_item(&self, item: ItemId, target: CellPos) -> Result<(), InventoryError> {
        self.grid.lock().move_item(item, target)
    }

    /// See [`InventoryGrid::commit_drop`].
    pub fn commit_drop(&self) -> Result<DropOutcome, InventoryError> {
        self.grid.lock().commit_drop()
    }

    /// See [`InventoryGrid::remove_item`]. Returns the removed item's count.
    pub fn remove_item(&self, item: ItemId) -> Result<u32, InventoryError> {
        self.grid.lock().remove_item(item).map(|item| item.count())
    }

    /// Takes the grid back out, if this is the last handle.
    pub fn try_unwrap(self) -> Result<InventoryGrid, Self> {
        Arc::try_unwrap(self.grid)
            .map(Mutex::into_inner)
            .map_err(|grid| Self { grid })
    }
}
