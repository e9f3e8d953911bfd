//! # Satchel Core
//!
//! A grid inventory: items with rectangular footprints placed on a fixed grid of slots,
//! stacked where possible and moved around by drag and drop.
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    missing_docs,
    clippy::unwrap_used
)]
#![allow(
    clippy::single_call_fn,
    clippy::multiple_inherent_impl,
    clippy::shadow_unrelated,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata,
    clippy::multiple_crate_versions
)]

pub mod command;
pub mod config;
mod error;
pub mod events;
pub mod inventory;
pub mod item;
mod shared;

pub use command::{CommandOutcome, InventoryCommand, dispatch};
pub use config::{ConfigError, ItemKindConfig, SatchelConfig};
pub use error::InventoryError;
pub use events::{EventChannel, InventoryEvent, Subscription};
pub use inventory::{
    Acquired, CellHighlight, DragState, DropOutcome, GridStore, HoverCandidate, InventoryGrid,
    OccupancySnapshot, StackAction,
};
pub use item::{AcquisitionRequest, ItemCatalog, ItemCategory, ItemId, ItemKind, PlacedItem};
pub use shared::SharedInventory;
