//! Scripted commands against a grid.

use std::{fmt, sync::Arc};

use satchel_utils::CellPos;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::inventory::{Acquired, DropOutcome, InventoryGrid, StackAction};
use crate::item::{AcquisitionRequest, ItemCatalog, ItemId};

/// One discrete input to the grid, as read from a script or another process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InventoryCommand {
    /// Pick up `count` items of the kind with id `kind`.
    Acquire {
        /// Kind id, resolved against the catalog.
        kind: String,
        /// Offered count.
        #[serde(default = "one")]
        count: u32,
    },
    /// Start dragging an item.
    BeginDrag {
        /// The item to drag.
        item: ItemId,
    },
    /// Hold the dragged item over a cell.
    Hover {
        /// Column of the candidate origin.
        col: i32,
        /// Row of the candidate origin.
        row: i32,
    },
    /// Move the pointer off the grid.
    EndHover,
    /// Drop the dragged item.
    Drop,
    /// Abandon the drag.
    CancelDrag,
    /// Discard an item.
    Remove {
        /// The item to discard.
        item: ItemId,
    },
}

fn one() -> u32 {
    1
}

/// What a successfully dispatched command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Items were taken in.
    Acquired(Acquired),
    /// A drag started.
    DragStarted(ItemId),
    /// The dragged item is over a cell.
    Hovering {
        /// The candidate origin.
        origin: CellPos,
        /// Whether dropping would commit.
        can_drop: bool,
    },
    /// The hover candidate was discarded.
    HoverEnded,
    /// The drag ended with a drop.
    Dropped(DropOutcome),
    /// The drag was abandoned.
    DragCancelled(ItemId),
    /// An item left the grid.
    Removed {
        /// The removed item.
        item: ItemId,
        /// Its kind id.
        kind: String,
        /// Its count.
        count: u32,
    },
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquired(acquired) => {
                let verb = match acquired.action {
                    StackAction::Merged => "merged into",
                    StackAction::Created => "created",
                };
                write!(
                    f,
                    "{verb} {} (+{}, now {})",
                    acquired.item, acquired.accepted, acquired.count
                )?;
                if acquired.rejected > 0 {
                    write!(f, ", {} left over", acquired.rejected)?;
                }
                Ok(())
            }
            Self::DragStarted(item) => write!(f, "dragging {item}"),
            Self::Hovering { origin, can_drop } => {
                let state = if *can_drop { "free" } else { "blocked" };
                write!(f, "hovering {origin}, {state}")
            }
            Self::HoverEnded => f.write_str("hover ended"),
            Self::Dropped(DropOutcome::Committed { item, from, to }) => {
                write!(f, "moved {item} from {from} to {to}")
            }
            Self::Dropped(DropOutcome::NotCommitted { item, origin, .. }) => {
                write!(f, "drop refused, {item} stays at {origin}")
            }
            Self::DragCancelled(item) => write!(f, "drag of {item} cancelled"),
            Self::Removed { item, kind, count } => write!(f, "removed {item} ({kind} x{count})"),
        }
    }
}

/// Runs one command against `grid` to completion.
pub fn dispatch(
    grid: &mut InventoryGrid,
    catalog: &ItemCatalog,
    command: &InventoryCommand,
) -> Result<CommandOutcome, InventoryError> {
    log::trace!("Dispatching {command:?}");
    match command {
        InventoryCommand::Acquire { kind, count } => {
            let kind = catalog.resolve(kind)?;
            let request = AcquisitionRequest::new(Arc::clone(&kind), *count);
            grid.try_acquire(&request).map(CommandOutcome::Acquired)
        }
        InventoryCommand::BeginDrag { item } => {
            grid.begin_drag(*item)?;
            Ok(CommandOutcome::DragStarted(*item))
        }
        InventoryCommand::Hover { col, row } => {
            let origin = CellPos::new(*col, *row);
            let can_drop = grid.begin_hover(origin)?;
            Ok(CommandOutcome::Hovering { origin, can_drop })
        }
        InventoryCommand::EndHover => {
            grid.end_hover()?;
            Ok(CommandOutcome::HoverEnded)
        }
        InventoryCommand::Drop => grid.commit_drop().map(CommandOutcome::Dropped),
        InventoryCommand::CancelDrag => grid.cancel_drag().map(CommandOutcome::DragCancelled),
        InventoryCommand::Remove { item } => {
            let removed = grid.remove_item(*item)?;
            Ok(CommandOutcome::Removed {
                item: removed.id(),
                kind: removed.kind().id().to_owned(),
                count: removed.count(),
            })
        }
    }
}
