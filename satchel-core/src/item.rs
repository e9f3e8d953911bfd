//! Item kinds, acquisition requests and placed items.

use std::{fmt, sync::Arc};

use rustc_hash::FxHashMap;
use satchel_utils::{CellPos, Footprint};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::InventoryError;

/// Opaque identifier of an item resident in the grid.
///
/// Slots refer to their occupant through this id; the grid resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Broad item category, used by collaborators for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ItemCategory {
    Tool,
    Weapon,
    Material,
    #[default]
    Other,
}

/// The shared definition of a kind of item.
///
/// Two kinds are the same kind iff their ids match.
#[derive(Debug, Clone)]
pub struct ItemKind {
    id: String,
    name: String,
    category: ItemCategory,
    footprint: Footprint,
    stackable: bool,
    max_stack_size: u32,
}

impl ItemKind {
    /// Creates a new kind.
    ///
    /// `max_stack_size` must be at least 1. Non-stackable kinds always hold exactly one item
    /// regardless of `max_stack_size`.
    pub fn new(
        id: impl Into<String>,
        footprint: Footprint,
        stackable: bool,
        max_stack_size: u32,
    ) -> Result<Self, InventoryError> {
        let id = id.into();
        if max_stack_size == 0 {
            return Err(InventoryError::InvalidStackSize {
                kind: id,
                max: max_stack_size,
            });
        }
        Ok(Self {
            name: id.clone(),
            id,
            category: ItemCategory::default(),
            footprint,
            stackable,
            max_stack_size,
        })
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    /// Returns the kind id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> ItemCategory {
        self.category
    }

    /// Returns the footprint.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Returns whether several items of this kind can share one placed stack.
    #[must_use]
    pub fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// Returns the configured maximum stack size.
    #[must_use]
    pub fn max_stack_size(&self) -> u32 {
        self.max_stack_size
    }

    /// Returns the largest count a single placed stack of this kind may hold.
    #[must_use]
    pub fn effective_max_stack(&self) -> u32 {
        if self.stackable { self.max_stack_size } else { 1 }
    }
}

impl PartialEq for ItemKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ItemKind {}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A request to put `count` items of `kind` into the grid.
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    /// The kind being acquired.
    pub kind: Arc<ItemKind>,
    /// How many items the source offers. Must be at least 1.
    pub count: u32,
}

impl AcquisitionRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(kind: Arc<ItemKind>, count: u32) -> Self {
        Self { kind, count }
    }
}

/// An item stack resident in the grid.
///
/// Only the grid creates, mutates and destroys these; collaborators get shared references.
#[derive(Debug, Clone)]
pub struct PlacedItem {
    id: ItemId,
    kind: Arc<ItemKind>,
    count: u32,
    origin: CellPos,
    /// Back-references to the slots this item occupies, row-major.
    pub(crate) cells: SmallVec<[CellPos; 4]>,
}

impl PlacedItem {
    /// Creates an item that does not yet occupy any cells.
    pub(crate) fn new(id: ItemId, kind: Arc<ItemKind>, count: u32, origin: CellPos) -> Self {
        Self {
            id,
            kind,
            count,
            origin,
            cells: SmallVec::new(),
        }
    }

    /// Returns the item id.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the item's kind.
    #[must_use]
    pub fn kind(&self) -> &Arc<ItemKind> {
        &self.kind
    }

    /// Returns the stack count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the top-left cell of the item's footprint.
    #[must_use]
    pub fn origin(&self) -> CellPos {
        self.origin
    }

    /// Returns the footprint.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        self.kind.footprint()
    }

    /// Returns the cells currently recorded as occupied by this item.
    #[must_use]
    pub fn cells(&self) -> &[CellPos] {
        &self.cells
    }

    /// Returns how many more items this stack can take.
    #[must_use]
    pub fn remaining_capacity(&self) -> u32 {
        self.kind.effective_max_stack().saturating_sub(self.count)
    }

    /// Returns whether `count` more items of `kind` can be merged into this stack.
    #[must_use]
    pub fn can_merge(&self, kind: &ItemKind, count: u32) -> bool {
        *self.kind == *kind
            && self.kind.is_stackable()
            && self
                .count
                .checked_add(count)
                .is_some_and(|total| total <= self.kind.max_stack_size())
    }

    pub(crate) fn grow(&mut self, amount: u32) {
        self.count += amount;
    }

    pub(crate) fn set_origin(&mut self, origin: CellPos) {
        self.origin = origin;
    }
}

/// A lookup of item kinds by id.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    kinds: FxHashMap<String, Arc<ItemKind>>,
    order: Vec<String>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a kind, replacing any previous kind with the same id.
    pub fn insert(&mut self, kind: ItemKind) -> Arc<ItemKind> {
        let kind = Arc::new(kind);
        if self
            .kinds
            .insert(kind.id().to_owned(), Arc::clone(&kind))
            .is_none()
        {
            self.order.push(kind.id().to_owned());
        }
        kind
    }

    /// Looks up a kind by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<ItemKind>> {
        self.kinds.get(id).cloned()
    }

    /// Looks up a kind by id, failing with `UnknownKind`.
    pub fn resolve(&self, id: &str) -> Result<Arc<ItemKind>, InventoryError> {
        self.get(id)
            .ok_or_else(|| InventoryError::UnknownKind(id.to_owned()))
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates the kinds in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ItemKind>> {
        self.order.iter().filter_map(|id| self.kinds.get(id))
    }
}
