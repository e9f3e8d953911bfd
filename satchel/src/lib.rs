//! # Satchel
//!
//! A headless driver for the satchel inventory grid: loads a config, replays scripted
//! commands and prints the resulting grid.
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
use std::{fs, path::Path};

use anyhow::Context;
use satchel_core::{
    InventoryCommand, InventoryEvent, InventoryGrid, ItemCatalog, SatchelConfig, Subscription,
    dispatch,
};

pub mod logger;

/// Counts of how a script run went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Commands that completed.
    pub succeeded: usize,
    /// Commands that returned an error. The grid is unchanged by each of them.
    pub failed: usize,
}

/// One grid plus the catalog its commands resolve against.
pub struct SatchelDriver {
    catalog: ItemCatalog,
    grid: InventoryGrid,
    events: Subscription,
}

impl SatchelDriver {
    /// Builds an empty grid and catalog from `config`.
    pub fn new(config: &SatchelConfig) -> anyhow::Result<Self> {
        let catalog = config.catalog().context("building the item catalog")?;
        let grid = config.build_grid().context("building the grid")?;
        let events = grid.subscribe();
        log::info!(
            "Created a {}x{} grid with {} item kinds",
            grid.columns(),
            grid.rows(),
            catalog.len()
        );

        Ok(Self {
            catalog,
            grid,
            events,
        })
    }

    /// Returns the grid.
    #[must_use]
    pub fn grid(&self) -> &InventoryGrid {
        &self.grid
    }

    /// Reads a JSON5 array of commands.
    pub fn load_script(path: &Path) -> anyhow::Result<Vec<InventoryCommand>> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        serde_json5::from_str(&text).with_context(|| format!("parsing script {}", path.display()))
    }

    /// Runs each command in order. A failing command is logged and skipped.
    pub fn run(&mut self, commands: &[InventoryCommand]) -> RunReport {
        let mut report = RunReport::default();
        for command in commands {
            match dispatch(&mut self.grid, &self.catalog, command) {
                Ok(outcome) => {
                    report.succeeded += 1;
                    tracing::info!("{outcome}");
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!("{command:?} failed: {err}");
                }
            }
            for event in self.events.drain() {
                log_event(&event);
            }
        }
        report
    }

    /// Draws the grid as text, one line per row. Free cells are `.`, occupied cells show the
    /// occupant's id.
    #[must_use]
    pub fn render(&self) -> String {
        let snapshot = self.grid.snapshot();
        let mut out = String::new();
        for row in snapshot.rows() {
            for cell in row {
                let label = cell.map_or_else(|| ".".to_owned(), |id| id.0.to_string());
                out.push_str(&format!("{label:>4}"));
            }
            out.push('\n');
        }
        out
    }

    /// Serializes the current occupancy.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.grid.snapshot())
    }
}

fn log_event(event: &InventoryEvent) {
    tracing::debug!(target: "satchel::events", "{event:?}");
}
