//! # Satchel Utils
//!
//! Plain value types shared by the satchel crates.
#![allow(missing_docs)]

mod types;

pub use types::{CellPos, Footprint, ScreenPos};
