//! Inventory domain module.
//!
//! This crate contains business rules for bead inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod item;

pub use category::{OTHER_CATEGORY, category_index, category_of, letter_prefix, matches_category};
pub use item::{AdjustDirection, Adjustment, InventoryItem, ItemCode, Quantity};
