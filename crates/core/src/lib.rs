//! Roster core library.
//!
//! Pure request-shaping logic shared by the persistence and HTTP layers:
//! field selection, data shaping, pagination, sorting and patch merging.
//! Nothing in this crate performs I/O.

pub mod error;
pub mod field_selection;
pub mod pagination;
pub mod patch;
pub mod shaping;
pub mod sorting;
pub mod types;
