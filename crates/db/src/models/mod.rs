//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row,
//!   shapeable field by field
//! - A validated `Deserialize` create DTO for inserts
//! - A validated update DTO (full replacement), which is also the transfer
//!   shape targeted by patch documents

pub mod company;
pub mod employee;
