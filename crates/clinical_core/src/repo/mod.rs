//! Repository layer: data-access contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the shared CRUD contract and error taxonomy.
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Repositories never commit or roll back; callers own transactions.
//! - Default reads hide soft-deleted rows.

pub mod contract;
pub mod mapping;
pub mod patient_repo;
pub mod record_repo;
