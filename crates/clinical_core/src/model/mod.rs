//! Domain model for patients and their clinical records.
//!
//! # Responsibility
//! - Define the entity values mapped to and from `paciente` / `historia_clinica`.
//!
//! # Invariants
//! - Identifiers are store-generated and absent until insert.
//! - Deletion is a soft-delete flag, never a physical removal.

pub mod blood_type;
pub mod clinical_record;
pub mod patient;
pub mod validation;
