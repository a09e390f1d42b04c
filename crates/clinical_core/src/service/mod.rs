//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into transactional use-cases.
//! - Keep CLI callers decoupled from storage details.

pub mod patient_service;
