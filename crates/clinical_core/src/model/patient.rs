//! Patient domain model.
//!
//! # Responsibility
//! - Define the patient aggregate read back by the patient repository.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on insert.
//! - `national_id` is unique among non-deleted patients (store-enforced).
//! - `clinical_record` is populated on read, never written by patient writes.

use crate::model::clinical_record::ClinicalRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-generated patient identifier.
pub type PatientId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Option<PatientId>,
    pub is_deleted: bool,
    pub first_name: String,
    pub last_name: String,
    /// National identity document number (`dni`).
    pub national_id: String,
    pub birth_date: NaiveDate,
    /// Attached on read from `historia_clinica.paciente_id`.
    pub clinical_record: Option<ClinicalRecord>,
}

impl Patient {
    /// Creates an unsaved, active patient with no attached record.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_id: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            is_deleted: false,
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id: national_id.into(),
            birth_date,
            clinical_record: None,
        }
    }

    /// Returns whether this patient is visible to default reads.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
