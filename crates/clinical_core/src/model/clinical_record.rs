//! Clinical record domain model.
//!
//! # Responsibility
//! - Define the single clinical record owned by a patient.
//!
//! # Invariants
//! - `patient_id` must be set before the record can be created.
//! - The record holds the back-reference; the patient never stores a record id.
//! - Soft delete leaves `patient_id` untouched.

use crate::model::blood_type::BloodType;
use crate::model::patient::PatientId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-generated clinical record identifier.
pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub id: Option<RecordId>,
    pub is_deleted: bool,
    /// Human-assigned record number (`nro_historia`).
    pub record_number: String,
    pub blood_type: BloodType,
    pub history: Option<String>,
    pub current_medication: Option<String>,
    pub observations: Option<String>,
    /// Owning patient. Required for create.
    pub patient_id: Option<PatientId>,
}

impl ClinicalRecord {
    /// Creates an unsaved, active record with empty notes and no owner yet.
    pub fn new(record_number: impl Into<String>, blood_type: BloodType) -> Self {
        Self {
            id: None,
            is_deleted: false,
            record_number: record_number.into(),
            blood_type,
            history: None,
            current_medication: None,
            observations: None,
            patient_id: None,
        }
    }

    /// Builder-style owner assignment.
    pub fn for_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    /// Returns the owning patient id or a validation error when unset.
    pub fn require_patient_id(&self) -> Result<PatientId, ValidationError> {
        self.patient_id.ok_or(ValidationError::MissingPatientId)
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
