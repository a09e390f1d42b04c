//! Input preconditions checked before any store access.

use crate::model::patient::PatientId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Precondition failures on entity shape or state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A clinical record was submitted without its owning patient id.
    MissingPatientId,
    /// An update targeted an entity that was never persisted.
    MissingId { entity: &'static str },
    /// A record was submitted under a patient it does not belong to.
    RecordOwnerMismatch {
        patient_id: PatientId,
        record_patient_id: PatientId,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPatientId => {
                write!(f, "clinical record must reference a persisted patient id")
            }
            Self::MissingId { entity } => write!(f, "{entity} has no id; persist it first"),
            Self::RecordOwnerMismatch {
                patient_id,
                record_patient_id,
            } => write!(
                f,
                "clinical record belongs to patient {record_patient_id}, not {patient_id}"
            ),
        }
    }
}

impl Error for ValidationError {}
