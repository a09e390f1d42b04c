//! Persistence core for patients and their clinical records.
//! This crate is the single source of truth for data-access invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{db_config, init_config, ConfigError, DbConfig};
pub use db::{ConnectionProvider, DbError, DbResult, SqliteConnectionProvider};
pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use model::blood_type::BloodType;
pub use model::clinical_record::{ClinicalRecord, RecordId};
pub use model::patient::{Patient, PatientId};
pub use model::validation::ValidationError;
pub use repo::contract::{RepoError, RepoResult, Repository};
pub use repo::patient_repo::{PatientRepository, SqlitePatientRepository};
pub use repo::record_repo::{RecordRepository, SqliteRecordRepository};
pub use service::patient_service::{PatientService, SqlitePatientService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
