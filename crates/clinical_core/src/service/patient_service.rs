//! Patient use-case service.
//!
//! # Responsibility
//! - Own the transaction around multi-entity writes (patient + record).
//! - Delegate every statement to the repositories.
//!
//! # Invariants
//! - Each write use-case commits once or not at all; an early return drops
//!   the transaction, which rolls it back.
//! - Service APIs never bypass repository contracts.

use crate::db::{ConnectionProvider, SqliteConnectionProvider};
use crate::model::clinical_record::{ClinicalRecord, RecordId};
use crate::model::patient::{Patient, PatientId};
use crate::model::validation::ValidationError;
use crate::repo::contract::{RepoError, RepoResult, Repository};
use crate::repo::patient_repo::{PatientRepository, SqlitePatientRepository};
use crate::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Service wired over the SQLite repositories.
pub type SqlitePatientService = PatientService<
    SqliteConnectionProvider,
    SqlitePatientRepository<
        SqliteConnectionProvider,
        SqliteRecordRepository<SqliteConnectionProvider>,
    >,
>;

/// Use-case service for patients and their clinical records.
pub struct PatientService<P, R> {
    provider: P,
    patients: R,
}

impl SqlitePatientService {
    /// Wires provider, record repository and patient repository together.
    pub fn sqlite(provider: SqliteConnectionProvider) -> Self {
        let records = SqliteRecordRepository::new(provider.clone());
        let patients = SqlitePatientRepository::new(provider.clone(), records);
        PatientService::new(provider, patients)
    }
}

impl<P: ConnectionProvider, R: PatientRepository> PatientService<P, R> {
    pub fn new(provider: P, patients: R) -> Self {
        Self { provider, patients }
    }

    pub fn patients(&self) -> &R {
        &self.patients
    }

    /// Creates a patient and its clinical record in one transaction.
    ///
    /// `record.patient_id` is overwritten with the new patient id.
    pub fn register(
        &self,
        patient: &Patient,
        record: &ClinicalRecord,
    ) -> RepoResult<(PatientId, RecordId)> {
        let started_at = Instant::now();
        let result = self.in_transaction(|tx| {
            let patient_id = self.patients.create(patient, tx)?;
            let record = record.clone().for_patient(patient_id);
            let record_id = self.patients.records().create(&record, tx)?;
            Ok((patient_id, record_id))
        });
        log_outcome("patient_register", started_at, &result);
        result
    }

    /// Updates a patient and, when attached, its clinical record.
    ///
    /// The attached record must be the patient's active record; a record owned
    /// by another patient is rejected and nothing is written.
    pub fn update_with_record(&self, patient: &Patient) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = check_record_owner(patient).and_then(|()| {
            self.in_transaction(|tx| {
                self.patients.update(patient, tx)?;
                if let (Some(patient_id), Some(record)) =
                    (patient.id, patient.clinical_record.as_ref())
                {
                    self.ensure_active_record(patient_id, record, tx)?;
                    self.patients.records().update(record, tx)?;
                }
                Ok(())
            })
        });
        log_outcome("patient_update", started_at, &result);
        result
    }

    /// Soft-deletes a patient together with its active clinical record.
    pub fn remove(&self, patient_id: PatientId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.in_transaction(|tx| {
            let records = self.patients.records();
            if let Some(record_id) = records.active_record_id(patient_id, tx)? {
                records.soft_delete(record_id, tx)?;
            }
            self.patients.soft_delete(patient_id, tx)
        });
        log_outcome("patient_remove", started_at, &result);
        result
    }

    pub fn get(&self, patient_id: PatientId) -> RepoResult<Option<Patient>> {
        self.patients.read(patient_id)
    }

    pub fn find_by_national_id(&self, national_id: &str) -> RepoResult<Option<Patient>> {
        self.patients.find_by_national_id(national_id)
    }

    pub fn list(&self) -> RepoResult<Vec<Patient>> {
        self.patients.read_all()
    }

    /// Attaches a new record to an existing, record-less patient.
    pub fn attach_record(
        &self,
        patient_id: PatientId,
        record: &ClinicalRecord,
    ) -> RepoResult<RecordId> {
        if self.patients.read(patient_id)?.is_none() {
            return Err(RepoError::Persistence(format!(
                "cannot attach record: patient {patient_id} not found or deleted"
            )));
        }
        let record = record.clone().for_patient(patient_id);
        self.in_transaction(|tx| self.patients.records().create(&record, tx))
    }

    fn ensure_active_record(
        &self,
        patient_id: PatientId,
        record: &ClinicalRecord,
        tx: &Connection,
    ) -> RepoResult<()> {
        let record_id = record.id.ok_or(ValidationError::MissingId {
            entity: "clinical record",
        })?;
        let active = self.patients.records().active_record_id(patient_id, tx)?;
        if active != Some(record_id) {
            return Err(RepoError::Persistence(format!(
                "clinical record {record_id} is not the active record of patient {patient_id}"
            )));
        }
        Ok(())
    }

    fn in_transaction<T>(
        &self,
        work: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut conn = self.provider.acquire().map_err(RepoError::Connection)?;
        let tx = conn.transaction()?;
        let value = work(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn check_record_owner(patient: &Patient) -> RepoResult<()> {
    let owners = (
        patient.id,
        patient.clinical_record.as_ref().and_then(|record| record.patient_id),
    );
    match owners {
        (Some(patient_id), Some(record_patient_id)) if patient_id != record_patient_id => {
            Err(ValidationError::RecordOwnerMismatch {
                patient_id,
                record_patient_id,
            }
            .into())
        }
        _ => Ok(()),
    }
}

fn log_outcome<T>(event: &str, started_at: Instant, result: &RepoResult<T>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!("event={event} module=service status=ok duration_ms={duration_ms}"),
        Err(RepoError::Validation(err)) => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error_code=validation error={err}"
        ),
        Err(err) => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error={err}"
        ),
    }
}
