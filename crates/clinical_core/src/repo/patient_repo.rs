//! Patient repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `paciente`, plus lookup by national id.
//! - Attach each patient's clinical record on read through the injected
//!   record repository.
//!
//! # Invariants
//! - `create` and `update` write patient columns only; records are written by
//!   the record repository in a separate, caller-orchestrated step.
//! - `update` never writes `id` or `eliminado`.
//! - The patient cursor and handle are released before records are fetched.

use crate::db::ConnectionProvider;
use crate::model::patient::{Patient, PatientId};
use crate::model::validation::ValidationError;
use crate::repo::contract::{ensure_changed, inserted_id, RepoError, RepoResult, Repository};
use crate::repo::mapping::{
    bool_to_int, encode_date, fetch_all, fetch_optional, patient_from_row, PATIENT_COLUMNS,
};
use crate::repo::record_repo::RecordRepository;
use log::debug;
use rusqlite::{params, Connection};

const ENTITY: &str = "patient";

/// Patient repository surface.
pub trait PatientRepository: Repository<Entity = Patient, Id = PatientId> {
    type Records: RecordRepository;

    /// Fetches the non-deleted patient holding `national_id`.
    fn find_by_national_id(&self, national_id: &str) -> RepoResult<Option<Patient>>;

    /// Record repository used to attach clinical records.
    fn records(&self) -> &Self::Records;
}

/// SQLite-backed patient repository composed over a record repository.
#[derive(Debug, Clone)]
pub struct SqlitePatientRepository<P, R> {
    provider: P,
    records: R,
}

impl<P: ConnectionProvider, R: RecordRepository> SqlitePatientRepository<P, R> {
    pub fn new(provider: P, records: R) -> Self {
        Self { provider, records }
    }

    fn acquire(&self) -> RepoResult<Connection> {
        self.provider.acquire().map_err(RepoError::Connection)
    }

    fn attach_record(&self, mut patient: Patient) -> RepoResult<Patient> {
        if let Some(id) = patient.id {
            patient.clinical_record = self.records.read_by_patient_id(id)?;
        }
        Ok(patient)
    }

    fn attach_one(&self, patient: Option<Patient>) -> RepoResult<Option<Patient>> {
        patient.map(|patient| self.attach_record(patient)).transpose()
    }
}

impl<P: ConnectionProvider, R: RecordRepository> Repository for SqlitePatientRepository<P, R> {
    type Entity = Patient;
    type Id = PatientId;

    fn create(&self, patient: &Patient, conn: &Connection) -> RepoResult<PatientId> {
        let changed = conn.execute(
            "INSERT INTO paciente (
                nombre,
                apellido,
                dni,
                fecha_nacimiento,
                eliminado
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                patient.first_name.as_str(),
                patient.last_name.as_str(),
                patient.national_id.as_str(),
                encode_date(patient.birth_date),
                bool_to_int(patient.is_deleted),
            ],
        )?;

        let id = inserted_id(conn, changed, ENTITY)?;
        debug!("event=patient_create module=repo status=ok patient_id={id}");
        Ok(id)
    }

    fn read(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        let patient = {
            let conn = self.acquire()?;
            fetch_optional(
                &conn,
                &format!(
                    "SELECT {PATIENT_COLUMNS}
                     FROM paciente
                     WHERE id = ?1
                       AND eliminado = 0;"
                ),
                [id],
                patient_from_row,
            )?
        };
        self.attach_one(patient)
    }

    fn read_all(&self) -> RepoResult<Vec<Patient>> {
        let patients = {
            let conn = self.acquire()?;
            fetch_all(
                &conn,
                &format!(
                    "SELECT {PATIENT_COLUMNS}
                     FROM paciente
                     WHERE eliminado = 0
                     ORDER BY id ASC;"
                ),
                [],
                patient_from_row,
            )?
        };
        patients
            .into_iter()
            .map(|patient| self.attach_record(patient))
            .collect()
    }

    fn update(&self, patient: &Patient, conn: &Connection) -> RepoResult<()> {
        let id = patient
            .id
            .ok_or(ValidationError::MissingId { entity: ENTITY })?;

        let changed = conn.execute(
            "UPDATE paciente
             SET
                nombre = ?1,
                apellido = ?2,
                dni = ?3,
                fecha_nacimiento = ?4
             WHERE id = ?5
               AND eliminado = 0;",
            params![
                patient.first_name.as_str(),
                patient.last_name.as_str(),
                patient.national_id.as_str(),
                encode_date(patient.birth_date),
                id,
            ],
        )?;

        ensure_changed(changed, "update", ENTITY, id)
    }

    fn soft_delete(&self, id: PatientId, conn: &Connection) -> RepoResult<()> {
        let changed = conn.execute(
            "UPDATE paciente
             SET eliminado = 1
             WHERE id = ?1;",
            [id],
        )?;

        ensure_changed(changed, "soft delete", ENTITY, id)
    }
}

impl<P: ConnectionProvider, R: RecordRepository> PatientRepository
    for SqlitePatientRepository<P, R>
{
    type Records = R;

    fn find_by_national_id(&self, national_id: &str) -> RepoResult<Option<Patient>> {
        let patient = {
            let conn = self.acquire()?;
            fetch_optional(
                &conn,
                &format!(
                    "SELECT {PATIENT_COLUMNS}
                     FROM paciente
                     WHERE dni = ?1
                       AND eliminado = 0;"
                ),
                [national_id],
                patient_from_row,
            )?
        };
        self.attach_one(patient)
    }

    fn records(&self) -> &Self::Records {
        &self.records
    }
}
