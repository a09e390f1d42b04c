//! Clinical record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `historia_clinica`, plus lookup by owning patient.
//!
//! # Invariants
//! - `create` rejects a record without `patient_id` before touching the store.
//! - `update` never writes `paciente_id` or `eliminado`.
//! - Soft delete keeps `paciente_id`, so the link survives the tombstone.

use crate::db::ConnectionProvider;
use crate::model::clinical_record::{ClinicalRecord, RecordId};
use crate::model::patient::PatientId;
use crate::model::validation::ValidationError;
use crate::repo::contract::{ensure_changed, inserted_id, RepoError, RepoResult, Repository};
use crate::repo::mapping::{
    bool_to_int, encode_blood_type, fetch_all, fetch_optional, record_from_row, RECORD_COLUMNS,
};
use log::debug;
use rusqlite::{params, Connection};

const ENTITY: &str = "clinical record";

/// Clinical record repository surface.
pub trait RecordRepository: Repository<Entity = ClinicalRecord, Id = RecordId> {
    /// Fetches the non-deleted record owned by `patient_id`.
    fn read_by_patient_id(&self, patient_id: PatientId) -> RepoResult<Option<ClinicalRecord>>;

    /// Id of the non-deleted record owned by `patient_id`, looked up on `conn`
    /// so it sees the caller's uncommitted writes.
    fn active_record_id(
        &self,
        patient_id: PatientId,
        conn: &Connection,
    ) -> RepoResult<Option<RecordId>>;
}

/// SQLite-backed clinical record repository.
#[derive(Debug, Clone)]
pub struct SqliteRecordRepository<P> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteRecordRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn acquire(&self) -> RepoResult<Connection> {
        self.provider.acquire().map_err(RepoError::Connection)
    }
}

impl<P: ConnectionProvider> Repository for SqliteRecordRepository<P> {
    type Entity = ClinicalRecord;
    type Id = RecordId;

    fn create(&self, record: &ClinicalRecord, conn: &Connection) -> RepoResult<RecordId> {
        let patient_id = record.require_patient_id()?;

        let changed = conn.execute(
            "INSERT INTO historia_clinica (
                nro_historia,
                grupo_sanguineo,
                antecedentes,
                medicacion_actual,
                observaciones,
                eliminado,
                paciente_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                record.record_number.as_str(),
                encode_blood_type(record.blood_type),
                record.history.as_deref(),
                record.current_medication.as_deref(),
                record.observations.as_deref(),
                bool_to_int(record.is_deleted),
                patient_id,
            ],
        )?;

        let id = inserted_id(conn, changed, ENTITY)?;
        debug!("event=record_create module=repo status=ok record_id={id} patient_id={patient_id}");
        Ok(id)
    }

    fn read(&self, id: RecordId) -> RepoResult<Option<ClinicalRecord>> {
        let conn = self.acquire()?;
        fetch_optional(
            &conn,
            &format!(
                "SELECT {RECORD_COLUMNS}
                 FROM historia_clinica
                 WHERE id = ?1
                   AND eliminado = 0;"
            ),
            [id],
            record_from_row,
        )
    }

    fn read_all(&self) -> RepoResult<Vec<ClinicalRecord>> {
        let conn = self.acquire()?;
        fetch_all(
            &conn,
            &format!(
                "SELECT {RECORD_COLUMNS}
                 FROM historia_clinica
                 WHERE eliminado = 0
                 ORDER BY id ASC;"
            ),
            [],
            record_from_row,
        )
    }

    fn update(&self, record: &ClinicalRecord, conn: &Connection) -> RepoResult<()> {
        let id = record
            .id
            .ok_or(ValidationError::MissingId { entity: ENTITY })?;

        let changed = conn.execute(
            "UPDATE historia_clinica
             SET
                nro_historia = ?1,
                grupo_sanguineo = ?2,
                antecedentes = ?3,
                medicacion_actual = ?4,
                observaciones = ?5
             WHERE id = ?6
               AND eliminado = 0;",
            params![
                record.record_number.as_str(),
                encode_blood_type(record.blood_type),
                record.history.as_deref(),
                record.current_medication.as_deref(),
                record.observations.as_deref(),
                id,
            ],
        )?;

        ensure_changed(changed, "update", ENTITY, id)
    }

    fn soft_delete(&self, id: RecordId, conn: &Connection) -> RepoResult<()> {
        let changed = conn.execute(
            "UPDATE historia_clinica
             SET eliminado = 1
             WHERE id = ?1;",
            [id],
        )?;

        ensure_changed(changed, "soft delete", ENTITY, id)
    }
}

impl<P: ConnectionProvider> RecordRepository for SqliteRecordRepository<P> {
    fn read_by_patient_id(&self, patient_id: PatientId) -> RepoResult<Option<ClinicalRecord>> {
        let conn = self.acquire()?;
        fetch_optional(
            &conn,
            &format!(
                "SELECT {RECORD_COLUMNS}
                 FROM historia_clinica
                 WHERE paciente_id = ?1
                   AND eliminado = 0
                 ORDER BY id ASC
                 LIMIT 1;"
            ),
            [patient_id],
            record_from_row,
        )
    }

    fn active_record_id(
        &self,
        patient_id: PatientId,
        conn: &Connection,
    ) -> RepoResult<Option<RecordId>> {
        fetch_optional(
            conn,
            "SELECT id
             FROM historia_clinica
             WHERE paciente_id = ?1
               AND eliminado = 0
             ORDER BY id ASC
             LIMIT 1;",
            [patient_id],
            |row| Ok(row.get::<_, RecordId>(0)?),
        )
    }
}
