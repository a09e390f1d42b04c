use chrono::NaiveDate;
use clinical_core::db::open_db_in_memory;
use clinical_core::{
    BloodType, ClinicalRecord, ConnectionProvider, Patient, PatientId, RecordRepository,
    RepoError, Repository, SqliteConnectionProvider, SqlitePatientRepository,
    SqliteRecordRepository, ValidationError,
};
use rusqlite::Connection;
use tempfile::TempDir;

#[test]
fn create_without_patient_id_fails_before_store_access() {
    let (_dir, provider, records) = setup();

    // No schema on this handle: any statement would fail with a Db error.
    let bare = Connection::open_in_memory().unwrap();
    let record = ClinicalRecord::new("H1", BloodType::APos);
    let err = records.create(&record, &bare).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingPatientId)
    ));

    let conn = provider.acquire().unwrap();
    let err = records.create(&record, &conn).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(record_rows(&conn), 0);
}

#[test]
fn create_and_read_by_id_and_owner() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();
    let patient_id = insert_patient(&provider, "123");

    let mut record = ClinicalRecord::new("H1", BloodType::ONeg).for_patient(patient_id);
    record.history = Some("appendectomy 2004".to_string());
    record.current_medication = Some("none".to_string());
    let id = records.create(&record, &conn).unwrap();

    let mut expected = record.clone();
    expected.id = Some(id);
    assert_eq!(records.read(id).unwrap(), Some(expected.clone()));
    assert_eq!(records.read_by_patient_id(patient_id).unwrap(), Some(expected));
    assert_eq!(records.read_by_patient_id(patient_id + 1).unwrap(), None);
}

#[test]
fn every_blood_type_survives_the_store() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();

    for (index, blood_type) in BloodType::ALL.into_iter().enumerate() {
        let patient_id = insert_patient(&provider, &format!("dni-{index}"));
        let record = ClinicalRecord::new(format!("H{index}"), blood_type).for_patient(patient_id);
        let id = records.create(&record, &conn).unwrap();

        let stored: String = conn
            .query_row(
                "SELECT grupo_sanguineo FROM historia_clinica WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, blood_type.as_db_name());
        assert_eq!(records.read(id).unwrap().unwrap().blood_type, blood_type);
    }
}

#[test]
fn unknown_stored_blood_type_is_data_integrity_error() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();
    let patient_id = insert_patient(&provider, "123");

    let id = records
        .create(&ClinicalRecord::new("H1", BloodType::BPos).for_patient(patient_id), &conn)
        .unwrap();
    conn.execute(
        "UPDATE historia_clinica SET grupo_sanguineo = 'B+' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let err = records.read(id).unwrap_err();
    assert!(matches!(err, RepoError::DataIntegrity(_)), "{err}");
    let err = records.read_by_patient_id(patient_id).unwrap_err();
    assert!(matches!(err, RepoError::DataIntegrity(_)), "{err}");
}

#[test]
fn update_never_moves_owner_or_flag() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();
    let owner = insert_patient(&provider, "123");
    let other = insert_patient(&provider, "456");

    let id = records
        .create(&ClinicalRecord::new("H1", BloodType::APos).for_patient(owner), &conn)
        .unwrap();

    let mut changed = records.read(id).unwrap().unwrap();
    changed.record_number = "H1-B".to_string();
    changed.blood_type = BloodType::AbNeg;
    changed.history = Some("asthma".to_string());
    changed.current_medication = Some("salbutamol".to_string());
    changed.observations = Some("follow-up in 6 months".to_string());
    changed.patient_id = Some(other);
    changed.is_deleted = true;
    records.update(&changed, &conn).unwrap();

    let loaded = records.read(id).unwrap().unwrap();
    assert_eq!(loaded.record_number, "H1-B");
    assert_eq!(loaded.blood_type, BloodType::AbNeg);
    assert_eq!(loaded.history.as_deref(), Some("asthma"));
    assert_eq!(loaded.current_medication.as_deref(), Some("salbutamol"));
    assert_eq!(loaded.observations.as_deref(), Some("follow-up in 6 months"));
    assert_eq!(loaded.patient_id, Some(owner));
    assert!(!loaded.is_deleted);
}

#[test]
fn update_deleted_or_unknown_record_is_persistence_error() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();
    let patient_id = insert_patient(&provider, "123");

    let id = records
        .create(&ClinicalRecord::new("H1", BloodType::OPos).for_patient(patient_id), &conn)
        .unwrap();
    records.soft_delete(id, &conn).unwrap();

    let mut stale = ClinicalRecord::new("H2", BloodType::ONeg).for_patient(patient_id);
    stale.id = Some(id);
    let err = records.update(&stale, &conn).unwrap_err();
    assert!(matches!(err, RepoError::Persistence(_)), "{err}");

    stale.id = Some(id + 100);
    let err = records.update(&stale, &conn).unwrap_err();
    assert!(matches!(err, RepoError::Persistence(_)), "{err}");

    let number: String = conn
        .query_row(
            "SELECT nro_historia FROM historia_clinica WHERE id = ?1;",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(number, "H1");
}

#[test]
fn soft_delete_keeps_owner_reference() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();
    let patient_id = insert_patient(&provider, "123");

    let id = records
        .create(&ClinicalRecord::new("H1", BloodType::ANeg).for_patient(patient_id), &conn)
        .unwrap();
    records.soft_delete(id, &conn).unwrap();

    assert!(records.read(id).unwrap().is_none());
    assert!(records.read_by_patient_id(patient_id).unwrap().is_none());
    assert!(records.read_all().unwrap().is_empty());

    let (flag, owner): (i64, PatientId) = conn
        .query_row(
            "SELECT eliminado, paciente_id FROM historia_clinica WHERE id = ?1;",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(flag, 1);
    assert_eq!(owner, patient_id);

    let err = records.soft_delete(id + 1, &conn).unwrap_err();
    assert!(matches!(err, RepoError::Persistence(_)), "{err}");
}

#[test]
fn record_for_unknown_patient_is_rejected_by_foreign_key() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();

    let record = ClinicalRecord::new("H1", BloodType::APos).for_patient(999);
    let err = records.create(&record, &conn).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)), "{err}");
    assert_eq!(record_rows(&conn), 0);
}

#[test]
fn patient_owns_at_most_one_active_record() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();
    let patient_id = insert_patient(&provider, "123");

    let first = records
        .create(&ClinicalRecord::new("H1", BloodType::APos).for_patient(patient_id), &conn)
        .unwrap();
    let err = records
        .create(&ClinicalRecord::new("H2", BloodType::APos).for_patient(patient_id), &conn)
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)), "{err}");

    records.soft_delete(first, &conn).unwrap();
    let second = records
        .create(&ClinicalRecord::new("H2", BloodType::APos).for_patient(patient_id), &conn)
        .unwrap();
    assert_eq!(
        records.read_by_patient_id(patient_id).unwrap().unwrap().id,
        Some(second)
    );
}

#[test]
fn read_all_lists_active_records_in_id_order() {
    let (_dir, provider, records) = setup();
    let conn = provider.acquire().unwrap();

    let mut ids = Vec::new();
    for index in 0..3 {
        let patient_id = insert_patient(&provider, &format!("dni-{index}"));
        let record =
            ClinicalRecord::new(format!("H{index}"), BloodType::OPos).for_patient(patient_id);
        ids.push(records.create(&record, &conn).unwrap());
    }
    records.soft_delete(ids[1], &conn).unwrap();

    let listed: Vec<_> = records
        .read_all()
        .unwrap()
        .into_iter()
        .map(|record| record.id.unwrap())
        .collect();
    assert_eq!(listed, vec![ids[0], ids[2]]);
}

#[test]
fn writes_run_on_the_supplied_handle() {
    let (_dir, _provider, records) = setup();
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO paciente (nombre, apellido, dni, fecha_nacimiento)
         VALUES ('Ana', 'Ruiz', '123', '1990-01-01');",
        [],
    )
    .unwrap();

    let record = ClinicalRecord::new("H1", BloodType::APos).for_patient(conn.last_insert_rowid());
    let id = records.create(&record, &conn).unwrap();
    assert!(id > 0);
    assert_eq!(record_rows(&conn), 1);
    assert!(records.read_all().unwrap().is_empty());
}

#[test]
fn active_record_id_sees_writes_on_the_supplied_handle() {
    let (_dir, provider, records) = setup();
    let patient_id = insert_patient(&provider, "123");
    let mut conn = provider.acquire().unwrap();

    let tx = conn.transaction().unwrap();
    assert_eq!(records.active_record_id(patient_id, &tx).unwrap(), None);
    let id = records
        .create(&ClinicalRecord::new("H1", BloodType::APos).for_patient(patient_id), &tx)
        .unwrap();
    assert_eq!(records.active_record_id(patient_id, &tx).unwrap(), Some(id));

    records.soft_delete(id, &tx).unwrap();
    assert_eq!(records.active_record_id(patient_id, &tx).unwrap(), None);
}

type RecordRepo = SqliteRecordRepository<SqliteConnectionProvider>;

fn setup() -> (TempDir, SqliteConnectionProvider, RecordRepo) {
    let dir = tempfile::tempdir().unwrap();
    let provider = SqliteConnectionProvider::new(dir.path().join("clinical.sqlite3"));
    let records = SqliteRecordRepository::new(provider.clone());
    (dir, provider, records)
}

fn insert_patient(provider: &SqliteConnectionProvider, national_id: &str) -> PatientId {
    let patients = SqlitePatientRepository::new(provider, SqliteRecordRepository::new(provider));
    let conn = provider.acquire().unwrap();
    let birth_date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    patients
        .create(&Patient::new("Ana", "Ruiz", national_id, birth_date), &conn)
        .unwrap()
}

fn record_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM historia_clinica;", [], |row| row.get(0))
        .unwrap()
}
