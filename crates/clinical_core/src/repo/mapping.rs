//! Row mapping between SQLite rows and domain values.
//!
//! # Responsibility
//! - Decode `paciente` / `historia_clinica` rows into entities.
//! - Encode enum, date and flag fields for binding.
//!
//! # Invariants
//! - Mapping is pure: no queries, no I/O.
//! - A missing, mistyped, NULL-in-mandatory or undecodable column is a
//!   `DataIntegrity` error; nothing falls back to a default.

use crate::model::blood_type::BloodType;
use crate::model::clinical_record::ClinicalRecord;
use crate::model::patient::Patient;
use crate::repo::contract::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::FromSql;
use rusqlite::{Connection, Params, Row};

pub(crate) const PATIENT_COLUMNS: &str =
    "id, nombre, apellido, dni, fecha_nacimiento, eliminado";

pub(crate) const RECORD_COLUMNS: &str = "id, nro_historia, grupo_sanguineo, antecedentes, \
     medicacion_actual, observaciones, eliminado, paciente_id";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps one `paciente` row. The attached clinical record is left empty.
pub fn patient_from_row(row: &Row<'_>) -> RepoResult<Patient> {
    let birth_date: String = column(row, "paciente", "fecha_nacimiento")?;

    Ok(Patient {
        id: Some(column(row, "paciente", "id")?),
        is_deleted: decode_flag(column(row, "paciente", "eliminado")?, "paciente.eliminado")?,
        first_name: column(row, "paciente", "nombre")?,
        last_name: column(row, "paciente", "apellido")?,
        national_id: column(row, "paciente", "dni")?,
        birth_date: decode_date(&birth_date, "paciente.fecha_nacimiento")?,
        clinical_record: None,
    })
}

/// Maps one `historia_clinica` row.
pub fn record_from_row(row: &Row<'_>) -> RepoResult<ClinicalRecord> {
    let blood_type: String = column(row, "historia_clinica", "grupo_sanguineo")?;

    Ok(ClinicalRecord {
        id: Some(column(row, "historia_clinica", "id")?),
        is_deleted: decode_flag(
            column(row, "historia_clinica", "eliminado")?,
            "historia_clinica.eliminado",
        )?,
        record_number: column(row, "historia_clinica", "nro_historia")?,
        blood_type: decode_blood_type(&blood_type)?,
        history: column(row, "historia_clinica", "antecedentes")?,
        current_medication: column(row, "historia_clinica", "medicacion_actual")?,
        observations: column(row, "historia_clinica", "observaciones")?,
        patient_id: Some(column(row, "historia_clinica", "paciente_id")?),
    })
}

pub fn encode_blood_type(blood_type: BloodType) -> &'static str {
    blood_type.as_db_name()
}

pub fn decode_blood_type(value: &str) -> RepoResult<BloodType> {
    BloodType::from_db_name(value).ok_or_else(|| {
        RepoError::DataIntegrity(format!(
            "unrecognized blood type `{value}` in historia_clinica.grupo_sanguineo"
        ))
    })
}

pub fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn decode_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| {
        RepoError::DataIntegrity(format!("malformed date `{value}` in {column}: {err}"))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn decode_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::DataIntegrity(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

/// Reads one named column, reporting decode failures as `DataIntegrity`.
fn column<T: FromSql>(row: &Row<'_>, table: &str, name: &str) -> RepoResult<T> {
    row.get::<_, T>(name).map_err(|err| {
        let undecodable = matches!(
            err,
            rusqlite::Error::InvalidColumnName(_)
                | rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::IntegralValueOutOfRange(..)
        );
        if undecodable {
            RepoError::DataIntegrity(format!("{table}.{name}: {err}"))
        } else {
            RepoError::from(err)
        }
    })
}

/// Runs `sql` and maps the first row, if any.
pub(crate) fn fetch_optional<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: impl Fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map(row)?));
    }
    Ok(None)
}

/// Runs `sql` and maps every row.
pub(crate) fn fetch_all<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: impl Fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(map(row)?);
    }
    Ok(items)
}
