//! Read-only CLI probe over the clinical store.
//!
//! # Responsibility
//! - Validate database configuration at startup and abort when it is invalid.
//! - Print every patient joined with its clinical record, if any.

use clinical_core::{
    core_version, init_config, init_logging_from_env, BloodType, ConnectionProvider, DbConfig,
    SqliteConnectionProvider,
};
use log::error;
use rusqlite::Connection;
use std::process::ExitCode;

const PATIENT_LISTING_SQL: &str = "SELECT
    p.id,
    p.nombre,
    p.apellido,
    p.dni,
    h.nro_historia,
    h.grupo_sanguineo
FROM paciente p
LEFT JOIN historia_clinica h ON p.id = h.paciente_id
ORDER BY p.id ASC";

fn main() -> ExitCode {
    if let Err(err) = init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    let config = match init_config(DbConfig::from_env()) {
        Ok(config) => config,
        Err(err) => {
            error!("event=cli_start module=cli status=error error_code=invalid_config error={err}");
            eprintln!("invalid database configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let provider = SqliteConnectionProvider::from_config(config);
    let conn = match provider.acquire() {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_connect module=cli status=error error={err}");
            eprintln!("could not connect to `{}`: {err}", provider.path().display());
            return ExitCode::FAILURE;
        }
    };

    println!("clinical_core version={}", core_version());
    match print_patients(&conn) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_listing module=cli status=error error={err}");
            eprintln!("query failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_patients(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(PATIENT_LISTING_SQL)?;
    let mut rows = stmt.query([])?;

    println!("patients:");
    while let Some(row) = rows.next()? {
        let id: i64 = row.get("id")?;
        let first_name: String = row.get("nombre")?;
        let last_name: String = row.get("apellido")?;
        let national_id: String = row.get("dni")?;
        let record_number: Option<String> = row.get("nro_historia")?;
        let blood_type: Option<String> = row.get("grupo_sanguineo")?;

        // Unknown stored names are shown verbatim rather than hidden.
        let blood_type = blood_type.map(|name| {
            BloodType::from_db_name(&name)
                .map(|value| value.symbol().to_string())
                .unwrap_or(name)
        });

        println!(
            "id={id} name={first_name} {last_name} dni={national_id} record={} blood_type={}",
            record_number.as_deref().unwrap_or("-"),
            blood_type.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
