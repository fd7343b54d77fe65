#![allow(dead_code)]

use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use xmlorg_health::config::Settings;
use xmlorg_health::exceptions::ReportError;
use xmlorg_health::models::ServiceState;
use xmlorg_health::service::ServiceProbe;

pub struct Fixture {
    pub dir: TempDir,
    pub settings: Settings,
}

impl Fixture {
    pub fn conn(&self) -> Connection {
        Connection::open(&self.settings.database).unwrap()
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// A data directory laid out like the pipeline's, with an empty schema.
pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::with_data_dir(dir.path());
    fs::create_dir_all(&settings.quarantine_dir).unwrap();
    fs::create_dir_all(&settings.dead_letter_dir).unwrap();

    let conn = Connection::open(&settings.database).unwrap();
    create_schema(&conn);

    Fixture { dir, settings }
}

pub fn create_schema(conn: &Connection) {
    conn.execute_batch(
        "CREATE TABLE empresa (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cnpj TEXT NOT NULL UNIQUE,
            nome TEXT NOT NULL
        );
        CREATE TABLE nota_fiscal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chave_acesso TEXT NOT NULL UNIQUE,
            empresa_id INTEGER NOT NULL,
            tipo_documento TEXT NOT NULL
        );
        CREATE TABLE processing_audit (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_hash TEXT NOT NULL,
            filename TEXT NOT NULL,
            discovered_at TEXT NOT NULL,
            current_status TEXT NOT NULL,
            attempt_count INTEGER DEFAULT 0,
            last_attempt_at TEXT,
            last_error_type TEXT,
            total_duration_ms INTEGER
        );
        CREATE TABLE reconciliation_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_at TEXT DEFAULT CURRENT_TIMESTAMP,
            files_checked INTEGER,
            inconsistencies_found INTEGER,
            issues_fixed INTEGER,
            details TEXT
        );",
    )
    .unwrap();
}

/// Inserts a processing record discovered at `datetime('now', age)`.
pub fn insert_audit(
    conn: &Connection,
    status: &str,
    age: &str,
    duration_ms: Option<i64>,
    attempts: i64,
    error_type: Option<&str>,
) {
    conn.execute(
        "INSERT INTO processing_audit
            (file_hash, filename, discovered_at, current_status, attempt_count,
             last_attempt_at, last_error_type, total_duration_ms)
         VALUES ('h', 'f.xml', datetime('now', ?1), ?2, ?3, datetime('now', ?1), ?4, ?5)",
        params![age, status, attempts, error_type, duration_ms],
    )
    .unwrap();
}

/// `success` successful and `total - success` failed records, all today.
pub fn insert_today(conn: &Connection, total: usize, success: usize) {
    for i in 0..total {
        if i < success {
            insert_audit(conn, "SUCCESS", "-0 seconds", Some(1000), 1, None);
        } else {
            insert_audit(
                conn,
                "FAILED_PERMANENT",
                "-0 seconds",
                None,
                5,
                Some("XML_PARSE_ERROR"),
            );
        }
    }
}

pub fn insert_reconciliation(
    conn: &Connection,
    files_checked: i64,
    inconsistencies: i64,
    fixed: i64,
    details: Option<&str>,
) {
    conn.execute(
        "INSERT INTO reconciliation_log (files_checked, inconsistencies_found, issues_fixed, details)
         VALUES (?1, ?2, ?3, ?4)",
        params![files_checked, inconsistencies, fixed, details],
    )
    .unwrap();
}

pub fn insert_document(conn: &Connection, key: &str, company: i64, doc_type: &str) {
    conn.execute(
        "INSERT INTO nota_fiscal (chave_acesso, empresa_id, tipo_documento) VALUES (?1, ?2, ?3)",
        params![key, company, doc_type],
    )
    .unwrap();
}

pub fn insert_company(conn: &Connection, cnpj: &str, name: &str) {
    conn.execute(
        "INSERT INTO empresa (cnpj, nome) VALUES (?1, ?2)",
        params![cnpj, name],
    )
    .unwrap();
}

/// Creates `count` files named `doc_00.xml`, `doc_01.xml`, ... in `dir`.
pub fn touch_documents(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("doc_{:02}.xml", i));
            fs::write(&path, "<nfeProc/>").unwrap();
            path
        })
        .collect()
}

pub fn backdate(path: &Path, age: Duration) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

pub struct FixedProbe(pub ServiceState);

impl ServiceProbe for FixedProbe {
    fn query(&self, _service: &str) -> Result<ServiceState, ReportError> {
        Ok(self.0)
    }
}

pub struct BrokenProbe;

impl ServiceProbe for BrokenProbe {
    fn query(&self, _service: &str) -> Result<ServiceState, ReportError> {
        Err(ReportError::Service("systemctl not available".into()))
    }
}

pub fn active() -> FixedProbe {
    FixedProbe(ServiceState::Active { since: None })
}
