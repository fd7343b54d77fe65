use crate::consts::{
    INTERMEDIATE_STATUSES, STALE_AFTER_MINUTES, STATUS_DUPLICATE, STATUS_SUCCESS,
    TOP_ERROR_LIMIT, UNKNOWN_ERROR_LABEL,
};
use crate::exceptions::ReportError;
use crate::models::{DailyVolume, LabelCount, ReconciliationRun};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::Path;

/// Read-only view over the pipeline's audit database.
pub struct AuditStore {
    conn: Connection,
}

/// Average and maximum duration of today's successful records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSummary {
    pub average_ms: i64,
    pub max_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptSummary {
    pub retried: i64,
    pub mean_attempts: f64,
}

impl AuditStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!(database = %path.display(), "opened audit store");
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Today's records by outcome. The rate is `None` when nothing was
    /// discovered today.
    pub fn daily_volume(&self) -> Result<(DailyVolume, Option<f64>), ReportError> {
        let (total, success, duplicate, rate) = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN current_status = ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN current_status = ?2 THEN 1 ELSE 0 END), 0),
                ROUND(100.0 * SUM(CASE WHEN current_status = ?1 THEN 1 ELSE 0 END) / COUNT(*), 2)
             FROM processing_audit
             WHERE DATE(discovered_at) = DATE('now')",
            params![STATUS_SUCCESS, STATUS_DUPLICATE],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            },
        )?;

        let volume = DailyVolume {
            total,
            success,
            duplicate,
            other: total - success - duplicate,
        };
        let rate = if total > 0 { rate } else { None };
        Ok((volume, rate))
    }

    pub fn success_durations(&self) -> Result<Option<DurationSummary>, ReportError> {
        let (average, max) = self.conn.query_row(
            "SELECT ROUND(AVG(total_duration_ms), 0), MAX(total_duration_ms)
             FROM processing_audit
             WHERE DATE(discovered_at) = DATE('now')
               AND current_status = ?1
               AND total_duration_ms IS NOT NULL",
            params![STATUS_SUCCESS],
            |row| Ok((row.get::<_, Option<f64>>(0)?, row.get::<_, Option<i64>>(1)?)),
        )?;

        Ok(match (average, max) {
            (Some(average), Some(max)) => Some(DurationSummary {
                average_ms: average as i64,
                max_ms: max,
            }),
            _ => None,
        })
    }

    pub fn attempt_summary(&self) -> Result<Option<AttemptSummary>, ReportError> {
        let (retried, mean) = self.conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN attempt_count > 1 THEN 1 ELSE 0 END), 0),
                ROUND(AVG(attempt_count), 2)
             FROM processing_audit
             WHERE DATE(discovered_at) = DATE('now')",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<f64>>(1)?)),
        )?;

        Ok(mean.map(|mean_attempts| AttemptSummary {
            retried,
            mean_attempts,
        }))
    }

    /// Most frequent error types over the last 24 hours.
    pub fn top_error_types(&self) -> Result<Vec<LabelCount>, ReportError> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(last_error_type, ?1) AS kind, COUNT(*) AS count
             FROM processing_audit
             WHERE current_status NOT IN (?2, ?3)
               AND datetime(discovered_at) > datetime('now', '-24 hours')
             GROUP BY kind
             ORDER BY count DESC, kind ASC
             LIMIT ?4",
        )?;

        let rows = stmt
            .query_map(
                params![
                    UNKNOWN_ERROR_LABEL,
                    STATUS_SUCCESS,
                    STATUS_DUPLICATE,
                    TOP_ERROR_LIMIT as i64
                ],
                |row| {
                    Ok(LabelCount {
                        label: row.get(0)?,
                        count: row.get(1)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn last_reconciliation(&self) -> Result<Option<ReconciliationRun>, ReportError> {
        let row = self
            .conn
            .query_row(
                "SELECT run_at,
                        COALESCE(files_checked, 0),
                        COALESCE(inconsistencies_found, 0),
                        COALESCE(issues_fixed, 0),
                        details
                 FROM reconciliation_log
                 ORDER BY id DESC
                 LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(
            |(run_at, files_checked, inconsistencies_found, issues_fixed, details)| {
                ReconciliationRun {
                    run_at: run_at.unwrap_or_default(),
                    files_checked,
                    inconsistencies_found,
                    issues_fixed,
                    details: details.as_deref().map(parse_details).unwrap_or_default(),
                }
            },
        ))
    }

    pub fn document_count(&self) -> Result<i64, ReportError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM nota_fiscal", [], |row| row.get(0))?)
    }

    pub fn company_count(&self) -> Result<i64, ReportError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM empresa", [], |row| row.get(0))?)
    }

    pub fn documents_by_type(&self) -> Result<Vec<LabelCount>, ReportError> {
        let mut stmt = self.conn.prepare(
            "SELECT tipo_documento, COUNT(*) AS count
             FROM nota_fiscal
             GROUP BY tipo_documento
             ORDER BY count DESC, tipo_documento ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LabelCount {
                    label: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Records left in an intermediate status past the stale threshold.
    pub fn stuck_records(&self) -> Result<i64, ReportError> {
        let placeholders = (1..=INTERMEDIATE_STATUSES.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT COUNT(*)
             FROM processing_audit
             WHERE current_status IN ({})
               AND datetime(last_attempt_at) < datetime('now', '-{} minutes')",
            placeholders, STALE_AFTER_MINUTES
        );

        Ok(self.conn.query_row(
            &sql,
            rusqlite::params_from_iter(INTERMEDIATE_STATUSES.iter()),
            |row| row.get(0),
        )?)
    }
}

/// Reconciliation details are stored as a JSON array of issue strings.
/// Anything else is ignored.
fn parse_details(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(issues) => issues,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable reconciliation details");
            Vec::new()
        }
    }
}
