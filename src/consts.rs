use std::time::Duration;

// --- Pipeline layout ---

pub const DEFAULT_DATA_DIR: &str = "/mnt/c/xml_organizer_data";
pub const DATABASE_FILE_NAME: &str = "xml_organizer.db";
pub const LOG_FILE_NAME: &str = "xml_organizer.log";
pub const QUARANTINE_DIR_NAME: &str = "quarantine";
pub const DEAD_LETTER_DIR_NAME: &str = "dead_letter";
pub const DEFAULT_SERVICE_NAME: &str = "xml-organizer";

/// Only files with this suffix count as queued documents.
pub const DOCUMENT_SUFFIX: &str = ".xml";

// --- Environment ---

pub const ENV_DATA_DIR: &str = "XMLORG_DATA_DIR";
pub const ENV_DATABASE: &str = "XMLORG_DATABASE";
pub const ENV_LOG_FILE: &str = "XMLORG_LOG_FILE";
pub const ENV_QUARANTINE_DIR: &str = "XMLORG_QUARANTINE_DIR";
pub const ENV_DEAD_LETTER_DIR: &str = "XMLORG_DEAD_LETTER_DIR";
pub const ENV_SERVICE: &str = "XMLORG_SERVICE";
pub const ENV_LOG_FILTER: &str = "XMLORG_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

// --- Statuses ---

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_DUPLICATE: &str = "DUPLICATE";
pub const UNKNOWN_ERROR_LABEL: &str = "UNKNOWN";

/// Statuses a record passes through before reaching a terminal state.
pub const INTERMEDIATE_STATUSES: [&str; 5] = [
    "PENDING",
    "QUARANTINED",
    "PROCESSING",
    "PARSED",
    "DB_INSERTED",
];

// --- Thresholds ---

/// Quarantined files (and intermediate records) older than this are stuck.
pub const STALE_AFTER: Duration = Duration::from_secs(10 * 60);
pub const STALE_AFTER_MINUTES: u64 = 10;

pub const RECOMMEND_MIN_SUCCESS_RATE: f64 = 95.0;
pub const RECOMMEND_MAX_DEAD_LETTER: usize = 5;

pub const DEAD_LETTER_PREVIEW: usize = 5;
pub const TOP_ERROR_LIMIT: usize = 5;
pub const RECONCILIATION_DETAIL_PREVIEW: usize = 5;

/// Lines of the pipeline log matching this are counted as error lines.
pub const LOG_ERROR_PATTERN: &str = "ERROR|CRITICAL";
