use crate::consts::{
    DATABASE_FILE_NAME, DEAD_LETTER_DIR_NAME, DEFAULT_DATA_DIR, DEFAULT_SERVICE_NAME,
    ENV_DATA_DIR, ENV_DATABASE, ENV_DEAD_LETTER_DIR, ENV_LOG_FILE, ENV_QUARANTINE_DIR,
    ENV_SERVICE, LOG_FILE_NAME, QUARANTINE_DIR_NAME,
};
use crate::exceptions::ReportError;
use std::path::{Path, PathBuf};

/// Locations the report reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub log_file: PathBuf,
    pub quarantine_dir: PathBuf,
    pub dead_letter_dir: PathBuf,
    pub service_name: String,
}

impl Settings {
    /// Standard pipeline layout rooted at `data_dir`.
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            database: data_dir.join(DATABASE_FILE_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            quarantine_dir: data_dir.join(QUARANTINE_DIR_NAME),
            dead_letter_dir: data_dir.join(DEAD_LETTER_DIR_NAME),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get(ENV_DATA_DIR).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut settings = Self::with_data_dir(data_dir);

        if let Some(p) = get(ENV_DATABASE) {
            settings.database = PathBuf::from(p);
        }
        if let Some(p) = get(ENV_LOG_FILE) {
            settings.log_file = PathBuf::from(p);
        }
        if let Some(p) = get(ENV_QUARANTINE_DIR) {
            settings.quarantine_dir = PathBuf::from(p);
        }
        if let Some(p) = get(ENV_DEAD_LETTER_DIR) {
            settings.dead_letter_dir = PathBuf::from(p);
        }
        if let Some(name) = get(ENV_SERVICE) {
            settings.service_name = name.trim().to_string();
        }

        settings
    }

    /// Fails fast when a required path is unusable. The log file is optional.
    pub fn validate(&self) -> Result<(), ReportError> {
        if !self.database.is_file() {
            return Err(ReportError::Configuration(format!(
                "database not found: {}",
                self.database.display()
            )));
        }

        for (label, dir) in [
            ("quarantine", &self.quarantine_dir),
            ("dead-letter", &self.dead_letter_dir),
        ] {
            if !dir.is_dir() {
                return Err(ReportError::Configuration(format!(
                    "{} directory not found: {}",
                    label,
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}
