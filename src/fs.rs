use crate::consts::LOG_ERROR_PATTERN;
use crate::exceptions::ReportError;
use crate::models::LogStats;
use regex::Regex;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Files directly inside `dir` whose name ends with `suffix`, sorted by name.
/// Symlinks count when they resolve to a regular file.
pub fn list_matching(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, ReportError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().ends_with(suffix) {
            continue;
        }
        let path = entry.path();
        if fs::metadata(&path).is_ok_and(|m| m.is_file()) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

/// Counts files last modified strictly before `cutoff`. Files that vanish
/// between listing and stat are skipped.
pub fn count_modified_before(paths: &[PathBuf], cutoff: SystemTime) -> usize {
    paths
        .iter()
        .filter_map(|p| fs::metadata(p).and_then(|m| m.modified()).ok())
        .filter(|modified| *modified < cutoff)
        .count()
}

/// Size, line count and error-line count of the pipeline log.
/// Lines are counted as newline characters, so a trailing unterminated line
/// adds nothing to `lines` but is still checked for error markers.
/// Returns `Ok(None)` when the file does not exist.
pub fn inspect_log(path: &Path) -> Result<Option<LogStats>, ReportError> {
    if !path.exists() {
        return Ok(None);
    }

    static RE: std::sync::LazyLock<Option<Regex>> =
        std::sync::LazyLock::new(|| Regex::new(LOG_ERROR_PATTERN).ok());

    let file = fs::File::open(path)?;
    let size_bytes = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let mut lines = 0u64;
    let mut error_lines = 0u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.ends_with(b"\n") {
            lines += 1;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(re) = RE.as_ref()
            && re.is_match(&line)
        {
            error_lines += 1;
        }
    }

    Ok(Some(LogStats {
        size_bytes,
        lines,
        error_lines,
    }))
}
