use crate::grading::Grade;
use std::path::PathBuf;
use time::OffsetDateTime;

// --- Enums ---

/// Outcome of one metric group. A failed query or read is `NotApplicable`
/// and never aborts the report.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric<T> {
    Measured(T),
    Empty,
    NotApplicable,
}

impl<T> Metric<T> {
    pub fn as_measured(&self) -> Option<&T> {
        match self {
            Metric::Measured(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Metric<U> {
        match self {
            Metric::Measured(v) => Metric::Measured(f(v)),
            Metric::Empty => Metric::Empty,
            Metric::NotApplicable => Metric::NotApplicable,
        }
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Measured(v),
            None => Metric::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Active { since: Option<OffsetDateTime> },
    Inactive,
}

impl ServiceState {
    pub fn is_active(&self) -> bool {
        matches!(self, ServiceState::Active { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    LowSuccessRate { rate: f64 },
    DeadLetterBacklog { files: usize },
    StaleQuarantine { files: usize },
    ServiceDown { service: String },
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::LowSuccessRate { rate } => write!(
                f,
                "Success rate is {:.2}% today: inspect the top error types and the pipeline log",
                rate
            ),
            Recommendation::DeadLetterBacklog { files } => write!(
                f,
                "{} files in the dead-letter queue: review and reprocess them",
                files
            ),
            Recommendation::StaleQuarantine { files } => write!(
                f,
                "{} quarantined files are older than 10 minutes: processing may be stuck",
                files
            ),
            Recommendation::ServiceDown { service } => {
                write!(f, "Service '{}' is not running: restart it", service)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    AttentionRequired { recommendations: usize },
    AwaitingData,
    Healthy,
    Operational,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::AttentionRequired { .. } => "ATTENTION REQUIRED",
            Verdict::AwaitingData => "AWAITING DATA",
            Verdict::Healthy => "HEALTHY",
            Verdict::Operational => "OPERATIONAL",
        }
    }
}

// --- Sections ---

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSection {
    pub name: String,
    pub state: ServiceState,
    pub uptime_hours: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailyVolume {
    pub total: i64,
    pub success: i64,
    pub duplicate: i64,
    pub other: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuccessRate {
    pub percent: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub average_ms: i64,
    pub max_ms: i64,
    pub grade: Grade,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryStats {
    pub retried: i64,
    pub mean_attempts: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterSection {
    pub count: usize,
    pub grade: Grade,
    pub preview: Vec<String>,
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarantineSection {
    pub count: usize,
    pub grade: Grade,
    pub stale: usize,
}

impl QuarantineSection {
    pub fn has_problem(&self) -> bool {
        self.grade == Grade::Attention && self.stale > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRun {
    pub run_at: String,
    pub files_checked: i64,
    pub inconsistencies_found: i64,
    pub issues_fixed: i64,
    pub details: Vec<String>,
}

impl ReconciliationRun {
    pub fn is_clean(&self) -> bool {
        self.inconsistencies_found == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllTimeStats {
    pub documents: i64,
    pub companies: i64,
    pub by_type: Vec<LabelCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    pub size_bytes: u64,
    pub lines: u64,
    pub error_lines: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogHealth {
    Found { stats: LogStats, grade: Grade },
    NotFound { path: PathBuf },
    Unreadable { path: PathBuf },
}

// --- Report ---

#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub generated_at: OffsetDateTime,
    pub service: ServiceSection,
    pub today: Metric<DailyVolume>,
    pub success_rate: Metric<SuccessRate>,
    pub latency: Metric<Latency>,
    pub retries: Metric<RetryStats>,
    pub dead_letter: Metric<DeadLetterSection>,
    pub quarantine: Metric<QuarantineSection>,
    pub top_errors: Metric<Vec<LabelCount>>,
    pub reconciliation: Metric<ReconciliationRun>,
    pub all_time: Metric<AllTimeStats>,
    pub stuck_records: Metric<i64>,
    pub log: LogHealth,
    pub recommendations: Vec<Recommendation>,
    pub verdict: Verdict,
}

impl HealthReport {
    pub fn total_today(&self) -> i64 {
        self.today.as_measured().map(|v| v.total).unwrap_or(0)
    }
}
