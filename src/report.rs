//! Builds the health report from the audit store, the queue directories and
//! the service manager. Every section is evaluated independently; a failing
//! query degrades its own section to `NotApplicable` and nothing else.

use crate::config::Settings;
use crate::consts::{
    DEAD_LETTER_PREVIEW, DOCUMENT_SUFFIX, RECOMMEND_MAX_DEAD_LETTER,
    RECOMMEND_MIN_SUCCESS_RATE, STALE_AFTER,
};
use crate::exceptions::ReportError;
use crate::fs::{count_modified_before, file_names, inspect_log, list_matching};
use crate::grading::{
    DEAD_LETTER_FILES, Grade, LATENCY_MS, LOG_ERROR_LINES, QUARANTINE_FILES, SUCCESS_RATE,
    grade_mean_attempts,
};
use crate::models::{
    AllTimeStats, DailyVolume, DeadLetterSection, HealthReport, Latency, LogHealth, Metric,
    QuarantineSection, Recommendation, RetryStats, ServiceSection, ServiceState, SuccessRate,
    Verdict,
};
use crate::service::{ServiceProbe, uptime_hours};
use crate::store::AuditStore;
use std::time::SystemTime;
use time::OffsetDateTime;

pub fn build_report(
    settings: &Settings,
    store: &AuditStore,
    probe: &dyn ServiceProbe,
    now: OffsetDateTime,
) -> HealthReport {
    let service = service_section(settings, probe, now);

    let (today, rate) = match soft("daily volume", store.daily_volume()) {
        Some((volume, rate)) => (Metric::Measured(volume), rate),
        None => (Metric::NotApplicable, None),
    };
    let success_rate = success_section(&today, rate);

    let latency = measured("latency", store.success_durations()).map(|d| Latency {
        average_ms: d.average_ms,
        max_ms: d.max_ms,
        grade: LATENCY_MS.grade(d.average_ms),
    });

    let retries = measured("retries", store.attempt_summary()).map(|a| RetryStats {
        retried: a.retried,
        mean_attempts: a.mean_attempts,
        grade: grade_mean_attempts(a.mean_attempts),
    });

    let cutoff = SystemTime::from(now)
        .checked_sub(STALE_AFTER)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let dead_letter = dead_letter_section(settings);
    let quarantine = quarantine_section(settings, cutoff);

    let top_errors = match soft("top errors", store.top_error_types()) {
        Some(rows) if rows.is_empty() => Metric::Empty,
        Some(rows) => Metric::Measured(rows),
        None => Metric::NotApplicable,
    };

    let reconciliation = measured("reconciliation", store.last_reconciliation());
    let all_time = soft("all-time statistics", all_time_stats(store))
        .map(Metric::Measured)
        .unwrap_or(Metric::NotApplicable);
    let stuck_records = soft("stuck records", store.stuck_records())
        .map(Metric::Measured)
        .unwrap_or(Metric::NotApplicable);

    let log = log_health(settings);

    let recommendations = recommendations(&service, &today, rate, &dead_letter, &quarantine);
    let verdict = verdict(&recommendations, &today, &success_rate, &dead_letter);

    HealthReport {
        generated_at: now,
        service,
        today,
        success_rate,
        latency,
        retries,
        dead_letter,
        quarantine,
        top_errors,
        reconciliation,
        all_time,
        stuck_records,
        log,
        recommendations,
        verdict,
    }
}

fn soft<T>(section: &str, result: Result<T, ReportError>) -> Option<T> {
    match result {
        Ok(value) => {
            tracing::debug!(section, "section evaluated");
            Some(value)
        }
        Err(e) => {
            tracing::warn!(section, error = %e, "section not applicable");
            None
        }
    }
}

fn measured<T>(section: &str, result: Result<Option<T>, ReportError>) -> Metric<T> {
    match soft(section, result) {
        Some(value) => Metric::from(value),
        None => Metric::NotApplicable,
    }
}

fn service_section(
    settings: &Settings,
    probe: &dyn ServiceProbe,
    now: OffsetDateTime,
) -> ServiceSection {
    let state = probe.state(&settings.service_name);
    let uptime = match state {
        ServiceState::Active { since: Some(since) } => Some(uptime_hours(since, now)),
        _ => None,
    };
    ServiceSection {
        name: settings.service_name.clone(),
        state,
        uptime_hours: uptime,
    }
}

fn success_section(today: &Metric<DailyVolume>, rate: Option<f64>) -> Metric<SuccessRate> {
    match (today, rate) {
        (Metric::Measured(volume), Some(percent)) if volume.total > 0 => {
            Metric::Measured(SuccessRate {
                percent,
                grade: SUCCESS_RATE.grade(percent),
            })
        }
        (Metric::NotApplicable, _) => Metric::NotApplicable,
        _ => Metric::Empty,
    }
}

fn dead_letter_section(settings: &Settings) -> Metric<DeadLetterSection> {
    let Some(files) = soft(
        "dead-letter queue",
        list_matching(&settings.dead_letter_dir, DOCUMENT_SUFFIX),
    ) else {
        return Metric::NotApplicable;
    };

    let names = file_names(&files);
    let count = names.len();
    let preview: Vec<String> = names.into_iter().take(DEAD_LETTER_PREVIEW).collect();
    Metric::Measured(DeadLetterSection {
        count,
        grade: DEAD_LETTER_FILES.grade(count),
        remaining: count - preview.len(),
        preview,
    })
}

fn quarantine_section(settings: &Settings, cutoff: SystemTime) -> Metric<QuarantineSection> {
    let Some(files) = soft(
        "quarantine",
        list_matching(&settings.quarantine_dir, DOCUMENT_SUFFIX),
    ) else {
        return Metric::NotApplicable;
    };

    let count = files.len();
    Metric::Measured(QuarantineSection {
        count,
        grade: QUARANTINE_FILES.grade(count),
        stale: count_modified_before(&files, cutoff),
    })
}

fn all_time_stats(store: &AuditStore) -> Result<AllTimeStats, ReportError> {
    Ok(AllTimeStats {
        documents: store.document_count()?,
        companies: store.company_count()?,
        by_type: store.documents_by_type()?,
    })
}

fn log_health(settings: &Settings) -> LogHealth {
    let path = settings.log_file.clone();
    match soft("log health", inspect_log(&path)) {
        Some(Some(stats)) => LogHealth::Found {
            grade: LOG_ERROR_LINES.grade(stats.error_lines),
            stats,
        },
        Some(None) => LogHealth::NotFound { path },
        None => LogHealth::Unreadable { path },
    }
}

/// One recommendation per triggered condition, evaluated independently of
/// the section grades.
pub fn recommendations(
    service: &ServiceSection,
    today: &Metric<DailyVolume>,
    rate: Option<f64>,
    dead_letter: &Metric<DeadLetterSection>,
    quarantine: &Metric<QuarantineSection>,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if let Some(volume) = today.as_measured()
        && volume.total > 0
        && let Some(rate) = rate
        && rate < RECOMMEND_MIN_SUCCESS_RATE
    {
        out.push(Recommendation::LowSuccessRate { rate });
    }

    if let Some(dlq) = dead_letter.as_measured()
        && dlq.count > RECOMMEND_MAX_DEAD_LETTER
    {
        out.push(Recommendation::DeadLetterBacklog { files: dlq.count });
    }

    if let Some(q) = quarantine.as_measured()
        && q.stale > 0
    {
        out.push(Recommendation::StaleQuarantine { files: q.stale });
    }

    if !service.state.is_active() {
        out.push(Recommendation::ServiceDown {
            service: service.name.clone(),
        });
    }

    out
}

pub fn verdict(
    recommendations: &[Recommendation],
    today: &Metric<DailyVolume>,
    success_rate: &Metric<SuccessRate>,
    dead_letter: &Metric<DeadLetterSection>,
) -> Verdict {
    if !recommendations.is_empty() {
        return Verdict::AttentionRequired {
            recommendations: recommendations.len(),
        };
    }

    let total = today.as_measured().map(|v| v.total).unwrap_or(0);
    if total == 0 {
        return Verdict::AwaitingData;
    }

    let excellent = success_rate
        .as_measured()
        .is_some_and(|s| s.grade == Grade::Excellent);
    let empty_queue = dead_letter.as_measured().is_some_and(|d| d.count == 0);

    if excellent && empty_queue {
        Verdict::Healthy
    } else {
        Verdict::Operational
    }
}
