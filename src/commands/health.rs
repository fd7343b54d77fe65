use crate::config::Settings;
use crate::console::{
    dim, format_size, format_thousands, get_terminal_width, heading, is_stdout_terminal, paint,
    panel_lines,
};
use crate::exceptions::ReportError;
use crate::grading::{Grade, Tone};
use crate::models::{
    AllTimeStats, DailyVolume, DeadLetterSection, HealthReport, LabelCount, Latency, LogHealth,
    Metric, QuarantineSection, ReconciliationRun, RetryStats, ServiceSection, ServiceState,
    Verdict,
};
use crate::report::build_report;
use crate::service::SystemctlProbe;
use crate::store::AuditStore;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use std::io::Write;
use time::OffsetDateTime;
use time::macros::format_description;

const TITLE: &str = "XML Organizer Health Report";
const NOT_APPLICABLE: &str = "n/a";
const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub width: usize,
    pub styled: bool,
}

pub fn run() -> Result<(), ReportError> {
    let settings = Settings::from_env();
    settings.validate()?;
    tracing::debug!(?settings, "resolved settings");

    let store = AuditStore::open(&settings.database)?;
    let report = build_report(&settings, &store, &SystemctlProbe, OffsetDateTime::now_utc());

    let options = RenderOptions {
        width: get_terminal_width(),
        styled: is_stdout_terminal(),
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render(&report, &options).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Renders the report as the console text printed by `run`.
pub fn render(report: &HealthReport, options: &RenderOptions) -> String {
    let mut out = Vec::new();
    let styled = options.styled;

    let generated = report
        .generated_at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| report.generated_at.to_string());
    out.extend(panel_lines(
        TITLE,
        &[format!("Generated {}", generated)],
        options.width,
    ));

    section(&mut out, "Service", styled, service_lines(&report.service, styled));
    section(
        &mut out,
        "Today's volume",
        styled,
        metric_lines(&report.today, volume_lines, "No records today"),
    );

    // Omitted entirely when nothing was discovered today.
    match &report.success_rate {
        Metric::Measured(rate) => section(
            &mut out,
            "Success rate",
            styled,
            vec![format!(
                "{:.2}% {}",
                rate.percent,
                grade_tag(rate.grade, styled)
            )],
        ),
        Metric::NotApplicable => section(
            &mut out,
            "Success rate",
            styled,
            vec![NOT_APPLICABLE.to_string()],
        ),
        Metric::Empty => {}
    }

    match &report.latency {
        Metric::Measured(latency) => section(
            &mut out,
            "Latency (successful records today)",
            styled,
            latency_lines(latency, styled),
        ),
        Metric::NotApplicable => section(
            &mut out,
            "Latency (successful records today)",
            styled,
            vec![NOT_APPLICABLE.to_string()],
        ),
        Metric::Empty => {}
    }

    section(
        &mut out,
        "Retries",
        styled,
        metric_lines(&report.retries, |r| retry_lines(r, styled), "No records today"),
    );
    section(
        &mut out,
        "Dead-letter queue",
        styled,
        metric_lines(
            &report.dead_letter,
            |d| dead_letter_lines(d, styled),
            "No files",
        ),
    );
    section(
        &mut out,
        "Quarantine",
        styled,
        metric_lines(
            &report.quarantine,
            |q| quarantine_lines(q, styled),
            "No files",
        ),
    );
    section(
        &mut out,
        "Top error types (last 24h)",
        styled,
        metric_lines(
            &report.top_errors,
            |rows| table_lines("Error type", rows, options),
            "No errors in the last 24 hours",
        ),
    );
    section(
        &mut out,
        "Last reconciliation",
        styled,
        metric_lines(
            &report.reconciliation,
            |r| reconciliation_lines(r, styled),
            "No reconciliation runs recorded",
        ),
    );
    section(
        &mut out,
        "All-time statistics",
        styled,
        metric_lines(
            &report.all_time,
            |s| all_time_lines(s, options),
            "No documents",
        ),
    );
    section(
        &mut out,
        "Stuck records",
        styled,
        metric_lines(
            &report.stuck_records,
            |n| {
                let tone = if *n > 0 { Tone::Warn } else { Tone::Good };
                vec![format!(
                    "Intermediate status for more than 10 min: {}",
                    paint(&format_thousands(*n), tone, styled)
                )]
            },
            "None",
        ),
    );
    section(&mut out, "Pipeline log", styled, log_lines(&report.log, styled));
    section(
        &mut out,
        "Recommendations",
        styled,
        recommendation_lines(report, styled),
    );

    out.push(String::new());
    out.extend(panel_lines(
        "Status",
        &[verdict_line(&report.verdict, styled)],
        options.width,
    ));

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn section(out: &mut Vec<String>, title: &str, styled: bool, lines: Vec<String>) {
    out.push(String::new());
    out.push(heading(title, styled));
    out.extend(lines.into_iter().map(|l| format!("{}{}", INDENT, l)));
}

fn metric_lines<T, F>(metric: &Metric<T>, f: F, empty: &str) -> Vec<String>
where
    F: FnOnce(&T) -> Vec<String>,
{
    match metric {
        Metric::Measured(value) => f(value),
        Metric::Empty => vec![empty.to_string()],
        Metric::NotApplicable => vec![NOT_APPLICABLE.to_string()],
    }
}

fn grade_tag(grade: Grade, styled: bool) -> String {
    paint(&format!("[{}]", grade.label()), grade.tone(), styled)
}

fn service_lines(service: &ServiceSection, styled: bool) -> Vec<String> {
    match service.state {
        ServiceState::Active { .. } => {
            let uptime = match service.uptime_hours {
                Some(h) => format!("uptime {} h", h),
                None => "uptime unknown".to_string(),
            };
            vec![format!(
                "{} {}: {} ({})",
                paint("✓", Tone::Good, styled),
                service.name,
                paint("ACTIVE", Tone::Good, styled),
                uptime
            )]
        }
        ServiceState::Inactive => vec![format!(
            "{} {}: {}",
            paint("✗", Tone::Bad, styled),
            service.name,
            paint("INACTIVE", Tone::Bad, styled)
        )],
    }
}

fn volume_lines(volume: &DailyVolume) -> Vec<String> {
    vec![format!(
        "Total: {} | Success: {} | Duplicates: {} | Errors: {}",
        format_thousands(volume.total),
        format_thousands(volume.success),
        format_thousands(volume.duplicate),
        format_thousands(volume.other)
    )]
}

fn latency_lines(latency: &Latency, styled: bool) -> Vec<String> {
    vec![format!(
        "Average: {} ms | Max: {} ms {}",
        format_thousands(latency.average_ms),
        format_thousands(latency.max_ms),
        grade_tag(latency.grade, styled)
    )]
}

fn retry_lines(retries: &RetryStats, styled: bool) -> Vec<String> {
    vec![format!(
        "Retried records: {} | Mean attempts: {:.2} {}",
        format_thousands(retries.retried),
        retries.mean_attempts,
        grade_tag(retries.grade, styled)
    )]
}

fn dead_letter_lines(dlq: &DeadLetterSection, styled: bool) -> Vec<String> {
    let mut lines = vec![format!("Files: {} {}", dlq.count, grade_tag(dlq.grade, styled))];
    lines.extend(dlq.preview.iter().map(|name| format!("{}- {}", INDENT, name)));
    if dlq.remaining > 0 {
        lines.push(dim(&format!("{}+{} more", INDENT, dlq.remaining), styled));
    }
    lines
}

fn quarantine_lines(quarantine: &QuarantineSection, styled: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "Files: {} {}",
        quarantine.count,
        grade_tag(quarantine.grade, styled)
    )];
    if quarantine.grade == Grade::Attention {
        let mut line = format!("Older than 10 min: {}", quarantine.stale);
        if quarantine.has_problem() {
            line.push(' ');
            line.push_str(&paint("[PROBLEM]", Tone::Bad, styled));
        }
        lines.push(line);
    }
    lines
}

fn reconciliation_lines(run: &ReconciliationRun, styled: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "Run at: {} | Files checked: {} | Inconsistencies: {} | Fixed: {}",
        if run.run_at.is_empty() {
            NOT_APPLICABLE
        } else {
            run.run_at.as_str()
        },
        format_thousands(run.files_checked),
        format_thousands(run.inconsistencies_found),
        format_thousands(run.issues_fixed)
    )];

    if run.is_clean() {
        lines.push(format!(
            "{} No inconsistencies",
            paint("✓", Tone::Good, styled)
        ));
    } else {
        lines.push(format!(
            "{} Inconsistencies detected and corrected",
            paint("⚠", Tone::Warn, styled)
        ));
        let shown = crate::consts::RECONCILIATION_DETAIL_PREVIEW;
        lines.extend(
            run.details
                .iter()
                .take(shown)
                .map(|d| format!("{}- {}", INDENT, d)),
        );
        if run.details.len() > shown {
            lines.push(dim(
                &format!("{}+{} more", INDENT, run.details.len() - shown),
                styled,
            ));
        }
    }
    lines
}

fn all_time_lines(stats: &AllTimeStats, options: &RenderOptions) -> Vec<String> {
    let mut lines = vec![format!(
        "Documents: {} | Companies: {}",
        format_thousands(stats.documents),
        format_thousands(stats.companies)
    )];
    if !stats.by_type.is_empty() {
        lines.extend(table_lines("Document type", &stats.by_type, options));
    }
    lines
}

fn table_lines(label_header: &str, rows: &[LabelCount], options: &RenderOptions) -> Vec<String> {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, ' ')
        .set_width(options.width.saturating_sub(INDENT.len()).min(u16::MAX as usize) as u16);

    if options.styled {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }

    table.set_header(vec![
        Cell::new("Count").add_attribute(Attribute::Bold),
        Cell::new(label_header).add_attribute(Attribute::Bold),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(format_thousands(row.count)).set_alignment(CellAlignment::Right),
            Cell::new(&row.label),
        ]);
    }

    table
        .to_string()
        .lines()
        .map(|l| l.trim_end().to_string())
        .collect()
}

fn log_lines(log: &LogHealth, styled: bool) -> Vec<String> {
    match log {
        LogHealth::Found { stats, grade } => vec![format!(
            "Size: {} | Lines: {} | Error lines: {} {}",
            format_size(stats.size_bytes),
            format_thousands(stats.lines as i64),
            format_thousands(stats.error_lines as i64),
            grade_tag(*grade, styled)
        )],
        LogHealth::NotFound { path } => vec![format!(
            "{} Log file not found: {}",
            paint("⚠", Tone::Warn, styled),
            path.display()
        )],
        LogHealth::Unreadable { path } => vec![format!(
            "{} ({} unreadable)",
            NOT_APPLICABLE,
            path.display()
        )],
    }
}

fn recommendation_lines(report: &HealthReport, styled: bool) -> Vec<String> {
    if report.recommendations.is_empty() {
        return vec![format!(
            "{} No critical actions required",
            paint("✓", Tone::Good, styled)
        )];
    }
    report
        .recommendations
        .iter()
        .map(|r| format!("{} CRITICAL: {}", paint("✗", Tone::Bad, styled), r))
        .collect()
}

fn verdict_line(verdict: &Verdict, styled: bool) -> String {
    match verdict {
        Verdict::AttentionRequired { recommendations } => format!(
            "{} ({} recommendation{})",
            paint(verdict.label(), Tone::Bad, styled),
            recommendations,
            if *recommendations == 1 { "" } else { "s" }
        ),
        Verdict::AwaitingData => format!(
            "{} (no records discovered today)",
            paint(verdict.label(), Tone::Warn, styled)
        ),
        Verdict::Healthy => paint(verdict.label(), Tone::Good, styled),
        Verdict::Operational => format!(
            "{} (functioning, not pristine)",
            paint(verdict.label(), Tone::Warn, styled)
        ),
    }
}
