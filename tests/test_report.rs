mod common;

use common::{
    BrokenProbe, FixedProbe, active, backdate, fixture, insert_audit, insert_today,
    touch_documents,
};
use std::fs;
use std::time::Duration;
use time::OffsetDateTime;
use xmlorg_health::grading::Grade;
use xmlorg_health::models::{
    DailyVolume, HealthReport, LogHealth, Metric, Recommendation, ServiceSection, ServiceState,
    Verdict,
};
use xmlorg_health::report::{build_report, recommendations};
use xmlorg_health::service::ServiceProbe;
use xmlorg_health::store::AuditStore;

fn report_for(fx: &common::Fixture, probe: &dyn ServiceProbe) -> HealthReport {
    let store = AuditStore::open(&fx.settings.database).unwrap();
    build_report(&fx.settings, &store, probe, OffsetDateTime::now_utc())
}

#[test]
fn test_no_records_today_awaits_data() {
    let fx = fixture();

    let report = report_for(&fx, &active());

    assert_eq!(report.total_today(), 0);
    assert_eq!(report.success_rate, Metric::Empty);
    assert_eq!(report.latency, Metric::Empty);
    assert!(report.recommendations.is_empty());
    assert_eq!(report.verdict, Verdict::AwaitingData);
}

#[test]
fn test_99_of_100_is_healthy() {
    let fx = fixture();
    insert_today(&fx.conn(), 100, 99);

    let report = report_for(&fx, &active());

    let rate = report.success_rate.as_measured().unwrap();
    assert_eq!(rate.percent, 99.0);
    assert_eq!(rate.grade, Grade::Excellent);
    assert!(report.recommendations.is_empty());
    assert_eq!(report.verdict, Verdict::Healthy);
}

#[test]
fn test_90_of_100_requires_attention() {
    let fx = fixture();
    insert_today(&fx.conn(), 100, 90);

    let report = report_for(&fx, &active());

    let rate = report.success_rate.as_measured().unwrap();
    assert_eq!(rate.percent, 90.0);
    assert_eq!(rate.grade, Grade::Critical);
    assert_eq!(
        report.recommendations,
        vec![Recommendation::LowSuccessRate { rate: 90.0 }]
    );
    assert_eq!(
        report.verdict,
        Verdict::AttentionRequired { recommendations: 1 }
    );
}

#[test]
fn test_acceptable_rate_is_operational() {
    let fx = fixture();
    insert_today(&fx.conn(), 100, 97);

    let report = report_for(&fx, &active());

    assert_eq!(
        report.success_rate.as_measured().unwrap().grade,
        Grade::Acceptable
    );
    assert_eq!(report.verdict, Verdict::Operational);
}

#[test]
fn test_dead_letter_files_block_healthy() {
    let fx = fixture();
    insert_today(&fx.conn(), 10, 10);
    touch_documents(&fx.settings.dead_letter_dir, 2);

    let report = report_for(&fx, &active());

    let dlq = report.dead_letter.as_measured().unwrap();
    assert_eq!(dlq.count, 2);
    assert_eq!(dlq.grade, Grade::Attention);
    // Two files grade ATTENTION but stay below the recommendation threshold.
    assert!(report.recommendations.is_empty());
    assert_eq!(report.verdict, Verdict::Operational);
}

#[test]
fn test_seven_dead_letter_files_preview_five() {
    let fx = fixture();
    touch_documents(&fx.settings.dead_letter_dir, 7);

    let report = report_for(&fx, &active());

    let dlq = report.dead_letter.as_measured().unwrap();
    assert_eq!(dlq.count, 7);
    assert_eq!(dlq.grade, Grade::Critical);
    assert_eq!(
        dlq.preview,
        vec!["doc_00.xml", "doc_01.xml", "doc_02.xml", "doc_03.xml", "doc_04.xml"]
    );
    assert_eq!(dlq.remaining, 2);
    assert!(
        report
            .recommendations
            .contains(&Recommendation::DeadLetterBacklog { files: 7 })
    );
}

#[test]
fn test_five_dead_letter_files_do_not_recommend() {
    let fx = fixture();
    touch_documents(&fx.settings.dead_letter_dir, 5);

    let report = report_for(&fx, &active());

    assert_eq!(report.dead_letter.as_measured().unwrap().grade, Grade::Critical);
    assert!(report.recommendations.is_empty());
}

#[test]
fn test_quarantine_attention_with_stale_files() {
    let fx = fixture();
    let files = touch_documents(&fx.settings.quarantine_dir, 6);
    backdate(&files[0], Duration::from_secs(15 * 60));

    let report = report_for(&fx, &active());

    let q = report.quarantine.as_measured().unwrap();
    assert_eq!(q.count, 6);
    assert_eq!(q.grade, Grade::Attention);
    assert_eq!(q.stale, 1);
    assert!(q.has_problem());
    assert_eq!(
        report.recommendations,
        vec![Recommendation::StaleQuarantine { files: 1 }]
    );
}

#[test]
fn test_stale_quarantine_recommended_even_when_grade_ok() {
    let fx = fixture();
    let files = touch_documents(&fx.settings.quarantine_dir, 2);
    backdate(&files[1], Duration::from_secs(60 * 60));

    let report = report_for(&fx, &active());

    let q = report.quarantine.as_measured().unwrap();
    assert_eq!(q.grade, Grade::Ok);
    assert!(!q.has_problem());
    assert_eq!(
        report.recommendations,
        vec![Recommendation::StaleQuarantine { files: 1 }]
    );
}

#[test]
fn test_inactive_service_always_recommended() {
    let fx = fixture();
    insert_today(&fx.conn(), 100, 100);

    let report = report_for(&fx, &FixedProbe(ServiceState::Inactive));

    assert_eq!(report.service.state, ServiceState::Inactive);
    assert_eq!(report.service.uptime_hours, None);
    assert_eq!(
        report.recommendations,
        vec![Recommendation::ServiceDown {
            service: "xml-organizer".into()
        }]
    );
    assert_eq!(
        report.verdict,
        Verdict::AttentionRequired { recommendations: 1 }
    );
}

#[test]
fn test_unreachable_service_manager_counts_as_inactive() {
    let fx = fixture();

    let report = report_for(&fx, &BrokenProbe);

    assert_eq!(report.service.state, ServiceState::Inactive);
    assert_eq!(report.recommendations.len(), 1);
}

#[test]
fn test_uptime_from_activation_timestamp() {
    let fx = fixture();
    let store = AuditStore::open(&fx.settings.database).unwrap();
    let now = OffsetDateTime::now_utc();
    let since = now - time::Duration::hours(26) - time::Duration::minutes(5);

    let report = build_report(
        &fx.settings,
        &store,
        &FixedProbe(ServiceState::Active { since: Some(since) }),
        now,
    );

    assert_eq!(report.service.uptime_hours, Some(26));
}

#[test]
fn test_all_conditions_counted() {
    let fx = fixture();
    insert_today(&fx.conn(), 10, 5);
    touch_documents(&fx.settings.dead_letter_dir, 6);
    let files = touch_documents(&fx.settings.quarantine_dir, 1);
    backdate(&files[0], Duration::from_secs(11 * 60));

    let report = report_for(&fx, &FixedProbe(ServiceState::Inactive));

    assert_eq!(report.recommendations.len(), 4);
    assert_eq!(
        report.verdict,
        Verdict::AttentionRequired { recommendations: 4 }
    );
}

#[test]
fn test_retry_mean_truncated_for_grading() {
    let fx = fixture();
    let conn = fx.conn();
    // Mean of 1, 2, 2, 2 is 1.75, graded on its integer part.
    insert_audit(&conn, "SUCCESS", "-0 seconds", Some(10), 1, None);
    for _ in 0..3 {
        insert_audit(&conn, "SUCCESS", "-0 seconds", Some(10), 2, None);
    }

    let report = report_for(&fx, &active());

    let retries = report.retries.as_measured().unwrap();
    assert_eq!(retries.retried, 3);
    assert_eq!(retries.mean_attempts, 1.75);
    assert_eq!(retries.grade, Grade::Excellent);
}

#[test]
fn test_latency_graded_on_average() {
    let fx = fixture();
    let conn = fx.conn();
    insert_audit(&conn, "SUCCESS", "-0 seconds", Some(4000), 1, None);
    insert_audit(&conn, "SUCCESS", "-0 seconds", Some(7000), 1, None);

    let report = report_for(&fx, &active());

    let latency = report.latency.as_measured().unwrap();
    assert_eq!(latency.average_ms, 5500);
    assert_eq!(latency.max_ms, 7000);
    assert_eq!(latency.grade, Grade::Slow);
}

#[test]
fn test_missing_log_reported_not_fatal() {
    let fx = fixture();

    let report = report_for(&fx, &active());

    assert_eq!(
        report.log,
        LogHealth::NotFound {
            path: fx.settings.log_file.clone()
        }
    );
}

#[test]
fn test_log_found_graded_by_error_lines() {
    let fx = fixture();
    let lines: String = (0..12).map(|i| format!("[ERROR] failure {}\n", i)).collect();
    fs::write(&fx.settings.log_file, lines).unwrap();

    let report = report_for(&fx, &active());

    match report.log {
        LogHealth::Found { stats, grade } => {
            assert_eq!(stats.lines, 12);
            assert_eq!(stats.error_lines, 12);
            assert_eq!(grade, Grade::Some);
        }
        other => panic!("unexpected log health: {:?}", other),
    }
}

#[test]
fn test_failed_queries_degrade_to_not_applicable() {
    let fx = fixture();
    fx.conn()
        .execute_batch("DROP TABLE processing_audit; DROP TABLE nota_fiscal;")
        .unwrap();
    fs::remove_dir(&fx.settings.dead_letter_dir).unwrap();

    let report = report_for(&fx, &active());

    assert_eq!(report.today, Metric::NotApplicable);
    assert_eq!(report.success_rate, Metric::NotApplicable);
    assert_eq!(report.latency, Metric::NotApplicable);
    assert_eq!(report.top_errors, Metric::NotApplicable);
    assert_eq!(report.all_time, Metric::NotApplicable);
    assert_eq!(report.dead_letter, Metric::NotApplicable);
    assert_eq!(report.reconciliation, Metric::Empty);
    assert_eq!(report.verdict, Verdict::AwaitingData);
}

#[test]
fn test_recommendations_skip_rate_without_records() {
    let service = ServiceSection {
        name: "xml-organizer".into(),
        state: ServiceState::Active { since: None },
        uptime_hours: None,
    };
    let today = Metric::Measured(DailyVolume::default());

    let recs = recommendations(&service, &today, Some(0.0), &Metric::Empty, &Metric::Empty);

    assert!(recs.is_empty());
}
