mod common;

use common::{main_belt_entry, ScriptedTransport};
use hifitime::Epoch;
use obsplan::config::PlannerConfig;
use obsplan::planner::{plan_candidates, run_check};

const CONFIG: &str = r#"
    target_count = 6
    horizon = [[0.0, 20.0], [180.0, 20.0]]

    [observer]
    latitude = -34.0
    longitude = 138.6
    elevation = 50.0
    utc_offset = 10.5

    [magnitude]
    min = 16.0
    max = 19.0

    [window]
    start = "2026-02-04T10:30:00"
    end = "2026-02-04T14:30:00"
    step_minutes = 60

    [query]
    concurrency = 4
    max_retries = 2
    backoff_seconds = 0
"#;

fn config() -> PlannerConfig {
    PlannerConfig::from_toml_str(CONFIG).unwrap()
}

/// Five hourly samples: one candidate never clears the flat 20° mask, the
/// other peaks at 45° altitude at 12:30 UTC.
fn scripted_transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .with_target(
            "1001",
            &[
                (120.0, -20.0, 90.0, 8.0, 17.0),
                (121.0, -20.0, 95.0, 13.0, 17.0),
                (122.0, -20.0, 100.0, 17.0, 17.0),
                (123.0, -20.0, 105.0, 14.0, 17.0),
                (124.0, -20.0, 110.0, 9.0, 17.0),
            ],
        )
        .with_target(
            "1002",
            &[
                (200.0, -30.0, 120.0, 24.0, 17.4),
                (201.0, -30.0, 130.0, 36.0, 17.4),
                (202.0, -30.0, 140.0, 45.0, 17.4),
                (203.0, -30.0, 150.0, 39.0, 17.4),
                (204.0, -30.0, 160.0, 28.0, 17.4),
            ],
        )
}

#[tokio::test]
async fn test_end_to_end_masked_candidate_excluded() {
    let candidates = vec![
        main_belt_entry("1001", None, 16.0),
        main_belt_entry("1002", Some("Synthetica"), 16.0),
    ];

    let (list, summary) = plan_candidates(candidates, &config(), scripted_transport())
        .await
        .unwrap();

    assert_eq!(list.records.len(), 1);
    let record = &list.records[0];
    assert_eq!(record.designation, "1002");
    assert_eq!(record.name.as_deref(), Some("Synthetica"));
    assert_eq!(record.altitude, 45.0);
    // the 45° peak is the third hourly sample of the 10:30 window
    assert_eq!(
        record.transit,
        Epoch::from_gregorian_utc(2026, 2, 4, 12, 30, 0, 0)
    );

    assert_eq!(summary.considered, 2);
    assert_eq!(summary.queried, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.visible, 1);
}

#[tokio::test]
async fn test_failed_designation_is_no_data_not_a_crash() {
    // "2001" has no route: every attempt fails and it simply drops out
    let candidates = vec![
        main_belt_entry("2001", None, 16.0),
        main_belt_entry("1002", None, 16.0),
    ];

    let (list, summary) = plan_candidates(candidates, &config(), scripted_transport())
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.visible, 1);
    assert_eq!(list.records.len(), 1);
    assert_eq!(list.records[0].designation, "1002");
}

#[tokio::test]
async fn test_empty_list_is_success_not_error() {
    let candidates = vec![main_belt_entry("1001", None, 16.0)];

    let (list, summary) = plan_candidates(candidates, &config(), scripted_transport())
        .await
        .unwrap();

    assert!(list.records.is_empty());
    assert_eq!(summary.visible, 0);
    assert!(list.formatted_report(10.5).contains("no visible candidates"));
}

#[tokio::test]
async fn test_single_target_check_reports_transit() {
    let report = run_check("1002", &config(), scripted_transport())
        .await
        .unwrap();

    assert!(report.contains("Target 1002"));
    assert!(report.contains("visible"));
    // 12:30 UTC transit is 23:00 local at UTC+10.5
    assert!(report.contains("best viewing at 23:00 local"));
}

#[tokio::test]
async fn test_single_target_check_unreachable_target_errors() {
    let result = run_check("9999", &config(), scripted_transport()).await;
    assert!(result.is_err());
}
