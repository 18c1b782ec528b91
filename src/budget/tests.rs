use super::*;
use std::fs;
use tempfile::{tempdir, TempDir};

const LIMITS: &str = "static-analysis.properties";

fn tracker_with(content: &str, ci: bool) -> (TempDir, AnalysisBudgetTracker) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(LIMITS);
    fs::write(&path, content).unwrap();
    (dir, AnalysisBudgetTracker::new(LimitsStore::new(path), ci))
}

fn stored(tracker: &AnalysisBudgetTracker, key: &str) -> Option<u32> {
    tracker.limits().unwrap().and_then(|l| l.get(key))
}

#[test]
fn test_equal_to_limit_passes() {
    for tool in [ToolSpec::checkstyle("r.xml"), ToolSpec::spotbugs("r.xml")] {
        for limit in [0, 1, 10, 37, 100, 5000] {
            let decision = decide(&tool, Some(limit), Some(limit), true, LIMITS);
            assert_eq!(
                decision,
                Decision::Pass(PassReason::WithinBudget { actual: limit, limit })
            );
        }
    }
}

#[test]
fn test_one_over_limit_fails() {
    for tool in [ToolSpec::checkstyle("r.xml"), ToolSpec::spotbugs("r.xml")] {
        for limit in [0, 1, 10, 100] {
            assert!(decide(&tool, Some(limit), Some(limit + 1), false, LIMITS).is_fail());
        }
    }
}

#[test]
fn test_spotbugs_failure_message() {
    let decision = decide(&ToolSpec::spotbugs("r.xml"), Some(20), Some(25), false, LIMITS);
    assert_eq!(
        decision,
        Decision::Fail("Too much SpotBugs errors: actual=25, limit=20".to_string())
    );
}

#[test]
fn test_between_bound_and_limit_passes() {
    // checkstyle: 95% of 100 is 95
    let checkstyle = ToolSpec::checkstyle("r.xml");
    for actual in 95..=100 {
        assert!(matches!(
            decide(&checkstyle, Some(100), Some(actual), true, LIMITS),
            Decision::Pass(_)
        ));
    }
    // spotbugs: 100 - 10
    let spotbugs = ToolSpec::spotbugs("r.xml");
    for actual in 90..=100 {
        assert!(matches!(
            decide(&spotbugs, Some(100), Some(actual), true, LIMITS),
            Decision::Pass(_)
        ));
    }
}

#[test]
fn test_rates_differ_at_the_margin() {
    // 91 is inside spotbugs' fixed margin but below checkstyle's 95%
    assert!(matches!(
        decide(&ToolSpec::spotbugs("r.xml"), Some(100), Some(91), false, LIMITS),
        Decision::Pass(_)
    ));
    assert_eq!(
        decide(&ToolSpec::checkstyle("r.xml"), Some(100), Some(91), false, LIMITS),
        Decision::Ratcheted(91)
    );
}

#[test]
fn test_below_bound_on_ci_fails_with_remediation() {
    let decision = decide(&ToolSpec::checkstyle("r.xml"), Some(100), Some(50), true, LIMITS);
    assert_eq!(
        decision,
        Decision::Fail(
            "Checkstyle limit is too high, must be 50. Decrease it in file static-analysis.properties."
                .to_string()
        )
    );
}

#[test]
fn test_zero_limit_is_zero_tolerance() {
    let tool = ToolSpec::spotbugs("r.xml");
    assert!(matches!(
        decide(&tool, Some(0), Some(0), true, LIMITS),
        Decision::Pass(PassReason::WithinBudget { actual: 0, limit: 0 })
    ));
    assert!(decide(&tool, Some(0), Some(1), false, LIMITS).is_fail());
}

#[test]
fn test_small_limits_never_ratchet_below_zero() {
    let tool = ToolSpec::spotbugs("r.xml");
    for limit in 0..=10 {
        for actual in 0..=limit {
            assert!(matches!(
                decide(&tool, Some(limit), Some(actual), true, LIMITS),
                Decision::Pass(_)
            ));
        }
    }
}

#[test]
fn test_missing_limit_or_report_passes() {
    let tool = ToolSpec::detekt("r.xml");
    assert_eq!(
        decide(&tool, None, Some(1000), true, LIMITS),
        Decision::Pass(PassReason::NoLimit)
    );
    assert_eq!(
        decide(&tool, None, None, true, LIMITS),
        Decision::Pass(PassReason::NoLimit)
    );
    assert_eq!(
        decide(&tool, Some(3), None, true, LIMITS),
        Decision::Pass(PassReason::NoReport)
    );
}

#[test]
fn test_local_ratchet_persists_new_limit() {
    let (_dir, tracker) = tracker_with("checkstyle=100\n", false);
    let decision = tracker
        .evaluate(&ToolSpec::checkstyle("r.xml"), Some(50))
        .unwrap();
    assert_eq!(decision, Decision::Ratcheted(50));
    assert_eq!(stored(&tracker, "checkstyle"), Some(50));
}

#[test]
fn test_ci_never_mutates_limits() {
    let (_dir, tracker) = tracker_with("checkstyle=100\nfindbugs=40\n", true);
    let decision = tracker
        .evaluate(&ToolSpec::checkstyle("r.xml"), Some(50))
        .unwrap();
    assert!(decision.is_fail());
    assert_eq!(stored(&tracker, "checkstyle"), Some(100));
    assert_eq!(stored(&tracker, "findbugs"), Some(40));
}

#[test]
fn test_ratchet_keeps_other_tools() {
    let (_dir, tracker) = tracker_with("checkstyle=100\nfindbugs=40\ndetekt=7\n", false);
    tracker
        .evaluate(&ToolSpec::spotbugs("r.xml"), Some(12))
        .unwrap();
    tracker
        .evaluate(&ToolSpec::checkstyle("r.xml"), Some(80))
        .unwrap();

    assert_eq!(stored(&tracker, "findbugs"), Some(12));
    assert_eq!(stored(&tracker, "checkstyle"), Some(80));
    assert_eq!(stored(&tracker, "detekt"), Some(7));
}

#[test]
fn test_pass_does_not_touch_file() {
    let original = "# hand written\nfindbugs = 20\n";
    let (dir, tracker) = tracker_with(original, false);
    tracker
        .evaluate(&ToolSpec::spotbugs("r.xml"), Some(15))
        .unwrap();
    assert_eq!(fs::read_to_string(dir.path().join(LIMITS)).unwrap(), original);
}

#[test]
fn test_no_limits_file_skips_everything() {
    let dir = tempdir().unwrap();
    let tracker = AnalysisBudgetTracker::new(LimitsStore::new(dir.path().join(LIMITS)), false);
    let decision = tracker
        .evaluate(&ToolSpec::checkstyle("r.xml"), Some(999))
        .unwrap();
    assert_eq!(decision, Decision::Pass(PassReason::NoLimit));
    assert!(!dir.path().join(LIMITS).exists());
}
