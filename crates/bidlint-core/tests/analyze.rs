//! End-to-end analysis behavior: the documented scenarios plus the engine's
//! determinism, memoization, exhaustiveness, and non-crash guarantees.

use bidlint_core::{AnalyzeOptions, Analyzer, Severity};

fn analyzer() -> Analyzer {
    Analyzer::new()
}

const SITE_BANNER: &str = r#"{"id":"r1","imp":[{"id":"1","banner":{"w":300,"h":250}}],"site":{"id":"s1","domain":"x.com","publisher":{"id":"p1"}}}"#;

#[test]
fn site_banner_without_device() {
    let result = analyzer().analyze(SITE_BANNER, &AnalyzeOptions::default());
    assert_eq!(result.summary.platform, "Site");
    assert_eq!(result.summary.media_formats, vec!["banner"]);
    assert!(
        result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.id == "device.missing"),
        "expected a warning for the absent device object"
    );
}

#[test]
fn app_and_site_together_is_an_error() {
    let text = r#"{"id":"r1","imp":[{"id":"1","banner":{"w":300,"h":250}}],"app":{"id":"a1","bundle":"com.example.app"},"site":{"id":"s1","domain":"x.com"}}"#;
    let result = analyzer().analyze(text, &AnalyzeOptions::default());
    let hit = result
        .issues
        .iter()
        .find(|i| i.id == "core.app-site-exclusive")
        .expect("exclusivity rule must fire");
    assert_eq!(hit.severity, Severity::Error);
}

#[test]
fn empty_impression_array_is_an_error_and_counts_zero() {
    let result = analyzer().analyze(r#"{"id":"r1","imp":[]}"#, &AnalyzeOptions::default());
    assert_eq!(result.summary.impressions, 0);
    let hit = result
        .issues
        .iter()
        .find(|i| i.id == "core.imp-empty")
        .expect("empty imp rule must fire");
    assert_eq!(hit.severity, Severity::Error);
}

#[test]
fn rqddurs_with_duration_range_is_exclusive_regardless_of_validity() {
    let text = r#"{"id":"r1","imp":[{"id":"1","video":{"mimes":["video/mp4"],"minduration":10,"maxduration":15,"rqddurs":[10,20]}}]}"#;
    let result = analyzer().analyze(text, &AnalyzeOptions::default());
    let hit = result
        .issues
        .iter()
        .find(|i| i.id == "video.rqddurs-exclusive")
        .expect("exclusivity rule must fire even with individually valid durations");
    assert_eq!(hit.severity, Severity::Error);
}

#[test]
fn non_json_text_yields_error_and_single_issue() {
    let result = analyzer().analyze("not json", &AnalyzeOptions::default());
    assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].id, "parse.invalid-json");
    assert_eq!(result.summary.request_type, "Unknown");
}

#[test]
fn analyze_never_panics_on_degenerate_input() {
    let a = analyzer();
    for text in ["", "null", "42", "{malformed", "[]", "[1,2,3]", "\"str\"", "{}"] {
        let result = a.analyze(text, &AnalyzeOptions::default());
        assert_eq!(result.summary.impressions, 0, "input: {:?}", text);
    }
}

#[test]
fn scalar_json_reports_missing_request_not_parse_error() {
    let a = analyzer();
    for text in ["null", "42"] {
        let result = a.analyze(text, &AnalyzeOptions::default());
        assert!(result.error.is_none(), "input: {:?}", text);
        let ids: Vec<_> = result.issues.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["core.request-missing"], "input: {:?}", text);
    }
}

#[test]
fn repeated_analysis_is_deterministic() {
    // Two independent analyzers so no memoization can mask a difference.
    let first = Analyzer::new().analyze(SITE_BANNER, &AnalyzeOptions::default());
    let second = Analyzer::new().analyze(SITE_BANNER, &AnalyzeOptions::default());
    assert_eq!(
        serde_json::to_value(&*first).unwrap(),
        serde_json::to_value(&*second).unwrap()
    );
}

#[test]
fn memo_hit_is_behaviorally_identical_to_a_fresh_run() {
    let a = analyzer();
    let cold = a.analyze(SITE_BANNER, &AnalyzeOptions::default());
    let warm = a.analyze(SITE_BANNER, &AnalyzeOptions::default());
    let fresh = Analyzer::new().analyze(SITE_BANNER, &AnalyzeOptions::default());
    assert_eq!(
        serde_json::to_value(&*cold).unwrap(),
        serde_json::to_value(&*warm).unwrap()
    );
    assert_eq!(
        serde_json::to_value(&*warm).unwrap(),
        serde_json::to_value(&*fresh).unwrap()
    );
}

#[test]
fn independent_violations_all_surface() {
    // Empty id, secure missing, gdpr without consent, schain absent: four
    // unrelated problems, four (or more) issues, none suppressed.
    let text = r#"{"id":"","imp":[{"id":"1","banner":{"w":300,"h":250}}],"site":{"id":"s1","domain":"x.com"},"regs":{"gdpr":1}}"#;
    let result = analyzer().analyze(text, &AnalyzeOptions::default());
    let ids: Vec<_> = result.issues.iter().map(|i| i.id).collect();
    for expected in [
        "core.id-empty",
        "imp.secure-missing",
        "privacy.gdpr-consent-missing",
        "source.schain-missing",
    ] {
        assert!(ids.contains(&expected), "missing {:?} in {:?}", expected, ids);
    }
}

#[test]
fn issue_order_follows_the_catalogue_not_severity() {
    let text = r#"{"id":"","imp":[{"id":"1","banner":{"w":300,"h":250}}],"regs":{"gdpr":1}}"#;
    let result = analyzer().analyze(text, &AnalyzeOptions::default());
    let ids: Vec<_> = result.issues.iter().map(|i| i.id).collect();
    let core = ids.iter().position(|i| *i == "core.id-empty").unwrap();
    let privacy = ids
        .iter()
        .position(|i| *i == "privacy.gdpr-consent-missing")
        .unwrap();
    assert!(core < privacy);
}

#[test]
fn reserialized_request_analyzes_identically() {
    let a = analyzer();
    let first = a.analyze(SITE_BANNER, &AnalyzeOptions::default());
    let request = first.request.as_ref().expect("request should decode");
    let round_tripped = serde_json::to_string(request).unwrap();
    let second = a.analyze(&round_tripped, &AnalyzeOptions::default());
    assert_eq!(
        serde_json::to_value(&first.summary).unwrap(),
        serde_json::to_value(&second.summary).unwrap()
    );
    let first_ids: Vec<_> = first.issues.iter().map(|i| i.id).collect();
    let second_ids: Vec<_> = second.issues.iter().map(|i| i.id).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn enveloped_request_is_located_and_analyzed() {
    let text = format!(r#"{{"capturedAt":"2024-03-01","payload":{}}}"#, SITE_BANNER);
    let result = analyzer().analyze(&text, &AnalyzeOptions::default());
    assert_eq!(result.summary.platform, "Site");
    assert!(!result.issues.iter().any(|i| i.id == "core.request-missing"));
}

#[test]
fn crossfield_issues_follow_the_rule_pass() {
    let text = r#"{"id":"r1","imp":[{"id":"1","banner":{"w":320,"h":50}}],"app":{"id":"a1","name":"Example","bundle":"999","storeurl":"https://apps.apple.com/us/app/example/id1193350206","publisher":{"id":"p1"}},"ext":{"dc":"fra"},"device":{"geo":{"country":"USA"}}}"#;
    let result = analyzer().analyze(text, &AnalyzeOptions::default());
    let ids: Vec<_> = result.issues.iter().map(|i| i.id).collect();
    let mismatch = ids
        .iter()
        .position(|i| *i == "crossfield.store-bundle-mismatch")
        .expect("bundle mismatch should fire");
    let geo = ids
        .iter()
        .position(|i| *i == "crossfield.geo-datacenter")
        .expect("geo/datacenter warning should fire");
    assert!(mismatch < geo);
    // Every catalogue issue precedes the cross-field ones.
    let last_rule_issue = ids
        .iter()
        .rposition(|i| !i.starts_with("crossfield."))
        .unwrap();
    assert!(last_rule_issue < mismatch);
}
