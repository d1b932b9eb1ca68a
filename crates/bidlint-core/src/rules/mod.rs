//! The rule catalogue and its evaluator.
//!
//! A rule is a plain record around two pure predicates: `applies` gates the
//! rule on the analysis context (absent means always applicable), `validate`
//! returns true when the request passes. Rules never mutate the context and
//! never see each other's results, so the evaluator can simply walk the whole
//! catalogue — one failing rule must never suppress another.

use serde::Serialize;

use crate::context::Context;

pub mod advanced;
pub mod app;
pub mod audio;
pub mod banner;
pub mod core;
pub mod ctv;
pub mod device;
pub mod dooh;
pub mod helpers;
pub mod imp;
pub mod native;
pub mod partner;
pub mod privacy;
pub mod site;
pub mod source;
pub mod video;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
        }
    }
}

pub type Predicate = fn(&Context) -> bool;

/// One declarative catalogue entry. `id` is stable and externally referenced;
/// never renumber an existing rule.
pub struct Rule {
    pub id: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    /// Dot/bracket locator for diagnostics. Per-impression rules use the
    /// `imp[]` wildcard; the failing index is deliberately not reported.
    pub path: Option<&'static str>,
    /// Citation into the OpenRTB 2.6 spec, e.g. "3.2.1".
    pub spec_ref: Option<&'static str>,
    pub applies: Option<Predicate>,
    pub validate: Predicate,
}

/// A non-passing rule, frozen into the analysis output.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub id: &'static str,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "specRef", skip_serializing_if = "Option::is_none")]
    pub spec_ref: Option<&'static str>,
}

impl Issue {
    fn from_rule(rule: &Rule) -> Self {
        Issue {
            id: rule.id,
            severity: rule.severity,
            message: rule.description.to_string(),
            path: rule.path.map(str::to_string),
            spec_ref: rule.spec_ref,
        }
    }
}

pub struct RuleSet {
    pub name: &'static str,
    pub rules: Vec<Rule>,
}

/// Assemble the catalogue. Set order is fixed and documented here because it
/// determines issue order in the output; it has no effect on *which* rules
/// fire.
pub fn catalogue() -> Vec<RuleSet> {
    vec![
        RuleSet { name: "core", rules: core::rules() },
        RuleSet { name: "impression", rules: imp::rules() },
        RuleSet { name: "app", rules: app::rules() },
        RuleSet { name: "site", rules: site::rules() },
        RuleSet { name: "device", rules: device::rules() },
        RuleSet { name: "video", rules: video::rules() },
        RuleSet { name: "audio", rules: audio::rules() },
        RuleSet { name: "native", rules: native::rules() },
        RuleSet { name: "banner", rules: banner::rules() },
        RuleSet { name: "ctv", rules: ctv::rules() },
        RuleSet { name: "dooh", rules: dooh::rules() },
        RuleSet { name: "partner", rules: partner::rules() },
        RuleSet { name: "privacy", rules: privacy::rules() },
        RuleSet { name: "source", rules: source::rules() },
        RuleSet { name: "advanced", rules: advanced::rules() },
    ]
}

/// Run every applicable rule, in catalogue order, with no early exit.
pub fn evaluate(sets: &[RuleSet], ctx: &Context) -> Vec<Issue> {
    let mut issues = Vec::new();
    for set in sets {
        let before = issues.len();
        for rule in &set.rules {
            let applicable = rule.applies.map_or(true, |applies| applies(ctx));
            if applicable && !(rule.validate)(ctx) {
                issues.push(Issue::from_rule(rule));
            }
        }
        log::debug!(
            "rule set '{}': {} rule(s), {} issue(s)",
            set.name,
            set.rules.len(),
            issues.len() - before
        );
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::openrtb::BidRequest;

    fn ctx(v: serde_json::Value) -> Context {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        Context::build(Some(req), false, false, None)
    }

    #[test]
    fn catalogue_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for set in catalogue() {
            for rule in &set.rules {
                assert!(seen.insert(rule.id), "duplicate rule id '{}'", rule.id);
            }
        }
    }

    #[test]
    fn catalogue_has_full_coverage() {
        let total: usize = catalogue().iter().map(|s| s.rules.len()).sum();
        assert!(total >= 100, "expected 100+ rules, got {}", total);
    }

    #[test]
    fn evaluation_is_exhaustive_and_ordered() {
        // Violates rules in several sets at once; all must be reported, in
        // catalogue order.
        let c = ctx(serde_json::json!({
            "id": "",
            "imp": [],
            "app": {"id":"a1"},
            "site": {"id":"s1"}
        }));
        let issues = evaluate(&catalogue(), &c);
        let ids: Vec<_> = issues.iter().map(|i| i.id).collect();
        assert!(ids.contains(&"core.id-empty"));
        assert!(ids.contains(&"core.imp-empty"));
        assert!(ids.contains(&"core.app-site-exclusive"));
        let pos_core = ids.iter().position(|i| *i == "core.id-empty").unwrap();
        let pos_device = ids.iter().position(|i| *i == "device.missing").unwrap();
        assert!(pos_core < pos_device, "core set must precede device set");
    }

    #[test]
    fn no_root_yields_single_presence_issue_from_core() {
        let c = Context::build(None, false, false, None);
        let issues = evaluate(&catalogue(), &c);
        assert_eq!(issues.len(), 1, "unexpected issues: {:?}", issues);
        assert_eq!(issues[0].id, "core.request-missing");
    }

    #[test]
    fn malformed_located_root_suppresses_presence_rule() {
        let c = Context::build(None, true, false, None);
        let issues = evaluate(&catalogue(), &c);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }
}
