//! App-channel rules. The whole set is gated on an `app` object being present.

use super::helpers::{flag_ok, is_https_url, is_iab_category, is_numeric_id, is_reverse_dns};
use super::{Rule, Severity};
use crate::context::Context;
use crate::openrtb::App;

fn has_app(ctx: &Context) -> bool {
    ctx.req().map_or(false, |r| r.app.is_some())
}

fn app_ok(ctx: &Context, pred: impl Fn(&App) -> bool) -> bool {
    ctx.req().and_then(|r| r.app.as_ref()).map_or(true, pred)
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "app.id-or-bundle",
            description: "app must be identifiable by id or bundle",
            severity: Severity::Error,
            path: Some("app"),
            spec_ref: Some("3.2.14"),
            applies: Some(has_app),
            validate: |ctx| app_ok(ctx, |a| a.id.is_some() || a.bundle.is_some()),
        },
        Rule {
            id: "app.bundle-missing",
            description: "app.bundle is how buyers block and report on apps; it should be present",
            severity: Severity::Warning,
            path: Some("app.bundle"),
            spec_ref: Some("3.2.14"),
            applies: Some(has_app),
            validate: |ctx| app_ok(ctx, |a| a.bundle.is_some()),
        },
        Rule {
            id: "app.bundle-format",
            description: "app.bundle should be a reverse-DNS identifier or a numeric store id",
            severity: Severity::Warning,
            path: Some("app.bundle"),
            spec_ref: Some("3.2.14"),
            applies: Some(has_app),
            validate: |ctx| {
                app_ok(ctx, |a| {
                    a.bundle
                        .as_deref()
                        .map_or(true, |b| is_reverse_dns(b) || is_numeric_id(b))
                })
            },
        },
        Rule {
            id: "app.storeurl-missing",
            description: "app.storeurl is missing; store listing checks are skipped without it",
            severity: Severity::Warning,
            path: Some("app.storeurl"),
            spec_ref: Some("3.2.14"),
            applies: Some(has_app),
            validate: |ctx| app_ok(ctx, |a| a.storeurl.is_some()),
        },
        Rule {
            id: "app.storeurl-https",
            description: "app.storeurl should be an https URL",
            severity: Severity::Warning,
            path: Some("app.storeurl"),
            spec_ref: None,
            applies: Some(has_app),
            validate: |ctx| {
                app_ok(ctx, |a| a.storeurl.as_deref().map_or(true, is_https_url))
            },
        },
        Rule {
            id: "app.name-missing",
            description: "app.name is absent",
            severity: Severity::Info,
            path: Some("app.name"),
            spec_ref: None,
            applies: Some(has_app),
            validate: |ctx| app_ok(ctx, |a| a.name.is_some()),
        },
        Rule {
            id: "app.publisher-id-missing",
            description: "app.publisher.id is required by most supply-path policies",
            severity: Severity::Warning,
            path: Some("app.publisher.id"),
            spec_ref: Some("3.2.16"),
            applies: Some(has_app),
            validate: |ctx| {
                app_ok(ctx, |a| {
                    a.publisher.as_ref().and_then(|p| p.id.as_ref()).is_some()
                })
            },
        },
        Rule {
            id: "app.cat-format",
            description: "app.cat entries should be IAB content taxonomy codes",
            severity: Severity::Info,
            path: Some("app.cat"),
            spec_ref: None,
            // Only meaningful for taxonomy 1 (the IABn-n code space).
            applies: Some(|ctx| {
                has_app(ctx)
                    && ctx
                        .req()
                        .and_then(|r| r.app.as_ref())
                        .map_or(false, |a| a.cattax.unwrap_or(1) == 1)
            }),
            validate: |ctx| {
                app_ok(ctx, |a| {
                    a.cat
                        .as_ref()
                        .map_or(true, |cat| cat.iter().all(|c| is_iab_category(c)))
                })
            },
        },
        Rule {
            id: "app.paid-flag",
            description: "app.paid must be 0 or 1",
            severity: Severity::Error,
            path: Some("app.paid"),
            spec_ref: Some("3.2.14"),
            applies: Some(has_app),
            validate: |ctx| app_ok(ctx, |a| flag_ok(a.paid)),
        },
        Rule {
            id: "app.privacypolicy-flag",
            description: "app.privacypolicy must be 0 or 1",
            severity: Severity::Error,
            path: Some("app.privacypolicy"),
            spec_ref: Some("3.2.14"),
            applies: Some(has_app),
            validate: |ctx| app_ok(ctx, |a| flag_ok(a.privacypolicy)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{catalogue, evaluate};
    use crate::context::Context;
    use crate::openrtb::BidRequest;

    fn issues_for(v: serde_json::Value) -> Vec<&'static str> {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        let ctx = Context::build(Some(req), false, false, None);
        evaluate(&catalogue(), &ctx).into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn app_rules_do_not_fire_for_site_requests() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{}}],"site":{"id":"s1"}
        }));
        assert!(!ids.iter().any(|i| i.starts_with("app.")));
    }

    #[test]
    fn anonymous_app_is_an_error() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{}}],"app":{"name":"Game"}
        }));
        assert!(ids.contains(&"app.id-or-bundle"));
    }

    #[test]
    fn numeric_and_reverse_dns_bundles_pass() {
        for bundle in ["com.example.game", "1234567890"] {
            let ids = issues_for(serde_json::json!({
                "id":"r1","imp":[{"id":"1","banner":{}}],
                "app":{"id":"a1","bundle":bundle}
            }));
            assert!(!ids.contains(&"app.bundle-format"), "bundle {}", bundle);
        }
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{}}],
            "app":{"id":"a1","bundle":"not a bundle!"}
        }));
        assert!(ids.contains(&"app.bundle-format"));
    }

    #[test]
    fn cat_check_skipped_for_non_default_taxonomy() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{}}],
            "app":{"id":"a1","cattax":6,"cat":["v9i3On"]}
        }));
        assert!(!ids.contains(&"app.cat-format"));
    }
}
