//! Partner-profile rules. Inactive unless the analysis was run with an
//! explicit partner profile in its options.

use super::{Rule, Severity};
use crate::context::{Context, PartnerProfile};

fn is_prebid(ctx: &Context) -> bool {
    ctx.partner == Some(PartnerProfile::Prebid) && ctx.request.is_some()
}

fn is_aps(ctx: &Context) -> bool {
    ctx.partner == Some(PartnerProfile::AmazonAps) && ctx.request.is_some()
}

fn imp_ext_has(imp: &crate::openrtb::Imp, key: &str) -> bool {
    imp.ext.as_ref().and_then(|e| e.get(key)).is_some()
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "partner.prebid.tid-missing",
            description: "Prebid Server sets source.tid; its absence suggests a broken adapter chain",
            severity: Severity::Warning,
            path: Some("source.tid"),
            spec_ref: None,
            applies: Some(is_prebid),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.source.as_ref())
                    .and_then(|s| s.tid.as_ref())
                    .is_some()
            },
        },
        Rule {
            id: "partner.prebid.gpid-missing",
            description: "Prebid placements should carry imp.ext.gpid or a tagid",
            severity: Severity::Warning,
            path: Some("imp[].ext.gpid"),
            spec_ref: None,
            applies: Some(is_prebid),
            validate: |ctx| {
                ctx.every_imp(|imp| imp_ext_has(imp, "gpid") || imp.tagid.is_some())
            },
        },
        Rule {
            id: "partner.prebid.imp-ext",
            description: "imp.ext.prebid block absent; bidder params may not round-trip",
            severity: Severity::Info,
            path: Some("imp[].ext.prebid"),
            spec_ref: None,
            applies: Some(is_prebid),
            validate: |ctx| ctx.every_imp(|imp| imp_ext_has(imp, "prebid")),
        },
        Rule {
            id: "partner.aps.bundle-required",
            description: "APS app monetization requires app.bundle",
            severity: Severity::Error,
            path: Some("app.bundle"),
            spec_ref: None,
            applies: Some(|ctx| {
                is_aps(ctx) && ctx.req().map_or(false, |r| r.app.is_some())
            }),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.app.as_ref())
                    .map_or(true, |a| a.bundle.is_some())
            },
        },
        Rule {
            id: "partner.aps.slot-missing",
            description: "APS slot identifiers travel in imp.tagid; every impression needs one",
            severity: Severity::Warning,
            path: Some("imp[].tagid"),
            spec_ref: None,
            applies: Some(is_aps),
            validate: |ctx| ctx.every_imp(|imp| imp.tagid.is_some()),
        },
        Rule {
            id: "partner.aps.banner-size",
            description: "APS banner slots must declare explicit w/h or a format array",
            severity: Severity::Warning,
            path: Some("imp[].banner"),
            spec_ref: None,
            applies: Some(is_aps),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    imp.banner.as_ref().map_or(true, |b| {
                        (b.w.is_some() && b.h.is_some()) || b.format.is_some()
                    })
                })
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{catalogue, evaluate};
    use crate::context::{Context, PartnerProfile};
    use crate::openrtb::BidRequest;

    fn issues_with(v: serde_json::Value, partner: Option<PartnerProfile>) -> Vec<&'static str> {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        let ctx = Context::build(Some(req), false, false, partner);
        evaluate(&catalogue(), &ctx).into_iter().map(|i| i.id).collect()
    }

    fn bare_request() -> serde_json::Value {
        serde_json::json!({"id":"r1","imp":[{"id":"1","banner":{"w":300,"h":250}}]})
    }

    #[test]
    fn partner_rules_inactive_without_profile() {
        let ids = issues_with(bare_request(), None);
        assert!(!ids.iter().any(|i| i.starts_with("partner.")));
    }

    #[test]
    fn prebid_profile_wants_tid_and_gpid() {
        let ids = issues_with(bare_request(), Some(PartnerProfile::Prebid));
        assert!(ids.contains(&"partner.prebid.tid-missing"));
        assert!(ids.contains(&"partner.prebid.gpid-missing"));
        assert!(!ids.iter().any(|i| i.starts_with("partner.aps.")));
    }

    #[test]
    fn gpid_in_imp_ext_satisfies_prebid() {
        let ids = issues_with(
            serde_json::json!({
                "id":"r1",
                "imp":[{"id":"1","banner":{"w":300,"h":250},"ext":{"gpid":"/123/home#top"}}],
                "source":{"tid":"t-1"}
            }),
            Some(PartnerProfile::Prebid),
        );
        assert!(!ids.contains(&"partner.prebid.gpid-missing"));
        assert!(!ids.contains(&"partner.prebid.tid-missing"));
    }

    #[test]
    fn aps_app_without_bundle_is_an_error() {
        let ids = issues_with(
            serde_json::json!({
                "id":"r1","imp":[{"id":"1","banner":{"w":300,"h":250}}],
                "app":{"id":"a1"}
            }),
            Some(PartnerProfile::AmazonAps),
        );
        assert!(ids.contains(&"partner.aps.bundle-required"));
    }
}
