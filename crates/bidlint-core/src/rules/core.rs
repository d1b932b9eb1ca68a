//! Top-level request rules: identity, impression array, distribution channel.

use super::helpers::is_currency_code;
use super::{Rule, Severity};
use crate::context::Context;

pub(super) fn has_root(ctx: &Context) -> bool {
    ctx.request.is_some()
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "core.request-missing",
            description: "no bid request object found (expected an object with a string id and an imp array)",
            severity: Severity::Error,
            path: None,
            spec_ref: Some("3.2.1"),
            applies: None,
            // A located-but-undecodable root already produced a shape issue;
            // don't pile a second "missing" issue on top.
            validate: |ctx| ctx.request.is_some() || ctx.located_malformed,
        },
        Rule {
            id: "core.id-empty",
            description: "request.id must be a non-empty string",
            severity: Severity::Error,
            path: Some("id"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .map_or(true, |r| r.id.as_deref().map_or(false, |id| !id.trim().is_empty()))
            },
        },
        Rule {
            id: "core.imp-empty",
            description: "imp must contain at least one impression",
            severity: Severity::Error,
            path: Some("imp"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| !ctx.imps().is_empty(),
        },
        Rule {
            id: "core.app-site-exclusive",
            description: "app and site are mutually exclusive; a request describes one distribution channel",
            severity: Severity::Error,
            path: None,
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .map_or(true, |r| !(r.app.is_some() && r.site.is_some()))
            },
        },
        Rule {
            id: "core.dooh-exclusive",
            description: "dooh is mutually exclusive with app and site",
            severity: Severity::Error,
            path: Some("dooh"),
            spec_ref: Some("3.2.15"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    !(r.dooh.is_some() && (r.app.is_some() || r.site.is_some()))
                })
            },
        },
        Rule {
            id: "core.channel-missing",
            description: "none of app, site, or dooh present; buyers cannot classify the inventory",
            severity: Severity::Warning,
            path: None,
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    r.app.is_some() || r.site.is_some() || r.dooh.is_some()
                })
            },
        },
        Rule {
            id: "core.at-known",
            description: "at should be 1 (first price), 2 (second price plus), or an exchange-specific value of 500+",
            severity: Severity::Warning,
            path: Some("at"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().and_then(|r| r.at).map_or(true, |at| at == 1 || at == 2 || at >= 500)
            },
        },
        Rule {
            id: "core.tmax-missing",
            description: "tmax not set; bidders cannot budget their response time",
            severity: Severity::Info,
            path: Some("tmax"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| ctx.req().map_or(true, |r| r.tmax.is_some()),
        },
        Rule {
            id: "core.tmax-positive",
            description: "tmax must be a positive number of milliseconds",
            severity: Severity::Error,
            path: Some("tmax"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| ctx.req().and_then(|r| r.tmax).map_or(true, |t| t > 0),
        },
        Rule {
            id: "core.cur-format",
            description: "cur entries must be ISO-4217 alpha codes (e.g. USD)",
            severity: Severity::Warning,
            path: Some("cur"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().and_then(|r| r.cur.as_ref()).map_or(true, |cur| {
                    cur.iter().all(|c| is_currency_code(c))
                })
            },
        },
        Rule {
            id: "core.wseat-bseat-exclusive",
            description: "wseat and bseat cannot both be present",
            severity: Severity::Error,
            path: None,
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .map_or(true, |r| !(r.wseat.is_some() && r.bseat.is_some()))
            },
        },
        Rule {
            id: "core.test-traffic",
            description: "test=1: request is flagged as non-billable test traffic",
            severity: Severity::Info,
            path: Some("test"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| ctx.req().and_then(|r| r.test).map_or(true, |t| t != 1),
        },
        Rule {
            id: "core.allimps-flag",
            description: "allimps must be 0 or 1",
            severity: Severity::Error,
            path: Some("allimps"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| super::helpers::flag_ok(ctx.req().and_then(|r| r.allimps)),
        },
    ]
}
