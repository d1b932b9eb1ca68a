//! Request-level hygiene rules: blocklists, language lists, latency budget,
//! and unexpanded macro detection.

use super::core::has_root;
use super::helpers::{
    has_macro_placeholder, is_bare_domain, is_iab_category, is_language_code, is_reverse_dns,
};
use super::{Rule, Severity};

/// Below this tmax most exchanges cannot complete a full auction round trip.
const TMAX_FLOOR_MS: i64 = 50;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "advanced.badv-format",
            description: "badv entries must be bare domains (no scheme, no path)",
            severity: Severity::Warning,
            path: Some("badv[]"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().and_then(|r| r.badv.as_ref()).map_or(true, |xs| {
                    xs.iter().all(|d| is_bare_domain(d))
                })
            },
        },
        Rule {
            id: "advanced.bcat-format",
            description: "bcat entries must be IAB content taxonomy codes",
            severity: Severity::Warning,
            path: Some("bcat[]"),
            spec_ref: Some("3.2.1"),
            // The IAB1-style grammar only holds for content taxonomy 1.
            applies: Some(|ctx| {
                has_root(ctx)
                    && ctx.req().map_or(false, |r| r.cattax.unwrap_or(1) == 1)
            }),
            validate: |ctx| {
                ctx.req().and_then(|r| r.bcat.as_ref()).map_or(true, |xs| {
                    xs.iter().all(|c| is_iab_category(c))
                })
            },
        },
        Rule {
            id: "advanced.bapp-format",
            description: "bapp entries must look like platform bundle ids",
            severity: Severity::Warning,
            path: Some("bapp[]"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().and_then(|r| r.bapp.as_ref()).map_or(true, |xs| {
                    xs.iter()
                        .all(|b| is_reverse_dns(b) || b.chars().all(|c| c.is_ascii_digit()))
                })
            },
        },
        Rule {
            id: "advanced.wlang-format",
            description: "wlang entries must be two-letter ISO-639-1 codes",
            severity: Severity::Warning,
            path: Some("wlang[]"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().and_then(|r| r.wlang.as_ref()).map_or(true, |xs| {
                    xs.iter().all(|l| is_language_code(l))
                })
            },
        },
        Rule {
            id: "advanced.cattax-known",
            description: "cattax is not a defined taxonomy code (1-7)",
            severity: Severity::Warning,
            path: Some("cattax"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.cattax)
                    .map_or(true, |t| (1..=7).contains(&t))
            },
        },
        Rule {
            id: "advanced.cur-empty",
            description: "cur declared as an empty array; no bid can name a currency",
            severity: Severity::Error,
            path: Some("cur"),
            spec_ref: Some("3.2.1"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.cur.as_ref())
                    .map_or(true, |c| !c.is_empty())
            },
        },
        Rule {
            id: "advanced.tmax-low",
            description: "tmax under 50ms leaves no room for a real auction",
            severity: Severity::Info,
            path: Some("tmax"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.tmax)
                    .map_or(true, |t| t <= 0 || t >= TMAX_FLOOR_MS)
            },
        },
        Rule {
            id: "advanced.page-macro",
            description: "site.page contains an unexpanded macro placeholder",
            severity: Severity::Error,
            path: Some("site.page"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.site.as_ref())
                    .and_then(|s| s.page.as_deref())
                    .map_or(true, |p| !has_macro_placeholder(p))
            },
        },
        Rule {
            id: "advanced.storeurl-macro",
            description: "app.storeurl contains an unexpanded macro placeholder",
            severity: Severity::Error,
            path: Some("app.storeurl"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.app.as_ref())
                    .and_then(|a| a.storeurl.as_deref())
                    .map_or(true, |u| !has_macro_placeholder(u))
            },
        },
    ]
}
