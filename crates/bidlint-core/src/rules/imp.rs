//! Per-impression structural rules.
//!
//! These follow `every` semantics: one violating impression fails the rule
//! for the whole request, reported against the `imp[]` wildcard path.

use std::collections::HashSet;

use super::core::has_root;
use super::helpers::{flag_ok, is_currency_code};
use super::{Rule, Severity};
use crate::openrtb::Imp;

fn media_count(imp: &Imp) -> usize {
    [
        imp.banner.is_some(),
        imp.video.is_some(),
        imp.audio.is_some(),
        imp.native.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count()
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "imp.id-missing",
            description: "every impression must carry a non-empty id",
            severity: Severity::Error,
            path: Some("imp[].id"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.every_imp(|imp| imp.id.as_deref().map_or(false, |id| !id.trim().is_empty()))
            },
        },
        Rule {
            id: "imp.id-unique",
            description: "impression ids must be unique within imp",
            severity: Severity::Error,
            path: Some("imp[].id"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| {
                let mut seen = HashSet::new();
                ctx.imps()
                    .iter()
                    .filter_map(|imp| imp.id.as_deref())
                    .all(|id| seen.insert(id))
            },
        },
        Rule {
            id: "imp.media-missing",
            description: "impression has no media object (banner, video, audio, or native)",
            severity: Severity::Error,
            path: Some("imp[]"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| media_count(imp) >= 1),
        },
        Rule {
            id: "imp.media-exclusive",
            description: "banner, video, audio, and native are mutually exclusive within one impression",
            severity: Severity::Error,
            path: Some("imp[]"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| media_count(imp) <= 1),
        },
        Rule {
            id: "imp.bidfloor-negative",
            description: "bidfloor cannot be negative",
            severity: Severity::Error,
            path: Some("imp[].bidfloor"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| imp.bidfloor.map_or(true, |f| f >= 0.0)),
        },
        Rule {
            id: "imp.bidfloorcur-format",
            description: "bidfloorcur must be an ISO-4217 alpha code",
            severity: Severity::Warning,
            path: Some("imp[].bidfloorcur"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.every_imp(|imp| imp.bidfloorcur.as_deref().map_or(true, is_currency_code))
            },
        },
        Rule {
            id: "imp.bidfloorcur-assumed",
            description: "bidfloor set without bidfloorcur; USD is assumed",
            severity: Severity::Info,
            path: Some("imp[].bidfloorcur"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.every_imp(|imp| !(imp.bidfloor.is_some() && imp.bidfloorcur.is_none()))
            },
        },
        Rule {
            id: "imp.secure-missing",
            description: "secure not declared; HTTPS-only creative delivery cannot be guaranteed",
            severity: Severity::Warning,
            path: Some("imp[].secure"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| imp.secure.is_some()),
        },
        Rule {
            id: "imp.secure-flag",
            description: "secure must be 0 or 1",
            severity: Severity::Error,
            path: Some("imp[].secure"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| flag_ok(imp.secure)),
        },
        Rule {
            id: "imp.instl-flag",
            description: "instl must be 0 or 1",
            severity: Severity::Error,
            path: Some("imp[].instl"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| flag_ok(imp.instl)),
        },
        Rule {
            id: "imp.rwdd-flag",
            description: "rwdd must be 0 or 1",
            severity: Severity::Error,
            path: Some("imp[].rwdd"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| flag_ok(imp.rwdd)),
        },
        Rule {
            id: "imp.tagid-missing",
            description: "tagid helps identify the specific ad placement; consider setting it",
            severity: Severity::Info,
            path: Some("imp[].tagid"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| imp.tagid.is_some()),
        },
        Rule {
            id: "imp.exp-negative",
            description: "exp (impression expiry) cannot be negative",
            severity: Severity::Error,
            path: Some("imp[].exp"),
            spec_ref: Some("3.2.4"),
            applies: Some(has_root),
            validate: |ctx| ctx.every_imp(|imp| imp.exp.map_or(true, |e| e >= 0)),
        },
        Rule {
            id: "imp.deal-id-missing",
            description: "every pmp deal must carry a non-empty id",
            severity: Severity::Error,
            path: Some("imp[].pmp.deals[].id"),
            spec_ref: Some("3.2.12"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    imp.pmp
                        .as_ref()
                        .and_then(|p| p.deals.as_ref())
                        .map_or(true, |deals| {
                            deals.iter().all(|d| {
                                d.id.as_deref().map_or(false, |id| !id.trim().is_empty())
                            })
                        })
                })
            },
        },
        Rule {
            id: "imp.private-auction-flag",
            description: "pmp.private_auction must be 0 or 1",
            severity: Severity::Error,
            path: Some("imp[].pmp.private_auction"),
            spec_ref: Some("3.2.11"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    flag_ok(imp.pmp.as_ref().and_then(|p| p.private_auction))
                })
            },
        },
    ]
}
