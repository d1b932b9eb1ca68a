//! Supply-chain transparency rules: `source` and its embedded schain.

use super::core::has_root;
use super::helpers::{flag_ok, is_bare_domain};
use super::{Rule, Severity};
use crate::context::Context;
use crate::openrtb::{BidRequest, Source, SupplyChain, SupplyChainNode};

fn source_of(ctx: &Context) -> Option<&Source> {
    ctx.req().and_then(|r| r.source.as_ref())
}

/// The schain rides in `source.schain` since 2.6; older senders put the same
/// object under `source.ext.schain`. Typed access covers the current spot,
/// ext access the legacy one.
fn has_legacy_schain(r: &BidRequest) -> bool {
    r.source
        .as_ref()
        .and_then(|s| s.ext.as_ref())
        .and_then(|e| e.get("schain"))
        .is_some()
}

fn schain_of(ctx: &Context) -> Option<&SupplyChain> {
    source_of(ctx).and_then(|s| s.schain.as_ref())
}

fn nodes_ok(ctx: &Context, pred: impl Fn(&SupplyChainNode) -> bool + Copy) -> bool {
    schain_of(ctx)
        .and_then(|sc| sc.nodes.as_ref())
        .map_or(true, |nodes| nodes.iter().all(pred))
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "source.missing",
            description: "no source object; transaction provenance is opaque",
            severity: Severity::Info,
            path: Some("source"),
            spec_ref: Some("3.2.2"),
            applies: Some(has_root),
            validate: |ctx| ctx.req().map_or(true, |r| r.source.is_some()),
        },
        Rule {
            id: "source.tid-missing",
            description: "source present without a transaction id",
            severity: Severity::Warning,
            path: Some("source.tid"),
            spec_ref: Some("3.2.2"),
            applies: Some(has_root),
            validate: |ctx| {
                source_of(ctx).map_or(true, |s| {
                    s.tid.as_deref().map_or(false, |t| !t.is_empty())
                })
            },
        },
        Rule {
            id: "source.fd-flag",
            description: "source.fd must be 0 or 1",
            severity: Severity::Error,
            path: Some("source.fd"),
            spec_ref: Some("3.2.2"),
            applies: Some(has_root),
            validate: |ctx| flag_ok(source_of(ctx).and_then(|s| s.fd)),
        },
        Rule {
            id: "source.schain-missing",
            description: "no supply chain object; many buyers discard schain-less traffic",
            severity: Severity::Warning,
            path: Some("source.schain"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    r.source
                        .as_ref()
                        .map_or(false, |s| s.schain.is_some())
                        || has_legacy_schain(r)
                })
            },
        },
        Rule {
            id: "source.schain-complete-flag",
            description: "schain.complete must be 0 or 1",
            severity: Severity::Error,
            path: Some("source.schain.complete"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| flag_ok(schain_of(ctx).and_then(|sc| sc.complete)),
        },
        Rule {
            id: "source.schain-nodes-empty",
            description: "schain declared with no nodes",
            severity: Severity::Error,
            path: Some("source.schain.nodes"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                schain_of(ctx).map_or(true, |sc| {
                    sc.nodes.as_ref().map_or(false, |n| !n.is_empty())
                })
            },
        },
        Rule {
            id: "source.schain-node-fields",
            description: "every schain node needs asi and sid",
            severity: Severity::Error,
            path: Some("source.schain.nodes[]"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                nodes_ok(ctx, |n| {
                    n.asi.as_deref().map_or(false, |a| !a.is_empty())
                        && n.sid.as_deref().map_or(false, |s| !s.is_empty())
                })
            },
        },
        Rule {
            id: "source.schain-node-asi-domain",
            description: "node asi should be a bare domain (no scheme, no path)",
            severity: Severity::Warning,
            path: Some("source.schain.nodes[].asi"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                nodes_ok(ctx, |n| n.asi.as_deref().map_or(true, is_bare_domain))
            },
        },
        Rule {
            id: "source.schain-node-hp",
            description: "node hp must be 1; indirect payment chains are unsupported",
            severity: Severity::Warning,
            path: Some("source.schain.nodes[].hp"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| nodes_ok(ctx, |n| n.hp.map_or(true, |hp| hp == 1)),
        },
        Rule {
            id: "source.schain-ver",
            description: "schain.ver should be \"1.0\"",
            severity: Severity::Warning,
            path: Some("source.schain.ver"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                schain_of(ctx).map_or(true, |sc| {
                    sc.ver.as_deref().map_or(true, |v| v == "1.0")
                })
            },
        },
    ]
}
