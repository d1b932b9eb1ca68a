//! Digital-out-of-home rules, active when `imp[].qty` or a top-level `dooh`
//! object marks the request as DOOH inventory.

use super::helpers::code_in;
use super::{Rule, Severity};
use crate::context::{Context, InventoryType};

fn is_dooh(ctx: &Context) -> bool {
    ctx.inventory.contains(InventoryType::Dooh)
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "dooh.qty-multiplier",
            description: "imp.qty must carry a positive multiplier (expected impressions per play)",
            severity: Severity::Error,
            path: Some("imp[].qty.multiplier"),
            spec_ref: Some("3.2.30"),
            applies: Some(is_dooh),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    imp.qty.as_ref().map_or(true, |q| {
                        q.multiplier.map_or(false, |m| m > 0.0)
                    })
                })
            },
        },
        Rule {
            id: "dooh.qty-sourcetype-known",
            description: "imp.qty.sourcetype is not a known measurement source code (0-3)",
            severity: Severity::Warning,
            path: Some("imp[].qty.sourcetype"),
            spec_ref: Some("3.2.30"),
            applies: Some(is_dooh),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    code_in(imp.qty.as_ref().and_then(|q| q.sourcetype), 0, 3)
                })
            },
        },
        Rule {
            id: "dooh.qty-vendor-missing",
            description: "imp.qty.sourcetype says measurement vendor but no vendor is named",
            severity: Severity::Warning,
            path: Some("imp[].qty.vendor"),
            spec_ref: Some("3.2.30"),
            applies: Some(is_dooh),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    imp.qty.as_ref().map_or(true, |q| {
                        // sourcetype 1 = measurement vendor provided.
                        q.sourcetype != Some(1) || q.vendor.is_some()
                    })
                })
            },
        },
        Rule {
            id: "dooh.object-missing",
            description: "imp.qty present but no top-level dooh object describes the venue",
            severity: Severity::Warning,
            path: Some("dooh"),
            spec_ref: Some("3.2.15"),
            applies: Some(is_dooh),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    let has_qty = r.imp.iter().any(|imp| imp.qty.is_some());
                    !has_qty || r.dooh.is_some()
                })
            },
        },
        Rule {
            id: "dooh.venuetype-missing",
            description: "dooh.venuetype is absent; venue targeting is impossible",
            severity: Severity::Info,
            path: Some("dooh.venuetype"),
            spec_ref: Some("3.2.15"),
            applies: Some(is_dooh),
            validate: |ctx| {
                ctx.req().and_then(|r| r.dooh.as_ref()).map_or(true, |d| {
                    d.venuetype.as_ref().map_or(false, |v| !v.is_empty())
                })
            },
        },
        Rule {
            id: "dooh.geo-expected",
            description: "DOOH screens are fixed installations; device.geo should be present",
            severity: Severity::Info,
            path: Some("device.geo"),
            spec_ref: None,
            applies: Some(is_dooh),
            validate: |ctx| ctx.device().map_or(true, |d| d.geo.is_some()),
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
    fn qty_without_multiplier_is_an_error() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{"w":1920,"h":1080},"qty":{"sourcetype":1}}],
            "dooh":{"id":"v1","venuetype":["transit"]}
        }));
        assert!(ids.contains(&"dooh.qty-multiplier"));
        assert!(ids.contains(&"dooh.qty-vendor-missing"));
    }

    #[test]
    fn qty_without_dooh_object_warns() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{"w":1920,"h":1080},"qty":{"multiplier":3.5}}]
        }));
        assert!(ids.contains(&"dooh.object-missing"));
    }

    #[test]
    fn dooh_rules_inactive_for_plain_display() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{"w":300,"h":250}}]
        }));
        assert!(!ids.iter().any(|i| i.starts_with("dooh.")));
    }
}
