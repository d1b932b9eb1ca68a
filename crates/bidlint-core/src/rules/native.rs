//! Native impression rules. The native request payload is itself JSON,
//! usually serialized into a string field, so the checks here re-parse it.

use serde_json::Value;

use super::helpers::codes_in;
use super::{Rule, Severity};
use crate::context::{Context, InventoryType};
use crate::openrtb::Native;

fn has_native(ctx: &Context) -> bool {
    ctx.inventory.contains(InventoryType::Native)
}

fn native_ok(ctx: &Context, pred: impl Fn(&Native) -> bool + Copy) -> bool {
    ctx.every_imp(|imp| imp.native.as_ref().map_or(true, pred))
}

/// Resolve `native.request` into a JSON object, whether it arrived as an
/// embedded string or (non-spec but common) as a plain object.
fn parsed_request(n: &Native) -> Option<Value> {
    match n.request.as_ref()? {
        Value::String(s) => serde_json::from_str(s).ok(),
        v @ Value::Object(_) => Some(v.clone()),
        _ => None,
    }
}

fn assets_of(request: &Value) -> Option<&Vec<Value>> {
    // Native 1.x allows the payload under a top-level "native" wrapper.
    let inner = request.get("native").unwrap_or(request);
    inner.get("assets").and_then(Value::as_array)
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "native.request-missing",
            description: "native.request is required",
            severity: Severity::Error,
            path: Some("imp[].native.request"),
            spec_ref: Some("3.2.9"),
            applies: Some(has_native),
            validate: |ctx| native_ok(ctx, |n| n.request.is_some()),
        },
        Rule {
            id: "native.request-parses",
            description: "native.request must be a JSON object or a string containing one",
            severity: Severity::Error,
            path: Some("imp[].native.request"),
            spec_ref: Some("3.2.9"),
            applies: Some(has_native),
            validate: |ctx| {
                native_ok(ctx, |n| {
                    n.request.is_none() || parsed_request(n).map_or(false, |v| v.is_object())
                })
            },
        },
        Rule {
            id: "native.assets-missing",
            description: "native.request declares no assets",
            severity: Severity::Warning,
            path: Some("imp[].native.request"),
            spec_ref: None,
            applies: Some(has_native),
            validate: |ctx| {
                native_ok(ctx, |n| {
                    let Some(req) = parsed_request(n) else { return true };
                    assets_of(&req).map_or(false, |a| !a.is_empty())
                })
            },
        },
        Rule {
            id: "native.ver-known",
            description: "native.ver is not a known Native Ads spec version (1.0, 1.1, 1.2)",
            severity: Severity::Warning,
            path: Some("imp[].native.ver"),
            spec_ref: Some("3.2.9"),
            applies: Some(has_native),
            validate: |ctx| {
                native_ok(ctx, |n| {
                    n.ver
                        .as_deref()
                        .map_or(true, |v| matches!(v, "1.0" | "1.1" | "1.2"))
                })
            },
        },
        Rule {
            id: "native.api-known",
            description: "native.api contains a code outside the defined range (1-7)",
            severity: Severity::Warning,
            path: Some("imp[].native.api"),
            spec_ref: Some("3.2.9"),
            applies: Some(has_native),
            validate: |ctx| native_ok(ctx, |n| codes_in(n.api.as_ref(), 1, 7)),
        },
    ]
}
