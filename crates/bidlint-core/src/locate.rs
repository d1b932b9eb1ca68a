//! Finding the bid-request object inside arbitrary parsed JSON.
//!
//! Payloads arrive wrapped in all kinds of envelopes (exchange logs, proxy
//! captures, `{"bidRequest": {...}}` shells). The locator walks the parsed
//! value depth-first and returns the first descendant that looks like a bid
//! request: a string `id` next to an array `imp`.

use serde_json::Value;

use crate::openrtb::BidRequest;

fn is_request_shaped(value: &Value) -> bool {
    value.get("id").map_or(false, Value::is_string)
        && value.get("imp").map_or(false, Value::is_array)
}

/// Depth-first search for the first request-shaped object. JSON values are
/// acyclic, so no visited set is needed.
pub fn locate(value: &Value) -> Option<&Value> {
    if is_request_shaped(value) {
        return Some(value);
    }
    match value {
        Value::Object(map) => map.values().find_map(locate),
        Value::Array(items) => items.iter().find_map(locate),
        _ => None,
    }
}

/// Decode a located object into the typed model. The model is all-optional,
/// so this only fails when a present field has the wrong JSON type (e.g. a
/// numeric `imp[].id`); callers surface that as a single shape issue.
pub fn decode(value: &Value) -> Result<BidRequest, serde_json::Error> {
    serde_json::from_value(value.clone())
}
