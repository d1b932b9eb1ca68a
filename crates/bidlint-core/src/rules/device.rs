//! Device and geo rules.

use uuid::Uuid;

use super::core::has_root;
use super::helpers::{
    code_in, flag_ok, has_macro_placeholder, is_alpha3_country, is_ipv4, is_ipv6,
    is_language_code,
};
use super::{Rule, Severity};
use crate::context::Context;
use crate::openrtb::Device;

fn has_device(ctx: &Context) -> bool {
    ctx.device().is_some()
}

fn device_ok(ctx: &Context, pred: impl Fn(&Device) -> bool) -> bool {
    ctx.device().map_or(true, pred)
}

const ZERO_IFA: &str = "00000000-0000-0000-0000-000000000000";

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "device.missing",
            description: "device object absent; geo, platform, and fraud signals are unavailable",
            severity: Severity::Warning,
            path: Some("device"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_root),
            validate: has_device,
        },
        Rule {
            id: "device.ua-missing",
            description: "device.ua (user agent) is absent",
            severity: Severity::Warning,
            path: Some("device.ua"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| d.ua.is_some() || d.sua.is_some()),
        },
        Rule {
            id: "device.ip-missing",
            description: "neither device.ip nor device.ipv6 present; geo lookup impossible",
            severity: Severity::Warning,
            path: Some("device.ip"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| d.ip.is_some() || d.ipv6.is_some()),
        },
        Rule {
            id: "device.ip-format",
            description: "device.ip must be a dotted-quad IPv4 address",
            severity: Severity::Error,
            path: Some("device.ip"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| d.ip.as_deref().map_or(true, is_ipv4)),
        },
        Rule {
            id: "device.ipv6-format",
            description: "device.ipv6 must be a valid IPv6 address",
            severity: Severity::Error,
            path: Some("device.ipv6"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| d.ipv6.as_deref().map_or(true, is_ipv6)),
        },
        Rule {
            id: "device.devicetype-missing",
            description: "device.devicetype is absent",
            severity: Severity::Info,
            path: Some("device.devicetype"),
            spec_ref: None,
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| d.devicetype.is_some()),
        },
        Rule {
            id: "device.devicetype-known",
            description: "device.devicetype is not a known code (1-8)",
            severity: Severity::Warning,
            path: Some("device.devicetype"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| code_in(d.devicetype, 1, 8)),
        },
        Rule {
            id: "device.ifa-format",
            description: "device.ifa should be a UUID-form advertising identifier",
            severity: Severity::Warning,
            path: Some("device.ifa"),
            spec_ref: None,
            applies: Some(has_device),
            validate: |ctx| {
                device_ok(ctx, |d| {
                    d.ifa.as_deref().map_or(true, |ifa| Uuid::parse_str(ifa).is_ok())
                })
            },
        },
        Rule {
            id: "device.ifa-zeroed",
            description: "device.ifa is all zeros; the user has limited ad tracking",
            severity: Severity::Info,
            path: Some("device.ifa"),
            spec_ref: None,
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| d.ifa.as_deref() != Some(ZERO_IFA)),
        },
        Rule {
            id: "device.lmt-flag",
            description: "device.lmt must be 0 or 1",
            severity: Severity::Error,
            path: Some("device.lmt"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| flag_ok(d.lmt)),
        },
        Rule {
            id: "device.dnt-flag",
            description: "device.dnt must be 0 or 1",
            severity: Severity::Error,
            path: Some("device.dnt"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| flag_ok(d.dnt)),
        },
        Rule {
            id: "device.js-flag",
            description: "device.js must be 0 or 1",
            severity: Severity::Error,
            path: Some("device.js"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| flag_ok(d.js)),
        },
        Rule {
            id: "device.language-format",
            description: "device.language should be an ISO-639-1 code (use langb for BCP-47)",
            severity: Severity::Warning,
            path: Some("device.language"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| {
                device_ok(ctx, |d| d.language.as_deref().map_or(true, is_language_code))
            },
        },
        Rule {
            id: "device.connectiontype-known",
            description: "device.connectiontype is not a known code (0-6)",
            severity: Severity::Warning,
            path: Some("device.connectiontype"),
            spec_ref: Some("3.2.18"),
            applies: Some(has_device),
            validate: |ctx| device_ok(ctx, |d| code_in(d.connectiontype, 0, 6)),
        },
        Rule {
            id: "device.geo-country-format",
            description: "device.geo.country must be an ISO-3166-1 alpha-3 code",
            severity: Severity::Warning,
            path: Some("device.geo.country"),
            spec_ref: Some("3.2.19"),
            applies: Some(has_device),
            validate: |ctx| {
                device_ok(ctx, |d| {
                    d.geo
                        .as_ref()
                        .and_then(|g| g.country.as_deref())
                        .map_or(true, is_alpha3_country)
                })
            },
        },
        Rule {
            id: "device.geo-coords-range",
            description: "device.geo lat/lon out of range (lat -90..90, lon -180..180)",
            severity: Severity::Error,
            path: Some("device.geo"),
            spec_ref: Some("3.2.19"),
            applies: Some(has_device),
            validate: |ctx| {
                device_ok(ctx, |d| {
                    d.geo.as_ref().map_or(true, |g| {
                        g.lat.map_or(true, |lat| (-90.0..=90.0).contains(&lat))
                            && g.lon.map_or(true, |lon| (-180.0..=180.0).contains(&lon))
                    })
                })
            },
        },
        Rule {
            id: "device.geo-type-known",
            description: "device.geo.type is not a known code (1-3)",
            severity: Severity::Warning,
            path: Some("device.geo.type"),
            spec_ref: Some("3.2.19"),
            applies: Some(has_device),
            validate: |ctx| {
                device_ok(ctx, |d| code_in(d.geo.as_ref().and_then(|g| g.type_), 1, 3))
            },
        },
        Rule {
            id: "device.macro-placeholder",
            description: "device.ua or device.ifa contains an unresolved macro placeholder",
            severity: Severity::Warning,
            path: Some("device"),
            spec_ref: None,
            applies: Some(has_device),
            validate: |ctx| {
                device_ok(ctx, |d| {
                    !d.ua.as_deref().map_or(false, has_macro_placeholder)
                        && !d.ifa.as_deref().map_or(false, has_macro_placeholder)
                })
            },
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

    fn with_device(device: serde_json::Value) -> serde_json::Value {
        serde_json::json!({"id":"r1","imp":[{"id":"1","banner":{}}],"device":device})
    }

    #[test]
    fn missing_device_is_a_warning_and_gates_the_rest() {
        let ids = issues_for(serde_json::json!({"id":"r1","imp":[{"id":"1","banner":{}}]}));
        assert!(ids.contains(&"device.missing"));
        assert!(!ids.contains(&"device.ua-missing"), "gated rules must not fire");
    }

    #[test]
    fn bad_ipv4_is_an_error() {
        let ids = issues_for(with_device(serde_json::json!({"ip":"999.1.1.1"})));
        assert!(ids.contains(&"device.ip-format"));
        let ids = issues_for(with_device(serde_json::json!({"ip":"8.8.8.8"})));
        assert!(!ids.contains(&"device.ip-format"));
    }

    #[test]
    fn ipv6_collapse_form_passes() {
        let ids = issues_for(with_device(serde_json::json!({"ipv6":"2001:db8::1"})));
        assert!(!ids.contains(&"device.ipv6-format"));
    }

    #[test]
    fn zeroed_ifa_is_informational_not_malformed() {
        let ids = issues_for(with_device(serde_json::json!({
            "ifa":"00000000-0000-0000-0000-000000000000"
        })));
        assert!(ids.contains(&"device.ifa-zeroed"));
        assert!(!ids.contains(&"device.ifa-format"));
    }

    #[test]
    fn macro_in_ifa_is_flagged() {
        let ids = issues_for(with_device(serde_json::json!({"ifa":"[IFA]"})));
        assert!(ids.contains(&"device.macro-placeholder"));
    }

    #[test]
    fn alpha2_country_is_flagged() {
        let ids = issues_for(with_device(serde_json::json!({"geo":{"country":"US"}})));
        assert!(ids.contains(&"device.geo-country-format"));
        let ids = issues_for(with_device(serde_json::json!({"geo":{"country":"USA"}})));
        assert!(!ids.contains(&"device.geo-country-format"));
    }
}
