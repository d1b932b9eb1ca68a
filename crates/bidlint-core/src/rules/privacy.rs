//! Privacy and consent-signal rules (COPPA, GDPR/TCF, CCPA, GPP, EIDs).

use super::core::has_root;
use super::helpers::flag_ok;
use super::{Rule, Severity};
use crate::context::Context;
use crate::openrtb::BidRequest;

/// `regs.gdpr` moved out of ext in 2.6; accept the 2.5 `regs.ext.gdpr` spot too.
fn gdpr_signal(r: &BidRequest) -> Option<i64> {
    let regs = r.regs.as_ref()?;
    regs.gdpr
        .or_else(|| regs.ext.as_ref()?.get("gdpr")?.as_i64())
}

fn us_privacy_signal(r: &BidRequest) -> Option<String> {
    let regs = r.regs.as_ref()?;
    regs.us_privacy.clone().or_else(|| {
        regs.ext
            .as_ref()?
            .get("us_privacy")?
            .as_str()
            .map(str::to_string)
    })
}

/// IAB USP string: version digit then three of Y/N/- (e.g. "1YNN", "1---").
fn usp_string_ok(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 4
        && bytes[0].is_ascii_digit()
        && bytes[1..]
            .iter()
            .all(|&b| matches!(b, b'Y' | b'N' | b'y' | b'n' | b'-'))
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "privacy.coppa-flag",
            description: "regs.coppa must be 0 or 1",
            severity: Severity::Error,
            path: Some("regs.coppa"),
            spec_ref: Some("3.2.3"),
            applies: Some(has_root),
            validate: |ctx| {
                flag_ok(ctx.req().and_then(|r| r.regs.as_ref()).and_then(|r| r.coppa))
            },
        },
        Rule {
            id: "privacy.gdpr-flag",
            description: "the GDPR applicability signal must be 0 or 1",
            severity: Severity::Error,
            path: Some("regs.gdpr"),
            spec_ref: Some("3.2.3"),
            applies: Some(has_root),
            validate: |ctx| flag_ok(ctx.req().and_then(gdpr_signal)),
        },
        Rule {
            id: "privacy.gdpr-consent-missing",
            description: "gdpr=1 but no user.consent string present",
            severity: Severity::Warning,
            path: Some("user.consent"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    gdpr_signal(r) != Some(1)
                        || r.user
                            .as_ref()
                            .and_then(|u| u.consent.as_deref())
                            .map_or(false, |c| !c.is_empty())
                })
            },
        },
        Rule {
            id: "privacy.consent-without-gdpr",
            description: "user.consent present without a regs gdpr signal; scope is ambiguous",
            severity: Severity::Info,
            path: Some("regs.gdpr"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    r.user.as_ref().and_then(|u| u.consent.as_ref()).is_none()
                        || gdpr_signal(r).is_some()
                })
            },
        },
        Rule {
            id: "privacy.us-privacy-format",
            description: "us_privacy must be a 4-character USP string (e.g. 1YNN or 1---)",
            severity: Severity::Error,
            path: Some("regs.us_privacy"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .and_then(us_privacy_signal)
                    .map_or(true, |s| usp_string_ok(&s))
            },
        },
        Rule {
            id: "privacy.gpp-sid-missing",
            description: "regs.gpp present without gpp_sid; receivers cannot tell which sections apply",
            severity: Severity::Warning,
            path: Some("regs.gpp_sid"),
            spec_ref: Some("3.2.3"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().and_then(|r| r.regs.as_ref()).map_or(true, |regs| {
                    regs.gpp.is_none()
                        || regs.gpp_sid.as_ref().map_or(false, |sid| !sid.is_empty())
                })
            },
        },
        Rule {
            id: "privacy.coppa-pii",
            description: "coppa=1 forbids user.yob and user.gender",
            severity: Severity::Error,
            path: Some("user"),
            spec_ref: Some("3.2.3"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    r.regs.as_ref().and_then(|regs| regs.coppa) != Some(1)
                        || r.user
                            .as_ref()
                            .map_or(true, |u| u.yob.is_none() && u.gender.is_none())
                })
            },
        },
        Rule {
            id: "privacy.eids-structure",
            description: "every user.eids entry needs a source and at least one uid with an id",
            severity: Severity::Error,
            path: Some("user.eids[]"),
            spec_ref: Some("3.2.27"),
            applies: Some(has_root),
            validate: |ctx| {
                ctx.req()
                    .and_then(|r| r.user.as_ref())
                    .and_then(|u| u.eids.as_ref())
                    .map_or(true, |eids| {
                        eids.iter().all(|eid| {
                            eid.source.as_deref().map_or(false, |s| !s.is_empty())
                                && eid.uids.as_ref().map_or(false, |uids| {
                                    !uids.is_empty()
                                        && uids.iter().all(|u| u.id.is_some())
                                })
                        })
                    })
            },
        },
        Rule {
            id: "privacy.lmt-ifa-leak",
            description: "device.lmt=1 but a real ifa is still transmitted",
            severity: Severity::Info,
            path: Some("device.ifa"),
            spec_ref: None,
            applies: Some(has_root),
            validate: |ctx| {
                ctx.device().map_or(true, |d| {
                    d.lmt != Some(1)
                        || d.ifa.as_deref().map_or(true, |ifa| {
                            ifa == "00000000-0000-0000-0000-000000000000"
                        })
                })
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{catalogue, evaluate};
    use super::usp_string_ok;
    use crate::context::Context;
    use crate::openrtb::BidRequest;

    fn issues_for(v: serde_json::Value) -> Vec<&'static str> {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        let ctx = Context::build(Some(req), false, false, None);
        evaluate(&catalogue(), &ctx).into_iter().map(|i| i.id).collect()
    }

    fn base(extra: serde_json::Value) -> serde_json::Value {
        let mut v = serde_json::json!({"id":"r1","imp":[{"id":"1","banner":{"w":300,"h":250}}]});
        for (k, val) in extra.as_object().unwrap() {
            v[k] = val.clone();
        }
        v
    }

    #[test]
    fn usp_string_shapes() {
        assert!(usp_string_ok("1YNN"));
        assert!(usp_string_ok("1---"));
        assert!(!usp_string_ok("1YN"));
        assert!(!usp_string_ok("XYNN"));
        assert!(!usp_string_ok("1YNZ"));
    }

    #[test]
    fn gdpr_without_consent_warns() {
        let ids = issues_for(base(serde_json::json!({"regs":{"gdpr":1}})));
        assert!(ids.contains(&"privacy.gdpr-consent-missing"));
    }

    #[test]
    fn gdpr_signal_accepted_from_regs_ext() {
        let ids = issues_for(base(serde_json::json!({"regs":{"ext":{"gdpr":2}}})));
        assert!(ids.contains(&"privacy.gdpr-flag"));
    }

    #[test]
    fn coppa_with_demographics_is_an_error() {
        let ids = issues_for(base(serde_json::json!({
            "regs":{"coppa":1},
            "user":{"yob":1990}
        })));
        assert!(ids.contains(&"privacy.coppa-pii"));
    }

    #[test]
    fn eid_without_uids_is_an_error() {
        let ids = issues_for(base(serde_json::json!({
            "user":{"eids":[{"source":"liveramp.com"}]}
        })));
        assert!(ids.contains(&"privacy.eids-structure"));
    }

    #[test]
    fn gpp_needs_section_ids() {
        let ids = issues_for(base(serde_json::json!({"regs":{"gpp":"DBABMA~..."}})));
        assert!(ids.contains(&"privacy.gpp-sid-missing"));
        let ids = issues_for(base(serde_json::json!({
            "regs":{"gpp":"DBABMA~...","gpp_sid":[2]}
        })));
        assert!(!ids.contains(&"privacy.gpp-sid-missing"));
    }
}
