//! Connected-TV rules. Applicable when the context says CTV, whether
//! auto-detected from the device type or forced via analysis options.

use super::helpers::flag_ok;
use super::{Rule, Severity};
use crate::context::{Context, CTV_DEVICE_TYPES};

fn is_ctv(ctx: &Context) -> bool {
    ctx.is_ctv && ctx.request.is_some()
}

/// Full-screen ad position code. CTV inventory must declare exactly this.
const POS_FULLSCREEN: i64 = 7;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "ctv.pos-fullscreen",
            description: "CTV video must declare pos 7 (full screen); presence alone is not enough",
            severity: Severity::Error,
            path: Some("imp[].video.pos"),
            spec_ref: None,
            applies: Some(is_ctv),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    imp.video
                        .as_ref()
                        .map_or(true, |v| v.pos == Some(POS_FULLSCREEN))
                })
            },
        },
        Rule {
            id: "ctv.devicetype-consistent",
            description: "CTV request should carry devicetype 3 (Connected TV) or 7 (Set Top Box)",
            severity: Severity::Warning,
            path: Some("device.devicetype"),
            spec_ref: None,
            applies: Some(is_ctv),
            validate: |ctx| {
                ctx.device()
                    .and_then(|d| d.devicetype)
                    .map_or(true, |dt| CTV_DEVICE_TYPES.contains(&dt))
            },
        },
        Rule {
            id: "ctv.app-expected",
            description: "CTV inventory is app inventory; no app object present",
            severity: Severity::Warning,
            path: Some("app"),
            spec_ref: None,
            applies: Some(is_ctv),
            validate: |ctx| ctx.req().map_or(true, |r| r.app.is_some()),
        },
        Rule {
            id: "ctv.content-missing",
            description: "content object missing; CTV buyers target on show-level metadata",
            severity: Severity::Warning,
            path: Some("app.content"),
            spec_ref: None,
            applies: Some(is_ctv),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    r.app.as_ref().map_or(false, |a| a.content.is_some())
                        || r.site.as_ref().map_or(false, |s| s.content.is_some())
                })
            },
        },
        Rule {
            id: "ctv.livestream-flag",
            description: "content.livestream must be 0 or 1",
            severity: Severity::Error,
            path: Some("app.content.livestream"),
            spec_ref: Some("3.2.16"),
            applies: Some(is_ctv),
            validate: |ctx| {
                ctx.req().map_or(true, |r| {
                    let content = r
                        .app
                        .as_ref()
                        .and_then(|a| a.content.as_ref())
                        .or_else(|| r.site.as_ref().and_then(|s| s.content.as_ref()));
                    flag_ok(content.and_then(|c| c.livestream))
                })
            },
        },
        Rule {
            id: "ctv.ifa-missing",
            description: "no device.ifa on a CTV request; frequency capping breaks without it",
            severity: Severity::Warning,
            path: Some("device.ifa"),
            spec_ref: None,
            applies: Some(is_ctv),
            validate: |ctx| {
                ctx.device()
                    .map_or(true, |d| d.ifa.is_some() || d.lmt == Some(1))
            },
        },
        Rule {
            id: "ctv.startdelay-missing",
            description: "CTV video should declare startdelay (pre/mid/post roll)",
            severity: Severity::Warning,
            path: Some("imp[].video.startdelay"),
            spec_ref: None,
            applies: Some(is_ctv),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    imp.video.as_ref().map_or(true, |v| v.startdelay.is_some())
                })
            },
        },
        Rule {
            id: "ctv.video-size-subhd",
            description: "CTV video smaller than 1280x720 is unusual for the big screen",
            severity: Severity::Info,
            path: Some("imp[].video"),
            spec_ref: None,
            applies: Some(is_ctv),
            validate: |ctx| {
                ctx.every_imp(|imp| {
                    imp.video.as_ref().map_or(true, |v| match (v.w, v.h) {
                        (Some(w), Some(h)) => w >= 1280 && h >= 720,
                        _ => true,
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

    fn issues_with(v: serde_json::Value, force_ctv: bool) -> Vec<&'static str> {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        let ctx = Context::build(Some(req), false, force_ctv, None::<PartnerProfile>);
        evaluate(&catalogue(), &ctx).into_iter().map(|i| i.id).collect()
    }

    fn ctv_video(pos: Option<i64>) -> serde_json::Value {
        let mut video = serde_json::json!({"mimes":["video/mp4"],"w":1920,"h":1080});
        if let Some(p) = pos {
            video["pos"] = serde_json::json!(p);
        }
        serde_json::json!({
            "id":"r1",
            "imp":[{"id":"1","video":video}],
            "app":{"id":"a1","bundle":"193582","content":{"title":"Show"}},
            "device":{"devicetype":3,"ifa":"5a9e1c2d-0b1f-4a8e-9f3d-7c6b5a4e3d2c"}
        })
    }

    #[test]
    fn pos_must_equal_fullscreen_exactly() {
        assert!(issues_with(ctv_video(None), false).contains(&"ctv.pos-fullscreen"));
        assert!(issues_with(ctv_video(Some(1)), false).contains(&"ctv.pos-fullscreen"));
        assert!(!issues_with(ctv_video(Some(7)), false).contains(&"ctv.pos-fullscreen"));
    }

    #[test]
    fn ctv_rules_inactive_without_ctv_signal() {
        let ids = issues_with(
            serde_json::json!({
                "id":"r1","imp":[{"id":"1","video":{"mimes":["video/mp4"]}}],
                "device":{"devicetype":4}
            }),
            false,
        );
        assert!(!ids.iter().any(|i| i.starts_with("ctv.")));
    }

    #[test]
    fn forced_ctv_on_non_tv_device_flags_inconsistency() {
        let ids = issues_with(
            serde_json::json!({
                "id":"r1","imp":[{"id":"1","video":{"mimes":["video/mp4"],"pos":7}}],
                "app":{"id":"a1","content":{}},
                "device":{"devicetype":4}
            }),
            true,
        );
        assert!(ids.contains(&"ctv.devicetype-consistent"));
    }
}
