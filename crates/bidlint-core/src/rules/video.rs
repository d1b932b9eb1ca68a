//! Video impression rules, including OpenRTB 2.6 pod duration fields.
//!
//! The set is gated on video inventory being present; individual predicates
//! are still written defensively (`imp.video.as_ref().map_or(true, ...)`) so
//! non-video impressions in a mixed request trivially pass.

use super::helpers::{code_in, codes_in, flag_ok};
use super::{Rule, Severity};
use crate::context::{Context, InventoryType};
use crate::openrtb::Video;

fn has_video(ctx: &Context) -> bool {
    ctx.inventory.contains(InventoryType::Video)
}

fn video_ok(ctx: &Context, pred: impl Fn(&Video) -> bool + Copy) -> bool {
    ctx.every_imp(|imp| imp.video.as_ref().map_or(true, pred))
}

fn video_mime_ok(mime: &str) -> bool {
    mime.starts_with("video/") || mime.starts_with("application/")
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "video.mimes-missing",
            description: "video.mimes is required and must not be empty",
            severity: Severity::Error,
            path: Some("imp[].video.mimes"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| v.mimes.as_ref().map_or(false, |m| !m.is_empty()))
            },
        },
        Rule {
            id: "video.mimes-format",
            description: "video.mimes entries should be video/* or application/* media types",
            severity: Severity::Warning,
            path: Some("imp[].video.mimes"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| {
                    v.mimes
                        .as_ref()
                        .map_or(true, |m| m.iter().all(|s| video_mime_ok(s)))
                })
            },
        },
        Rule {
            id: "video.protocols-missing",
            description: "video.protocols is absent; bidders cannot pick a VAST version",
            severity: Severity::Warning,
            path: Some("imp[].video.protocols"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| v.protocols.as_ref().map_or(false, |p| !p.is_empty()))
            },
        },
        Rule {
            id: "video.protocols-known",
            description: "video.protocols contains a code outside the defined range (1-14)",
            severity: Severity::Error,
            path: Some("imp[].video.protocols"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| codes_in(v.protocols.as_ref(), 1, 14)),
        },
        Rule {
            id: "video.duration-negative",
            description: "video durations must be non-negative, and maxduration positive",
            severity: Severity::Error,
            path: Some("imp[].video"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| {
                    v.minduration.map_or(true, |d| d >= 0)
                        && v.maxduration.map_or(true, |d| d > 0)
                })
            },
        },
        Rule {
            id: "video.duration-order",
            description: "video.minduration must not exceed video.maxduration",
            severity: Severity::Error,
            path: Some("imp[].video"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| match (v.minduration, v.maxduration) {
                    (Some(min), Some(max)) => min <= max,
                    _ => true,
                })
            },
        },
        Rule {
            id: "video.rqddurs-exclusive",
            description: "video.rqddurs is mutually exclusive with minduration/maxduration",
            severity: Severity::Error,
            path: Some("imp[].video.rqddurs"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| {
                    !(v.rqddurs.is_some()
                        && (v.minduration.is_some() || v.maxduration.is_some()))
                })
            },
        },
        Rule {
            id: "video.rqddurs-positive",
            description: "video.rqddurs entries must be positive durations",
            severity: Severity::Error,
            path: Some("imp[].video.rqddurs"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| {
                    v.rqddurs.as_ref().map_or(true, |ds| ds.iter().all(|d| *d > 0))
                })
            },
        },
        Rule {
            id: "video.size-missing",
            description: "video.w and video.h should be declared",
            severity: Severity::Warning,
            path: Some("imp[].video"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| v.w.is_some() && v.h.is_some()),
        },
        Rule {
            id: "video.size-positive",
            description: "video.w and video.h must be positive when present",
            severity: Severity::Error,
            path: Some("imp[].video"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| {
                    v.w.map_or(true, |w| w > 0) && v.h.map_or(true, |h| h > 0)
                })
            },
        },
        Rule {
            id: "video.linearity-known",
            description: "video.linearity must be 1 (in-stream) or 2 (overlay)",
            severity: Severity::Error,
            path: Some("imp[].video.linearity"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| code_in(v.linearity, 1, 2)),
        },
        Rule {
            id: "video.placement-known",
            description: "video.placement is not a known code (1-5)",
            severity: Severity::Error,
            path: Some("imp[].video.placement"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| code_in(v.placement, 1, 5)),
        },
        Rule {
            id: "video.plcmt-known",
            description: "video.plcmt is not a known code (1-4)",
            severity: Severity::Error,
            path: Some("imp[].video.plcmt"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| code_in(v.plcmt, 1, 4)),
        },
        Rule {
            id: "video.placement-deprecated",
            description: "video.placement is deprecated; declare plcmt alongside it",
            severity: Severity::Info,
            path: Some("imp[].video.plcmt"),
            spec_ref: None,
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| !(v.placement.is_some() && v.plcmt.is_none()))
            },
        },
        Rule {
            id: "video.plcmt-consistent",
            description: "video.placement says in-stream but plcmt disagrees",
            severity: Severity::Warning,
            path: Some("imp[].video.plcmt"),
            spec_ref: None,
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| match (v.placement, v.plcmt) {
                    (Some(1), Some(p)) => p == 1,
                    _ => true,
                })
            },
        },
        Rule {
            id: "video.startdelay-valid",
            description: "video.startdelay must be >= -2 (-1 generic mid-roll, -2 generic post-roll)",
            severity: Severity::Error,
            path: Some("imp[].video.startdelay"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| v.startdelay.map_or(true, |d| d >= -2)),
        },
        Rule {
            id: "video.skip-flag",
            description: "video.skip must be 0 or 1",
            severity: Severity::Error,
            path: Some("imp[].video.skip"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| flag_ok(v.skip)),
        },
        Rule {
            id: "video.skip-attrs-orphaned",
            description: "skipmin/skipafter are only meaningful when skip=1",
            severity: Severity::Warning,
            path: Some("imp[].video"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| {
                    v.skip == Some(1) || (v.skipmin.is_none() && v.skipafter.is_none())
                })
            },
        },
        Rule {
            id: "video.playbackmethod-known",
            description: "video.playbackmethod contains a code outside the defined range (1-7)",
            severity: Severity::Warning,
            path: Some("imp[].video.playbackmethod"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| codes_in(v.playbackmethod.as_ref(), 1, 7)),
        },
        Rule {
            id: "video.delivery-known",
            description: "video.delivery contains a code outside the defined range (1-3)",
            severity: Severity::Warning,
            path: Some("imp[].video.delivery"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| codes_in(v.delivery.as_ref(), 1, 3)),
        },
        Rule {
            id: "video.pos-known",
            description: "video.pos is not a known ad position code (0-7)",
            severity: Severity::Warning,
            path: Some("imp[].video.pos"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| code_in(v.pos, 0, 7)),
        },
        Rule {
            id: "video.api-known",
            description: "video.api contains a code outside the defined range (1-7)",
            severity: Severity::Warning,
            path: Some("imp[].video.api"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| codes_in(v.api.as_ref(), 1, 7)),
        },
        Rule {
            id: "video.bitrate-order",
            description: "video.minbitrate must not exceed video.maxbitrate",
            severity: Severity::Error,
            path: Some("imp[].video"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| match (v.minbitrate, v.maxbitrate) {
                    (Some(min), Some(max)) => min <= max,
                    _ => true,
                })
            },
        },
        Rule {
            id: "video.poddur-positive",
            description: "video.poddur (total pod duration) must be positive",
            severity: Severity::Error,
            path: Some("imp[].video.poddur"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| v.poddur.map_or(true, |d| d > 0)),
        },
        Rule {
            id: "video.maxseq-positive",
            description: "video.maxseq (max ads in pod) must be positive",
            severity: Severity::Error,
            path: Some("imp[].video.maxseq"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| video_ok(ctx, |v| v.maxseq.map_or(true, |n| n > 0)),
        },
        Rule {
            id: "video.pod-without-duration",
            description: "pod fields (podid/maxseq) declared without poddur, rqddurs, or maxduration",
            severity: Severity::Warning,
            path: Some("imp[].video"),
            spec_ref: Some("3.2.7"),
            applies: Some(has_video),
            validate: |ctx| {
                video_ok(ctx, |v| {
                    let is_pod = v.podid.is_some() || v.maxseq.is_some();
                    !is_pod
                        || v.poddur.is_some()
                        || v.rqddurs.is_some()
                        || v.maxduration.is_some()
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

    fn with_video(video: serde_json::Value) -> serde_json::Value {
        serde_json::json!({"id":"r1","imp":[{"id":"1","video":video}]})
    }

    #[test]
    fn rqddurs_with_min_max_is_mutually_exclusive_error() {
        // Durations themselves are individually valid; exclusivity still fails.
        let ids = issues_for(with_video(serde_json::json!({
            "mimes":["video/mp4"],"minduration":10,"maxduration":15,"rqddurs":[10,20]
        })));
        assert!(ids.contains(&"video.rqddurs-exclusive"));
        assert!(!ids.contains(&"video.duration-order"));
    }

    #[test]
    fn inverted_durations_fail() {
        let ids = issues_for(with_video(serde_json::json!({
            "mimes":["video/mp4"],"minduration":30,"maxduration":15
        })));
        assert!(ids.contains(&"video.duration-order"));
    }

    #[test]
    fn missing_mimes_is_an_error() {
        let ids = issues_for(with_video(serde_json::json!({"protocols":[2]})));
        assert!(ids.contains(&"video.mimes-missing"));
        let ids = issues_for(with_video(serde_json::json!({"mimes":[]})));
        assert!(ids.contains(&"video.mimes-missing"));
    }

    #[test]
    fn video_rules_skip_non_video_requests() {
        let ids = issues_for(serde_json::json!({"id":"r1","imp":[{"id":"1","banner":{}}]}));
        assert!(!ids.iter().any(|i| i.starts_with("video.")));
    }

    #[test]
    fn non_video_imp_in_mixed_request_passes_trivially() {
        let ids = issues_for(serde_json::json!({
            "id":"r1",
            "imp":[
                {"id":"1","banner":{"w":300,"h":250}},
                {"id":"2","video":{"mimes":["video/mp4"],"protocols":[0]}}
            ]
        }));
        assert!(ids.contains(&"video.protocols-known"));
    }

    #[test]
    fn skip_attrs_without_skip_flag_warn() {
        let ids = issues_for(with_video(serde_json::json!({
            "mimes":["video/mp4"],"skipmin":5
        })));
        assert!(ids.contains(&"video.skip-attrs-orphaned"));
    }

    #[test]
    fn pod_needs_some_duration_bound() {
        let ids = issues_for(with_video(serde_json::json!({
            "mimes":["video/mp4"],"podid":"p1","maxseq":3
        })));
        assert!(ids.contains(&"video.pod-without-duration"));
        let ids = issues_for(with_video(serde_json::json!({
            "mimes":["video/mp4"],"podid":"p1","maxseq":3,"poddur":60
        })));
        assert!(!ids.contains(&"video.pod-without-duration"));
    }
}
