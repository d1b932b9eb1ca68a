//! Audio impression rules. Mirrors the video set where the objects overlap.

use super::helpers::{code_in, codes_in, flag_ok};
use super::{Rule, Severity};
use crate::context::{Context, InventoryType};
use crate::openrtb::Audio;

fn has_audio(ctx: &Context) -> bool {
    ctx.inventory.contains(InventoryType::Audio)
}

fn audio_ok(ctx: &Context, pred: impl Fn(&Audio) -> bool + Copy) -> bool {
    ctx.every_imp(|imp| imp.audio.as_ref().map_or(true, pred))
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "audio.mimes-missing",
            description: "audio.mimes is required and must not be empty",
            severity: Severity::Error,
            path: Some("imp[].audio.mimes"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| {
                audio_ok(ctx, |a| a.mimes.as_ref().map_or(false, |m| !m.is_empty()))
            },
        },
        Rule {
            id: "audio.mimes-format",
            description: "audio.mimes entries should be audio/* or application/* media types",
            severity: Severity::Warning,
            path: Some("imp[].audio.mimes"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| {
                audio_ok(ctx, |a| {
                    a.mimes.as_ref().map_or(true, |m| {
                        m.iter()
                            .all(|s| s.starts_with("audio/") || s.starts_with("application/"))
                    })
                })
            },
        },
        Rule {
            id: "audio.protocols-known",
            description: "audio.protocols contains a code outside the defined range (1-14)",
            severity: Severity::Error,
            path: Some("imp[].audio.protocols"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| audio_ok(ctx, |a| codes_in(a.protocols.as_ref(), 1, 14)),
        },
        Rule {
            id: "audio.duration-order",
            description: "audio.minduration must not exceed audio.maxduration",
            severity: Severity::Error,
            path: Some("imp[].audio"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| {
                audio_ok(ctx, |a| match (a.minduration, a.maxduration) {
                    (Some(min), Some(max)) => min <= max,
                    _ => true,
                })
            },
        },
        Rule {
            id: "audio.rqddurs-exclusive",
            description: "audio.rqddurs is mutually exclusive with minduration/maxduration",
            severity: Severity::Error,
            path: Some("imp[].audio.rqddurs"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| {
                audio_ok(ctx, |a| {
                    !(a.rqddurs.is_some()
                        && (a.minduration.is_some() || a.maxduration.is_some()))
                })
            },
        },
        Rule {
            id: "audio.startdelay-valid",
            description: "audio.startdelay must be >= -2",
            severity: Severity::Error,
            path: Some("imp[].audio.startdelay"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| audio_ok(ctx, |a| a.startdelay.map_or(true, |d| d >= -2)),
        },
        Rule {
            id: "audio.feed-known",
            description: "audio.feed is not a known code (1-3)",
            severity: Severity::Warning,
            path: Some("imp[].audio.feed"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| audio_ok(ctx, |a| code_in(a.feed, 1, 3)),
        },
        Rule {
            id: "audio.stitched-flag",
            description: "audio.stitched must be 0 or 1",
            severity: Severity::Error,
            path: Some("imp[].audio.stitched"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| audio_ok(ctx, |a| flag_ok(a.stitched)),
        },
        Rule {
            id: "audio.nvol-known",
            description: "audio.nvol is not a known volume normalization code (0-4)",
            severity: Severity::Warning,
            path: Some("imp[].audio.nvol"),
            spec_ref: Some("3.2.8"),
            applies: Some(has_audio),
            validate: |ctx| audio_ok(ctx, |a| code_in(a.nvol, 0, 4)),
        },
        Rule {
            id: "audio.sequence-deprecated",
            description: "audio.sequence is deprecated; use podded placements instead",
            severity: Severity::Info,
            path: Some("imp[].audio.sequence"),
            spec_ref: None,
            applies: Some(has_audio),
            validate: |ctx| audio_ok(ctx, |a| a.sequence.is_none()),
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

    fn with_audio(audio: serde_json::Value) -> serde_json::Value {
        serde_json::json!({"id":"r1","imp":[{"id":"1","audio":audio}]})
    }

    #[test]
    fn rqddurs_exclusivity_mirrors_video() {
        let ids = issues_for(with_audio(serde_json::json!({
            "mimes":["audio/mp4"],"minduration":5,"rqddurs":[15,30]
        })));
        assert!(ids.contains(&"audio.rqddurs-exclusive"));
    }

    #[test]
    fn wrong_mime_family_warns() {
        let ids = issues_for(with_audio(serde_json::json!({"mimes":["video/mp4"]})));
        assert!(ids.contains(&"audio.mimes-format"));
    }

    #[test]
    fn sequence_is_flagged_as_deprecated() {
        let ids = issues_for(with_audio(serde_json::json!({
            "mimes":["audio/mp4"],"sequence":1
        })));
        assert!(ids.contains(&"audio.sequence-deprecated"));
    }
}
