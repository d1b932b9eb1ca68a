//! Banner impression rules.

use super::helpers::{code_in, codes_in, flag_ok};
use super::{Rule, Severity};
use crate::context::{Context, InventoryType};
use crate::openrtb::{Banner, Format};

fn has_banner(ctx: &Context) -> bool {
    ctx.inventory.contains(InventoryType::Banner)
}

fn banner_ok(ctx: &Context, pred: impl Fn(&Banner) -> bool + Copy) -> bool {
    ctx.every_imp(|imp| imp.banner.as_ref().map_or(true, pred))
}

/// Common IAB display sizes. Uncommon sizes are not wrong, just worth a note.
pub fn is_standard_size(w: i64, h: i64) -> bool {
    matches!(
        (w, h),
        (300, 250)
            | (320, 50)
            | (728, 90)
            | (160, 600)
            | (300, 50)
            | (300, 600)
            | (970, 250)
            | (970, 90)
            | (468, 60)
            | (336, 280)
            | (320, 100)
            | (320, 480)
            | (768, 1024)
    )
}

fn format_entry_ok(f: &Format) -> bool {
    let fixed = matches!((f.w, f.h), (Some(w), Some(h)) if w > 0 && h > 0);
    let ratio = matches!(
        (f.wratio, f.hratio, f.wmin),
        (Some(wr), Some(hr), Some(wmin)) if wr > 0 && hr > 0 && wmin > 0
    );
    fixed || ratio
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "banner.size-missing",
            description: "banner needs w/h or a format array",
            severity: Severity::Error,
            path: Some("imp[].banner"),
            spec_ref: Some("3.2.6"),
            applies: Some(has_banner),
            validate: |ctx| {
                banner_ok(ctx, |b| {
                    (b.w.is_some() && b.h.is_some())
                        || b.format.as_ref().map_or(false, |f| !f.is_empty())
                })
            },
        },
        Rule {
            id: "banner.size-positive",
            description: "banner.w and banner.h must be positive when present",
            severity: Severity::Error,
            path: Some("imp[].banner"),
            spec_ref: Some("3.2.6"),
            applies: Some(has_banner),
            validate: |ctx| {
                banner_ok(ctx, |b| {
                    b.w.map_or(true, |w| w > 0) && b.h.map_or(true, |h| h > 0)
                })
            },
        },
        Rule {
            id: "banner.format-entries",
            description: "each format entry needs positive w/h or a complete wratio/hratio/wmin trio",
            severity: Severity::Error,
            path: Some("imp[].banner.format[]"),
            spec_ref: Some("3.2.10"),
            applies: Some(has_banner),
            validate: |ctx| {
                banner_ok(ctx, |b| {
                    b.format
                        .as_ref()
                        .map_or(true, |fs| fs.iter().all(format_entry_ok))
                })
            },
        },
        Rule {
            id: "banner.size-nonstandard",
            description: "banner w×h is not a common IAB size; fill rates may suffer",
            severity: Severity::Info,
            path: Some("imp[].banner"),
            spec_ref: None,
            applies: Some(has_banner),
            validate: |ctx| {
                banner_ok(ctx, |b| match (b.w, b.h) {
                    // A format array supersedes the single-size check.
                    (Some(w), Some(h)) if b.format.is_none() => is_standard_size(w, h),
                    _ => true,
                })
            },
        },
        Rule {
            id: "banner.btype-known",
            description: "banner.btype contains a code outside the defined range (1-4)",
            severity: Severity::Warning,
            path: Some("imp[].banner.btype"),
            spec_ref: Some("3.2.6"),
            applies: Some(has_banner),
            validate: |ctx| banner_ok(ctx, |b| codes_in(b.btype.as_ref(), 1, 4)),
        },
        Rule {
            id: "banner.expdir-known",
            description: "banner.expdir contains a code outside the defined range (1-5)",
            severity: Severity::Warning,
            path: Some("imp[].banner.expdir"),
            spec_ref: Some("3.2.6"),
            applies: Some(has_banner),
            validate: |ctx| banner_ok(ctx, |b| codes_in(b.expdir.as_ref(), 1, 5)),
        },
        Rule {
            id: "banner.pos-known",
            description: "banner.pos is not a known ad position code (0-7)",
            severity: Severity::Warning,
            path: Some("imp[].banner.pos"),
            spec_ref: Some("3.2.6"),
            applies: Some(has_banner),
            validate: |ctx| banner_ok(ctx, |b| code_in(b.pos, 0, 7)),
        },
        Rule {
            id: "banner.api-known",
            description: "banner.api contains a code outside the defined range (1-7)",
            severity: Severity::Warning,
            path: Some("imp[].banner.api"),
            spec_ref: Some("3.2.6"),
            applies: Some(has_banner),
            validate: |ctx| banner_ok(ctx, |b| codes_in(b.api.as_ref(), 1, 7)),
        },
        Rule {
            id: "banner.vcm-flag",
            description: "banner.vcm must be 0 or 1",
            severity: Severity::Error,
            path: Some("imp[].banner.vcm"),
            spec_ref: Some("3.2.6"),
            applies: Some(has_banner),
            validate: |ctx| banner_ok(ctx, |b| flag_ok(b.vcm)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{catalogue, evaluate};
    use super::is_standard_size;
    use crate::context::Context;
    use crate::openrtb::BidRequest;

    fn issues_for(v: serde_json::Value) -> Vec<&'static str> {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        let ctx = Context::build(Some(req), false, false, None);
        evaluate(&catalogue(), &ctx).into_iter().map(|i| i.id).collect()
    }

    fn with_banner(banner: serde_json::Value) -> serde_json::Value {
        serde_json::json!({"id":"r1","imp":[{"id":"1","banner":banner}]})
    }

    #[test]
    fn standard_size_table() {
        assert!(is_standard_size(300, 250));
        assert!(is_standard_size(728, 90));
        assert!(!is_standard_size(300, 251));
        assert!(!is_standard_size(0, 0));
    }

    #[test]
    fn sizeless_banner_is_an_error() {
        let ids = issues_for(with_banner(serde_json::json!({})));
        assert!(ids.contains(&"banner.size-missing"));
    }

    #[test]
    fn format_array_satisfies_size_requirement() {
        let ids = issues_for(with_banner(serde_json::json!({
            "format":[{"w":320,"h":50},{"w":300,"h":250}]
        })));
        assert!(!ids.contains(&"banner.size-missing"));
    }

    #[test]
    fn ratio_format_entry_passes() {
        let ids = issues_for(with_banner(serde_json::json!({
            "format":[{"wratio":6,"hratio":5,"wmin":300}]
        })));
        assert!(!ids.contains(&"banner.format-entries"));
    }

    #[test]
    fn incomplete_format_entry_fails() {
        let ids = issues_for(with_banner(serde_json::json!({"format":[{"w":300}]})));
        assert!(ids.contains(&"banner.format-entries"));
    }

    #[test]
    fn odd_size_is_informational() {
        let ids = issues_for(with_banner(serde_json::json!({"w":333,"h":222})));
        assert!(ids.contains(&"banner.size-nonstandard"));
    }
}
