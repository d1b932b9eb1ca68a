//! Cross-field validators.
//!
//! These run after the rule pass because a single check can emit more than one
//! kind of issue, so they append to the issue list directly instead of
//! returning pass/fail like a `Rule` does.

use url::Url;

use crate::context::Context;
use crate::rules::{Issue, Severity};
use crate::tables::{country_continent, datacenter_continent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storefront {
    AppleAppStore,
    GooglePlay,
    RokuChannelStore,
}

impl Storefront {
    fn name(self) -> &'static str {
        match self {
            Storefront::AppleAppStore => "Apple App Store",
            Storefront::GooglePlay => "Google Play",
            Storefront::RokuChannelStore => "Roku Channel Store",
        }
    }

    /// Does `bundle` fit this vendor's id grammar? Apple and Roku use numeric
    /// ids, Play uses reverse-DNS package names.
    fn bundle_format_ok(self, bundle: &str) -> bool {
        match self {
            Storefront::AppleAppStore | Storefront::RokuChannelStore => {
                crate::rules::helpers::is_numeric_id(bundle)
            }
            Storefront::GooglePlay => crate::rules::helpers::is_reverse_dns(bundle),
        }
    }
}

/// Match a storefront URL and pull out the app identifier it embeds.
///
/// Recognized shapes:
/// - `https://apps.apple.com/<cc>/app/<slug>/id<digits>` (itunes.apple.com too)
/// - `https://play.google.com/store/apps/details?id=<package>`
/// - `https://channelstore.roku.com/details/<digits>[/slug]`
fn match_storefront(url: &Url) -> Option<(Storefront, String)> {
    let host = url.host_str()?.trim_start_matches("www.").to_ascii_lowercase();
    match host.as_str() {
        "apps.apple.com" | "itunes.apple.com" => {
            let id = url.path_segments()?.find_map(|seg| {
                let digits = seg.strip_prefix("id")?;
                (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
                    .then(|| digits.to_string())
            })?;
            Some((Storefront::AppleAppStore, id))
        }
        "play.google.com" => {
            let id = url
                .query_pairs()
                .find(|(k, _)| k == "id")
                .map(|(_, v)| v.into_owned())?;
            Some((Storefront::GooglePlay, id))
        }
        "channelstore.roku.com" => {
            let mut segs = url.path_segments()?;
            let id = segs
                .find(|s| *s == "details")
                .and_then(|_| segs.next())
                .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))?;
            Some((Storefront::RokuChannelStore, id.to_string()))
        }
        _ => None,
    }
}

/// Store URL / bundle consistency. Skipped entirely when either side is
/// absent or the URL does not parse; those conditions have their own rules.
fn check_store_bundle(ctx: &Context, issues: &mut Vec<Issue>) {
    let Some(app) = ctx.req().and_then(|r| r.app.as_ref()) else {
        return;
    };
    let (Some(storeurl), Some(bundle)) = (app.storeurl.as_deref(), app.bundle.as_deref()) else {
        return;
    };
    let Ok(url) = Url::parse(storeurl) else {
        return;
    };

    let Some((vendor, embedded_id)) = match_storefront(&url) else {
        issues.push(Issue {
            id: "crossfield.storefront-unrecognized",
            severity: Severity::Error,
            message: format!("storeurl host '{}' matches no known storefront URL shape",
                url.host_str().unwrap_or("")),
            path: Some("app.storeurl".to_string()),
            spec_ref: None,
        });
        return;
    };

    if !vendor.bundle_format_ok(bundle) {
        issues.push(Issue {
            id: "crossfield.bundle-format",
            severity: Severity::Error,
            message: format!(
                "bundle '{}' does not fit the {} id format",
                bundle,
                vendor.name()
            ),
            path: Some("app.bundle".to_string()),
            spec_ref: None,
        });
    }

    if embedded_id != bundle {
        issues.push(Issue {
            id: "crossfield.store-bundle-mismatch",
            severity: Severity::Error,
            message: format!(
                "storeurl embeds {} id '{}' but app.bundle is '{}'",
                vendor.name(),
                embedded_id,
                bundle
            ),
            path: Some("app.storeurl".to_string()),
            spec_ref: None,
        });
    }
}

/// Geo / datacenter consistency. The datacenter id travels in `ext.dc` on the
/// request; when both its continent and the geo country's continent are known
/// and disagree, warn. A soft signal, never an Error.
fn check_geo_datacenter(ctx: &Context, issues: &mut Vec<Issue>) {
    let Some(req) = ctx.req() else {
        return;
    };
    let Some(dc) = req.ext.as_ref().and_then(|e| e.get("dc")).and_then(|d| d.as_str()) else {
        return;
    };
    let Some(country) = ctx
        .device()
        .and_then(|d| d.geo.as_ref())
        .and_then(|g| g.country.as_deref())
    else {
        return;
    };
    let (Some(dc_cont), Some(geo_cont)) =
        (datacenter_continent(dc), country_continent(country))
    else {
        return;
    };
    if dc_cont != geo_cont {
        issues.push(Issue {
            id: "crossfield.geo-datacenter",
            severity: Severity::Warning,
            message: format!(
                "device geo '{}' ({}) is far from datacenter '{}' ({}); possible proxy or misrouted traffic",
                country, geo_cont, dc, dc_cont
            ),
            path: Some("device.geo.country".to_string()),
            spec_ref: None,
        });
    }
}

/// Run every cross-field validator, appending to `issues` in place.
pub fn validate(ctx: &Context, issues: &mut Vec<Issue>) {
    check_store_bundle(ctx, issues);
    check_geo_datacenter(ctx, issues);
}
