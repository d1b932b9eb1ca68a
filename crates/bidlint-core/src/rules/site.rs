//! Site-channel rules, gated on a `site` object being present.

use url::Url;

use super::helpers::{flag_ok, is_bare_domain, is_iab_category, is_valid_url};
use super::{Rule, Severity};
use crate::context::Context;
use crate::openrtb::Site;

fn has_site(ctx: &Context) -> bool {
    ctx.req().map_or(false, |r| r.site.is_some())
}

fn site_ok(ctx: &Context, pred: impl Fn(&Site) -> bool) -> bool {
    ctx.req().and_then(|r| r.site.as_ref()).map_or(true, pred)
}

/// Registrable-domain containment: `news.example.com` belongs to `example.com`.
fn host_matches_domain(host: &str, domain: &str) -> bool {
    let domain = domain.trim_start_matches("www.");
    let host = host.trim_start_matches("www.");
    host == domain || host.ends_with(&format!(".{}", domain))
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "site.id-or-domain",
            description: "site must be identifiable by id or domain",
            severity: Severity::Error,
            path: Some("site"),
            spec_ref: Some("3.2.13"),
            applies: Some(has_site),
            validate: |ctx| site_ok(ctx, |s| s.id.is_some() || s.domain.is_some()),
        },
        Rule {
            id: "site.domain-missing",
            description: "site.domain is how buyers block and report on sites; it should be present",
            severity: Severity::Warning,
            path: Some("site.domain"),
            spec_ref: Some("3.2.13"),
            applies: Some(has_site),
            validate: |ctx| site_ok(ctx, |s| s.domain.is_some()),
        },
        Rule {
            id: "site.domain-format",
            description: "site.domain must be a bare domain, not a URL",
            severity: Severity::Warning,
            path: Some("site.domain"),
            spec_ref: Some("3.2.13"),
            applies: Some(has_site),
            validate: |ctx| {
                site_ok(ctx, |s| s.domain.as_deref().map_or(true, is_bare_domain))
            },
        },
        Rule {
            id: "site.page-missing",
            description: "site.page (the URL of the page) is absent",
            severity: Severity::Warning,
            path: Some("site.page"),
            spec_ref: Some("3.2.13"),
            applies: Some(has_site),
            validate: |ctx| site_ok(ctx, |s| s.page.is_some()),
        },
        Rule {
            id: "site.page-url",
            description: "site.page must be a parseable absolute URL",
            severity: Severity::Error,
            path: Some("site.page"),
            spec_ref: Some("3.2.13"),
            applies: Some(has_site),
            validate: |ctx| site_ok(ctx, |s| s.page.as_deref().map_or(true, is_valid_url)),
        },
        Rule {
            id: "site.page-domain-consistent",
            description: "site.page host does not belong to site.domain",
            severity: Severity::Warning,
            path: Some("site.page"),
            spec_ref: None,
            applies: Some(has_site),
            validate: |ctx| {
                site_ok(ctx, |s| {
                    let (Some(page), Some(domain)) = (s.page.as_deref(), s.domain.as_deref())
                    else {
                        return true;
                    };
                    // Unparseable pages are site.page-url's problem.
                    let Ok(url) = Url::parse(page) else { return true };
                    url.host_str().map_or(true, |h| host_matches_domain(h, domain))
                })
            },
        },
        Rule {
            id: "site.publisher-id-missing",
            description: "site.publisher.id is required by most supply-path policies",
            severity: Severity::Warning,
            path: Some("site.publisher.id"),
            spec_ref: Some("3.2.16"),
            applies: Some(has_site),
            validate: |ctx| {
                site_ok(ctx, |s| {
                    s.publisher.as_ref().and_then(|p| p.id.as_ref()).is_some()
                })
            },
        },
        Rule {
            id: "site.mobile-flag",
            description: "site.mobile must be 0 or 1",
            severity: Severity::Error,
            path: Some("site.mobile"),
            spec_ref: Some("3.2.13"),
            applies: Some(has_site),
            validate: |ctx| site_ok(ctx, |s| flag_ok(s.mobile)),
        },
        Rule {
            id: "site.privacypolicy-flag",
            description: "site.privacypolicy must be 0 or 1",
            severity: Severity::Error,
            path: Some("site.privacypolicy"),
            spec_ref: Some("3.2.13"),
            applies: Some(has_site),
            validate: |ctx| site_ok(ctx, |s| flag_ok(s.privacypolicy)),
        },
        Rule {
            id: "site.cat-format",
            description: "site.cat entries should be IAB content taxonomy codes",
            severity: Severity::Info,
            path: Some("site.cat"),
            spec_ref: None,
            applies: Some(|ctx| {
                has_site(ctx)
                    && ctx
                        .req()
                        .and_then(|r| r.site.as_ref())
                        .map_or(false, |s| s.cattax.unwrap_or(1) == 1)
            }),
            validate: |ctx| {
                site_ok(ctx, |s| {
                    s.cat
                        .as_ref()
                        .map_or(true, |cat| cat.iter().all(|c| is_iab_category(c)))
                })
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{catalogue, evaluate};
    use super::host_matches_domain;
    use crate::context::Context;
    use crate::openrtb::BidRequest;

    fn issues_for(v: serde_json::Value) -> Vec<&'static str> {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        let ctx = Context::build(Some(req), false, false, None);
        evaluate(&catalogue(), &ctx).into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn host_domain_containment() {
        assert!(host_matches_domain("news.example.com", "example.com"));
        assert!(host_matches_domain("example.com", "www.example.com"));
        assert!(!host_matches_domain("example.com.evil.net", "example.com.evil"));
        assert!(!host_matches_domain("other.com", "example.com"));
    }

    #[test]
    fn page_on_foreign_host_is_flagged() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{}}],
            "site":{"id":"s1","domain":"example.com","page":"https://other.net/article"}
        }));
        assert!(ids.contains(&"site.page-domain-consistent"));
    }

    #[test]
    fn url_in_domain_field_is_flagged() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{}}],
            "site":{"id":"s1","domain":"https://example.com"}
        }));
        assert!(ids.contains(&"site.domain-format"));
    }

    #[test]
    fn relative_page_url_is_an_error() {
        let ids = issues_for(serde_json::json!({
            "id":"r1","imp":[{"id":"1","banner":{}}],
            "site":{"id":"s1","domain":"example.com","page":"/article/5"}
        }));
        assert!(ids.contains(&"site.page-url"));
    }
}
