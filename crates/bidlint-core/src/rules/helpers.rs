//! Fixed-form matchers shared across rule sets.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::Url;

/// Four dot-separated octets, each 0-255.
pub fn is_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

/// Colon-separated hex groups including `::` collapse forms.
pub fn is_ipv6(s: &str) -> bool {
    s.parse::<Ipv6Addr>().is_ok()
}

fn is_macro_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '%' | '$' | '.')
}

/// Detect unresolved macro placeholders: a `{name}` or `[name]` span whose
/// body is a plausible macro name. Publishers that never expanded their tag
/// macros ship literal `[timestamp]` / `{GDPR_CONSENT}` strings downstream.
pub fn has_macro_placeholder(s: &str) -> bool {
    for (open, close) in [('{', '}'), ('[', ']')] {
        let mut rest = s;
        while let Some(start) = rest.find(open) {
            let tail = &rest[start + 1..];
            if let Some(end) = tail.find(close) {
                let name = &tail[..end];
                if !name.is_empty() && name.chars().all(is_macro_name_char) {
                    return true;
                }
                rest = &tail[end + 1..];
            } else {
                break;
            }
        }
    }
    false
}

/// ISO-3166-1 alpha-3, the form OpenRTB mandates for `geo.country`.
pub fn is_alpha3_country(s: &str) -> bool {
    s.len() == 3 && s.chars().all(|c| c.is_ascii_uppercase())
}

/// ISO-3166-1 alpha-2 — tolerated but worth flagging separately.
pub fn is_alpha2_country(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_uppercase())
}

/// ISO-4217 currency code shape.
pub fn is_currency_code(s: &str) -> bool {
    s.len() == 3 && s.chars().all(|c| c.is_ascii_uppercase())
}

/// ISO-639-1 language code shape.
pub fn is_language_code(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_lowercase())
}

/// Reverse-DNS bundle shape: dotted segments, each starting with a letter.
pub fn is_reverse_dns(s: &str) -> bool {
    let mut segments = 0;
    for seg in s.split('.') {
        if seg.is_empty() || !seg.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return false;
        }
        if !seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
        segments += 1;
    }
    segments >= 2
}

pub fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Bare domain: dotted labels, no scheme, no path.
pub fn is_bare_domain(s: &str) -> bool {
    if s.contains("://") || s.contains('/') || !s.contains('.') {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

pub fn is_valid_url(s: &str) -> bool {
    Url::parse(s).is_ok()
}

pub fn is_https_url(s: &str) -> bool {
    Url::parse(s).map_or(false, |u| u.scheme() == "https")
}

/// IAB content taxonomy code: `IAB<n>` or `IAB<n>-<m>`.
pub fn is_iab_category(s: &str) -> bool {
    let Some(rest) = s.strip_prefix("IAB") else {
        return false;
    };
    match rest.split_once('-') {
        Some((major, minor)) => is_numeric_id(major) && is_numeric_id(minor),
        None => is_numeric_id(rest),
    }
}

/// Binary flag fields: absent passes, present must be 0 or 1.
pub fn flag_ok(v: Option<i64>) -> bool {
    v.map_or(true, |x| x == 0 || x == 1)
}

/// Enum-coded fields: absent passes, present must sit in `lo..=hi`.
pub fn code_in(v: Option<i64>, lo: i64, hi: i64) -> bool {
    v.map_or(true, |x| (lo..=hi).contains(&x))
}

/// List-of-codes fields: absent passes, every member must sit in `lo..=hi`.
pub fn codes_in(v: Option<&Vec<i64>>, lo: i64, hi: i64) -> bool {
    v.map_or(true, |xs| xs.iter().all(|x| (lo..=hi).contains(x)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_fixed_form() {
        assert!(is_ipv4("8.8.8.8"));
        assert!(is_ipv4("255.255.255.255"));
        assert!(!is_ipv4("256.1.1.1"));
        assert!(!is_ipv4("1.2.3"));
        assert!(!is_ipv4("1.2.3.4.5"));
        assert!(!is_ipv4("a.b.c.d"));
    }

    #[test]
    fn ipv6_accepts_collapse_forms() {
        assert!(is_ipv6("2001:db8::1"));
        assert!(is_ipv6("::1"));
        assert!(is_ipv6("fe80:0:0:0:0:0:0:1"));
        assert!(!is_ipv6("2001:::1"));
        assert!(!is_ipv6("8.8.8.8"));
    }

    #[test]
    fn macro_placeholders_detected_in_both_bracket_forms() {
        assert!(has_macro_placeholder("ifa=[IFA]"));
        assert!(has_macro_placeholder("https://x.test/?cb={CACHEBUSTER}"));
        assert!(has_macro_placeholder("[timestamp]"));
        assert!(has_macro_placeholder("pre {GDPR_CONSENT_78} post"));
        assert!(!has_macro_placeholder("plain text"));
        assert!(!has_macro_placeholder("a[b c]d")); // space: not a macro name
        assert!(!has_macro_placeholder("{}"));
        // Second span still found after a non-macro first span.
        assert!(has_macro_placeholder("[not a macro] then [REAL_ONE]"));
    }

    #[test]
    fn country_and_currency_shapes() {
        assert!(is_alpha3_country("USA"));
        assert!(!is_alpha3_country("usa"));
        assert!(!is_alpha3_country("US"));
        assert!(is_alpha2_country("US"));
        assert!(is_currency_code("EUR"));
        assert!(!is_currency_code("eur"));
    }

    #[test]
    fn reverse_dns_shape() {
        assert!(is_reverse_dns("com.example.app"));
        assert!(is_reverse_dns("io.foo"));
        assert!(!is_reverse_dns("example"));
        assert!(!is_reverse_dns("com..app"));
        assert!(!is_reverse_dns("com.1app"));
        assert!(!is_reverse_dns("123456789"));
    }

    #[test]
    fn bare_domain_shape() {
        assert!(is_bare_domain("news.example.com"));
        assert!(!is_bare_domain("https://news.example.com"));
        assert!(!is_bare_domain("example.com/path"));
        assert!(!is_bare_domain("localhost"));
    }

    #[test]
    fn iab_category_shape() {
        assert!(is_iab_category("IAB1"));
        assert!(is_iab_category("IAB17-44"));
        assert!(!is_iab_category("IAB"));
        assert!(!is_iab_category("iab1"));
        assert!(!is_iab_category("IAB1-"));
    }

    #[test]
    fn flag_and_code_helpers_pass_on_absent() {
        assert!(flag_ok(None));
        assert!(flag_ok(Some(1)));
        assert!(!flag_ok(Some(2)));
        assert!(code_in(None, 1, 4));
        assert!(!code_in(Some(9), 1, 4));
        assert!(codes_in(None, 1, 14));
        assert!(codes_in(Some(&vec![1, 14]), 1, 14));
        assert!(!codes_in(Some(&vec![0]), 1, 14));
    }
}
