//! Human-facing request classification, derived from the same context the
//! rules see. Purely descriptive: it reports what is there and never enforces
//! anything (a request with both app and site still gets a platform label;
//! the exclusivity rule fires separately).

use serde::Serialize;

use crate::context::Context;
use crate::tables::device_type_label;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub request_type: String,
    pub platform: &'static str,
    pub device_type: &'static str,
    /// Device country code, or "N/A". Never empty.
    pub geo: String,
    pub impressions: usize,
    /// Detection order: banner, video, audio, native, dooh.
    pub media_formats: Vec<&'static str>,
}

pub fn derive(ctx: &Context) -> AnalysisSummary {
    let media_formats: Vec<&'static str> =
        ctx.inventory.iter().map(|t| t.as_str()).collect();

    let request_type = match ctx.inventory.len() {
        0 => "Unknown".to_string(),
        1 => ctx.inventory.iter().next().map(|t| t.label()).unwrap_or("Unknown").to_string(),
        _ => "Mixed".to_string(),
    };

    let platform = match ctx.req() {
        Some(r) if r.app.is_some() && r.site.is_none() => "App",
        Some(r) if r.site.is_some() && r.app.is_none() => "Site",
        _ => "Unknown",
    };

    let device_type = ctx
        .device()
        .and_then(|d| d.devicetype)
        .and_then(device_type_label)
        .unwrap_or("Unknown");

    let geo = ctx
        .device()
        .and_then(|d| d.geo.as_ref())
        .and_then(|g| g.country.clone())
        .unwrap_or_else(|| "N/A".to_string());

    AnalysisSummary {
        request_type,
        platform,
        device_type,
        geo,
        impressions: ctx.imps().len(),
        media_formats,
    }
}
