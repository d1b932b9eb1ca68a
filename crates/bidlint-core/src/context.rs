//! Per-analysis derived facts shared by every rule.

use serde::{Deserialize, Serialize};

use crate::openrtb::{BidRequest, Device, Imp};

/// Device type codes the auto-detector treats as CTV: 3 = Connected TV,
/// 7 = Set Top Box.
pub const CTV_DEVICE_TYPES: [i64; 2] = [3, 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryType {
    Banner,
    Video,
    Audio,
    Native,
    Dooh,
}

impl InventoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryType::Banner => "banner",
            InventoryType::Video => "video",
            InventoryType::Audio => "audio",
            InventoryType::Native => "native",
            InventoryType::Dooh => "dooh",
        }
    }

    /// Capitalized form used for the summary's request type.
    pub fn label(self) -> &'static str {
        match self {
            InventoryType::Banner => "Banner",
            InventoryType::Video => "Video",
            InventoryType::Audio => "Audio",
            InventoryType::Native => "Native",
            InventoryType::Dooh => "DOOH",
        }
    }
}

/// Which media categories appear anywhere in `imp`. Iteration order is the
/// detection order (banner, video, audio, native, dooh) and is what the
/// summary's `mediaFormats` list reflects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InventorySet {
    banner: bool,
    video: bool,
    audio: bool,
    native: bool,
    dooh: bool,
}

impl InventorySet {
    pub fn contains(&self, t: InventoryType) -> bool {
        match t {
            InventoryType::Banner => self.banner,
            InventoryType::Video => self.video,
            InventoryType::Audio => self.audio,
            InventoryType::Native => self.native,
            InventoryType::Dooh => self.dooh,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = InventoryType> + '_ {
        [
            InventoryType::Banner,
            InventoryType::Video,
            InventoryType::Audio,
            InventoryType::Native,
            InventoryType::Dooh,
        ]
        .into_iter()
        .filter(|t| self.contains(*t))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partner integration profiles that switch on extra rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartnerProfile {
    Prebid,
    AmazonAps,
}

impl std::str::FromStr for PartnerProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prebid" => Ok(PartnerProfile::Prebid),
            "amazon-aps" | "aps" => Ok(PartnerProfile::AmazonAps),
            other => Err(format!("unknown partner profile '{}'", other)),
        }
    }
}

/// Everything a rule is allowed to look at. Built once per analysis, never
/// mutated afterwards.
#[derive(Debug, Default)]
pub struct Context {
    pub request: Option<BidRequest>,
    /// A request-shaped object was located but failed typed decode. Root
    /// presence rules treat this as "found" so only the shape issue fires.
    pub located_malformed: bool,
    pub inventory: InventorySet,
    pub is_ctv: bool,
    pub partner: Option<PartnerProfile>,
}

impl Context {
    /// Single O(n) pass over `imp` plus a device-type probe.
    pub fn build(
        request: Option<BidRequest>,
        located_malformed: bool,
        force_ctv: bool,
        partner: Option<PartnerProfile>,
    ) -> Self {
        let mut inventory = InventorySet::default();
        let mut is_ctv = force_ctv;

        if let Some(req) = &request {
            for imp in &req.imp {
                inventory.banner |= imp.banner.is_some();
                inventory.video |= imp.video.is_some();
                inventory.audio |= imp.audio.is_some();
                inventory.native |= imp.native.is_some();
                inventory.dooh |= imp.qty.is_some();
            }
            inventory.dooh |= req.dooh.is_some();

            if !is_ctv {
                is_ctv = req
                    .device
                    .as_ref()
                    .and_then(|d| d.devicetype)
                    .map_or(false, |dt| CTV_DEVICE_TYPES.contains(&dt));
            }
        }

        Context {
            request,
            located_malformed,
            inventory,
            is_ctv,
            partner,
        }
    }

    pub fn req(&self) -> Option<&BidRequest> {
        self.request.as_ref()
    }

    pub fn imps(&self) -> &[Imp] {
        self.req().map_or(&[], |r| r.imp.as_slice())
    }

    pub fn device(&self) -> Option<&Device> {
        self.req().and_then(|r| r.device.as_ref())
    }

    /// `Array.every` semantics: vacuously true with no root or no impressions.
    pub fn every_imp(&self, pred: impl Fn(&Imp) -> bool) -> bool {
        self.imps().iter().all(pred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx_from(v: serde_json::Value) -> Context {
        let req: BidRequest = serde_json::from_value(v).unwrap();
        Context::build(Some(req), false, false, None)
    }

    #[test]
    fn detects_inventory_types_across_impressions() {
        let ctx = ctx_from(json!({
            "id":"r1",
            "imp":[
                {"id":"1","banner":{}},
                {"id":"2","video":{}},
                {"id":"3","native":{},"qty":{"multiplier":2.0}}
            ]
        }));
        let found: Vec<_> = ctx.inventory.iter().map(InventoryType::as_str).collect();
        assert_eq!(found, vec!["banner", "video", "native", "dooh"]);
    }

    #[test]
    fn dooh_object_counts_as_dooh_inventory() {
        let ctx = ctx_from(json!({"id":"r1","imp":[{"id":"1","banner":{}}],"dooh":{"id":"v1"}}));
        assert!(ctx.inventory.contains(InventoryType::Dooh));
    }

    #[test]
    fn ctv_auto_detected_from_device_type() {
        for dt in CTV_DEVICE_TYPES {
            let ctx = ctx_from(json!({
                "id":"r1","imp":[{"id":"1","video":{}}],"device":{"devicetype":dt}
            }));
            assert!(ctx.is_ctv, "devicetype {} should flag CTV", dt);
        }
        let ctx = ctx_from(json!({
            "id":"r1","imp":[{"id":"1","video":{}}],"device":{"devicetype":2}
        }));
        assert!(!ctx.is_ctv);
    }

    #[test]
    fn force_ctv_overrides_detection() {
        let req: BidRequest =
            serde_json::from_value(json!({"id":"r1","imp":[{"id":"1","banner":{}}]})).unwrap();
        let ctx = Context::build(Some(req), false, true, None);
        assert!(ctx.is_ctv);
    }

    #[test]
    fn absent_root_yields_empty_facts() {
        let ctx = Context::build(None, false, false, None);
        assert!(ctx.inventory.is_empty());
        assert!(ctx.imps().is_empty());
        assert!(ctx.every_imp(|_| false), "every() is vacuous without a root");
    }

    #[test]
    fn partner_profile_parses_from_str() {
        assert_eq!("prebid".parse(), Ok(PartnerProfile::Prebid));
        assert_eq!("aps".parse(), Ok(PartnerProfile::AmazonAps));
        assert!("acme".parse::<PartnerProfile>().is_err());
    }
}
