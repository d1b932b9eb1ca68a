//! The analyzer: one entry point (`analyze`) over the whole pipeline of
//! parse, locate, context build, rule evaluation, cross-field validation,
//! and summary derivation, fronted by a memo cache.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::context::{Context, PartnerProfile};
use crate::crossfield;
use crate::locate;
use crate::openrtb::BidRequest;
use crate::rules::{self, Issue, RuleSet, Severity};
use crate::summary::{self, AnalysisSummary};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnalyzeOptions {
    /// Treat the request as CTV even when the device type says otherwise.
    pub force_ctv: bool,
    pub partner: Option<PartnerProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub summary: AnalysisSummary,
    /// Ordered by catalogue grouping, not by severity. Cross-field issues
    /// come last.
    pub issues: Vec<Issue>,
    /// The located, decoded request, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BidRequest>,
    /// Set only when the input text is not valid JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }
}

type CacheKey = (String, AnalyzeOptions);

/// FIFO-bounded memo cache. Keyed by the exact input text plus the options,
/// since options change both gating and output.
struct MemoCache {
    map: HashMap<CacheKey, Arc<AnalysisResult>>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl MemoCache {
    fn new(capacity: usize) -> Self {
        MemoCache {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Arc<AnalysisResult>> {
        self.map.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, value: Arc<AnalysisResult>) {
        if self.capacity == 0 {
            return;
        }
        if self.map.contains_key(&key) {
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.map.remove(&evicted);
            }
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }
}

pub struct Analyzer {
    catalogue: Vec<RuleSet>,
    cache: Mutex<MemoCache>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Analyzer {
            catalogue: rules::catalogue(),
            cache: Mutex::new(MemoCache::new(capacity)),
        }
    }

    /// Analyze one input text. Never fails: malformed JSON, a bare scalar,
    /// or a request-shaped object that will not decode all come back as a
    /// well-formed result with the failure encoded in `issues` / `error`.
    pub fn analyze(&self, text: &str, options: &AnalyzeOptions) -> Arc<AnalysisResult> {
        let key = (text.to_string(), options.clone());

        // A poisoned lock means some earlier caller panicked mid-insert;
        // skip the cache rather than propagate.
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                log::debug!("memo cache hit ({} bytes)", text.len());
                return hit;
            }
        }

        let result = Arc::new(self.run(text, options));

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, result.clone());
        }
        result
    }

    fn run(&self, text: &str, options: &AnalyzeOptions) -> AnalysisResult {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                // Parse failure short-circuits: no context, no rules.
                log::debug!("input is not JSON: {}", e);
                let ctx = Context::default();
                return AnalysisResult {
                    summary: summary::derive(&ctx),
                    issues: vec![Issue {
                        id: "parse.invalid-json",
                        severity: Severity::Error,
                        message: format!("input is not valid JSON: {}", e),
                        path: None,
                        spec_ref: None,
                    }],
                    request: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let mut issues = Vec::new();
        let (request, located_malformed) = match locate::locate(&value) {
            Some(root) => match locate::decode(root) {
                Ok(req) => (Some(req), false),
                Err(e) => {
                    // A request-shaped object that will not decode gets
                    // exactly one issue; the presence rule stays quiet.
                    issues.push(Issue {
                        id: "core.shape",
                        severity: Severity::Error,
                        message: format!("request object failed to decode: {}", e),
                        path: None,
                        spec_ref: None,
                    });
                    (None, true)
                }
            },
            None => (None, false),
        };

        let ctx = Context::build(request, located_malformed, options.force_ctv, options.partner);

        issues.extend(rules::evaluate(&self.catalogue, &ctx));
        crossfield::validate(&ctx, &mut issues);

        let summary = summary::derive(&ctx);
        log::debug!(
            "analysis complete: {} issue(s), type {}",
            issues.len(),
            summary.request_type
        );

        AnalysisResult {
            summary,
            issues,
            request: ctx.request,
            error: None,
        }
    }
}
