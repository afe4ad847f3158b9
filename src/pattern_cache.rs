//! Process-wide, append-only compiled-regex cache keyed by pattern string (§5, Design Notes
//! §9). The pattern set used by this service is closed (every call site passes a literal), so
//! eviction is unnecessary; a hard upper bound guards against unbounded growth anyway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_CACHED_PATTERNS: usize = 512;

static CACHE: Lazy<Mutex<HashMap<String, Arc<Regex>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns a compiled `Regex` for `pattern`, compiling and caching it on first use. Panics on an
/// invalid pattern: every pattern passed by this codebase is a compile-time literal, so a bad
/// pattern is a programming error, not a runtime condition.
pub fn cached(pattern: &str) -> Arc<Regex> {
    let mut cache = CACHE.lock().expect("pattern cache mutex poisoned");
    if let Some(re) = cache.get(pattern) {
        return re.clone();
    }
    let compiled = Arc::new(Regex::new(pattern).unwrap_or_else(|e| {
        panic!("invalid precompiled pattern {pattern:?}: {e}");
    }));
    if cache.len() < MAX_CACHED_PATTERNS {
        cache.insert(pattern.to_string(), compiled.clone());
    }
    compiled
}
