use crate::core::{ListError, Record, Result};
use lru::LruCache;
use regex::{Regex, RegexBuilder};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

lazy_static::lazy_static! {
    static ref PATTERN_CACHE: Mutex<LruCache<String, Arc<Regex>>> =
        Mutex::new(LruCache::new(NonZeroUsize::new(128).unwrap_or(NonZeroUsize::MIN)));
}

/// `*` separated segments, each escaped, joined by `.*`
fn wildcard_to_regex(pattern: &str) -> String {
    pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

fn compiled(pattern: &str) -> Result<Arc<Regex>> {
    {
        let mut cache = PATTERN_CACHE.lock()?;
        if let Some(regex) = cache.get(pattern) {
            return Ok(Arc::clone(regex));
        }
    }

    let regex = RegexBuilder::new(&wildcard_to_regex(pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| ListError::InvalidRequest(format!("Invalid search pattern: {}", e)))?;
    let regex = Arc::new(regex);

    PATTERN_CACHE.lock()?.put(pattern.to_string(), Arc::clone(&regex));
    Ok(regex)
}

/// Case-insensitive match. Without `*` this is a plain substring test.
pub fn matches(text: &str, pattern: &str) -> Result<bool> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Ok(true);
    }
    if !pattern.contains('*') {
        return Ok(text.to_lowercase().contains(&pattern.to_lowercase()));
    }
    Ok(compiled(pattern)?.is_match(text))
}

/// Keep the records whose named string fields match `pattern`.
/// Returns a new vector; an empty pattern keeps everything.
pub fn filter_records(items: &[Record], fields: &[&str], pattern: &str) -> Result<Vec<Record>> {
    let mut kept = Vec::with_capacity(items.len());
    for record in items {
        let mut hit = false;
        for field in fields {
            if let Some(text) = record.text(field) {
                if matches(text, pattern)? {
                    hit = true;
                    break;
                }
            }
        }
        if hit || pattern.trim().is_empty() {
            kept.push(record.clone());
        }
    }
    Ok(kept)
}
