//! Display-name normalisation over the flat proxy list.
//!
//! Steps run in a fixed order over the whole list: origin prefix, removal
//! filter, rename pairs, regional tag, trim (empty names fall back to the
//! endpoint), then de-duplication. Output names are pairwise unique.

use crate::error::BuildError;
use crate::model::Proxy;
use crate::region;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Compiled removal and rename patterns.
#[derive(Debug, Default)]
pub struct NameRules {
    remove: Option<Regex>,
    rename: Vec<(Regex, String)>,
}

impl NameRules {
    /// Compile user patterns. `replace_keys` and `replace_to` are parallel.
    pub fn compile(
        remove: Option<&str>,
        replace_keys: &[String],
        replace_to: &[String],
    ) -> Result<Self, BuildError> {
        if replace_keys.len() != replace_to.len() {
            return Err(BuildError::Options(format!(
                "replace keys and targets differ in length ({} vs {})",
                replace_keys.len(),
                replace_to.len()
            )));
        }
        let remove = match remove.map(str::trim).filter(|r| !r.is_empty()) {
            Some(pattern) => Some(
                Regex::new(pattern).map_err(|e| BuildError::pattern("remove", pattern, e))?,
            ),
            None => None,
        };
        let rename = replace_keys
            .iter()
            .zip(replace_to)
            .map(|(key, to)| {
                Regex::new(key)
                    .map(|re| (re, to.clone()))
                    .map_err(|e| BuildError::pattern("replace", key.as_str(), e))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { remove, rename })
    }

    pub fn removes(&self, name: &str) -> bool {
        self.remove.as_ref().is_some_and(|re| re.is_match(name))
    }

    pub fn rename(&self, name: &str) -> String {
        self.rename
            .iter()
            .fold(name.to_string(), |acc, (re, to)| {
                re.replace_all(&acc, to.as_str()).into_owned()
            })
    }
}

/// Run every step over `proxies`, in place.
pub fn normalize(proxies: &mut Vec<Proxy>, rules: &NameRules) {
    for p in proxies.iter_mut() {
        if let Some(tag) = p.sub_name.as_deref() {
            p.name = format!("{} {}", tag.trim(), p.name.trim());
        }
    }

    let before = proxies.len();
    proxies.retain(|p| !rules.removes(&p.name));
    if proxies.len() != before {
        debug!(removed = before - proxies.len(), "proxies dropped by removal filter");
    }

    for p in proxies.iter_mut() {
        let renamed = rules.rename(&p.name);
        let tagged = region::tag(&renamed);
        let trimmed = tagged.trim();
        p.name = if trimmed.is_empty() {
            p.endpoint().unwrap_or_else(|| p.kind.clone())
        } else {
            trimmed.to_string()
        };
    }

    dedup(proxies);
}

/// `X, X, X` → `X, X 1, X 2`. A suffixed candidate that collides with a name
/// already in use keeps counting.
pub fn dedup(proxies: &mut [Proxy]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::with_capacity(proxies.len());
    for p in proxies.iter_mut() {
        let count = counts.entry(p.name.clone()).or_insert(0);
        if *count > 0 || used.contains(&p.name) {
            let mut candidate = format!("{} {}", p.name, (*count).max(1));
            *count = (*count).max(1);
            while used.contains(&candidate) {
                *count += 1;
                candidate = format!("{} {}", p.name, count);
            }
            p.name = candidate;
        }
        *count += 1;
        used.insert(p.name.clone());
    }
}
