//! Per-build options.
//!
//! Accepted from YAML or JSON. Keys are kebab-case; the camelCase and
//! snake_case spellings used by existing web front-ends are accepted too.

use crate::error::BuildError;
use crate::model::Dialect;
use crate::rules::{CustomRule, ProviderRequest};
use crate::sort::GroupSort;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildOptions {
    /// Template location: URL, file path, or inline document
    /// (optionally percent-encoded). `None` selects the built-in template.
    pub template: Option<String>,
    /// Subscription identifiers, each optionally suffixed with `#tag`.
    #[serde(alias = "sub")]
    pub subs: Vec<String>,
    /// Literal share links appended after subscription proxies.
    #[serde(alias = "proxy")]
    pub proxies: Vec<String>,
    /// Names matching this regex are dropped.
    pub remove: Option<String>,
    #[serde(alias = "replaceKeys", alias = "replace_keys")]
    pub replace_keys: Vec<String>,
    #[serde(alias = "replaceTo", alias = "replace_to")]
    pub replace_to: Vec<String>,
    /// `sizeasc|sizedesc|nameasc|namedesc`; anything else sorts by name.
    pub sort: Option<String>,
    #[serde(
        alias = "ignoreCountryGroup",
        alias = "ignore_country_group",
        alias = "ignore-region-groups"
    )]
    pub ignore_country_group: bool,
    pub rules: Vec<CustomRule>,
    #[serde(alias = "ruleProviders", alias = "rule_providers")]
    pub rule_providers: Vec<ProviderRequest>,
    #[serde(alias = "autoTest", alias = "auto_test")]
    pub auto_test: bool,
    pub lazy: bool,
    #[serde(alias = "clashType", alias = "target")]
    pub dialect: Dialect,
    /// Bypass any loader-side cache.
    pub refresh: bool,
}

impl BuildOptions {
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, BuildError> {
        serde_yaml::from_slice(bytes).map_err(|e| BuildError::Options(e.to_string()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, BuildError> {
        serde_json::from_slice(bytes).map_err(|e| BuildError::Options(e.to_string()))
    }

    pub fn group_sort(&self) -> GroupSort {
        self.sort
            .as_deref()
            .map(GroupSort::parse_lenient)
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.subs.iter().all(|s| s.trim().is_empty())
            && self.proxies.iter().all(|p| p.trim().is_empty())
        {
            return Err(BuildError::Options(
                "at least one subscription or proxy link is required".into(),
            ));
        }
        if self.replace_keys.len() != self.replace_to.len() {
            return Err(BuildError::Options(format!(
                "replace keys and targets differ in length ({} vs {})",
                self.replace_keys.len(),
                self.replace_to.len()
            )));
        }
        if let Some(sort) = self.sort.as_deref() {
            if sort.parse::<GroupSort>().is_err() {
                warn!(sort, known = ?GroupSort::KEYS, "unknown sort key, using nameasc");
            }
        }
        if let Some(p) = self.rule_providers.iter().find(|p| p.url.trim().is_empty()) {
            return Err(BuildError::Options(format!(
                "rule provider {:?} has no url",
                p.name
            )));
        }
        Ok(())
    }
}
