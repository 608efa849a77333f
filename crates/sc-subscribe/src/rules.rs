//! Custom rule lines and remote rule providers.
//! 自定义规则与规则集注入。

use crate::error::BuildError;
use crate::model::{RuleProvider, Subscription};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224};

pub const PROVIDER_INTERVAL: u32 = 3600;

/// Rule types whose payload is a regular expression.
const REGEX_RULES: &[&str] = &["DOMAIN-REGEX", "PROCESS-NAME-REGEX", "PROCESS-PATH-REGEX"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    pub rule: String,
    #[serde(default)]
    pub prepend: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub url: String,
    #[serde(default)]
    pub behavior: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub prepend: bool,
}

/// Check one rule line: comma separated, no empty field, regex payloads compile.
pub fn validate_rule(rule: &str) -> Result<(), BuildError> {
    let fields: Vec<&str> = rule.split(',').map(str::trim).collect();
    if rule.trim().is_empty() || fields.iter().any(|f| f.is_empty()) {
        return Err(BuildError::pattern("rule", rule, "empty field"));
    }
    let kind = fields[0].to_ascii_uppercase();
    if REGEX_RULES.contains(&kind.as_str()) {
        let payload = fields
            .get(1)
            .ok_or_else(|| BuildError::pattern("rule", rule, "missing pattern"))?;
        Regex::new(payload).map_err(|e| BuildError::pattern("rule", rule, e))?;
    }
    Ok(())
}

/// Stable provider id: hex SHA-224 of the URL.
pub fn provider_id(url: &str) -> String {
    hex::encode(Sha224::digest(url.as_bytes()))
}

/// Prepends land at the head in input order, appends at the tail in input order.
fn splice(rules: &mut Vec<String>, lines: Vec<(String, bool)>) {
    let (head, tail): (Vec<_>, Vec<_>) = lines.into_iter().partition(|(_, prepend)| *prepend);
    let head: Vec<String> = head.into_iter().map(|(l, _)| l).collect();
    rules.splice(0..0, head);
    rules.extend(tail.into_iter().map(|(l, _)| l));
}

/// Validate and inject literal rules. Nothing is written when any line fails.
pub fn add_rules(doc: &mut Subscription, rules: &[CustomRule]) -> Result<(), BuildError> {
    for r in rules {
        validate_rule(&r.rule)?;
    }
    splice(
        &mut doc.rules,
        rules
            .iter()
            .map(|r| (r.rule.trim().to_string(), r.prepend))
            .collect(),
    );
    Ok(())
}

/// Register providers and their `RULE-SET` lines.
pub fn add_providers(doc: &mut Subscription, providers: &[ProviderRequest]) {
    let mut lines = Vec::with_capacity(providers.len());
    for req in providers {
        let id = provider_id(&req.url);
        let key = if req.name.is_empty() {
            id.clone()
        } else {
            req.name.clone()
        };
        doc.rule_providers.insert(
            key.clone(),
            RuleProvider {
                kind: "http".into(),
                behavior: req.behavior.clone(),
                url: req.url.clone(),
                path: format!("./{id}.yaml"),
                interval: Some(PROVIDER_INTERVAL),
                extra: Default::default(),
            },
        );
        lines.push((format!("RULE-SET,{key},{}", req.group), req.prepend));
    }
    splice(&mut doc.rules, lines);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(r: &str, prepend: bool) -> CustomRule {
        CustomRule {
            rule: r.into(),
            prepend,
        }
    }

    #[test]
    fn prepend_keeps_input_order() {
        let mut doc = Subscription::default();
        doc.rules = vec!["MATCH,Proxy".into()];
        add_rules(
            &mut doc,
            &[
                rule("DOMAIN,a.com,DIRECT", true),
                rule("DOMAIN,z.com,DIRECT", false),
                rule("DOMAIN,b.com,DIRECT", true),
            ],
        )
        .unwrap();
        assert_eq!(
            doc.rules,
            [
                "DOMAIN,a.com,DIRECT",
                "DOMAIN,b.com,DIRECT",
                "MATCH,Proxy",
                "DOMAIN,z.com,DIRECT"
            ]
        );
    }

    #[test]
    fn invalid_rules_abort() {
        let mut doc = Subscription::default();
        let err = add_rules(
            &mut doc,
            &[rule("DOMAIN,ok.com,DIRECT", true), rule("DOMAIN,,DIRECT", false)],
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Pattern { field: "rule", .. }));
        assert!(doc.rules.is_empty());

        assert!(validate_rule("DOMAIN-REGEX,^(ab,Proxy").is_err());
        assert!(validate_rule("DOMAIN-REGEX,^ab$,Proxy").is_ok());
        assert!(validate_rule("   ").is_err());
    }

    #[test]
    fn provider_id_is_stable() {
        let a = provider_id("https://example.com/list.yaml");
        assert_eq!(a, provider_id("https://example.com/list.yaml"));
        assert_eq!(a.len(), 56);
        assert_ne!(a, provider_id("https://example.com/other.yaml"));
    }

    #[test]
    fn provider_injection() {
        let mut doc = Subscription::default();
        doc.rules = vec!["MATCH,Proxy".into()];
        let url = "https://example.com/ads.yaml";
        add_providers(
            &mut doc,
            &[
                ProviderRequest {
                    url: url.into(),
                    behavior: "domain".into(),
                    name: "ads".into(),
                    group: "REJECT".into(),
                    prepend: true,
                },
                ProviderRequest {
                    url: "https://example.com/cn.yaml".into(),
                    behavior: "ipcidr".into(),
                    name: String::new(),
                    group: "DIRECT".into(),
                    prepend: false,
                },
            ],
        );
        let p = &doc.rule_providers["ads"];
        assert_eq!(p.kind, "http");
        assert_eq!(p.path, format!("./{}.yaml", provider_id(url)));
        assert_eq!(p.interval, Some(3600));
        let cn = provider_id("https://example.com/cn.yaml");
        assert!(doc.rule_providers.contains_key(&cn));
        assert_eq!(doc.rules[0], "RULE-SET,ads,REJECT");
        assert_eq!(doc.rules[2], format!("RULE-SET,{cn},DIRECT"));
    }
}
