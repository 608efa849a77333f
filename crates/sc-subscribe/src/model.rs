//! Clash document model.
//! Clash 配置文档模型。
//!
//! Only the parts the build pipeline touches are typed: proxies, proxy groups,
//! rules and rule providers. Everything else (ports, DNS, TUN, sniffer, ...)
//! rides along in a flattened [`Mapping`] and is written back untouched.

use crate::de;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One outbound proxy endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Connection parameters, carried verbatim in their original order.
    #[serde(flatten)]
    pub params: Mapping,
    /// Origin subscription tag (the `#tag` suffix of the source identifier).
    #[serde(skip)]
    pub sub_name: Option<String>,
}

impl Proxy {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Append a parameter; `None`/empty values are skipped so link parsers can
    /// feed optional query fields straight in.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let empty = match &value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Sequence(s) => s.is_empty(),
            Value::Mapping(m) => m.is_empty(),
            _ => false,
        };
        if !empty {
            self.params.insert(Value::String(key.to_string()), value);
        }
        self
    }

    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<Value>>) -> &mut Self {
        if let Some(v) = value {
            self.set(key, v);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// `server:port`, used as a display name of last resort.
    pub fn endpoint(&self) -> Option<String> {
        let server = self.get_str("server")?;
        let port = match self.get("port")? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => return None,
        };
        Some(format!("{server}:{port}"))
    }
}

/// A named selection policy over proxy (or group) names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyGroup {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "de::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub proxies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,
    /// Template-authored extras (`use`, `filter`, `icon`, ...).
    #[serde(flatten)]
    pub extra: Mapping,
    /// Auto-generated per-region group (never read from or written to YAML).
    #[serde(skip)]
    pub is_region: bool,
}

impl ProxyGroup {
    pub fn size(&self) -> usize {
        self.proxies.len()
    }
}

/// External rule-set reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleProvider {
    #[serde(rename = "type", default = "default_provider_type")]
    pub kind: String,
    #[serde(default)]
    pub behavior: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(flatten)]
    pub extra: Mapping,
}

fn default_provider_type() -> String {
    "http".to_string()
}

/// Root Clash document: the template on the way in, the result on the way out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Fields this crate never interprets.
    #[serde(flatten)]
    pub extra: Mapping,
    #[serde(
        default,
        deserialize_with = "de::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub proxies: Vec<Proxy>,
    #[serde(
        rename = "proxy-groups",
        default,
        deserialize_with = "de::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub proxy_groups: Vec<ProxyGroup>,
    #[serde(
        rename = "rule-providers",
        default,
        deserialize_with = "de::null_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub rule_providers: BTreeMap<String, RuleProvider>,
    #[serde(
        default,
        deserialize_with = "de::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub rules: Vec<String>,
}

impl Subscription {
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn proxy_names(&self) -> Vec<String> {
        self.proxies.iter().map(|p| p.name.clone()).collect()
    }
}

/// Output dialect: vanilla Clash or Clash.Meta (mihomo).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Clash,
    #[default]
    #[serde(alias = "clashmeta", alias = "mihomo")]
    Meta,
}

impl Dialect {
    /// Proxy `type` values the dialect can run.
    pub fn supports(self, kind: &str) -> bool {
        const CLASH: &[&str] = &["ss", "ssr", "vmess", "trojan", "socks5", "http", "snell"];
        const META_ONLY: &[&str] = &["vless", "hysteria", "hysteria2", "tuic", "wireguard"];
        match self {
            Self::Clash => CLASH.contains(&kind),
            Self::Meta => CLASH.contains(&kind) || META_ONLY.contains(&kind),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clash => "clash",
            Self::Meta => "meta",
        })
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clash" => Ok(Self::Clash),
            "meta" | "clashmeta" | "mihomo" => Ok(Self::Meta),
            other => Err(format!("unknown dialect: {other}")),
        }
    }
}
