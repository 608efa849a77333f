//! Shared pieces of the share-link grammars: base64 with any alphabet or
//! padding, `#fragment` names, `?query` strings and `host:port` splitting.

use crate::error::LinkError;
use crate::model::Proxy;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_yaml::{Mapping, Value};

/// Decode standard or URL-safe base64, padded or not, ignoring whitespace.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, LinkError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let trimmed = cleaned.trim_end_matches('=');
    if trimmed.is_empty() {
        return Err(LinkError::Base64);
    }
    STANDARD_NO_PAD
        .decode(trimmed)
        .or_else(|_| URL_SAFE_NO_PAD.decode(trimmed))
        .map_err(|_| LinkError::Base64)
}

pub fn decode_base64_str(input: &str) -> Result<String, LinkError> {
    let bytes = decode_base64(input)?;
    String::from_utf8(bytes).map_err(|_| LinkError::Base64)
}

/// Percent-decode, falling back to the raw text on malformed escapes.
pub fn percent_decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Split `body#name`; the name is percent-decoded.
pub fn split_fragment(s: &str) -> (&str, Option<String>) {
    match s.rfind('#') {
        Some(idx) => {
            let name = percent_decode(&s[idx + 1..]);
            (&s[..idx], (!name.trim().is_empty()).then_some(name))
        }
        None => (s, None),
    }
}

/// Decoded `?k=v&k2=v2` pairs, order preserved.
#[derive(Debug, Default, Clone)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|kv| !kv.is_empty())
            .map(|kv| match kv.split_once('=') {
                Some((k, v)) => (percent_decode(k), percent_decode(v)),
                None => (percent_decode(kv), String::new()),
            })
            .collect();
        Self(pairs)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1") | Some("true") | Some("True"))
    }
}

/// Split `body?query`.
pub fn split_query(s: &str) -> (&str, Query) {
    match s.split_once('?') {
        Some((body, q)) => (body, Query::parse(q)),
        None => (s, Query::default()),
    }
}

/// Split `host:port`, accepting bracketed IPv6 (`[::1]:443`).
pub fn split_host_port(s: &str) -> Result<(String, u16), LinkError> {
    let s = s.trim().trim_end_matches('/');
    let (host, port) = if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| LinkError::Payload(format!("unterminated IPv6 host in {s:?}")))?;
        let port = tail.strip_prefix(':').ok_or(LinkError::Missing("port"))?;
        (host, port)
    } else {
        s.rsplit_once(':').ok_or(LinkError::Missing("port"))?
    };
    if host.is_empty() {
        return Err(LinkError::Missing("server"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| LinkError::Port(port.to_string()))?;
    Ok((host.to_string(), port))
}

pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

/// Transport options shared by vmess, vless and trojan links.
#[derive(Debug, Default)]
pub struct Transport<'a> {
    pub network: Option<&'a str>,
    pub path: Option<&'a str>,
    pub host: Option<&'a str>,
    pub service_name: Option<&'a str>,
}

/// Write Clash `network` plus the matching `*-opts` block.
pub fn apply_transport(proxy: &mut Proxy, t: &Transport<'_>) {
    let network = match t.network {
        Some(n) if !n.is_empty() && n != "tcp" && n != "none" => n,
        _ => return,
    };
    proxy.set("network", network);
    match network {
        "ws" | "httpupgrade" => {
            let mut opts = Mapping::new();
            if let Some(path) = t.path {
                opts.insert("path".into(), path.into());
            }
            if let Some(host) = t.host {
                let mut headers = Mapping::new();
                headers.insert("Host".into(), host.into());
                opts.insert("headers".into(), Value::Mapping(headers));
            }
            proxy.set("ws-opts", opts);
        }
        "grpc" => {
            let mut opts = Mapping::new();
            if let Some(name) = t.service_name.or(t.path) {
                opts.insert("grpc-service-name".into(), name.into());
            }
            proxy.set("grpc-opts", opts);
        }
        "h2" => {
            let mut opts = Mapping::new();
            if let Some(path) = t.path {
                opts.insert("path".into(), path.into());
            }
            if let Some(host) = t.host {
                opts.insert("host".into(), Value::from(split_list(host)));
            }
            proxy.set("h2-opts", opts);
        }
        "http" => {
            let mut opts = Mapping::new();
            if let Some(path) = t.path {
                opts.insert("path".into(), Value::from(vec![path]));
            }
            if let Some(host) = t.host {
                let mut headers = Mapping::new();
                headers.insert("Host".into(), Value::from(split_list(host)));
                opts.insert("headers".into(), Value::Mapping(headers));
            }
            proxy.set("http-opts", opts);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_variants() {
        assert_eq!(decode_base64_str("dGVzdA==").unwrap(), "test");
        assert_eq!(decode_base64_str("dGVzdA").unwrap(), "test");
        assert_eq!(decode_base64_str("dGVz\ndA==\n").unwrap(), "test");
        // URL-safe alphabet
        assert_eq!(decode_base64("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_base64("not base64!"), Err(LinkError::Base64));
        assert_eq!(decode_base64("==="), Err(LinkError::Base64));
    }

    #[test]
    fn fragment_and_query() {
        let (body, name) = split_fragment("a@b:1?x=1#Hong%20Kong%2001");
        assert_eq!(body, "a@b:1?x=1");
        assert_eq!(name.as_deref(), Some("Hong Kong 01"));
        let (_, q) = split_query(body);
        assert_eq!(q.get("x"), Some("1"));
        assert!(q.flag("x"));
        assert_eq!(q.get("y"), None);
        assert_eq!(split_fragment("a#").1, None);
    }

    #[test]
    fn host_port() {
        assert_eq!(
            split_host_port("example.com:443").unwrap(),
            ("example.com".to_string(), 443)
        );
        assert_eq!(
            split_host_port("[2001:db8::1]:8443/").unwrap(),
            ("2001:db8::1".to_string(), 8443)
        );
        assert_eq!(split_host_port("example.com"), Err(LinkError::Missing("port")));
        assert!(matches!(split_host_port("h:99999"), Err(LinkError::Port(_))));
    }

    #[test]
    fn ws_transport_block() {
        let mut p = Proxy::new("n", "vmess");
        apply_transport(
            &mut p,
            &Transport {
                network: Some("ws"),
                path: Some("/ray"),
                host: Some("cdn.example.com"),
                service_name: None,
            },
        );
        assert_eq!(p.get_str("network"), Some("ws"));
        let opts = p.get("ws-opts").unwrap();
        assert_eq!(opts["path"], Value::from("/ray"));
        assert_eq!(opts["headers"]["Host"], Value::from("cdn.example.com"));
    }
}
