//! `ss://` — SIP002 and the legacy all-base64 form.

use super::util::{decode_base64_str, percent_decode, split_fragment, split_host_port, split_query};
use super::LinkParser;
use crate::error::LinkError;
use crate::model::Proxy;
use serde_yaml::Mapping;

pub struct Shadowsocks;

impl LinkParser for Shadowsocks {
    fn schemes(&self) -> &'static [&'static str] {
        &["ss"]
    }

    fn parse(&self, link: &str) -> Result<Proxy, LinkError> {
        let rest = link.split_once("://").map(|(_, r)| r).unwrap_or(link);
        let (body, name) = split_fragment(rest);
        let (body, query) = split_query(body);
        let body = body.trim_end_matches('/');

        let (userinfo, server) = match body.rsplit_once('@') {
            Some((user, server)) => {
                let user = percent_decode(user);
                let user = if user.contains(':') {
                    user
                } else {
                    decode_base64_str(&user)?
                };
                (user, server.to_string())
            }
            None => {
                // legacy: base64(method:password@host:port)
                let decoded = decode_base64_str(body)?;
                let (user, server) = decoded
                    .rsplit_once('@')
                    .ok_or(LinkError::Missing("server"))?;
                (user.to_string(), server.to_string())
            }
        };

        let (cipher, password) = userinfo
            .split_once(':')
            .ok_or(LinkError::Missing("password"))?;
        if cipher.is_empty() {
            return Err(LinkError::Missing("cipher"));
        }
        let (host, port) = split_host_port(&server)?;

        let mut proxy = Proxy::new(name.unwrap_or_else(|| format!("{host}:{port}")), "ss");
        proxy
            .set("server", host)
            .set("port", port)
            .set("cipher", cipher)
            .set("password", password);
        if let Some(plugin) = query.get("plugin") {
            apply_plugin(&mut proxy, plugin);
        }
        Ok(proxy)
    }
}

/// `plugin=obfs-local;obfs=http;obfs-host=x` → Clash `plugin` + `plugin-opts`.
fn apply_plugin(proxy: &mut Proxy, spec: &str) {
    let mut parts = spec.split(';');
    let name = parts.next().unwrap_or_default();
    let mut opts = Mapping::new();
    let plugin = match name {
        "obfs-local" | "simple-obfs" | "obfs" => {
            for kv in parts {
                match kv.split_once('=') {
                    Some(("obfs", v)) => {
                        opts.insert("mode".into(), v.into());
                    }
                    Some(("obfs-host", v)) => {
                        opts.insert("host".into(), v.into());
                    }
                    _ => {}
                }
            }
            "obfs"
        }
        "v2ray-plugin" => {
            for kv in parts {
                match kv.split_once('=') {
                    Some(("mode", v)) => {
                        opts.insert("mode".into(), v.into());
                    }
                    Some(("host", v)) => {
                        opts.insert("host".into(), v.into());
                    }
                    Some(("path", v)) => {
                        opts.insert("path".into(), v.into());
                    }
                    None if kv == "tls" => {
                        opts.insert("tls".into(), true.into());
                    }
                    _ => {}
                }
            }
            "v2ray-plugin"
        }
        other => other,
    };
    proxy.set("plugin", plugin).set("plugin-opts", opts);
}
