//! `vless://uuid@host:port?params#name`, including REALITY parameters.

use super::util::{apply_transport, split_fragment, split_host_port, split_list, split_query, Transport};
use super::LinkParser;
use crate::error::LinkError;
use crate::model::Proxy;
use serde_yaml::Mapping;

pub struct Vless;

impl LinkParser for Vless {
    fn schemes(&self) -> &'static [&'static str] {
        &["vless"]
    }

    fn parse(&self, link: &str) -> Result<Proxy, LinkError> {
        let rest = link.split_once("://").map(|(_, r)| r).unwrap_or(link);
        let (body, name) = split_fragment(rest);
        let (body, query) = split_query(body);
        let (uuid, server) = body.rsplit_once('@').ok_or(LinkError::Missing("uuid"))?;
        if uuid.is_empty() {
            return Err(LinkError::Missing("uuid"));
        }
        let (host, port) = split_host_port(server)?;

        let mut proxy = Proxy::new(name.unwrap_or_else(|| format!("{host}:{port}")), "vless");
        proxy
            .set("server", host)
            .set("port", port)
            .set("uuid", uuid)
            .set_opt("flow", query.get("flow"));

        let security = query.get("security").unwrap_or("none");
        if matches!(security, "tls" | "reality") {
            proxy.set("tls", true);
        }
        proxy
            .set_opt("servername", query.get("sni"))
            .set_opt("client-fingerprint", query.get("fp"))
            .set_opt("alpn", query.get("alpn").map(split_list));
        if query.flag("allowInsecure") {
            proxy.set("skip-cert-verify", true);
        }
        if security == "reality" {
            let mut opts = Mapping::new();
            if let Some(pbk) = query.get("pbk") {
                opts.insert("public-key".into(), pbk.into());
            }
            if let Some(sid) = query.get("sid") {
                opts.insert("short-id".into(), sid.into());
            }
            proxy.set("reality-opts", opts);
        }
        apply_transport(
            &mut proxy,
            &Transport {
                network: query.get("type"),
                path: query.get("path"),
                host: query.get("host"),
                service_name: query.get("serviceName"),
            },
        );
        Ok(proxy)
    }
}
