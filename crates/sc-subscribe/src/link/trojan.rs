//! `trojan://password@host:port?params#name`

use super::util::{
    apply_transport, percent_decode, split_fragment, split_host_port, split_list, split_query,
    Transport,
};
use super::LinkParser;
use crate::error::LinkError;
use crate::model::Proxy;

pub struct Trojan;

impl LinkParser for Trojan {
    fn schemes(&self) -> &'static [&'static str] {
        &["trojan"]
    }

    fn parse(&self, link: &str) -> Result<Proxy, LinkError> {
        let rest = link.split_once("://").map(|(_, r)| r).unwrap_or(link);
        let (body, name) = split_fragment(rest);
        let (body, query) = split_query(body);
        let (password, server) = body.rsplit_once('@').ok_or(LinkError::Missing("password"))?;
        if password.is_empty() {
            return Err(LinkError::Missing("password"));
        }
        let (host, port) = split_host_port(server)?;

        let mut proxy = Proxy::new(name.unwrap_or_else(|| format!("{host}:{port}")), "trojan");
        proxy
            .set("server", host)
            .set("port", port)
            .set("password", percent_decode(password))
            .set_opt("sni", query.get("sni").or_else(|| query.get("peer")))
            .set_opt("alpn", query.get("alpn").map(split_list))
            .set_opt("client-fingerprint", query.get("fp"));
        if query.flag("allowInsecure") || query.flag("insecure") {
            proxy.set("skip-cert-verify", true);
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
