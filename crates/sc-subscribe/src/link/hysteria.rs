//! `hysteria://` (v1) and `hysteria2://` / `hy2://` links.

use super::util::{split_fragment, split_host_port, split_list, split_query, percent_decode};
use super::LinkParser;
use crate::error::LinkError;
use crate::model::Proxy;

pub struct Hysteria;

impl LinkParser for Hysteria {
    fn schemes(&self) -> &'static [&'static str] {
        &["hysteria"]
    }

    fn parse(&self, link: &str) -> Result<Proxy, LinkError> {
        let rest = link.split_once("://").map(|(_, r)| r).unwrap_or(link);
        let (body, name) = split_fragment(rest);
        let (server, query) = split_query(body);
        let (host, port) = split_host_port(server)?;

        let mut proxy = Proxy::new(
            name.unwrap_or_else(|| format!("{host}:{port}")),
            "hysteria",
        );
        proxy
            .set("server", host)
            .set("port", port)
            .set_opt("auth-str", query.get("auth"))
            .set_opt("protocol", query.get("protocol"))
            .set_opt("sni", query.get("peer").or_else(|| query.get("sni")))
            .set_opt("up", query.get("upmbps"))
            .set_opt("down", query.get("downmbps"))
            .set_opt("alpn", query.get("alpn").map(split_list))
            .set_opt("obfs", query.get("obfsParam").or_else(|| query.get("obfs")));
        if query.flag("insecure") {
            proxy.set("skip-cert-verify", true);
        }
        Ok(proxy)
    }
}

pub struct Hysteria2;

impl LinkParser for Hysteria2 {
    fn schemes(&self) -> &'static [&'static str] {
        &["hysteria2", "hy2"]
    }

    fn parse(&self, link: &str) -> Result<Proxy, LinkError> {
        let rest = link.split_once("://").map(|(_, r)| r).unwrap_or(link);
        let (body, name) = split_fragment(rest);
        let (body, query) = split_query(body);
        let (password, server) = match body.rsplit_once('@') {
            Some((pw, server)) => (Some(percent_decode(pw)), server),
            None => (None, body),
        };
        let (host, port) = split_host_port(server)?;

        let mut proxy = Proxy::new(
            name.unwrap_or_else(|| format!("{host}:{port}")),
            "hysteria2",
        );
        proxy
            .set("server", host)
            .set("port", port)
            .set_opt("password", password)
            .set_opt("sni", query.get("sni"))
            .set_opt("obfs", query.get("obfs"))
            .set_opt("obfs-password", query.get("obfs-password"))
            .set_opt("ports", query.get("mport"));
        if query.flag("insecure") {
            proxy.set("skip-cert-verify", true);
        }
        Ok(proxy)
    }
}
