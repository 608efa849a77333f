//! `ssr://base64(host:port:protocol:method:obfs:base64(password)/?params)`

use super::util::{decode_base64_str, Query};
use super::LinkParser;
use crate::error::LinkError;
use crate::model::Proxy;

pub struct ShadowsocksR;

impl LinkParser for ShadowsocksR {
    fn schemes(&self) -> &'static [&'static str] {
        &["ssr"]
    }

    fn parse(&self, link: &str) -> Result<Proxy, LinkError> {
        let payload = link.split_once("://").map(|(_, r)| r).unwrap_or(link);
        let decoded = decode_base64_str(payload)?;
        let (main, params) = match decoded.split_once("/?") {
            Some((m, p)) => (m, Query::parse(p)),
            None => (decoded.trim_end_matches('/'), Query::default()),
        };

        // host may itself contain ':' (IPv6), so peel fields off the right
        let mut fields = main.rsplitn(6, ':');
        let password = fields.next().ok_or(LinkError::Missing("password"))?;
        let obfs = fields.next().ok_or(LinkError::Missing("obfs"))?;
        let method = fields.next().ok_or(LinkError::Missing("cipher"))?;
        let protocol = fields.next().ok_or(LinkError::Missing("protocol"))?;
        let port = fields.next().ok_or(LinkError::Missing("port"))?;
        let host = fields
            .next()
            .filter(|h| !h.is_empty())
            .ok_or(LinkError::Missing("server"))?;
        let port: u16 = port.parse().map_err(|_| LinkError::Port(port.to_string()))?;
        let password = decode_base64_str(password)?;

        let param = |key: &str| params.get(key).and_then(|v| decode_base64_str(v).ok());
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let name = param("remarks").unwrap_or_else(|| format!("{host}:{port}"));

        let mut proxy = Proxy::new(name, "ssr");
        proxy
            .set("server", host)
            .set("port", port)
            .set("cipher", method)
            .set("password", password)
            .set("obfs", obfs)
            .set("protocol", protocol)
            .set_opt("obfs-param", param("obfsparam"))
            .set_opt("protocol-param", param("protoparam"));
        Ok(proxy)
    }
}
