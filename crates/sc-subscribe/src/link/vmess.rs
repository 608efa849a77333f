//! `vmess://base64(json)` in the v2rayN share format.

use super::util::{apply_transport, decode_base64, split_list, Transport};
use super::LinkParser;
use crate::error::LinkError;
use crate::model::Proxy;
use serde_json::{Map, Value as Json};

pub struct Vmess;

/// Fields arrive as strings or numbers depending on the exporter.
fn text(obj: &Map<String, Json>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Json::String(s) if !s.is_empty() => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl LinkParser for Vmess {
    fn schemes(&self) -> &'static [&'static str] {
        &["vmess"]
    }

    fn parse(&self, link: &str) -> Result<Proxy, LinkError> {
        let payload = link.split_once("://").map(|(_, r)| r).unwrap_or(link);
        let bytes = decode_base64(payload)?;
        let json: Json =
            serde_json::from_slice(&bytes).map_err(|e| LinkError::Payload(e.to_string()))?;
        let obj = json
            .as_object()
            .ok_or_else(|| LinkError::Payload("vmess payload is not an object".into()))?;

        let server = text(obj, "add").ok_or(LinkError::Missing("server"))?;
        let port_raw = text(obj, "port").ok_or(LinkError::Missing("port"))?;
        let port: u16 = port_raw
            .parse()
            .map_err(|_| LinkError::Port(port_raw.clone()))?;
        let uuid = text(obj, "id").ok_or(LinkError::Missing("uuid"))?;
        let alter_id: u32 = text(obj, "aid").and_then(|a| a.parse().ok()).unwrap_or(0);
        let name = text(obj, "ps").unwrap_or_else(|| format!("{server}:{port}"));

        let mut proxy = Proxy::new(name, "vmess");
        proxy
            .set("server", server)
            .set("port", port)
            .set("uuid", uuid)
            .set("alterId", alter_id)
            .set("cipher", text(obj, "scy").unwrap_or_else(|| "auto".into()));
        if text(obj, "tls").as_deref() == Some("tls") {
            proxy.set("tls", true);
        }
        proxy
            .set_opt("servername", text(obj, "sni"))
            .set_opt("client-fingerprint", text(obj, "fp"))
            .set_opt("alpn", text(obj, "alpn").map(|a| split_list(&a)));

        let network = text(obj, "net");
        let path = text(obj, "path");
        let host = text(obj, "host");
        apply_transport(
            &mut proxy,
            &Transport {
                network: network.as_deref(),
                path: path.as_deref(),
                host: host.as_deref(),
                service_name: None,
            },
        );
        Ok(proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_yaml::Value;

    fn link(json: &str) -> String {
        format!("vmess://{}", STANDARD.encode(json))
    }

    #[test]
    fn ws_tls_node() {
        let l = link(
            r#"{"v":"2","ps":"US 01","add":"us.example.com","port":"443","id":"b831381d-6324-4d53-ad4f-8cda48b30811","aid":"0","scy":"auto","net":"ws","type":"none","host":"cdn.example.com","path":"/ray","tls":"tls","sni":"us.example.com"}"#,
        );
        let p = Vmess.parse(&l).unwrap();
        assert_eq!(p.name, "US 01");
        assert_eq!(p.get("port"), Some(&Value::from(443u16)));
        assert_eq!(p.get("alterId"), Some(&Value::from(0u32)));
        assert_eq!(p.get("tls"), Some(&Value::from(true)));
        assert_eq!(p.get_str("servername"), Some("us.example.com"));
        assert_eq!(p.get_str("network"), Some("ws"));
        assert_eq!(p.get("ws-opts").unwrap()["path"], Value::from("/ray"));
    }

    #[test]
    fn numeric_port_and_grpc() {
        let l = link(r#"{"add":"1.1.1.1","port":8443,"id":"u","aid":2,"net":"grpc","path":"svc"}"#);
        let p = Vmess.parse(&l).unwrap();
        assert_eq!(p.name, "1.1.1.1:8443");
        assert_eq!(p.get("alterId"), Some(&Value::from(2u32)));
        assert_eq!(
            p.get("grpc-opts").unwrap()["grpc-service-name"],
            Value::from("svc")
        );
        assert!(p.get("tls").is_none());
    }

    #[test]
    fn bad_payloads() {
        assert_eq!(Vmess.parse("vmess://%%%"), Err(LinkError::Base64));
        assert!(matches!(
            Vmess.parse(&link("[1,2]")),
            Err(LinkError::Payload(_))
        ));
        assert_eq!(
            Vmess.parse(&link(r#"{"add":"a","port":"1"}"#)),
            Err(LinkError::Missing("uuid"))
        );
    }
}
