use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sc_subscribe::pipeline::LoadError;
use sc_subscribe::rules::{CustomRule, ProviderRequest};
use sc_subscribe::{build, BuildError, BuildOptions, Dialect, SourceLoader, Subscription};
use std::collections::HashMap;

const TEMPLATE: &str = r#"
mixed-port: 7890
dns:
  enable: true
proxy-groups:
  - name: Proxy
    type: select
    proxies:
      - <all>
      - DIRECT
  - name: Region
    type: select
    proxies:
      - <countries>
  - name: HK only
    type: select
    proxies:
      - <hk>
rules:
  - MATCH,Proxy
"#;

struct Fixture(HashMap<String, Vec<u8>>);

impl Fixture {
    fn new() -> Self {
        let mut m = HashMap::new();
        m.insert("tpl".to_string(), TEMPLATE.as_bytes().to_vec());
        Self(m)
    }

    fn with(mut self, loc: &str, body: impl Into<Vec<u8>>) -> Self {
        self.0.insert(loc.to_string(), body.into());
        self
    }
}

impl SourceLoader for Fixture {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        self.0
            .get(location)
            .cloned()
            .ok_or_else(|| format!("no fixture for {location}").into())
    }
}

fn opts(subs: &[&str]) -> BuildOptions {
    BuildOptions {
        template: Some("tpl".into()),
        subs: subs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn group<'a>(doc: &'a Subscription, name: &str) -> &'a [String] {
    &doc.proxy_groups
        .iter()
        .find(|g| g.name == name)
        .unwrap_or_else(|| panic!("group {name} missing"))
        .proxies
}

#[test]
fn base64_subscription_with_tag() {
    let links = "trojan://pw@hk.example.com:443#Hong%20Kong%2001\n\
                 trojan://pw@jp.example.com:443#Japan%2001\n\
                 trojan://pw@x.example.com:443#Node\n\
                 trojan://pw@y.example.com:443#Node\n";
    let loader = Fixture::new().with("https://sub/a", STANDARD.encode(links));
    let doc = build(&opts(&["https://sub/a#MySub"]), &loader).unwrap();

    assert_eq!(
        doc.proxy_names(),
        [
            "🇭🇰 MySub Hong Kong 01",
            "🇯🇵 MySub Japan 01",
            "MySub Node",
            "MySub Node 1"
        ]
    );
    assert_eq!(
        group(&doc, "Proxy"),
        [
            "🇭🇰 MySub Hong Kong 01",
            "🇯🇵 MySub Japan 01",
            "MySub Node",
            "MySub Node 1",
            "DIRECT"
        ]
    );
    // default sort is by name
    assert_eq!(group(&doc, "Region"), ["🇭🇰 HK", "🇯🇵 JP"]);
    assert_eq!(group(&doc, "HK only"), ["🇭🇰 MySub Hong Kong 01"]);
    assert_eq!(group(&doc, "🇯🇵 JP"), ["🇯🇵 MySub Japan 01"]);
    // passthrough survives
    assert!(doc.extra.contains_key("dns"));
}

#[test]
fn clash_document_and_literal_links() {
    let yaml = "proxies:\n  - {name: 'SG 1', type: ss, server: 1.1.1.1, port: 1, cipher: aes-128-gcm, password: x}\n";
    let loader = Fixture::new().with("sub.yaml", yaml);
    let mut o = opts(&["sub.yaml"]);
    o.proxies = vec!["trojan://pw@h:443#SG%201".into()];
    let doc = build(&o, &loader).unwrap();
    assert_eq!(doc.proxy_names(), ["🇸🇬 SG 1", "🇸🇬 SG 1 1"]);
    assert_eq!(group(&doc, "🇸🇬 SG"), ["🇸🇬 SG 1", "🇸🇬 SG 1 1"]);
    assert_eq!(doc.proxies[0].get_str("cipher"), Some("aes-128-gcm"));
}

#[test]
fn clash_dialect_drops_meta_only_types() {
    let links = "vless://uuid@h:443?security=tls#Hong%20Kong\ntrojan://pw@h:443#Hong%20Kong\n";
    let loader = Fixture::new().with("s", links);
    let mut o = opts(&["s"]);
    o.dialect = Dialect::Clash;
    let doc = build(&o, &loader).unwrap();
    assert_eq!(doc.proxy_names(), ["🇭🇰 Hong Kong 1"]);
}

#[test]
fn sizedesc_applies_to_region_groups_only() {
    let links = "trojan://p@h:1#HK%201\ntrojan://p@h:1#JP%201\ntrojan://p@h:1#JP%202\n\
                 trojan://p@h:1#SG%201\ntrojan://p@h:1#SG%202\ntrojan://p@h:1#SG%203\n";
    let loader = Fixture::new().with("s", links);
    let mut o = opts(&["s"]);
    o.sort = Some("sizedesc".into());
    let doc = build(&o, &loader).unwrap();
    let names: Vec<_> = doc.proxy_groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(
        names,
        ["Proxy", "Region", "HK only", "🇸🇬 SG", "🇯🇵 JP", "🇭🇰 HK"]
    );
}

#[test]
fn ignore_country_group_keeps_template_groups() {
    let loader = Fixture::new().with("s", "trojan://p@h:1#HK%201\n");
    let mut o = opts(&["s"]);
    o.ignore_country_group = true;
    let doc = build(&o, &loader).unwrap();
    assert_eq!(doc.proxy_groups.len(), 3);
    // placeholders still expand
    assert_eq!(group(&doc, "Region"), ["🇭🇰 HK"]);
}

#[test]
fn rules_and_providers() {
    let loader = Fixture::new().with("s", "trojan://p@h:1#A\n");
    let mut o = opts(&["s"]);
    o.rules = vec![CustomRule {
        rule: "DOMAIN-SUFFIX,ads.example,REJECT".into(),
        prepend: true,
    }];
    o.rule_providers = vec![ProviderRequest {
        url: "https://rules/cn.yaml".into(),
        behavior: "domain".into(),
        name: "cn".into(),
        group: "DIRECT".into(),
        prepend: false,
    }];
    let doc = build(&o, &loader).unwrap();
    assert_eq!(
        doc.rules,
        ["DOMAIN-SUFFIX,ads.example,REJECT", "MATCH,Proxy", "RULE-SET,cn,DIRECT"]
    );
    let out = doc.to_yaml().unwrap();
    assert!(out.contains("rule-providers:"));
    assert!(out.contains("interval: 3600"));
}

#[test]
fn one_bad_source_fails_the_build() {
    let loader = Fixture::new()
        .with("good", "trojan://p@h:1#A\n")
        .with("bad", "nothing useful here");
    let err = build(&opts(&["good", "bad#B"]), &loader).unwrap_err();
    match err {
        BuildError::Parse { source_id, .. } => assert_eq!(source_id, "bad#B"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn invalid_template_is_reported() {
    let loader = Fixture::new()
        .with("broken", "proxy-groups: 5\n")
        .with("s", "trojan://p@h:1#A\n");
    let mut o = opts(&["s"]);
    o.template = Some("broken".into());
    assert!(matches!(build(&o, &loader), Err(BuildError::Template(_))));
}

#[test]
fn invalid_custom_rule_is_a_pattern_failure() {
    let loader = Fixture::new().with("s", "trojan://p@h:1#A\n");
    let mut o = opts(&["s"]);
    o.rules = vec![CustomRule {
        rule: "DOMAIN-REGEX,(unclosed,Proxy".into(),
        prepend: false,
    }];
    assert!(matches!(build(&o, &loader), Err(BuildError::Pattern { .. })));
}
