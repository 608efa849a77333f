//! Splice the synthetic document into the template.
//!
//! Template groups may list placeholder members, each a whole `<key>` token:
//!
//! | key          | expands to                                         |
//! |--------------|----------------------------------------------------|
//! | `all`        | every synthetic proxy name                         |
//! | `countries`  | every synthetic regional group name                |
//! | two letters  | members of that region's group, nothing if absent  |
//! | anything else| left as written                                    |

use crate::groups::region_group_name;
use crate::model::{ProxyGroup, Subscription};
use crate::region;
use tracing::{debug, warn};

/// `<key>` → `key`; anything else is not a placeholder.
fn placeholder(member: &str) -> Option<&str> {
    member
        .strip_prefix('<')?
        .strip_suffix('>')
        .filter(|k| !k.is_empty() && !k.contains(['<', '>']))
}

fn expand(member: &str, synthetic: &Subscription, out: &mut Vec<String>) {
    let Some(key) = placeholder(member) else {
        out.push(member.to_string());
        return;
    };
    match key {
        "all" => out.extend(synthetic.proxies.iter().map(|p| p.name.clone())),
        "countries" => out.extend(
            synthetic
                .proxy_groups
                .iter()
                .filter(|g| g.is_region)
                .map(|g| g.name.clone()),
        ),
        code if region::code_to_flag(code).is_some() => {
            let Some(r) = region::by_code(code) else {
                warn!(placeholder = member, "unknown region code, expands to nothing");
                return;
            };
            let name = region_group_name(r);
            if let Some(g) = synthetic
                .proxy_groups
                .iter()
                .find(|g| g.is_region && g.name == name)
            {
                out.extend(g.proxies.iter().cloned());
            }
        }
        _ => {
            debug!(placeholder = member, "unknown placeholder left as written");
            out.push(member.to_string());
        }
    }
}

fn expand_group(group: &mut ProxyGroup, synthetic: &Subscription) {
    let members = std::mem::take(&mut group.proxies);
    let mut out = Vec::with_capacity(members.len());
    for m in &members {
        expand(m, synthetic, &mut out);
    }
    group.proxies = out;
}

/// Merge `synthetic` into `template` in place.
pub fn merge(template: &mut Subscription, synthetic: Subscription, ignore_region_groups: bool) {
    for group in template.proxy_groups.iter_mut().filter(|g| !g.is_region) {
        expand_group(group, &synthetic);
    }
    let Subscription {
        proxies,
        proxy_groups,
        ..
    } = synthetic;
    template.proxies.extend(proxies);
    if !ignore_region_groups {
        template
            .proxy_groups
            .extend(proxy_groups.into_iter().filter(|g| g.is_region));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Proxy;

    fn synthetic() -> Subscription {
        let mut s = Subscription::default();
        s.proxies = vec![
            Proxy::new("🇭🇰 A", "ss"),
            Proxy::new("B", "ss"),
            Proxy::new("🇭🇰 C", "ss"),
        ];
        s.proxy_groups = vec![ProxyGroup {
            name: "🇭🇰 HK".into(),
            kind: "select".into(),
            proxies: vec!["🇭🇰 A".into(), "🇭🇰 C".into()],
            is_region: true,
            ..Default::default()
        }];
        s
    }

    fn template(members: &[&str]) -> Subscription {
        let mut t = Subscription::default();
        t.proxies = vec![Proxy::new("own", "http")];
        t.proxy_groups = vec![ProxyGroup {
            name: "Proxy".into(),
            kind: "select".into(),
            proxies: members.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }];
        t
    }

    #[test]
    fn all_placeholder_in_place() {
        let mut t = template(&["<all>", "DIRECT"]);
        merge(&mut t, synthetic(), false);
        assert_eq!(t.proxy_groups[0].proxies, ["🇭🇰 A", "B", "🇭🇰 C", "DIRECT"]);
        assert_eq!(t.proxy_names(), ["own", "🇭🇰 A", "B", "🇭🇰 C"]);
        assert_eq!(t.proxy_groups.len(), 2);
        assert_eq!(t.proxy_groups[1].name, "🇭🇰 HK");
    }

    #[test]
    fn countries_and_codes() {
        let mut t = template(&["<countries>", "<hk>", "<JP>", "REJECT"]);
        merge(&mut t, synthetic(), true);
        assert_eq!(
            t.proxy_groups[0].proxies,
            ["🇭🇰 HK", "🇭🇰 A", "🇭🇰 C", "REJECT"]
        );
        // regional groups not appended
        assert_eq!(t.proxy_groups.len(), 1);
    }

    #[test]
    fn lenient_placeholders() {
        let mut t = template(&["<custom>", "a<all>", "<", "<>", "<ZZ>"]);
        merge(&mut t, synthetic(), false);
        assert_eq!(t.proxy_groups[0].proxies, ["<custom>", "a<all>", "<", "<>"]);
    }

    #[test]
    fn two_char_keys_that_are_not_codes_stay_literal() {
        let mut s = synthetic();
        s.proxy_groups.clear();
        let mut t = template(&["<全部>", "<a1>", "<no>", "DIRECT"]);
        merge(&mut t, s, false);
        // `<no>` is a region code with no group in this build
        assert_eq!(t.proxy_groups[0].proxies, ["<全部>", "<a1>", "DIRECT"]);
    }
}
