//! Synthesize the per-build document: dialect-filtered proxies plus one
//! group per detected region.

use crate::model::{Dialect, Proxy, ProxyGroup, Subscription};
use crate::region;
use tracing::debug;

pub const TEST_URL: &str = "http://www.gstatic.com/generate_204";
pub const TEST_INTERVAL: u32 = 300;
pub const TEST_TOLERANCE: u32 = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupOptions {
    pub auto_test: bool,
    pub lazy: bool,
    pub dialect: Dialect,
}

/// Regional group name for a table entry: `🇭🇰 HK`.
pub fn region_group_name(region: &region::Region) -> String {
    format!("{} {}", region.flag, region.code)
}

fn region_group(region: &region::Region, opts: &GroupOptions) -> ProxyGroup {
    let mut g = ProxyGroup {
        name: region_group_name(region),
        is_region: true,
        ..Default::default()
    };
    if opts.auto_test {
        g.kind = "url-test".into();
        g.url = Some(TEST_URL.into());
        g.interval = Some(TEST_INTERVAL);
        g.tolerance = Some(TEST_TOLERANCE);
        g.lazy = Some(opts.lazy);
    } else {
        g.kind = "select".into();
    }
    g
}

/// Build the synthetic document from normalised proxies.
pub fn build_groups(proxies: Vec<Proxy>, opts: &GroupOptions) -> Subscription {
    let mut out = Subscription::default();
    // index into out.proxy_groups, per table flag
    let mut seen: Vec<(&'static str, usize)> = Vec::new();

    for p in proxies {
        if !opts.dialect.supports(&p.kind) {
            debug!(name = %p.name, kind = %p.kind, dialect = %opts.dialect, "proxy type not supported, dropped");
            continue;
        }
        if let Some(r) = region::tagged(&p.name) {
            let idx = match seen.iter().find(|(flag, _)| *flag == r.flag) {
                Some(&(_, idx)) => idx,
                None => {
                    out.proxy_groups.push(region_group(r, opts));
                    seen.push((r.flag, out.proxy_groups.len() - 1));
                    out.proxy_groups.len() - 1
                }
            };
            out.proxy_groups[idx].proxies.push(p.name.clone());
        }
        out.proxies.push(p);
    }
    debug!(
        proxies = out.proxies.len(),
        regions = out.proxy_groups.len(),
        "synthetic document built"
    );
    out
}
