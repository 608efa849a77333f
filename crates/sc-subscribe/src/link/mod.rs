//! Share-link parsers (`ss://`, `vmess://`, ...).
//! 分享链接解析。
//!
//! Each scheme lives in its own module behind [`LinkParser`]. The registry is a
//! plain scheme → parser table; adding a scheme means adding a module and one
//! entry in [`LinkRegistry::standard`].

mod hysteria;
mod ss;
mod ssr;
mod trojan;
pub mod util;
mod vless;
mod vmess;

pub use hysteria::{Hysteria, Hysteria2};
pub use ss::Shadowsocks;
pub use ssr::ShadowsocksR;
pub use trojan::Trojan;
pub use vless::Vless;
pub use vmess::Vmess;

use crate::error::LinkError;
use crate::model::Proxy;
use once_cell::sync::Lazy;

/// One share-link grammar.
pub trait LinkParser: Send + Sync {
    /// Lower-case URI schemes handled (without `://`).
    fn schemes(&self) -> &'static [&'static str];

    fn parse(&self, link: &str) -> Result<Proxy, LinkError>;
}

/// Scheme-keyed table of link parsers.
pub struct LinkRegistry {
    parsers: Vec<Box<dyn LinkParser>>,
}

static STANDARD: Lazy<LinkRegistry> = Lazy::new(LinkRegistry::standard);

impl LinkRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// The built-in grammars.
    pub fn standard() -> Self {
        let mut r = Self::empty();
        r.register(Box::new(Shadowsocks));
        r.register(Box::new(ShadowsocksR));
        r.register(Box::new(Vmess));
        r.register(Box::new(Trojan));
        r.register(Box::new(Vless));
        r.register(Box::new(Hysteria));
        r.register(Box::new(Hysteria2));
        r
    }

    /// Shared instance of [`LinkRegistry::standard`].
    pub fn global() -> &'static LinkRegistry {
        &STANDARD
    }

    pub fn register(&mut self, parser: Box<dyn LinkParser>) {
        self.parsers.push(parser);
    }

    fn find(&self, scheme: &str) -> Option<&dyn LinkParser> {
        self.parsers
            .iter()
            .find(|p| p.schemes().contains(&scheme))
            .map(|p| p.as_ref())
    }

    /// Whether the line starts with a recognised `scheme://`.
    pub fn recognizes(&self, line: &str) -> bool {
        scheme_of(line).is_some_and(|s| self.find(&s).is_some())
    }

    pub fn parse(&self, line: &str) -> Result<Proxy, LinkError> {
        let line = line.trim();
        let scheme = scheme_of(line).ok_or_else(|| LinkError::UnknownScheme(preview(line)))?;
        let parser = self
            .find(&scheme)
            .ok_or_else(|| LinkError::UnknownScheme(preview(line)))?;
        parser.parse(line)
    }

    pub fn schemes(&self) -> Vec<&'static str> {
        self.parsers
            .iter()
            .flat_map(|p| p.schemes().iter().copied())
            .collect()
    }
}

fn scheme_of(line: &str) -> Option<String> {
    let (scheme, _) = line.trim().split_once("://")?;
    let ok = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
    ok.then(|| scheme.to_ascii_lowercase())
}

/// Error messages carry at most the first few characters of a line; links
/// embed credentials.
fn preview(line: &str) -> String {
    let head: String = line.chars().take(16).collect();
    if head.len() < line.len() {
        format!("{head}…")
    } else {
        head
    }
}

/// Parse one share link with the built-in grammars.
pub fn parse_link(line: &str) -> Result<Proxy, LinkError> {
    LinkRegistry::global().parse(line)
}
