//! Subscription → Clash configuration builder.
//! 订阅转换：将多种格式的节点订阅合并为 Clash / Clash.Meta 配置。
//!
//! Pipeline, leaf first:
//! - [`source`] / [`link`]: raw bytes → proxies (Clash YAML, share links, base64);
//! - [`normalize`] with [`region`]: names get origin prefixes, flags, unique suffixes;
//! - [`groups`] and [`sort`]: one group per region;
//! - [`merge`]: template placeholders (`<all>`, `<countries>`, `<hk>`) expanded;
//! - [`rules`]: custom rules and rule providers.
//!
//! [`pipeline::build`] runs it end to end.

mod de;
pub mod error;
pub mod groups;
#[cfg(feature = "subs_http")]
pub mod http;
pub mod link;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod region;
pub mod rules;
pub mod sort;
pub mod source;

pub use error::{BuildError, LinkError};
pub use model::{Dialect, Proxy, ProxyGroup, RuleProvider, Subscription};
pub use options::BuildOptions;
pub use pipeline::{build, FileLoader, SourceLoader};
