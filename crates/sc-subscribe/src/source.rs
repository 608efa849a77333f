//! Turn the raw bytes of one subscription source into proxies.
//!
//! Classification order:
//! 1. a Clash-style document (YAML or JSON mapping with `proxies`), taken verbatim;
//! 2. share-link lines (`ss://`, `vmess://`, ...), every non-blank line must parse;
//! 3. a base64 blob, decoded and classified again (once).
//!
//! Anything else is a parse failure for the whole source.

use crate::error::{BuildError, LinkError};
use crate::link::LinkRegistry;
use crate::model::Proxy;
use serde_yaml::Value;
use tracing::{debug, warn};

/// A subscription identifier split into its fetchable part and origin tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId {
    pub location: String,
    pub tag: Option<String>,
}

impl SourceId {
    /// `https://x/y#MySub` → location `https://x/y`, tag `MySub`.
    pub fn parse(raw: &str) -> Self {
        match raw.rsplit_once('#') {
            Some((location, tag)) => {
                let tag = tag.trim();
                Self {
                    location: location.to_string(),
                    tag: (!tag.is_empty()).then(|| tag.to_string()),
                }
            }
            None => Self {
                location: raw.to_string(),
                tag: None,
            },
        }
    }
}

/// Parse one source's bytes. `source_id` is only used for error reporting.
pub fn parse_source(source_id: &str, data: &[u8]) -> Result<Vec<Proxy>, BuildError> {
    parse_with(LinkRegistry::global(), source_id, data)
}

pub fn parse_with(
    registry: &LinkRegistry,
    source_id: &str,
    data: &[u8],
) -> Result<Vec<Proxy>, BuildError> {
    if let Some(proxies) = classify(registry, source_id, data)? {
        return Ok(proxies);
    }
    let text = String::from_utf8_lossy(data);
    let decoded = crate::link::util::decode_base64_str(text.trim())
        .map_err(|_| BuildError::parse(source_id, "no proxy links found and content is not base64"))?;
    debug!(source = source_id, "source decoded from base64");
    classify(registry, source_id, decoded.as_bytes())?
        .ok_or_else(|| BuildError::parse(source_id, "decoded content contains no proxy links"))
}

/// `Ok(None)` means "not this shape, try the next fallback".
fn classify(
    registry: &LinkRegistry,
    source_id: &str,
    data: &[u8],
) -> Result<Option<Vec<Proxy>>, BuildError> {
    // only a mapping that actually carries `proxies` counts as a document; a
    // link line with ": " in its name would otherwise parse as an empty map
    if let Ok(Value::Mapping(doc)) = serde_yaml::from_slice::<Value>(data) {
        if let Some(list) = doc.get("proxies") {
            let proxies: Vec<Proxy> = match list {
                Value::Null => Vec::new(),
                other => serde_yaml::from_value(other.clone())
                    .map_err(|e| BuildError::parse(source_id, e))?,
            };
            if proxies.is_empty() {
                warn!(source = source_id, "document has no proxies");
            }
            debug!(source = source_id, count = proxies.len(), "structured source");
            return Ok(Some(proxies));
        }
    }

    let text = String::from_utf8_lossy(data);
    if !text.lines().any(|l| registry.recognizes(l)) {
        return Ok(None);
    }
    let proxies = parse_lines(registry, text.lines())
        .map_err(|(line, e)| BuildError::parse(source_id, format!("line {line}: {e}")))?;
    debug!(source = source_id, count = proxies.len(), "link-list source");
    Ok(Some(proxies))
}

/// Parse share links, skipping blank lines. On failure returns the 1-based
/// line number with the cause.
pub fn parse_lines<'a>(
    registry: &LinkRegistry,
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Proxy>, (usize, LinkError)> {
    let mut out = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        out.push(registry.parse(line).map_err(|e| (idx + 1, e))?);
    }
    Ok(out)
}
