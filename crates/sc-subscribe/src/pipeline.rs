//! The build pipeline: template + subscriptions + options → one document.
//!
//! Fetching is not done here. Callers hand in a [`SourceLoader`]; the pipeline
//! itself is synchronous and each stage runs to completion before the next.

use crate::error::BuildError;
use crate::groups::{build_groups, GroupOptions};
use crate::link::parse_link;
use crate::merge::merge;
use crate::model::{Dialect, Subscription};
use crate::normalize::{normalize, NameRules};
use crate::options::BuildOptions;
use crate::rules::{add_providers, add_rules, validate_rule};
use crate::sort::sort_groups;
use crate::source::{parse_source, SourceId};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Produces the raw bytes behind a template or subscription location.
pub trait SourceLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

impl<F> SourceLoader for F
where
    F: Fn(&str) -> Result<Vec<u8>, LoadError>,
{
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        self(location)
    }
}

/// Reads locations as local paths (`file://` prefix optional), relative to
/// `base` when set.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    base: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SourceLoader for FileLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        Ok(std::fs::read(self.resolve(location))?)
    }
}

pub const TEMPLATE_META: &str = include_str!("../assets/template_meta.yaml");
pub const TEMPLATE_CLASH: &str = include_str!("../assets/template_clash.yaml");

pub fn builtin_template(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Meta => TEMPLATE_META,
        Dialect::Clash => TEMPLATE_CLASH,
    }
}

/// A template given as a document rather than a location: multi-line text,
/// possibly percent-encoded.
fn inline_template(raw: &str) -> Option<String> {
    let decoded = crate::link::util::percent_decode(raw);
    decoded.contains('\n').then_some(decoded)
}

fn load_template(options: &BuildOptions, loader: &dyn SourceLoader) -> Result<Subscription, BuildError> {
    let bytes = match options.template.as_deref().map(str::trim) {
        None | Some("") => {
            debug!(dialect = %options.dialect, "using built-in template");
            builtin_template(options.dialect).as_bytes().to_vec()
        }
        Some(raw) => match inline_template(raw) {
            Some(doc) => doc.into_bytes(),
            None => loader
                .load(raw)
                .map_err(|e| BuildError::load(format!("template {raw}"), e))?,
        },
    };
    Ok(Subscription::from_yaml(&bytes)?)
}

/// Run the whole pipeline.
#[instrument(skip_all, fields(subs = options.subs.len(), dialect = %options.dialect))]
pub fn build(options: &BuildOptions, loader: &dyn SourceLoader) -> Result<Subscription, BuildError> {
    options.validate()?;
    // user patterns are checked before anything is loaded
    let name_rules = NameRules::compile(
        options.remove.as_deref(),
        &options.replace_keys,
        &options.replace_to,
    )?;
    for r in &options.rules {
        validate_rule(&r.rule)?;
    }

    let mut template = load_template(options, loader)?;

    let mut proxies = Vec::new();
    for raw in options.subs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let id = SourceId::parse(raw);
        let bytes = loader
            .load(&id.location)
            .map_err(|e| BuildError::load(raw, e))?;
        let mut parsed = parse_source(raw, &bytes)?;
        debug!(source = raw, count = parsed.len(), "subscription parsed");
        for p in &mut parsed {
            p.sub_name = id.tag.clone();
        }
        proxies.append(&mut parsed);
    }
    for link in options.proxies.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        proxies.push(parse_link(link).map_err(|e| BuildError::parse("inline proxy", e))?);
    }

    normalize(&mut proxies, &name_rules);
    let mut synthetic = build_groups(
        proxies,
        &GroupOptions {
            auto_test: options.auto_test,
            lazy: options.lazy,
            dialect: options.dialect,
        },
    );
    sort_groups(&mut synthetic.proxy_groups, options.group_sort());
    merge(&mut template, synthetic, options.ignore_country_group);

    add_rules(&mut template, &options.rules)?;
    add_providers(&mut template, &options.rule_providers);

    info!(
        proxies = template.proxies.len(),
        groups = template.proxy_groups.len(),
        rules = template.rules.len(),
        "build finished"
    );
    Ok(template)
}
