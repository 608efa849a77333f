//! `subconv convert`: options file + flags → Clash document.

use super::Format;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use sc_subscribe::rules::CustomRule;
use sc_subscribe::{BuildOptions, Dialect, FileLoader, SourceLoader};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug, Clone, Default)]
pub struct ConvertArgs {
    /// Options file (YAML, or JSON when the extension is `.json`)
    #[arg(long = "options", value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Template: URL, path, or inline document
    #[arg(short = 't', long, env = "SC_TEMPLATE")]
    pub template: Option<String>,

    /// Subscription URL or path, optionally suffixed with `#tag`
    #[arg(short = 's', long = "sub", value_name = "SOURCE")]
    pub subs: Vec<String>,

    /// Literal share link
    #[arg(short = 'p', long = "proxy", value_name = "LINK")]
    pub proxies: Vec<String>,

    /// Drop proxies whose name matches this regex
    #[arg(long)]
    pub remove: Option<String>,

    /// Rename pattern; pairs with the `--replace-to` at the same position
    #[arg(long = "replace-key", value_name = "REGEX")]
    pub replace_keys: Vec<String>,

    #[arg(long = "replace-to", value_name = "TEXT")]
    pub replace_to: Vec<String>,

    /// sizeasc | sizedesc | nameasc | namedesc
    #[arg(long)]
    pub sort: Option<String>,

    /// Do not append per-region groups
    #[arg(long, action = ArgAction::SetTrue)]
    pub ignore_country_group: bool,

    /// Rule appended after the template rules
    #[arg(long = "rule", value_name = "RULE")]
    pub rules: Vec<String>,

    /// Rule inserted before the template rules
    #[arg(long = "prepend-rule", value_name = "RULE")]
    pub prepend_rules: Vec<String>,

    /// Regional groups become url-test groups
    #[arg(long, action = ArgAction::SetTrue)]
    pub auto_test: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    pub lazy: bool,

    /// clash | meta
    #[arg(long)]
    pub dialect: Option<Dialect>,

    /// Bypass caches
    #[arg(long, action = ArgAction::SetTrue)]
    pub refresh: bool,

    /// Base directory for relative local paths
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Parallel fetches for remote sources
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,

    /// Output file; stdout when omitted
    #[arg(short = 'o', long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,
}

fn read_options(path: &Path) -> Result<BuildOptions> {
    let content = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let opts = if is_json {
        BuildOptions::from_json(&content)
    } else {
        BuildOptions::from_yaml(&content)
    };
    opts.with_context(|| format!("parse options: {}", path.display()))
}

/// Options file first, then flags on top. List flags extend, scalars replace.
pub fn resolve_options(args: &ConvertArgs) -> Result<BuildOptions> {
    let mut o = match &args.options {
        Some(path) => read_options(path)?,
        None => BuildOptions::default(),
    };
    if args.template.is_some() {
        o.template = args.template.clone();
    }
    o.subs.extend(args.subs.iter().cloned());
    o.proxies.extend(args.proxies.iter().cloned());
    if args.remove.is_some() {
        o.remove = args.remove.clone();
    }
    o.replace_keys.extend(args.replace_keys.iter().cloned());
    o.replace_to.extend(args.replace_to.iter().cloned());
    if args.sort.is_some() {
        o.sort = args.sort.clone();
    }
    o.ignore_country_group |= args.ignore_country_group;
    o.rules.extend(args.prepend_rules.iter().map(|r| CustomRule {
        rule: r.clone(),
        prepend: true,
    }));
    o.rules.extend(args.rules.iter().map(|r| CustomRule {
        rule: r.clone(),
        prepend: false,
    }));
    o.auto_test |= args.auto_test;
    o.lazy |= args.lazy;
    if let Some(d) = args.dialect {
        o.dialect = d;
    }
    o.refresh |= args.refresh;
    Ok(o)
}

fn local_loader(args: &ConvertArgs) -> FileLoader {
    match &args.base_dir {
        Some(dir) => FileLoader::with_base(dir),
        None => FileLoader::new(),
    }
}

#[cfg(feature = "http")]
async fn loader(args: &ConvertArgs, opts: &BuildOptions) -> Result<Box<dyn SourceLoader>> {
    use sc_subscribe::http;
    let client = http::client(http::DEFAULT_TIMEOUT)?;
    let loader = http::prefetch(opts, client, args.concurrency)
        .await
        .context("fetch remote sources")?;
    Ok(Box::new(loader.with_local(local_loader(args))))
}

#[cfg(not(feature = "http"))]
async fn loader(args: &ConvertArgs, _opts: &BuildOptions) -> Result<Box<dyn SourceLoader>> {
    Ok(Box::new(local_loader(args)))
}

pub async fn run(args: ConvertArgs) -> Result<()> {
    let opts = resolve_options(&args)?;
    opts.validate()?;
    let loader = loader(&args, &opts).await?;
    let doc = sc_subscribe::build(&opts, loader.as_ref())?;
    let rendered = args.format.render(&doc).context("encode document")?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
            }
            fs::write(path, rendered.as_bytes())
                .with_context(|| format!("write {}", path.display()))?;
            info!(
                path = %path.display(),
                proxies = doc.proxies.len(),
                "configuration written"
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_extend_options_file() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(
            &mut f,
            br#"{"subs": ["a#A"], "sort": "sizeasc", "rules": [{"rule": "MATCH,DIRECT"}]}"#,
        )
        .unwrap();
        let args = ConvertArgs {
            options: Some(f.path().to_path_buf()),
            subs: vec!["b".into()],
            sort: Some("namedesc".into()),
            prepend_rules: vec!["DOMAIN,x,REJECT".into()],
            dialect: Some(Dialect::Clash),
            ..Default::default()
        };
        let o = resolve_options(&args).unwrap();
        assert_eq!(o.subs, ["a#A", "b"]);
        assert_eq!(o.sort.as_deref(), Some("namedesc"));
        assert_eq!(o.rules.len(), 2);
        assert!(o.rules[1].prepend);
        assert_eq!(o.dialect, Dialect::Clash);
    }
}
