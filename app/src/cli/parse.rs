//! `subconv parse`: show what a single source decodes to.

use super::Format;
use anyhow::{Context, Result};
use clap::Parser;
use sc_subscribe::normalize::{normalize, NameRules};
use sc_subscribe::source::parse_source;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
pub struct ParseArgs {
    /// Source file, or `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: PathBuf,

    /// Origin tag prefixed to every name
    #[arg(long)]
    pub tag: Option<String>,

    /// Apply name normalization (prefix, flags, de-duplication)
    #[arg(long)]
    pub normalize: bool,

    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,
}

#[derive(Serialize)]
struct Parsed<'a> {
    proxies: &'a [sc_subscribe::Proxy],
}

pub fn run(args: ParseArgs) -> Result<()> {
    let data = if args.input.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        std::fs::read(&args.input).with_context(|| format!("read {}", args.input.display()))?
    };
    let source = match &args.tag {
        Some(tag) => format!("{}#{tag}", args.input.display()),
        None => args.input.display().to_string(),
    };
    let mut proxies = parse_source(&source, &data)?;
    let tag = args.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());
    for p in &mut proxies {
        p.sub_name = tag.map(String::from);
    }
    if args.normalize {
        normalize(&mut proxies, &NameRules::default());
    }
    print!("{}", args.format.render(&Parsed { proxies: &proxies })?);
    Ok(())
}
