pub mod convert;
pub mod parse;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "subconv", version)]
#[command(about = "Subscription to Clash converter", long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a Clash configuration from subscriptions and a template
    Convert(convert::ConvertArgs),
    /// 解析单个订阅源并输出节点列表
    Parse(parse::ParseArgs),
}

/// Serialization for documents written by the CLI.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    pub fn render<T: serde::Serialize>(self, value: &T) -> anyhow::Result<String> {
        Ok(match self {
            Format::Yaml => serde_yaml::to_string(value)?,
            Format::Json => serde_json::to_string_pretty(value)? + "\n",
        })
    }
}
