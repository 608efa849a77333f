//! subconv — entrypoint
//! - tracing 初始化（stderr）
//! - convert / parse 子命令

mod cli;
mod tracing_init;

use clap::Parser;
use cli::{Args, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_init::init_tracing_once(args.log_level());

    match args.command {
        Commands::Convert(a) => cli::convert::run(a).await,
        Commands::Parse(a) => cli::parse::run(a),
    }
}
