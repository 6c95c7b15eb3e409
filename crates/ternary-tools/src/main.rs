mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    //  Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,ternary_tools=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();

    match args.command {
        cli::Commands::Summary(a) => cli::summary::execute(&args.global, a),
        cli::Commands::Info(a) => cli::info::execute(&args.global, a),
        cli::Commands::Show(a) => cli::show::execute(&args.global, a),
        cli::Commands::Validate(a) => cli::validate::execute(a),
        cli::Commands::Calc(a) => cli::calc::execute(a),
        cli::Commands::Config(c) => cli::config_cmd::execute(c),
    }
}
