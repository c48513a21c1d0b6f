mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "bigspender")]
#[command(about = "Connect a bank account through Basiq and summarize spending by category")]
struct Cli {
    /// Output format: text, table, json, csv or markdown
    #[arg(long, default_value = "text", global = true)]
    output: String,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user, connect the bank, wait for transactions and summarize them
    Run(Box<commands::run::RunArgs>),
    /// Summarize a saved transaction list without calling the API
    Summarize(commands::summarize::SummarizeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("bigspender={}", level).parse()?)
                .add_directive("basiq_api=warn".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::parse(&cli.output)?;

    match &cli.command {
        Commands::Run(args) => commands::run::run(args.as_ref(), &format).await?,
        Commands::Summarize(args) => commands::summarize::run(args, &format)?,
    }

    Ok(())
}
