use clap::Parser;
use sweeper_cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli.verbose.log_level_filter().as_str().to_ascii_lowercase();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();
    log::debug!("data dir: {}", cli.data_dir.display());

    sweeper_cli::run(cli).await
}
