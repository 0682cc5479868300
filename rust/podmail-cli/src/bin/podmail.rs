use anyhow::Result;
use clap::Parser;
use podmail_cli::PodmailCli;
use podmail_notify::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = PodmailCli::parse();
    let config = Config::from_env()?;
    let output = cli.command.run(&config).await?;
    println!("{output}");
    Ok(())
}
