use clap::Parser;

use vitrine_rs::cli::{self, Cli};
use vitrine_rs::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = cli::load_and_merge_config(&cli)?;
    init_logger(settings.log.to_logger_config()?)?;
    tracing::debug!(
        base_url = %settings.api.base_url,
        page_size = settings.api.page_size,
        "configuration loaded"
    );

    cli::execute_command(&cli, settings).await?;

    Ok(())
}
