use clap::Parser;

use juicebox::cli::{self, Cli, CommandOutput};
use juicebox::db::establish_async_connection_pool;
use juicebox::repositories::Repositories;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match cli::load_and_merge_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = cli::init_logger_from_settings(&settings) {
        eprintln!("Logger initialization error: {:#}", e);
        std::process::exit(2);
    }

    tracing::debug!(
        application = %settings.application.name,
        max_concurrency = settings.database.max_concurrency,
        "Configuration loaded"
    );

    let pool = establish_async_connection_pool(&settings.database).await?;
    let repos = Repositories::new(pool, settings.database.max_concurrency);

    let output = match cli::execute_command(cli.command, &repos).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = ?e, "Command failed");
            eprintln!("Error: {}", cli::describe_error(&e));
            std::process::exit(1);
        }
    };

    if let Some(rendered) = output.render()? {
        println!("{}", rendered);
    }

    if let CommandOutput::Missing(message) = output {
        eprintln!("{}", message);
        std::process::exit(1);
    }

    Ok(())
}
