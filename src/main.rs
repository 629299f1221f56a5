//! Attainment CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use attainment::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `serve` installs its own subscriber from the logging config
    if !matches!(cli.command, Commands::Serve(_)) {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let result = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Serve(args) => cli::commands::serve::execute(args, config, cli.json).await,
            Commands::Migrate => cli::commands::migrate::execute(config, cli.json).await,
            Commands::Config => cli::commands::config::execute(config, cli.json),
        },
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        cli::handle_error(err, cli.json);
    }
}
