use clap::Parser;
use trustline::cli::{self, Cli, Commands};
use trustline::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::load_config(&cli.config, cli.strict)?;
    init_logging(&config.logging);

    match &cli.command {
        Commands::Evaluate { input, pretty } => cli::run_evaluate(config, input, *pretty),
        Commands::Batch { input, pretty } => cli::run_batch(config, input, *pretty),
        Commands::CheckConfig => cli::run_check_config(&config),
    }
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},trustline=debug", logging.level)));

    // Logs go to stderr so stdout stays parseable JSON.
    let (json_layer, text_layer) = if logging.json {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
