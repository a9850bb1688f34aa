use clap::{Parser, Subcommand};
use std::time::Duration;

mod commands;
mod tcp;

use commands::demo::DemoOptions;
use commands::PoolArgs;

/// Conduit Command Line Interface
///
/// Drives a bounded connection pool against a TCP endpoint.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log filter, e.g. `debug` or `conduit_pool=trace` (overrides RUST_LOG)
    #[clap(long, global = true)]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire and release pooled connections against an endpoint
    Demo {
        #[clap(flatten)]
        pool: PoolArgs,

        /// Also attempt one acquire past capacity
        #[clap(long)]
        probe_exhaustion: bool,

        /// Connect timeout per connection, in milliseconds
        #[clap(long, default_value_t = 3000)]
        connect_timeout_ms: u64,
    },

    /// Load and validate pool settings
    #[clap(name = "check-config")]
    CheckConfig {
        #[clap(flatten)]
        pool: PoolArgs,
    },
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Demo {
            pool,
            probe_exhaustion,
            connect_timeout_ms,
        } => {
            let config = pool.resolve()?;
            let options = DemoOptions {
                probe_exhaustion,
                connect_timeout: Duration::from_millis(connect_timeout_ms),
            };
            commands::demo::run(&config, &options)?;
        }
        Commands::CheckConfig { pool } => {
            let config = pool.resolve()?;
            commands::check::run(&config);
        }
    }

    Ok(())
}
