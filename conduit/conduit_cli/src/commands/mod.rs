//! Subcommand implementations.

pub mod check;
pub mod demo;

use anyhow::{bail, Context, Result};
use conduit_pool::PoolConfig;
use std::path::PathBuf;

/// Pool settings given on the command line
#[derive(Debug, Default, Clone, clap::Args)]
pub struct PoolArgs {
    /// TOML file with pool settings
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Address of the backing service (host:port)
    #[clap(long)]
    pub endpoint: Option<String>,

    /// User name presented to the service
    #[clap(long)]
    pub user: Option<String>,

    /// Password presented to the service
    #[clap(long)]
    pub password: Option<String>,

    /// Number of connections opened up front
    #[clap(long)]
    pub initial: Option<usize>,

    /// Maximum number of checked-out connections
    #[clap(long)]
    pub max: Option<usize>,
}

impl PoolArgs {
    /// Resolve the effective configuration: file first, then flag overrides
    pub fn resolve(&self) -> Result<PoolConfig> {
        let mut config = match (&self.config, &self.endpoint) {
            (Some(path), _) => PoolConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            (None, Some(endpoint)) => PoolConfig::new(endpoint.clone()),
            (None, None) => bail!("either --config or --endpoint is required"),
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(initial) = self.initial {
            config.initial_size = initial;
        }
        if let Some(max) = self.max {
            config.max_size = max;
        }

        config.validate()?;
        Ok(config)
    }
}
