//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ExtractorConfig;
use crate::engine::{shutdown_channel, EngineConfig, PaginationEngine, StallPolicy};
use crate::error::{Error, Result};
use crate::exchange::ExchangeRegistry;
use crate::output::{JsonLinesSink, RecordSink};
use crate::partition::enumerate_partitions;
use crate::state::StateManager;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Options for the `run` command, with CLI overrides over the config file
struct RunOptions<'a> {
    output: Option<&'a Path>,
    stall_policy: &'a str,
    max_retries: u32,
    checkpoint_interval: Option<usize>,
    concurrency: Option<usize>,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                output,
                stall_policy,
                max_retries,
                checkpoint_interval,
                concurrency,
            } => {
                self.extract(RunOptions {
                    output: output.as_deref(),
                    stall_policy,
                    max_retries: *max_retries,
                    checkpoint_interval: *checkpoint_interval,
                    concurrency: *concurrency,
                })
                .await
            }
            Commands::Partitions => self.partitions(),
            Commands::State => self.state().await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load configuration from the --config path
    fn load_config(&self) -> Result<ExtractorConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;
        ExtractorConfig::from_file(path)
    }

    /// Load state from the --state path, or run without persistence
    fn load_state(&self) -> Result<StateManager> {
        match &self.cli.state {
            Some(path) => StateManager::from_file(path),
            None => Ok(StateManager::in_memory()),
        }
    }

    /// Extract all configured partitions
    async fn extract(&self, options: RunOptions<'_>) -> Result<()> {
        let config = self.load_config()?;
        let state = self.load_state()?;
        let partitions = enumerate_partitions(&config)?;
        let registry = ExchangeRegistry::from_config(&config)?;

        let sink: Arc<dyn RecordSink> = match options.output {
            Some(path) => Arc::new(JsonLinesSink::create(path)?),
            None => Arc::new(JsonLinesSink::stdout()),
        };

        let engine_config = EngineConfig::new()
            .with_checkpoint_interval(
                options
                    .checkpoint_interval
                    .unwrap_or(config.checkpoint_interval),
            )
            .with_concurrency(options.concurrency.unwrap_or(config.concurrency))
            .with_max_retries(options.max_retries)
            .with_stall_policy(options.stall_policy.parse::<StallPolicy>()?);

        let (controller, shutdown) = shutdown_channel();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, finishing pending checkpoints");
                controller.trigger();
            }
        });

        let engine = PaginationEngine::new(Arc::new(registry), state, sink)
            .with_config(engine_config)
            .with_shutdown(shutdown);

        let stats = engine.run(partitions).await?;

        if stats.has_failures() {
            for (key, e) in &stats.failures {
                error!(partition = %key, error = %e, "partition failed");
            }
            return Err(Error::partition(
                stats.failures[0].0.clone(),
                format!(
                    "{} of {} partitions failed",
                    stats.failures.len(),
                    stats.failures.len() + stats.summaries.len()
                ),
            ));
        }
        Ok(())
    }

    /// List the partitions the configuration expands to
    fn partitions(&self) -> Result<()> {
        let config = self.load_config()?;
        for partition in enumerate_partitions(&config)? {
            println!("{partition}");
        }
        Ok(())
    }

    /// Print the persisted cursor state
    async fn state(&self) -> Result<()> {
        let state = self.load_state()?;
        println!("{}", state.to_json_pretty().await?);
        Ok(())
    }

    /// Validate the configuration file
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let partitions = enumerate_partitions(&config)?;
        println!(
            "config valid: {} exchanges, {} partitions",
            config.exchanges.len(),
            partitions.len()
        );
        Ok(())
    }
}
