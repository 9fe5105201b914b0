use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use carbon_listener::args::Args;
use carbon_listener::constants::timeout::STATS_INTERVAL;
use carbon_listener::logging::init_logging;
use carbon_listener::runtime::{
    RuntimeConfig, format_stats, log_config, shutdown_signal, spawn_datapoint_logger,
    spawn_stats_reporter,
};
use carbon_listener::{CarbonListener, ChannelSink, Config, load_config_with_fallback};

fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = load_config_with_fallback(&args.config)?;
    args.apply_to(&mut config);
    config.validate()?;

    init_logging(config.logging.file.as_deref());
    log_config(&config, &source);

    let rt = RuntimeConfig::from_args(args.threads).build_runtime()?;
    rt.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    let (sink, datapoints) = ChannelSink::new(config.sink.name.clone(), config.sink.capacity);
    let drained = spawn_datapoint_logger(datapoints);

    let listener = Arc::new(CarbonListener::load(&sink, &config.listener)?);
    info!(
        "Carbon listener {} accepting on {}/{}",
        listener.name(),
        listener.protocol(),
        listener.local_addr()
    );
    let reporter = spawn_stats_reporter(&listener, STATS_INTERVAL);

    shutdown_signal().await;
    info!("Shutdown signal received, closing listener");

    reporter.abort();
    listener.close().await?;
    info!("Final stats: {}", format_stats(&listener));

    // Open sessions still hold senders; stop waiting on them here
    drop(sink);
    drained.abort();

    Ok(())
}
