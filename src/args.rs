//! Command-line argument parsing for the listener binary

use clap::Parser;

use crate::config::Config;

/// Accept Carbon plaintext metrics over TCP
#[derive(Parser, Debug, Clone)]
#[command(name = "carbon-listener", version, about)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", env = "CARBON_CONFIG")]
    pub config: String,

    /// Address to listen on (overrides config file)
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Number of worker threads (default: 1, use 0 for CPU cores)
    #[arg(short, long, env = "CARBON_THREADS")]
    pub threads: Option<usize>,

    /// Also write logs to this file (overrides config file)
    #[arg(long, env = "CARBON_LOG_FILE")]
    pub log_file: Option<String>,
}

impl Args {
    /// Apply command-line overrides on top of a loaded config
    ///
    /// Command-line values win over both the file and `CARBON_*` overrides.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(listen) = &self.listen {
            config.listener.listen_addr = listen.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}
