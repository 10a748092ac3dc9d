//! CLI definitions

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// PollDaemon - bounded-concurrency endpoint poller
#[derive(Debug, Parser)]
#[command(
    name = "polldaemon",
    about = "Polls a JSON endpoint in batches and captures every response into rotating files",
    version,
    after_help = "Logs are written to: ~/.local/share/polldaemon/logs/polldaemon.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Endpoint URL to poll (overrides config)
    #[arg(long)]
    pub url: Option<String>,

    /// Requests per batch (overrides config)
    #[arg(long)]
    pub count: Option<usize>,

    /// Maximum in-flight requests within a batch (overrides config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Base name for output files (overrides config)
    #[arg(long)]
    pub base: Option<String>,

    /// Directory for output files (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// Apply CLI overrides on top of loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.endpoint.url = url.clone();
        }
        if let Some(count) = self.count {
            config.batch.count = count;
        }
        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }
        if let Some(base) = &self.base {
            config.storage.base = base.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.storage.dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["pd"]);

        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(cli.url.is_none());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["pd", "-c", "/path/to/config.yml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["pd", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_overrides() {
        let cli = Cli::parse_from([
            "pd",
            "--url",
            "https://api.example.com/x",
            "--count",
            "20",
            "--concurrency",
            "4",
            "--base",
            "capture",
            "--output-dir",
            "/tmp/captures",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://api.example.com/x"));
        assert_eq!(cli.count, Some(20));
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.base.as_deref(), Some("capture"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/captures")));
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from(["pd", "--url", "https://api.example.com/x", "--count", "20"]);
        let mut config = Config::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.endpoint.url, "https://api.example.com/x");
        assert_eq!(config.batch.count, 20);
        // Untouched settings keep their values
        assert_eq!(config.batch.concurrency, 2);
        assert_eq!(config.storage.base, "res");
    }

    #[test]
    fn test_apply_no_overrides_leaves_config_alone() {
        let cli = Cli::parse_from(["pd"]);
        let mut config = Config::default();
        let before = config.endpoint.url.clone();

        cli.apply_overrides(&mut config);

        assert_eq!(config.endpoint.url, before);
        assert_eq!(config.batch.count, 10);
    }
}
