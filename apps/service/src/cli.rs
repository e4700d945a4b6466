use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "uppe-sites", version, about = "Track uptime and certificate health of monitored sites")]
pub struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/uppe/sites.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run scheduled uptime and certificate checks until interrupted
    Run,
    /// Register a site to monitor
    Create {
        url: String,
        /// Skip certificate checks even for https urls
        #[arg(long)]
        no_ssl: bool,
    },
    /// Stop monitoring a site and remove it
    Delete { url: String },
    /// Resume checks for a site
    Enable { url: String },
    /// Pause checks for a site
    Disable { url: String },
    /// Show all sites and their health
    List {
        #[arg(long)]
        json: bool,
    },
    /// Check uptime now, for one site or every enabled site
    CheckUptime { url: Option<String> },
    /// Check certificates now, for one site or every enabled site
    CheckCertificate { url: Option<String> },
    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::parse_from(["uppe-sites", "create", "https://a.example", "--no-ssl"]);
        assert_eq!(cli.command, Command::Create { url: "https://a.example".into(), no_ssl: true });
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_global_config_and_optional_url() {
        let cli = Cli::parse_from(["uppe-sites", "check-uptime", "--config", "/tmp/sites.toml"]);
        assert_eq!(cli.command, Command::CheckUptime { url: None });
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sites.toml")));
    }
}
