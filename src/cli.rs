use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "newsyslog")]
#[command(about = "Rotate log files by copy and truncate", long_about = None)]
pub struct Cli {
    /// Report which logs would be rotated without touching them
    #[arg(short, long)]
    pub test: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Root configuration file [default: $NEWSYSLOG_CONFIG or /etc/newsyslog.toml]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["newsyslog"]);
        assert!(!cli.test);
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_flags_and_path() {
        let cli = Cli::parse_from(["newsyslog", "-t", "-v", "--json", "/tmp/n.toml"]);
        assert!(cli.test);
        assert!(cli.verbose);
        assert!(cli.json);
        assert!(!cli.log_json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/n.toml")));
    }
}
