//! [`Args`] definitions.

use clap::Parser;

/// Scheduled purge of users mentioning a token from an Auth0 tenant.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Perform a single purge immediately and exit, instead of following
    /// the schedule.
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["application"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(!args.once);
    }

    #[test]
    fn once() {
        let args = Args::try_parse_from([
            "application",
            "--config",
            "purge.toml",
            "--once",
        ])
        .unwrap();

        assert_eq!(args.config, "purge.toml");
        assert!(args.once);
    }
}
