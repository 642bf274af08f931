use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "standupbot", about = concat!("standupbot v", env!("CARGO_PKG_VERSION"), " - write your standup post one item at a time"), version)]
pub struct Cli {
    /// Path to config.toml
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// User the console session speaks as
    #[arg(long, default_value = "@me:localhost")]
    pub user: String,

    /// Room the console session speaks in
    #[arg(long, default_value = "!console:localhost")]
    pub room: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["standupbot"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert_eq!(cli.log_level, "info");
        assert!(cli.log_file.is_none());
        assert_eq!(cli.user, "@me:localhost");
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "standupbot",
            "--config",
            "/etc/standupbot.toml",
            "--log-level",
            "debug",
            "--log-file",
            "bot.log",
            "--user",
            "@alice:x",
            "--room",
            "!dm:x",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/standupbot.toml"));
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.log_file, Some(PathBuf::from("bot.log")));
        assert_eq!(cli.user, "@alice:x");
        assert_eq!(cli.room, "!dm:x");
    }
}
