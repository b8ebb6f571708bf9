//! CLI argument definitions.
//!
//! All Clap derive structs for `chillmcp` command-line parsing.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{
    DEFAULT_BOSS_ALERTNESS, DEFAULT_BOSS_ALERTNESS_COOLDOWN, DEFAULT_BREAK_DELAY_SECS,
};
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// `ChillMCP`: an MCP server that lets AI agents take breaks.
#[derive(Parser, Debug)]
#[command(name = "chillmcp", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute. Without one, `chillmcp` serves using the
    /// top-level server flags.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server flags accepted without the `serve` subcommand.
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CHILLMCP_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "CHILLMCP_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout.
    Serve(ServeArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `serve`.
///
/// Numeric settings are parsed as signed integers so out-of-range input
/// reaches validation and exits with a configuration error.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Probability (0-100 percent) that a break raises the boss alert.
    #[arg(
        long = "boss_alertness",
        visible_alias = "boss-alertness",
        default_value_t = DEFAULT_BOSS_ALERTNESS,
        env = "CHILLMCP_BOSS_ALERTNESS",
        allow_negative_numbers = true
    )]
    pub boss_alertness: i64,

    /// Seconds without a new alert rise before the boss alert drops by one.
    #[arg(
        long = "boss_alertness_cooldown",
        visible_alias = "boss-alertness-cooldown",
        default_value_t = DEFAULT_BOSS_ALERTNESS_COOLDOWN,
        env = "CHILLMCP_BOSS_ALERTNESS_COOLDOWN",
        allow_negative_numbers = true
    )]
    pub boss_alertness_cooldown: i64,

    /// Seconds a break is delayed while the boss alert is maxed.
    #[arg(long, default_value_t = DEFAULT_BREAK_DELAY_SECS, env = "CHILLMCP_BREAK_DELAY_SECS")]
    pub break_delay_secs: u64,

    /// Serve a read-only state endpoint on `[host:]port`.
    #[arg(long, env = "CHILLMCP_DASHBOARD")]
    pub dashboard: Option<String>,

    /// Expose Prometheus metrics on 127.0.0.1:<port>.
    #[arg(long, env = "CHILLMCP_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let mut full = vec!["chillmcp", "serve"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Some(Commands::Serve(args)) => args,
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn serve_defaults() {
        let args = serve_args(&[]);
        assert_eq!(args.boss_alertness, 50);
        assert_eq!(args.boss_alertness_cooldown, 300);
        assert_eq!(args.break_delay_secs, 20);
        assert!(args.dashboard.is_none());
        assert!(args.metrics_port.is_none());
    }

    #[test]
    fn underscore_flags() {
        let args = serve_args(&["--boss_alertness", "80", "--boss_alertness_cooldown", "60"]);
        assert_eq!(args.boss_alertness, 80);
        assert_eq!(args.boss_alertness_cooldown, 60);
    }

    #[test]
    fn kebab_aliases() {
        let args = serve_args(&["--boss-alertness", "10", "--boss-alertness-cooldown", "5"]);
        assert_eq!(args.boss_alertness, 10);
        assert_eq!(args.boss_alertness_cooldown, 5);
    }

    #[test]
    fn out_of_range_values_still_parse() {
        let args = serve_args(&["--boss_alertness", "150", "--boss_alertness_cooldown", "-5"]);
        assert_eq!(args.boss_alertness, 150);
        assert_eq!(args.boss_alertness_cooldown, -5);
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let result = Cli::try_parse_from(["chillmcp", "serve", "--boss_alertness", "lots"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chillmcp",
            "serve",
            "-vv",
            "--quiet",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn version_format() {
        let cli = Cli::try_parse_from(["chillmcp", "version", "--format", "json"]).unwrap();
        match cli.command {
            Some(Commands::Version(args)) => assert_eq!(args.format, OutputFormat::Json),
            _ => panic!("expected version"),
        }
    }

    #[test]
    fn serves_without_subcommand() {
        let cli = Cli::try_parse_from([
            "chillmcp",
            "--boss_alertness",
            "80",
            "--boss_alertness_cooldown",
            "60",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.boss_alertness, 80);
        assert_eq!(cli.serve.boss_alertness_cooldown, 60);
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["chillmcp", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
