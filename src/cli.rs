//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SilentPush - silent installation orchestrator
///
/// Run cataloged installers unattended across a workstation fleet.
#[derive(Parser, Debug)]
#[command(
    name = "silentpush",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Silent installation orchestrator for cataloged Windows installers",
    long_about = "SilentPush runs the installers declared in a JSON catalog unattended: each \
                  package is staged to a local cache, launched with per-product silent \
                  parameters, and retried once under an administrator identity when the \
                  unprivileged attempt is rejected.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  silentpush install\n    \
                  silentpush install \"Google Chrome\" VLC\n    \
                  silentpush install --all --yes\n    \
                  silentpush list chrome\n    \
                  silentpush completions --shell powershell"
)]
pub struct Cli {
    /// Catalog file (defaults to config.json next to the executable)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install packages from the catalog
    Install(InstallArgs),

    /// List cataloged packages
    List(ListArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Pick packages interactively:\n    silentpush install\n\n\
                  Install specific packages:\n    silentpush install \"Google Chrome\" VLC\n\n\
                  Install everything without prompts:\n    silentpush install --all --yes\n\n\
                  Use a different catalog:\n    silentpush install -c \\\\\\\\srv\\\\apps\\\\config.json\n\n\
                  Raise the per-installer timeout:\n    silentpush install --timeout 1200 office")]
pub struct InstallArgs {
    /// Package names to install. If not provided, an interactive picker is shown
    pub packages: Vec<String>,

    /// Install every package in the catalog
    #[arg(long, conflicts_with = "packages")]
    pub all: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Per-installer timeout in seconds for the unprivileged attempt
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Special-install configuration file (defaults to special_config.json)
    #[arg(long, value_name = "FILE")]
    pub special_config: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List all cataloged packages:\n    silentpush list\n\n\
                  Filter by name or path:\n    silentpush list chrome")]
pub struct ListArgs {
    /// Case-insensitive filter on package name or installer path
    pub filter: Option<String>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate PowerShell completions:\n    silentpush completions --shell powershell\n\n\
                  Generate bash completions:\n    silentpush completions --shell bash > ~/.bash_completion.d/silentpush")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_install() {
        let cli = Cli::try_parse_from(["silentpush", "install", "Google Chrome", "VLC"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.packages, vec!["Google Chrome", "VLC"]);
                assert!(!args.all);
                assert!(!args.yes);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_install_no_packages() {
        let cli = Cli::try_parse_from(["silentpush", "install"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert!(args.packages.is_empty());
                assert!(args.timeout.is_none());
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_install_with_options() {
        let cli = Cli::try_parse_from([
            "silentpush",
            "install",
            "--all",
            "--yes",
            "--timeout",
            "1200",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert!(args.all);
                assert!(args.yes);
                assert_eq!(args.timeout, Some(1200));
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_install_all_conflicts_with_packages() {
        assert!(Cli::try_parse_from(["silentpush", "install", "--all", "VLC"]).is_err());
    }

    #[test]
    fn test_cli_parsing_list() {
        let cli = Cli::try_parse_from(["silentpush", "list", "chrome"]).unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.filter, Some("chrome".to_string()));
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["silentpush", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_catalog_option() {
        let cli = Cli::try_parse_from(["silentpush", "-c", "/tmp/config.json", "list"]).unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("/tmp/config.json")));
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["silentpush", "completions", "--shell", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, "bash");
            }
            _ => panic!("Expected Completions command"),
        }
    }
}
