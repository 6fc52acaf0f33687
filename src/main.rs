//! SilentPush - silent installation orchestrator
//!
//! Runs the installers declared in a JSON catalog unattended: packages are
//! staged to a local cache, launched with per-product silent parameters,
//! and retried once under an administrator identity when the unprivileged
//! attempt is rejected.

use clap::Parser;

mod cache;
mod catalog;
mod cli;
mod commands;
mod common;
mod credentials;
mod error;
mod launch;
mod netshare;
mod params;
mod reporter;
mod sequencer;
mod special;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.catalog, args),
        Commands::List(args) => commands::list::run(cli.catalog, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
