//! Install command implementation
//!
//! Resolves the package selection and session credentials, then runs the
//! installation sequence on a worker thread while this thread renders
//! progress events from the channel. Stdin stays free of installer noise
//! and a slow terminal never stalls an installer.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use console::Style;
use dialoguer::console::Term;
use dialoguer::{Confirm, MultiSelect};

use crate::cache::InstallerCache;
use crate::catalog::{self, Catalog, Package};
use crate::cli::InstallArgs;
use crate::credentials::{self, CredentialRecord};
use crate::error::{Result, SilentPushError};
use crate::params;
use crate::reporter::{ChannelReporter, ConsoleReporter};
use crate::sequencer::{self, SessionContext, Tally};
use crate::special::{self, SpecialConfig};

/// Run install command
pub fn run(catalog_file: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let catalog_path = catalog::catalog_path(catalog_file);
    let catalog = Catalog::load(&catalog_path)?;

    if catalog.is_empty() {
        println!("No packages in catalog.");
        return Ok(());
    }

    let packages = select_packages(&catalog, &args)?;
    if packages.is_empty() {
        println!("Nothing selected.");
        return Ok(());
    }

    let special_path = args
        .special_config
        .unwrap_or_else(|| PathBuf::from(special::DEFAULT_SPECIAL_CONFIG_FILE));
    let special = SpecialConfig::load_or_default(&special_path)?;

    let credentials = if args.yes {
        // Unattended runs assume the invoking identity is already elevated.
        CredentialRecord::elevated(credentials::current_user())
    } else {
        let already_admin = Confirm::new()
            .with_prompt("Is this session already running as a local administrator?")
            .default(false)
            .interact_on(&Term::stderr())?;
        credentials::resolve_interactively(already_admin)?
    };

    if !args.yes && !confirm_plan(&packages)? {
        println!("Aborted.");
        return Ok(());
    }

    let timeout = Duration::from_secs(args.timeout.unwrap_or(params::DEFAULT_TIMEOUT_SECS));
    let tally = run_session(packages, special, credentials, timeout)?;
    print_summary(&tally);

    Ok(())
}

/// Resolve the package selection from arguments or the interactive picker.
fn select_packages(catalog: &Catalog, args: &InstallArgs) -> Result<Vec<Package>> {
    if args.all {
        return Ok(catalog.packages.clone());
    }
    if !args.packages.is_empty() {
        return catalog.resolve_selection(&args.packages);
    }

    let names: Vec<&str> = catalog.packages.iter().map(|p| p.name.as_str()).collect();
    let picked = MultiSelect::new()
        .with_prompt("Select packages to install (space toggles, enter confirms)")
        .items(&names)
        .interact_on(&Term::stderr())?;

    Ok(picked
        .into_iter()
        .map(|index| catalog.packages[index].clone())
        .collect())
}

/// Show the plan and ask for a go-ahead.
fn confirm_plan(packages: &[Package]) -> Result<bool> {
    println!("About to install {} package(s):", packages.len());
    for package in packages {
        println!("  {}", Style::new().bold().apply_to(&package.name));
    }

    Ok(Confirm::new()
        .with_prompt("Proceed?")
        .default(true)
        .interact_on(&Term::stderr())?)
}

/// Run the sequence on a worker thread; render its events here.
fn run_session(
    packages: Vec<Package>,
    special: SpecialConfig,
    credentials: CredentialRecord,
    timeout: Duration,
) -> Result<Tally> {
    let total = packages.len() as u64;
    let (sender, receiver) = mpsc::channel();

    let worker = thread::spawn(move || {
        let reporter = ChannelReporter::new(sender);
        let mut session = SessionContext::new(
            credentials,
            packages,
            special,
            InstallerCache::in_temp(),
            &reporter,
        );
        session.base_timeout = timeout;
        sequencer::run(&session).1
    });

    // The channel closes when the worker drops its reporter.
    let console = ConsoleReporter::new(total);
    for event in receiver {
        console.render(&event);
    }
    console.finish();

    worker.join().map_err(|_| SilentPushError::IoError {
        message: "installation worker thread panicked".to_string(),
    })
}

fn print_summary(tally: &Tally) {
    println!();
    let headline = format!(
        "{} of {} package(s) installed",
        tally.succeeded, tally.total
    );
    if tally.failed == 0 {
        println!("{}", Style::new().green().bold().apply_to(headline));
    } else {
        println!("{}", Style::new().yellow().bold().apply_to(headline));
        println!(
            "{}",
            Style::new()
                .red()
                .apply_to(format!("{} package(s) failed", tally.failed))
        );
    }
}
