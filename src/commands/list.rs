//! List command implementation
//!
//! Lists cataloged packages with their installer paths, optionally
//! filtered by a case-insensitive substring.

use console::Style;

use std::path::PathBuf;

use crate::catalog::{self, Catalog};
use crate::cli::ListArgs;
use crate::error::Result;
use crate::netshare;

/// Run list command
pub fn run(catalog_file: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let path = catalog::catalog_path(catalog_file);
    let catalog = Catalog::load(&path)?;

    let packages = match args.filter.as_deref() {
        Some(pattern) => catalog.filter(pattern),
        None => catalog.packages.iter().collect(),
    };

    if packages.is_empty() {
        if let Some(pattern) = args.filter {
            println!("No packages matching '{}'.", pattern);
        } else {
            println!("No packages in catalog.");
        }
        return Ok(());
    }

    println!("Cataloged packages ({}):", packages.len());
    println!();
    for package in packages {
        let location = if netshare::is_unc_path(&package.path) {
            Style::new().cyan().apply_to("network")
        } else {
            Style::new().green().apply_to("local")
        };
        println!(
            "  {} [{}]",
            Style::new().bold().yellow().apply_to(&package.name),
            location
        );
        println!("    {}", Style::new().dim().apply_to(&package.path));
    }

    Ok(())
}
