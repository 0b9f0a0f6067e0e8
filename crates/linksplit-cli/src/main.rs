//! linksplit CLI - copy column-A hyperlink targets into a new column

use anyhow::{Context, Result};
use clap::Parser;
use linksplit::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linksplit")]
#[command(
    author,
    version,
    about = "Append a \"Hyperlink\" column holding the link targets of column A",
    long_about = "Reads the hyperlink attached to each column-A cell of the active \
                  worksheet and writes its target URL as plain text into a new column \
                  after the last used one. The workbook is modified in place."
)]
struct Cli {
    /// Spreadsheet file to modify (xlsx, xlsm)
    input: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let report = split_hyperlink_column(&cli.input)
        .with_context(|| format!("Failed to split hyperlinks in '{}'", cli.input.display()))?;

    eprintln!(
        "Wrote {} of {} links to column {} of sheet \"{}\" in '{}'",
        report.links_copied,
        report.rows_scanned,
        report.column_letters(),
        report.sheet,
        cli.input.display()
    );

    Ok(())
}
