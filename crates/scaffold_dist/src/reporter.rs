use colored::Colorize;
use log::debug;
use std::io::{self, Write};

use crate::workflow::DistReport;

pub fn print_dist_summary<W: Write>(writer: &mut W, report: &DistReport) -> io::Result<()> {
    debug!("Printing dist summary");
    let result = &report.result;

    if !report.warnings.is_empty() {
        writeln!(writer, "{} {} warning(s)", "⚠".yellow().bold(), report.warnings.len())?;
        for (idx, warning) in report.warnings.iter().enumerate() {
            let prefix = if idx == report.warnings.len() - 1 { "└──" } else { "├──" };
            writeln!(writer, "{}  {}", prefix.dimmed(), warning)?;
        }
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "{} Extracted {} file(s) into {}",
        "✓".green().bold(),
        result.emitted_count.to_string().cyan(),
        report.out_dir.display().to_string().blue()
    )?;
    writeln!(writer, "  Entry: {}", result.entry_output_name.bold())?;

    if result.external_dependencies.is_empty() {
        writeln!(writer, "  No external dependencies")?;
    } else {
        writeln!(writer, "  External dependencies:")?;
        for (package, version) in &result.external_dependencies {
            let version = if version.is_empty() { "(undeclared)".yellow() } else { version.dimmed() };
            writeln!(writer, "    {} {}", package, version)?;
        }
    }
    writeln!(writer, "  Manifest: {}", report.manifest_path.display())?;

    writer.flush()?;
    Ok(())
}
