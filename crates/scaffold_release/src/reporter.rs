use colored::Colorize;
use std::io::{self, Write};

use crate::release::ReleaseReport;

pub fn print_release_summary<W: Write>(writer: &mut W, report: &ReleaseReport) -> io::Result<()> {
    let previous = report.previous.as_deref().unwrap_or("none");
    writeln!(
        writer,
        "{} Released {} (was {})",
        "✓".green().bold(),
        report.version.to_string().cyan().bold(),
        previous.dimmed()
    )?;
    writeln!(writer, "  Tag: {}", report.tag)?;
    if report.pushed {
        writeln!(writer, "  Pushed HEAD and {} to origin", report.tag)?;
    } else {
        writeln!(writer, "  {} No git remote configured; nothing was pushed", "⚠".yellow())?;
    }
    if let Some(repo) = &report.repository {
        writeln!(writer, "  Repository: {}", repo.blue())?;
    }

    writer.flush()?;
    Ok(())
}
