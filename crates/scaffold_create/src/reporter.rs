use colored::Colorize;
use std::io::{self, Write};

use crate::create::CreateReport;

pub fn print_create_summary<W: Write>(writer: &mut W, report: &CreateReport) -> io::Result<()> {
    writeln!(
        writer,
        "{} Created {} from {}",
        "✓".green().bold(),
        report.name.bold(),
        report.template.title.cyan()
    )?;
    writeln!(writer, "  Location: {}", report.target.display().to_string().blue())?;

    let pm = report.installed_with.as_deref().unwrap_or("npm");
    writeln!(writer, "\n{}", "Next steps:".bold())?;
    writeln!(writer, "  cd {}", report.name)?;
    if report.installed_with.is_none() {
        writeln!(writer, "  {} install", pm)?;
    }
    writeln!(writer, "  {} run dev", pm)?;

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Template, TemplateSource};
    use std::path::PathBuf;

    fn report(installed_with: Option<&str>) -> CreateReport {
        CreateReport {
            name: "my-app".to_string(),
            target: PathBuf::from("/work/my-app"),
            template: Template {
                id: "local".to_string(),
                title: "Extract from a local project".to_string(),
                source: TemplateSource::Local,
            },
            installed_with: installed_with.map(String::from),
        }
    }

    #[test]
    fn test_next_steps() {
        colored::control::set_override(false);

        let mut out = Vec::new();
        print_create_summary(&mut out, &report(Some("pnpm"))).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Created my-app from Extract from a local project"));
        assert!(text.ends_with("  cd my-app\n  pnpm run dev\n"));

        let mut out = Vec::new();
        print_create_summary(&mut out, &report(None)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("  cd my-app\n  npm install\n  npm run dev\n"));
    }
}
