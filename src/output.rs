//! Report output sinks: stdout, `.txt` or `.csv` files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use tracing::info;

use crate::error::AppError;
use crate::report::{render_rows, render_text, write_csv, RoleEntry};

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bordered text blocks.
    Text,
    /// One row per member.
    Csv,
}

impl OutputFormat {
    /// An explicit format wins; otherwise infer from the file extension, defaulting to text.
    pub fn resolve(explicit: Option<OutputFormat>, output: Option<&Path>) -> Self {
        if let Some(format) = explicit {
            return format;
        }

        match output
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
        {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Text,
        }
    }
}

/// Write the report to `output`, or stdout when no path is given.
pub fn write_report(
    entries: &[RoleEntry],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), AppError> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            emit(entries, format, &mut writer)?;
            writer.flush()?;
            info!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            emit(entries, format, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn emit<W: Write>(entries: &[RoleEntry], format: OutputFormat, writer: &mut W) -> Result<(), AppError> {
    match format {
        OutputFormat::Text => writer.write_all(render_text(entries).as_bytes())?,
        OutputFormat::Csv => write_csv(&render_rows(entries), writer)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::builder::{NOT_APPLICABLE, NOT_SCOPED_TO_AU, TENANT_WIDE_SCOPE};
    use std::fs;

    fn entries() -> Vec<RoleEntry> {
        vec![RoleEntry {
            role_name: "Global Reader".into(),
            role_description: "Can read everything.".into(),
            scope: TENANT_WIDE_SCOPE.into(),
            au_name: NOT_SCOPED_TO_AU.into(),
            au_id: NOT_APPLICABLE.into(),
            members: vec![],
        }]
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(OutputFormat::resolve(None, None), OutputFormat::Text);
        assert_eq!(
            OutputFormat::resolve(None, Some(Path::new("roles.CSV"))),
            OutputFormat::Csv
        );
        assert_eq!(
            OutputFormat::resolve(None, Some(Path::new("roles.txt"))),
            OutputFormat::Text
        );
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Csv), Some(Path::new("roles.txt"))),
            OutputFormat::Csv
        );
    }

    #[test]
    fn test_text_file_uses_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.txt");

        write_report(&entries(), OutputFormat::Text, Some(&path)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Role: Global Reader\r\n"));
        assert!(content.ends_with("No members in AU\r\n"));
        assert!(!content.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.csv");

        write_report(&entries(), OutputFormat::Csv, Some(&path)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("RoleName,"));
        assert!(lines[1].starts_with("Global Reader,"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("roles.txt");

        let result = write_report(&entries(), OutputFormat::Text, Some(&path));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
