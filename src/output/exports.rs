use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ExportError, Result};
use crate::providers::{header, project_issue, Issue, Row};

/// Writes issues as CSV: a header line, then one line per issue.
///
/// Every issue is projected before the first byte is written, so a malformed
/// issue leaves `output` untouched. Lines end with CRLF and fields are quoted
/// only when they need to be.
pub fn export_csv(issues: &[Issue], output: impl Write) -> Result<()> {
    let rows = issues
        .iter()
        .map(project_issue)
        .collect::<Result<Vec<Row>>>()?;
    let columns = header(issues);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(output);

    writer.write_record(&columns)?;
    for row in &rows {
        writer.write_record(
            columns
                .iter()
                .map(|column| row.get(column).map_or("", String::as_str)),
        )?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the CSV export to `path`.
///
/// The file is assembled next to its destination and moved into place once
/// complete; on failure any existing file at `path` is left as it was.
pub fn write_csv(path: &Path, issues: &[Issue]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(directory)?;
    export_csv(issues, file.as_file_mut())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| ExportError::Io(e.error))?;

    Ok(())
}
