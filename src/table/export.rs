//! CSV export of the rows currently shown

use std::path::Path;

use thiserror::Error;

use super::TableView;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Render visible rows as CSV. Fields are written as JSON string literals.
pub fn to_csv(view: &TableView) -> Result<String, ExportError> {
    if view.headers().is_empty() {
        return Err(ExportError::Empty);
    }

    let width = view.headers().len();
    let mut lines = Vec::with_capacity(view.visible_len() + 1);
    lines.push(view.headers().join(","));

    for row in view.visible_rows() {
        let fields = (0..width)
            .map(|i| serde_json::to_string(row.cell(i).unwrap_or("")))
            .collect::<Result<Vec<_>, _>>()?;
        lines.push(fields.join(","));
    }

    Ok(lines.join("\n"))
}

/// Write the CSV to `path`, returning the number of data rows written
pub fn export_csv(view: &TableView, path: &Path) -> Result<usize, ExportError> {
    let csv = to_csv(view)?;
    std::fs::write(path, csv)?;

    let rows = view.visible_len();
    tracing::info!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableView {
        TableView::new(
            vec!["title".into(), "note".into()],
            vec![
                vec!["Buy milk".into(), "".into()],
                vec!["Call \"Bob\"".into(), "a,b".into()],
                vec!["Skip".into()],
            ],
        )
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&sample()).unwrap();
        let expected = [
            "title,note",
            r#""Buy milk","""#,
            r#""Call \"Bob\"","a,b""#,
            r#""Skip","""#,
        ]
        .join("\n");
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_csv_respects_filter_and_order() {
        let mut view = sample();
        view.sort_by(0, false).unwrap();
        view.filter("b");

        let csv = to_csv(&view).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("\"Call"));
        assert!(lines[2].starts_with("\"Buy"));
    }

    #[test]
    fn test_empty_table() {
        assert!(matches!(to_csv(&TableView::default()), Err(ExportError::Empty)));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let rows = export_csv(&sample(), &path).unwrap();
        assert_eq!(rows, 3);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("title,note\n"));
    }
}
