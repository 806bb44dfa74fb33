//! Table output formatting

use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Render rows as a bordered table with uppercased headers.
///
/// `headers` may be empty (quiet mode). Returns `None` when there is nothing
/// to draw.
pub fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> Option<String> {
    if headers.is_empty() && rows.is_empty() {
        return None;
    }

    let width = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    let mut builder = Builder::default();
    if !headers.is_empty() {
        builder.push_record(headers.iter().map(|h| h.to_uppercase()));
    }
    for mut row in rows {
        // Scalar rows have a single cell
        row.resize(width, String::new());
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    if !headers.is_empty() {
        table.with(Modify::new(Rows::first()).with(Alignment::center()));
    }

    Some(table.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_empty() {
        assert!(render_table(&[], vec![]).is_none());
    }

    #[test]
    fn test_render_table_headers_only() {
        let table = render_table(&["Name"], vec![]).unwrap();
        assert!(table.contains("NAME"));
    }

    #[test]
    fn test_render_table_rows() {
        let table = render_table(
            &["Name", "Email"],
            vec![
                vec!["Ada".to_string(), "ada@example.com".to_string()],
                vec!["Grace".to_string(), String::new()],
            ],
        )
        .unwrap();

        assert!(table.contains("NAME"));
        assert!(table.contains("EMAIL"));
        assert!(table.contains("ada@example.com"));
        assert!(table.contains("Grace"));
        // Rounded style corners
        assert!(table.starts_with('╭'));
    }

    #[test]
    fn test_render_table_without_header() {
        let table = render_table(&[], vec![vec!["x".to_string()]]).unwrap();
        assert!(table.contains('x'));
        assert!(!table.contains("NAME"));
    }
}
