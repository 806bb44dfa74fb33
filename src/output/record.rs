//! Records and row resolution
//!
//! A record exposes its fields as `(name, text)` pairs in serialization
//! order. Names are the serde names, so a `#[serde(rename_all = "camelCase")]`
//! row struct and a raw API object resolve against the same headers.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::FormatError;

/// Field view of one record
#[derive(Debug, Clone, PartialEq)]
pub enum Fields {
    /// Structured record or key/value map, in field order
    Named(Vec<(String, String)>),
    /// Anything else, stringified as a whole
    Scalar(String),
}

/// Something the formatter can present.
///
/// The default `fields` goes through `serde_json`, so implementing the trait
/// for a `Serialize` type is a one-line `impl Record for MyRow {}`.
pub trait Record: Serialize {
    fn fields(&self) -> Result<Fields, FormatError> {
        Ok(match serde_json::to_value(self)? {
            Value::Object(map) => Fields::Named(
                map.into_iter()
                    .map(|(name, value)| (name, cell_text(&value)))
                    .collect(),
            ),
            other => Fields::Scalar(cell_text(&other)),
        })
    }
}

impl Record for Value {}

impl Record for String {}

/// Text for one cell: strings unquoted, null empty, nested values as compact JSON
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Header/field matching ignores case, spaces and underscores
fn match_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve one record into cells, one per header.
///
/// Unmatched headers give empty cells. A scalar record is a single-cell row
/// regardless of the headers.
pub fn resolve_row(fields: &Fields, headers: &[&str]) -> Vec<String> {
    match fields {
        Fields::Scalar(text) => vec![text.clone()],
        Fields::Named(pairs) => {
            let by_name: HashMap<String, &str> = pairs
                .iter()
                .map(|(name, value)| (match_key(name), value.as_str()))
                .collect();
            headers
                .iter()
                .map(|header| {
                    by_name
                        .get(&match_key(header))
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        name: String,
        inactive_members: usize,
        org_unit_path: Option<String>,
    }

    impl Record for Row {}

    #[test]
    fn test_struct_fields_keep_declaration_order() {
        let row = Row {
            name: "Eng".to_string(),
            inactive_members: 2,
            org_unit_path: None,
        };
        let fields = row.fields().unwrap();
        assert_eq!(
            fields,
            Fields::Named(vec![
                ("name".to_string(), "Eng".to_string()),
                ("inactiveMembers".to_string(), "2".to_string()),
                ("orgUnitPath".to_string(), String::new()),
            ])
        );
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let row = Row {
            name: "Eng".to_string(),
            inactive_members: 2,
            org_unit_path: Some("/".to_string()),
        };
        let cells = resolve_row(
            &row.fields().unwrap(),
            &["Name", "InactiveMembers", "OrgUnitPath", "Missing"],
        );
        assert_eq!(cells, vec!["Eng", "2", "/", ""]);
    }

    #[test]
    fn test_map_record_and_spaced_headers() {
        let record = json!({"ipAddress": "10.0.0.1", "admin": true, "tags": ["a", "b"]});
        let cells = resolve_row(&record.fields().unwrap(), &["IP Address", "Admin", "Tags"]);
        assert_eq!(cells, vec!["10.0.0.1", "true", r#"["a","b"]"#]);
    }

    #[test]
    fn test_scalar_record_is_single_cell() {
        let record = json!("just text");
        let fields = record.fields().unwrap();
        assert_eq!(fields, Fields::Scalar("just text".to_string()));
        assert_eq!(resolve_row(&fields, &["Name", "Email"]), vec!["just text"]);
    }
}
