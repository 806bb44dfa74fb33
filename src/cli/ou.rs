//! Organizational unit commands

use std::fmt::Write as _;

use log::debug;
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::{CommandContext, require_confirmation};
use crate::client::{OrgUnitListType, OrgUnitQuery, OrgUnitsApi};
use crate::error::{Error, Result, ResultExt};
use crate::models::OrgUnitRow;
use crate::output::{self, OutputOptions};
use crate::validation::sanitize_input;

const DELETE_HINTS: &[&str] = &[
    "OU contains users (move them first)",
    "OU contains sub-OUs (delete them first)",
    "OU path is incorrect",
];

/// Fields for `ou update`; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct OrgUnitChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent: Option<String>,
    pub block_inheritance: Option<bool>,
}

fn check_path(path: &str) -> Result<String> {
    let path = sanitize_input(path);
    if !path.starts_with('/') {
        return Err(Error::Validation(format!(
            "OU path must start with '/': {}",
            path
        )));
    }
    Ok(path)
}

/// Run the ou list command
pub async fn list(
    opts: &GlobalOptions,
    path: Option<&str>,
    list_type: OrgUnitListType,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let query = OrgUnitQuery {
        org_unit_path: path.map(check_path).transpose()?,
        list_type,
    };

    let units = ctx
        .client
        .list_org_units(&query)
        .await
        .context("Unable to list organizational units")?;
    debug!("Fetched {} organizational units", units.len());

    let out = ctx.output();
    match out.format {
        OutputFormat::Plain => {
            if units.is_empty() {
                output::message(out, "No organizational units found.");
            } else {
                print!("{}", render_tree(&units));
            }
            Ok(())
        }
        _ => {
            let rows: Vec<OrgUnitRow> = units.iter().map(OrgUnitRow::from).collect();
            output::print_many(&rows, OrgUnitRow::HEADERS, out)
        }
    }
}

/// Run the ou create command
pub async fn create(
    opts: &GlobalOptions,
    path: &str,
    description: Option<&str>,
    parent: Option<&str>,
    block_inheritance: bool,
) -> Result<()> {
    let body = new_org_unit(path, description, parent, block_inheritance)?;
    let ctx = CommandContext::new(opts).await?;

    let created = ctx
        .client
        .insert_org_unit(&body)
        .await
        .context("Unable to create organizational unit")?;
    report(&created, ctx.output(), "Successfully created organizational unit:", false)
}

/// Run the ou update command
pub async fn update(opts: &GlobalOptions, path: &str, changes: &OrgUnitChanges) -> Result<()> {
    let path = check_path(path)?;
    let patch = changes.to_patch()?;
    let ctx = CommandContext::new(opts).await?;

    let updated = ctx
        .client
        .update_org_unit(&path, &patch)
        .await
        .context(format!("Unable to update organizational unit {}", path))?;
    report(&updated, ctx.output(), "Successfully updated organizational unit:", true)
}

/// Run the ou delete command
pub async fn delete(opts: &GlobalOptions, path: &str, force: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let path = delete_org_unit(ctx.client.as_ref(), path, force, ctx.settings.assume_yes).await?;
    output::message(
        ctx.output(),
        format!("Successfully deleted organizational unit: {}", path),
    );
    Ok(())
}

/// Delete after confirmation; the OU must be empty.
pub async fn delete_org_unit<C>(
    client: &C,
    path: &str,
    force: bool,
    assume_yes: bool,
) -> Result<String>
where
    C: OrgUnitsApi + ?Sized,
{
    let path = check_path(path)?;
    require_confirmation(
        force,
        assume_yes,
        &format!("Deleting organizational unit {}", path),
    )?;
    client
        .delete_org_unit(&path)
        .await
        .with_hints(format!("Unable to delete organizational unit {}", path), DELETE_HINTS)?;
    Ok(path)
}

/// Insert body for a new OU at `path`.
///
/// The name is the last path segment. Without an explicit parent the parent
/// is the path minus that segment, `/` for a top-level OU.
pub fn new_org_unit(
    path: &str,
    description: Option<&str>,
    parent: Option<&str>,
    block_inheritance: bool,
) -> Result<Value> {
    let path = check_path(path)?;
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let name = segments.last().copied().unwrap_or_default();
    if name.is_empty() {
        return Err(Error::Validation(
            "OU path must name an organizational unit below /".to_string(),
        ));
    }

    let parent = match parent {
        Some(parent) => check_path(parent)?,
        None => format!("/{}", segments[..segments.len() - 1].join("/")),
    };

    let mut body = json!({
        "name": name,
        "parentOrgUnitPath": parent,
        "blockInheritance": block_inheritance,
    });
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        body["description"] = json!(sanitize_input(description));
    }
    Ok(body)
}

impl OrgUnitChanges {
    /// Patch body; at least one field is required
    pub fn to_patch(&self) -> Result<Value> {
        let mut patch = Map::new();
        if let Some(name) = self.name.as_deref().filter(|s| !s.is_empty()) {
            patch.insert("name".into(), json!(sanitize_input(name)));
        }
        if let Some(description) = self.description.as_deref().filter(|s| !s.is_empty()) {
            patch.insert("description".into(), json!(sanitize_input(description)));
        }
        if let Some(parent) = self.parent.as_deref().filter(|s| !s.is_empty()) {
            patch.insert("parentOrgUnitPath".into(), json!(check_path(parent)?));
        }
        if let Some(block) = self.block_inheritance {
            patch.insert("blockInheritance".into(), json!(block));
        }

        if patch.is_empty() {
            return Err(Error::Validation(
                "No update fields specified. Use --name, --description, --parent, or --block-inheritance"
                    .to_string(),
            ));
        }
        Ok(Value::Object(patch))
    }
}

/// Indented listing, two spaces per level
pub fn render_tree(units: &[Value]) -> String {
    let mut out = format!("Found {} organizational unit(s):\n\n", units.len());
    for ou in units {
        let row = OrgUnitRow::from(ou);
        let indent = " ".repeat(row.name.len() - row.name.trim_start().len());

        let _ = writeln!(out, "{}", row.name);
        let _ = writeln!(out, "{}  Path: {}", indent, row.org_unit_path);
        if !row.description.is_empty() {
            let _ = writeln!(out, "{}  Description: {}", indent, row.description);
        }
        if !row.parent_org_unit_path.is_empty() {
            let _ = writeln!(out, "{}  Parent: {}", indent, row.parent_org_unit_path);
        }
        let _ = writeln!(out, "{}  ID: {}", indent, row.org_unit_id);
        if row.block_inheritance {
            let _ = writeln!(out, "{}  Block Inheritance: Yes", indent);
        }
        out.push('\n');
    }
    out
}

fn report(ou: &Value, out: &OutputOptions, title: &str, always_block: bool) -> Result<()> {
    if !matches!(out.format, OutputFormat::Plain | OutputFormat::Table) {
        return output::print_one(ou, &[], out);
    }

    let row = OrgUnitRow::from(ou);
    output::message(out, format!("{}\n", title));
    output::message(out, format!("  Name: {}", row.name.trim_start()));
    output::message(out, format!("  Path: {}", row.org_unit_path));
    if !row.description.is_empty() {
        output::message(out, format!("  Description: {}", row.description));
    }
    output::message(out, format!("  Parent: {}", row.parent_org_unit_path));
    output::message(out, format!("  ID: {}", row.org_unit_id));
    match (row.block_inheritance, always_block) {
        (true, _) => output::message(out, "  Block Inheritance: Yes"),
        (false, true) => output::message(out, "  Block Inheritance: No"),
        (false, false) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWorkspaceClient;

    #[test]
    fn test_new_org_unit_derives_parent() {
        let body = new_org_unit("/Engineering/Platform", None, None, false).unwrap();
        assert_eq!(body["name"], "Platform");
        assert_eq!(body["parentOrgUnitPath"], "/Engineering");
        assert!(body.get("description").is_none());

        let top = new_org_unit("/Sales", Some("Sales team"), None, true).unwrap();
        assert_eq!(top["parentOrgUnitPath"], "/");
        assert_eq!(top["description"], "Sales team");
        assert_eq!(top["blockInheritance"], true);
    }

    #[test]
    fn test_new_org_unit_explicit_parent_and_bad_paths() {
        let body = new_org_unit("/Platform", None, Some("/Engineering"), false).unwrap();
        assert_eq!(body["parentOrgUnitPath"], "/Engineering");

        assert!(new_org_unit("Engineering", None, None, false).is_err());
        assert!(new_org_unit("/", None, None, false).is_err());
    }

    #[test]
    fn test_changes_require_a_field() {
        let err = OrgUnitChanges::default().to_patch().unwrap_err();
        assert!(err.to_string().contains("No update fields specified"));

        let patch = OrgUnitChanges {
            description: Some("New".to_string()),
            block_inheritance: Some(false),
            ..OrgUnitChanges::default()
        }
        .to_patch()
        .unwrap();
        assert_eq!(patch, json!({"description": "New", "blockInheritance": false}));
    }

    #[test]
    fn test_render_tree_indents_by_depth() {
        let tree = render_tree(&[
            json!({"name": "Engineering", "orgUnitPath": "/Engineering", "orgUnitId": "id:1", "parentOrgUnitPath": "/"}),
            json!({"name": "Platform", "orgUnitPath": "/Engineering/Platform", "orgUnitId": "id:2", "blockInheritance": true}),
        ]);

        assert!(tree.starts_with("Found 2 organizational unit(s):\n\n"));
        assert!(tree.contains("Engineering\n  Path: /Engineering\n  Parent: /\n  ID: id:1\n"));
        assert!(tree.contains("  Platform\n    Path: /Engineering/Platform\n"));
        assert!(tree.contains("    Block Inheritance: Yes\n"));
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let client = MockWorkspaceClient::new()
            .with_org_units(vec![json!({"name": "Old", "orgUnitPath": "/Old"})])
            .await;

        assert!(delete_org_unit(&client, "/Old", false, false).await.is_err());
        assert_eq!(client.call_counts().await.mutations, 0);

        let path = delete_org_unit(&client, "/Old", true, false).await.unwrap();
        assert_eq!(path, "/Old");
    }

    #[tokio::test]
    async fn test_delete_failure_hints() {
        let client = MockWorkspaceClient::new();
        let err = delete_org_unit(&client, "/Missing", false, true)
            .await
            .unwrap_err();
        assert_eq!(err.hints(), DELETE_HINTS);
    }
}
