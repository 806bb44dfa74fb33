//! Calendar resource commands

use std::collections::HashMap;
use std::fmt::Write as _;

use clap::{Args, ValueEnum};
use log::warn;
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::{CommandContext, require_confirmation};
use crate::client::ResourcesApi;
use crate::error::{Error, Result, ResultExt};
use crate::models::CalResourceRow;
use crate::output::{self, OutputOptions};
use crate::validation::sanitize_input;

const DELETE_HINTS: &[&str] = &[
    "Resource ID is incorrect",
    "Insufficient permissions",
    "Resource doesn't exist",
];

/// Resource type filter for `cal-resource list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeFilter {
    All,
    Room,
    Equipment,
    /// Anything that is neither a room nor equipment
    Other,
}

impl TypeFilter {
    pub fn matches(self, resource_type: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Room => resource_type == "ROOM",
            TypeFilter::Equipment => resource_type == "EQUIPMENT",
            TypeFilter::Other => !matches!(resource_type, "ROOM" | "EQUIPMENT"),
        }
    }

    fn name(self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Room => "room",
            TypeFilter::Equipment => "equipment",
            TypeFilter::Other => "other",
        }
    }
}

/// Type of a new resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    #[default]
    Room,
    Equipment,
    Other,
}

impl ResourceKind {
    pub fn api_name(self) -> &'static str {
        match self {
            ResourceKind::Room => "ROOM",
            ResourceKind::Equipment => "EQUIPMENT",
            ResourceKind::Other => "OTHER",
        }
    }
}

/// Optional resource fields shared by create and update
#[derive(Debug, Clone, Default, Args)]
pub struct ResourceArgs {
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// e.g. CONFERENCE_ROOM
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Building the resource is in
    #[arg(long, short = 'b')]
    pub building_id: Option<String>,

    /// Floor name or number
    #[arg(long, short = 'f')]
    pub floor: Option<String>,

    #[arg(long, short = 's')]
    pub section: Option<String>,

    /// Seats, for rooms
    #[arg(long)]
    pub capacity: Option<i64>,

    /// Description shown to users in Calendar
    #[arg(long)]
    pub user_description: Option<String>,
}

impl ResourceArgs {
    fn apply(&self, body: &mut Map<String, Value>) {
        let strings = [
            ("resourceDescription", &self.description),
            ("resourceCategory", &self.category),
            ("buildingId", &self.building_id),
            ("floorName", &self.floor),
            ("floorSection", &self.section),
            ("userVisibleDescription", &self.user_description),
        ];
        for (field, value) in strings {
            if let Some(value) = value {
                body.insert(field.to_string(), json!(sanitize_input(value)));
            }
        }
    }
}

/// Insert body for a new resource
pub fn new_resource(id: &str, name: &str, kind: ResourceKind, fields: &ResourceArgs) -> Result<Value> {
    let id = sanitize_input(id);
    let name = sanitize_input(name);
    if id.is_empty() || name.is_empty() {
        return Err(Error::Validation(
            "resource ID and name are required".to_string(),
        ));
    }

    let mut body = Map::new();
    body.insert("resourceId".into(), json!(id));
    body.insert("resourceName".into(), json!(name));
    body.insert("resourceType".into(), json!(kind.api_name()));
    fields.apply(&mut body);
    match fields.capacity {
        Some(capacity) if capacity > 0 => {
            body.insert("capacity".into(), json!(capacity));
        }
        _ => {}
    }
    Ok(Value::Object(body))
}

/// Patch for an existing resource; only given fields are sent
pub fn resource_patch(name: Option<&str>, fields: &ResourceArgs) -> Result<Value> {
    let mut patch = Map::new();
    if let Some(name) = name {
        patch.insert("resourceName".into(), json!(sanitize_input(name)));
    }
    fields.apply(&mut patch);
    if let Some(capacity) = fields.capacity {
        if capacity < 0 {
            return Err(Error::Validation("capacity cannot be negative".to_string()));
        }
        patch.insert("capacity".into(), json!(capacity));
    }

    if patch.is_empty() {
        return Err(Error::Validation(
            "No update fields specified. Use --name, --description, --category, --building-id, --floor, --section, --capacity, or --user-description"
                .to_string(),
        ));
    }
    Ok(Value::Object(patch))
}

/// Run the cal-resource list command
pub async fn list(opts: &GlobalOptions, filter: TypeFilter) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let listing = list_resources(ctx.client.as_ref(), filter).await?;

    let out = ctx.output();
    if listing.total == 0 {
        output::message(out, "No calendar resources found.");
        return Ok(());
    }
    if listing.rows.is_empty() {
        output::message(
            out,
            format!("No calendar resources found matching type: {}", filter.name()),
        );
        return Ok(());
    }
    output::message(out, format!("Found {} calendar resource(s):\n", listing.rows.len()));
    output::print_listing(&listing.resources, &listing.rows, CalResourceRow::HEADERS, out)
}

/// Resources that passed the type filter
#[derive(Debug, Default)]
pub struct ResourceListing {
    /// Count before filtering
    pub total: usize,
    /// Matching API records, untouched
    pub resources: Vec<Value>,
    /// Display rows for the same records, in the same order
    pub rows: Vec<CalResourceRow>,
}

/// All resources matching `filter`, with building names resolved.
///
/// Failing to list buildings only costs the names; the IDs are still shown.
pub async fn list_resources<C>(client: &C, filter: TypeFilter) -> Result<ResourceListing>
where
    C: ResourcesApi + ?Sized,
{
    let buildings: HashMap<String, String> = match client.list_buildings().await {
        Ok(buildings) => buildings
            .iter()
            .filter_map(|b| {
                let id = b.get("buildingId").and_then(Value::as_str)?;
                let name = b.get("buildingName").and_then(Value::as_str).unwrap_or_default();
                Some((id.to_string(), name.to_string()))
            })
            .collect(),
        Err(e) => {
            warn!("Could not retrieve buildings: {}", e);
            HashMap::new()
        }
    };

    let all = client
        .list_calendar_resources()
        .await
        .context("Unable to list calendar resources")?;
    let total = all.len();

    let resources: Vec<Value> = all
        .into_iter()
        .filter(|r| {
            filter.matches(r.get("resourceType").and_then(Value::as_str).unwrap_or_default())
        })
        .collect();
    let rows = resources
        .iter()
        .map(|r| CalResourceRow::new(r, &buildings))
        .collect();
    Ok(ResourceListing {
        total,
        resources,
        rows,
    })
}

/// Run the cal-resource create command
pub async fn create(
    opts: &GlobalOptions,
    id: &str,
    name: &str,
    kind: ResourceKind,
    fields: &ResourceArgs,
) -> Result<()> {
    let body = new_resource(id, name, kind, fields)?;
    let ctx = CommandContext::new(opts).await?;

    let created = ctx
        .client
        .insert_calendar_resource(&body)
        .await
        .context("Unable to create calendar resource")?;
    report(&created, ctx.output(), "Successfully created calendar resource:")
}

/// Run the cal-resource update command
pub async fn update(
    opts: &GlobalOptions,
    id: &str,
    name: Option<&str>,
    fields: &ResourceArgs,
) -> Result<()> {
    let patch = resource_patch(name, fields)?;
    let ctx = CommandContext::new(opts).await?;
    let id = sanitize_input(id);

    let updated = ctx
        .client
        .update_calendar_resource(&id, &patch)
        .await
        .context(format!("Unable to update calendar resource {}", id))?;
    report(&updated, ctx.output(), "Successfully updated calendar resource:")
}

/// Run the cal-resource delete command
pub async fn delete(opts: &GlobalOptions, id: &str, force: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let id = delete_resource(ctx.client.as_ref(), id, force || ctx.settings.assume_yes).await?;
    output::message(
        ctx.output(),
        format!("Successfully deleted calendar resource: {}", id),
    );
    Ok(())
}

pub async fn delete_resource<C>(client: &C, id: &str, confirmed: bool) -> Result<String>
where
    C: ResourcesApi + ?Sized,
{
    let id = sanitize_input(id);
    require_confirmation(confirmed, false, &format!("Deleting calendar resource {}", id))?;
    client
        .delete_calendar_resource(&id)
        .await
        .with_hints(format!("Unable to delete calendar resource {}", id), DELETE_HINTS)?;
    Ok(id)
}

/// Detail block printed after create and update
pub fn render_details(resource: &Value, title: &str) -> String {
    let field = |name: &str| {
        resource
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
    };

    let mut out = format!("{}\n\n", title);
    let _ = writeln!(out, "  Name: {}", field("resourceName"));
    let _ = writeln!(out, "  Email: {}", field("resourceEmail"));
    let _ = writeln!(out, "  ID: {}", field("resourceId"));
    let _ = writeln!(out, "  Type: {}", field("resourceType"));

    let optional = [
        ("Description", "resourceDescription"),
        ("Category", "resourceCategory"),
        ("Building ID", "buildingId"),
        ("Floor", "floorName"),
        ("Floor Section", "floorSection"),
        ("User Visible Description", "userVisibleDescription"),
    ];
    for (label, name) in optional {
        let value = field(name);
        if !value.is_empty() {
            let _ = writeln!(out, "  {}: {}", label, value);
        }
    }
    if let Some(capacity) = resource.get("capacity").and_then(Value::as_i64)
        && capacity > 0
    {
        let _ = writeln!(out, "  Capacity: {}", capacity);
    }
    out
}

fn report(resource: &Value, out: &OutputOptions, title: &str) -> Result<()> {
    match out.format {
        OutputFormat::Plain | OutputFormat::Table => {
            if !out.quiet {
                print!("{}", render_details(resource, title));
            }
            Ok(())
        }
        _ => output::print_one(resource, &[], out),
    }
}
