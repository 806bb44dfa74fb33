//! Group listing and membership audit

use log::debug;
use serde_json::Value;

use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::client::{GroupsApi, UsersApi, run_bounded};
use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use crate::models::{GroupAuditRow, MARK_FORMER, MARK_GROUP, MARK_MEMBER, MemberRow};
use crate::output;
use crate::validation::{sanitize_input, validate_group_name};

/// Groups audited concurrently
const AUDIT_WORKERS: usize = 10;

/// Run the group list command
pub async fn list(
    opts: &GlobalOptions,
    group: Option<&str>,
    members: bool,
    former_only: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let client = ctx.client.as_ref();

    match group {
        Some(group) => {
            let group = sanitize_input(group);
            validate_group_name(&group)?;
            let group_email = ctx.settings.qualify(&group)?;

            if members {
                let rows = member_rows(client, &ctx.settings, &group_email).await?;
                output::print_many(&rows, MemberRow::HEADERS, ctx.output())
            } else {
                let details = client
                    .get_group(&group_email)
                    .await
                    .context(format!("Unable to get group {}", group_email))?;
                output::print_one(&details, &[], ctx.output())
            }
        }
        None if members => Err(Error::Validation(
            "--members requires a GROUP argument".to_string(),
        )),
        None => {
            let rows = audit_groups(client, &ctx.settings, former_only).await?;
            output::print_many(&rows, GroupAuditRow::HEADERS, ctx.output())
        }
    }
}

/// Audit every group in the domain, sorted by group email.
pub async fn audit_groups<C>(
    client: &C,
    settings: &Settings,
    former_only: bool,
) -> Result<Vec<GroupAuditRow>>
where
    C: UsersApi + GroupsApi + ?Sized,
{
    let domain = settings.require_domain()?;
    let groups = client
        .list_groups(domain)
        .await
        .context("Unable to list groups")?;
    debug!("Auditing {} groups", groups.len());

    let mut rows = run_bounded(groups, AUDIT_WORKERS, |group| {
        audit_group(client, settings, group)
    })
    .await?;

    if former_only {
        rows.retain(|row| row.former_employees);
    }
    rows.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(rows)
}

/// Classify the members of one group.
///
/// Members outside the domain are external and nothing else is checked for
/// them. Non-`MEMBER` roles are owners. Users are looked up to find their OU:
/// outside the staff OUs is external, in the former-employees OU is former.
pub async fn audit_group<C>(client: &C, settings: &Settings, group: Value) -> Result<GroupAuditRow>
where
    C: UsersApi + GroupsApi + ?Sized,
{
    let mut row = GroupAuditRow::for_group(&group);
    let key = group
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(&row.email)
        .to_string();

    let members = client
        .list_members(&key)
        .await
        .context(format!("Unable to list members of {}", row.email))?;

    let suffix = settings.domain.as_ref().map(|d| format!("@{}", d));
    let mut owners = Vec::new();

    for member in &members {
        let field = |name: &str| member.get(name).and_then(Value::as_str).unwrap_or_default();
        let email = field("email");

        if let Some(ref suffix) = suffix
            && !email.ends_with(suffix.as_str())
        {
            row.external_members = true;
            continue;
        }

        if field("role") != "MEMBER" {
            owners.push(email.to_string());
        }

        if field("type") == "USER" {
            if field("status") != "ACTIVE" {
                row.inactive_members = true;
            }

            let user = client
                .get_user(email)
                .await
                .context(format!("Unable to get user {}", email))?;
            let ou = user
                .get("orgUnitPath")
                .and_then(Value::as_str)
                .unwrap_or_default();

            if !settings.audit.staff_ous.iter().any(|s| s == ou) {
                row.external_members = true;
            }
            if ou == settings.audit.former_employees_ou {
                row.former_employees = true;
            }
        }
    }

    row.owners = owners.join(",");
    Ok(row)
}

/// Members of one group with their status marks
pub async fn member_rows<C>(
    client: &C,
    settings: &Settings,
    group_email: &str,
) -> Result<Vec<MemberRow>>
where
    C: UsersApi + GroupsApi + ?Sized,
{
    let members = client
        .list_members(group_email)
        .await
        .context(format!("Unable to list members of {}", group_email))?;

    let mut rows = Vec::with_capacity(members.len());
    for member in &members {
        let mark = match member.get("type").and_then(Value::as_str) {
            Some("GROUP") => MARK_GROUP,
            Some("USER") => {
                let email = member
                    .get("email")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let user = client
                    .get_user(email)
                    .await
                    .context(format!("Unable to get user {}", email))?;
                if user.get("orgUnitPath").and_then(Value::as_str)
                    == Some(settings.audit.former_employees_ou.as_str())
                {
                    MARK_FORMER
                } else {
                    MARK_MEMBER
                }
            }
            _ => "",
        };
        rows.push(MemberRow::new(member, mark));
    }
    Ok(rows)
}
