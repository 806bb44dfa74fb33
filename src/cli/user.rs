//! User management commands

use std::io::Read;

use clap::Args;
use log::{debug, info};
use rand::Rng;
use serde_json::{Map, Value, json};

use crate::cli::args::GlobalOptions;
use crate::cli::context::{CommandContext, require_confirmation};
use crate::cli::OutputFormat;
use crate::client::{GroupsApi, UserQuery, UsersApi};
use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use crate::models::UserRow;
use crate::output::{self, OutputOptions};
use crate::validation::{
    sanitize_input, validate_department, validate_email, validate_group_name, validate_phone,
    validate_uuid,
};

/// Initial password length
pub const PASSWORD_LENGTH: usize = 12;

/// Password alphabet without easily confused characters (no l, O, 0)
const PASSWORD_CHARSET: &[u8] = b"abcdefghijkmnopqrstuvwxyzABCDEFGHIJKLMNPQRSTUVWXYZ123456789";

const WELCOME: &str = "Your Google Workspace account has been created.";

const SUSPEND_HINTS: &[&str] = &[
    "User does not exist",
    "Insufficient permissions",
    "User is already suspended",
    "Super admin accounts may have restrictions",
];

const UNSUSPEND_HINTS: &[&str] = &[
    "User does not exist",
    "Insufficient permissions",
    "User is already active (not suspended)",
];

/// Employee type custom attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmployeeType {
    Staff,
    Contractor,
}

/// Flags for `user create`
#[derive(Debug, Clone, Default, Args)]
pub struct CreateArgs {
    #[arg(long, short = 'f')]
    pub first_name: String,

    #[arg(long, short = 'l')]
    pub last_name: String,

    /// Personal (home) email address
    #[arg(long = "personal-email", short = 'e')]
    pub personal_email: Option<String>,

    /// Groups to join, comma-separated or repeated
    #[arg(long, short = 'g', value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Org unit path
    #[arg(long, short = 'o')]
    pub ou: Option<String>,
}

/// Flags for `user update`
#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    /// Formatted postal address
    #[arg(long, short = 'a')]
    pub address: Option<String>,

    /// Department
    #[arg(long, short = 'd')]
    pub dept: Option<String>,

    /// Employee ID (UUID)
    #[arg(long, short = 'i')]
    pub id: Option<String>,

    /// Employee type
    #[arg(long = "type", short = 'e', value_enum)]
    pub employee_type: Option<EmployeeType>,

    /// Overwrite existing values (e.g. employee ID); confirms --remove
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Groups to join, comma-separated or repeated
    #[arg(long, short = 'g', value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Org unit path
    #[arg(long, short = 'o')]
    pub ou: Option<String>,

    /// Manager's email
    #[arg(long, short = 'm')]
    pub manager: Option<String>,

    /// Phone numbers as `type:number`, separated by ';'
    #[arg(long, short = 'p')]
    pub phone: Option<String>,

    /// Job title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Offboard the account: sign out, clear PII, hide from the directory,
    /// move to the former employees OU, reset the password, leave all groups
    #[arg(long, short = 'r')]
    pub remove: bool,

    /// Clear personal information only
    #[arg(long)]
    pub clear_pii: bool,
}

impl UpdateArgs {
    /// True when any flag describes the patch; otherwise it comes from stdin
    pub fn has_fields(&self) -> bool {
        self.address.is_some()
            || self.dept.is_some()
            || self.id.is_some()
            || self.employee_type.is_some()
            || !self.groups.is_empty()
            || self.ou.is_some()
            || self.manager.is_some()
            || self.phone.is_some()
            || self.title.is_some()
            || self.remove
            || self.clear_pii
    }
}

/// What `user update` did besides the patch itself
#[derive(Debug, Default)]
pub struct UpdateOutcome {
    pub patch: Value,
    /// Employee ID left alone because one was already set
    pub skipped_employee_id: bool,
    pub removed_from: Vec<String>,
    pub added_to: Vec<String>,
}

/// Run the user list command
pub async fn list(opts: &GlobalOptions, email: Option<&str>, disabled_only: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    if let Some(email) = email {
        let email = sanitize_input(email);
        validate_email(&email)?;
        let user = ctx
            .client
            .get_user(&email)
            .await
            .context(format!("Unable to get user {}", email))?;
        return output::print_one(&user, &[], ctx.output());
    }

    let former_ou = disabled_only.then_some(ctx.settings.audit.former_employees_ou.as_str());
    let users = fetch_users(ctx.client.as_ref(), former_ou).await?;
    let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
    output::print_listing(&users, &rows, UserRow::HEADERS, ctx.output())
}

/// Every user of the customer, optionally only those in `former_ou`.
///
/// The OU filter runs client-side; the API rejects `orgUnitPath` queries
/// containing spaces.
pub async fn fetch_users<C>(client: &C, former_ou: Option<&str>) -> Result<Vec<Value>>
where
    C: UsersApi + ?Sized,
{
    let users = client
        .list_users(&UserQuery::new())
        .await
        .context("Unable to list users")?;
    debug!("Fetched {} users", users.len());

    Ok(match former_ou {
        Some(ou) => users
            .into_iter()
            .filter(|u| u.get("orgUnitPath").and_then(Value::as_str) == Some(ou))
            .collect(),
        None => users,
    })
}

/// Run the user create command
pub async fn create(opts: &GlobalOptions, email: &str, args: &CreateArgs) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let password = random_password(PASSWORD_LENGTH);
    let user = create_user(ctx.client.as_ref(), &ctx.settings, email, args, &password).await?;

    let primary = user
        .get("primaryEmail")
        .and_then(Value::as_str)
        .unwrap_or(email);
    match ctx.output().format {
        OutputFormat::Json | OutputFormat::Yaml | OutputFormat::Csv => {
            output::print_one(&UserRow::from(&user), UserRow::HEADERS, ctx.output())?;
            info!("Initial password for {} must be shared out of band", primary);
        }
        _ => print!("{}", welcome_text(primary, &password)),
    }
    Ok(())
}

/// Insert the user, then add it to each requested group.
pub async fn create_user<C>(
    client: &C,
    settings: &Settings,
    email: &str,
    args: &CreateArgs,
    password: &str,
) -> Result<Value>
where
    C: UsersApi + GroupsApi + ?Sized,
{
    let email = sanitize_input(email);
    validate_email(&email)?;

    let first = sanitize_input(&args.first_name);
    let last = sanitize_input(&args.last_name);

    let mut emails = Vec::new();
    if let Some(ref personal) = args.personal_email {
        let personal = sanitize_input(personal);
        validate_email(&personal)
            .map_err(|e| Error::Validation(format!("personal email: {}", e)))?;
        emails.push(json!({ "address": personal, "type": "home" }));
    }
    emails.push(json!({ "address": email, "primary": true }));

    let mut user = json!({
        "primaryEmail": email,
        "password": password,
        "changePasswordAtNextLogin": true,
        "name": {
            "givenName": first,
            "familyName": last,
            "fullName": format!("{} {}", first, last),
        },
        "emails": emails,
    });
    if let Some(ref ou) = args.ou {
        user["orgUnitPath"] = json!(ou);
    }

    let created = client
        .insert_user(&user)
        .await
        .context(format!("Unable to create {}", email))?;

    add_to_groups(client, settings, &email, &args.groups).await?;
    Ok(created)
}

/// Message to hand to the new user
pub fn welcome_text(email: &str, password: &str) -> String {
    format!(
        "{}\nUsername: {}\nPassword: {}\nURL: https://www.google.com/accounts/AccountChooser?Email={}&continue=https://apps.google.com/user/hub\n",
        WELCOME, email, password, email
    )
}

/// Random password drawn from [`PASSWORD_CHARSET`]
pub fn random_password(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| PASSWORD_CHARSET[rng.gen_range(0..PASSWORD_CHARSET.len())] as char)
        .collect()
}

/// Run the user update command
pub async fn update(opts: &GlobalOptions, email: &str, args: &UpdateArgs) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    let stdin_patch = if args.has_fields() {
        None
    } else {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Some(serde_json::from_str::<Value>(&raw)?)
    };

    let outcome =
        apply_update(ctx.client.as_ref(), &ctx.settings, email, args, stdin_patch).await?;

    let out = ctx.output();
    if outcome.skipped_employee_id {
        output::message(out, "Skipping update of existing Employee ID, use --force.");
    }
    for group in &outcome.removed_from {
        output::message(out, format!("Removed {} from {}", email, group));
    }
    for group in &outcome.added_to {
        output::message(out, format!("Added {} to {}", email, group));
    }
    output::message(out, format!("Updated {}", email));
    Ok(())
}

/// Build and send the patch for `user update`, then adjust group membership.
pub async fn apply_update<C>(
    client: &C,
    settings: &Settings,
    email: &str,
    args: &UpdateArgs,
    stdin_patch: Option<Value>,
) -> Result<UpdateOutcome>
where
    C: UsersApi + GroupsApi + ?Sized,
{
    let email = sanitize_input(email);
    validate_email(&email)?;
    let mut outcome = UpdateOutcome::default();

    let patch = match stdin_patch {
        Some(patch) => patch,
        None if args.remove => {
            require_confirmation(
                args.force,
                settings.assume_yes,
                &format!("Removing {}", email),
            )?;
            client
                .sign_out_user(&email)
                .await
                .context(format!("Unable to sign out {}", email))?;
            outcome.removed_from = leave_all_groups(client, &email).await?;
            removal_patch(
                &settings.audit.former_employees_ou,
                &random_password(PASSWORD_LENGTH),
            )
        }
        None if args.clear_pii => clear_pii_patch(),
        None => {
            let existing_ids = match args.id {
                Some(_) => {
                    let user = client
                        .get_user(&email)
                        .await
                        .context(format!("Unable to get user {}", email))?;
                    user.get("externalIds").is_some_and(|ids| !ids.is_null())
                }
                None => false,
            };
            let (patch, skipped) = field_patch(args, existing_ids)?;
            outcome.skipped_employee_id = skipped;
            patch
        }
    };

    if patch.as_object().is_some_and(|p| !p.is_empty()) {
        client
            .update_user(&email, &patch)
            .await
            .context(format!("Unable to update {}", email))?;
    }
    outcome.patch = patch;
    outcome.added_to = add_to_groups(client, settings, &email, &args.groups).await?;
    Ok(outcome)
}

/// Patch built from the individual field flags.
///
/// Returns the patch and whether an employee ID was skipped because the user
/// already has one and `--force` was not given.
pub fn field_patch(args: &UpdateArgs, existing_ids: bool) -> Result<(Value, bool)> {
    let mut patch = Map::new();
    let mut skipped = false;

    if let Some(ref address) = args.address {
        patch.insert(
            "addresses".into(),
            json!([{ "formatted": sanitize_input(address) }]),
        );
    }

    if args.dept.is_some() || args.title.is_some() {
        let mut org = Map::new();
        org.insert("primary".into(), json!(true));
        if let Some(ref dept) = args.dept {
            validate_department(dept)?;
            org.insert("department".into(), json!(sanitize_input(dept)));
        }
        if let Some(ref title) = args.title {
            org.insert("title".into(), json!(sanitize_input(title)));
        }
        patch.insert("organizations".into(), json!([org]));
    }

    if let Some(ref id) = args.id {
        validate_uuid(id)?;
        if existing_ids && !args.force {
            skipped = true;
        } else {
            patch.insert(
                "externalIds".into(),
                json!([{ "type": "organization", "value": id }]),
            );
        }
    }

    if let Some(kind) = args.employee_type {
        patch.insert("customSchemas".into(), employee_type_schema(kind));
    }

    if let Some(ref ou) = args.ou {
        patch.insert("orgUnitPath".into(), json!(ou));
    }

    if let Some(ref manager) = args.manager {
        let manager = sanitize_input(manager);
        validate_email(&manager).map_err(|e| Error::Validation(format!("manager: {}", e)))?;
        patch.insert(
            "relations".into(),
            json!([{ "type": "manager", "value": manager }]),
        );
    }

    if let Some(ref phone) = args.phone {
        patch.insert("phones".into(), parse_phones(phone)?);
    }

    Ok((Value::Object(patch), skipped))
}

/// Parse `type:number;type:number`; a number without a type is `work`.
pub fn parse_phones(input: &str) -> Result<Value> {
    let mut phones = Vec::new();
    for entry in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        validate_phone(entry)?;
        let (kind, number) = match entry.split_once(':') {
            Some((kind, number)) => (kind.trim(), number.trim()),
            None => ("work", entry),
        };
        phones.push(json!({ "type": kind, "value": number }));
    }
    Ok(Value::Array(phones))
}

fn employee_type_schema(kind: EmployeeType) -> Value {
    let (staff, contractor) = match kind {
        EmployeeType::Staff => ("Yes", ""),
        EmployeeType::Contractor => ("", "Yes"),
    };
    json!({
        "Employee_Type": {
            "Staff": [{ "type": "work", "value": staff }],
            "Contractor": [{ "type": "work", "value": contractor }],
        }
    })
}

/// Recovery data emptied, address and email lists nulled
pub fn clear_pii_patch() -> Value {
    json!({
        "recoveryEmail": "",
        "recoveryPhone": "",
        "addresses": null,
        "emails": null,
    })
}

/// Offboarding patch; mail delivery keeps working since the user is not suspended
pub fn removal_patch(former_employees_ou: &str, password: &str) -> Value {
    let mut patch = clear_pii_patch();
    if let Some(map) = patch.as_object_mut() {
        map.insert("changePasswordAtNextLogin".into(), json!(false));
        map.insert("includeInGlobalAddressList".into(), json!(false));
        map.insert("orgUnitPath".into(), json!(former_employees_ou));
        map.insert("password".into(), json!(password));
    }
    patch
}

async fn leave_all_groups<C>(client: &C, email: &str) -> Result<Vec<String>>
where
    C: GroupsApi + ?Sized,
{
    let groups = client
        .list_user_groups(email)
        .await
        .context(format!("Unable to list groups of {}", email))?;

    let mut left = Vec::new();
    for group in &groups {
        let Some(group_email) = group.get("email").and_then(Value::as_str) else {
            continue;
        };
        client
            .delete_member(group_email, email)
            .await
            .context(format!("Unable to remove {} from group {}", email, group_email))?;
        left.push(group_email.to_string());
    }
    Ok(left)
}

async fn add_to_groups<C>(
    client: &C,
    settings: &Settings,
    email: &str,
    groups: &[String],
) -> Result<Vec<String>>
where
    C: GroupsApi + ?Sized,
{
    let mut added = Vec::new();
    for group in groups {
        let group = sanitize_input(group);
        validate_group_name(&group)?;
        let group_email = settings.qualify(&group)?;
        client
            .insert_member(&group_email, &json!({ "email": email, "role": "MEMBER" }))
            .await
            .context(format!("Unable to add {} to group {}", email, group))?;
        added.push(group_email);
    }
    Ok(added)
}

/// Run the user suspend command
pub async fn suspend(
    opts: &GlobalOptions,
    email: &str,
    reason: Option<&str>,
    force: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let user = set_suspended(
        ctx.client.as_ref(),
        &ctx.settings,
        email,
        true,
        reason,
        force,
    )
    .await?;
    report_suspension(&user, ctx.output(), "Successfully suspended user account:")
}

/// Run the user unsuspend command
pub async fn unsuspend(opts: &GlobalOptions, email: &str, force: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let user = set_suspended(ctx.client.as_ref(), &ctx.settings, email, false, None, force).await?;
    report_suspension(&user, ctx.output(), "Successfully unsuspended user account:")?;
    output::message(
        ctx.output(),
        "\nThe user can now sign in and access Google Workspace services.",
    );
    Ok(())
}

/// Suspend or restore an account after confirmation
pub async fn set_suspended<C>(
    client: &C,
    settings: &Settings,
    email: &str,
    suspended: bool,
    reason: Option<&str>,
    force: bool,
) -> Result<Value>
where
    C: UsersApi + ?Sized,
{
    let email = sanitize_input(email);
    validate_email(&email)?;

    let (action, hints) = if suspended {
        ("Suspending", SUSPEND_HINTS)
    } else {
        ("Unsuspending", UNSUSPEND_HINTS)
    };
    require_confirmation(force, settings.assume_yes, &format!("{} {}", action, email))?;

    let mut patch = json!({ "suspended": suspended });
    if let Some(reason) = reason.filter(|r| !r.is_empty()) {
        patch["suspensionReason"] = json!(sanitize_input(reason));
    }

    client
        .update_user(&email, &patch)
        .await
        .with_hints(format!("{} {} failed", action, email), hints)
}

fn report_suspension(user: &Value, out: &OutputOptions, title: &str) -> Result<()> {
    match out.format {
        OutputFormat::Json | OutputFormat::Yaml => return output::print_one(user, &[], out),
        OutputFormat::Csv => {
            let headers = ["primaryEmail", "suspended", "suspensionReason"];
            return output::print_one(user, &headers, out);
        }
        _ => {}
    }

    let field = |ptr: &str| user.pointer(ptr).and_then(Value::as_str).unwrap_or_default();
    output::message(out, format!("{}\n", title));
    output::message(out, format!("  Email: {}", field("/primaryEmail")));
    output::message(
        out,
        format!("  Name: {} {}", field("/name/givenName"), field("/name/familyName")),
    );
    output::message(
        out,
        format!(
            "  Suspended: {}",
            user.get("suspended").and_then(Value::as_bool).unwrap_or(false)
        ),
    );
    let reason = field("/suspensionReason");
    if !reason.is_empty() {
        output::message(out, format!("  Reason: {}", reason));
    }
    Ok(())
}
