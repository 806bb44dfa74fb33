//! User alias commands

use crate::cli::args::GlobalOptions;
use crate::cli::context::{CommandContext, require_confirmation};
use crate::client::UsersApi;
use crate::error::{Error, Result, ResultExt};
use crate::models::AliasRow;
use crate::output;
use crate::validation::{sanitize_input, validate_email};

const LIST_HINTS: &[&str] = &[
    "User does not exist",
    "Insufficient permissions",
    "Invalid user email",
];

const ADD_HINTS: &[&str] = &[
    "User does not exist",
    "Alias already exists for another user or group",
    "Alias domain is not managed by your organization",
    "Insufficient permissions",
];

const REMOVE_HINTS: &[&str] = &[
    "User does not exist",
    "Alias does not exist for this user",
    "Alias email is incorrect",
    "Insufficient permissions",
];

fn checked(email: &str, what: &str) -> Result<String> {
    let email = sanitize_input(email);
    validate_email(&email).map_err(|e| Error::Validation(format!("{}: {}", what, e)))?;
    Ok(email)
}

/// Run the alias list command
pub async fn list(opts: &GlobalOptions, email: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let rows = list_aliases(ctx.client.as_ref(), email).await?;

    let out = ctx.output();
    output::message(out, format!("Aliases for {}:\n", email.trim()));
    if rows.is_empty() {
        output::message(out, "No aliases found.");
        return Ok(());
    }
    output::print_many(&rows, AliasRow::HEADERS, out)?;
    output::message(out, format!("\nTotal: {} alias(es)", rows.len()));
    Ok(())
}

pub async fn list_aliases<C>(client: &C, email: &str) -> Result<Vec<AliasRow>>
where
    C: UsersApi + ?Sized,
{
    let email = checked(email, "user email")?;
    let aliases = client
        .list_aliases(&email)
        .await
        .with_hints(format!("Unable to list aliases for {}", email), LIST_HINTS)?;
    Ok(aliases.iter().map(AliasRow::from).collect())
}

/// Run the alias add command
pub async fn add(opts: &GlobalOptions, email: &str, alias: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let (email, alias) = add_alias(ctx.client.as_ref(), email, alias).await?;

    let out = ctx.output();
    output::message(out, "Successfully added alias:\n");
    output::message(out, format!("  User:  {}", email));
    output::message(out, format!("  Alias: {}", alias));
    Ok(())
}

pub async fn add_alias<C>(client: &C, email: &str, alias: &str) -> Result<(String, String)>
where
    C: UsersApi + ?Sized,
{
    let email = checked(email, "user email")?;
    let alias = checked(alias, "alias")?;
    client
        .insert_alias(&email, &alias)
        .await
        .with_hints(format!("Unable to add alias {} to {}", alias, email), ADD_HINTS)?;
    Ok((email, alias))
}

/// Run the alias remove command
pub async fn remove(opts: &GlobalOptions, email: &str, alias: &str, force: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let (email, alias) = remove_alias(
        ctx.client.as_ref(),
        email,
        alias,
        force || ctx.settings.assume_yes,
    )
    .await?;

    let out = ctx.output();
    output::message(out, "Successfully removed alias:\n");
    output::message(out, format!("  User:  {}", email));
    output::message(out, format!("  Alias: {}", alias));
    Ok(())
}

pub async fn remove_alias<C>(
    client: &C,
    email: &str,
    alias: &str,
    confirmed: bool,
) -> Result<(String, String)>
where
    C: UsersApi + ?Sized,
{
    let email = checked(email, "user email")?;
    let alias = checked(alias, "alias")?;
    require_confirmation(confirmed, false, &format!("Removing alias {}", alias))?;

    client
        .delete_alias(&email, &alias)
        .await
        .with_hints(
            format!("Unable to remove alias {} from {}", alias, email),
            REMOVE_HINTS,
        )?;
    Ok((email, alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWorkspaceClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_then_list() {
        let client = MockWorkspaceClient::new();
        let (user, alias) = add_alias(&client, " ada@example.com ", "countess@example.com")
            .await
            .unwrap();
        assert_eq!(user, "ada@example.com");
        assert_eq!(alias, "countess@example.com");

        let rows = list_aliases(&client, "ada@example.com").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].alias, "countess@example.com");
        assert_eq!(rows[0].primary_email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_alias() {
        let client = MockWorkspaceClient::new();
        let err = add_alias(&client, "ada@example.com", "countess")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("alias"));
        assert_eq!(client.call_counts().await.mutations, 0);
    }

    #[tokio::test]
    async fn test_remove_requires_confirmation() {
        let client = MockWorkspaceClient::new()
            .with_aliases(
                "ada@example.com",
                vec![json!({"alias": "countess@example.com", "primaryEmail": "ada@example.com"})],
            )
            .await;

        assert!(
            remove_alias(&client, "ada@example.com", "countess@example.com", false)
                .await
                .is_err()
        );
        remove_alias(&client, "ada@example.com", "countess@example.com", true)
            .await
            .unwrap();
        assert!(list_aliases(&client, "ada@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_alias_has_hints() {
        let client = MockWorkspaceClient::new();
        let err = remove_alias(&client, "ada@example.com", "nobody@example.com", true)
            .await
            .unwrap_err();
        assert_eq!(err.hints(), REMOVE_HINTS);
    }
}
