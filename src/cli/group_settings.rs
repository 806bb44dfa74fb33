//! Group settings commands

use std::fmt::Write as _;

use clap::Args;
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::client::GroupsApi;
use crate::error::{Error, Result, ResultExt};
use crate::output;
use crate::validation::{sanitize_input, validate_email};

/// Report sections: title, then (label, API field) pairs
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "",
        &[
            ("Email", "email"),
            ("Name", "name"),
            ("Description", "description"),
        ],
    ),
    (
        "Access Settings",
        &[
            ("Who Can Join", "whoCanJoin"),
            ("Who Can View Group", "whoCanViewGroup"),
            ("Who Can View Membership", "whoCanViewMembership"),
            ("Allow External Members", "allowExternalMembers"),
        ],
    ),
    (
        "Posting Settings",
        &[
            ("Who Can Post Message", "whoCanPostMessage"),
            ("Allow Web Posting", "allowWebPosting"),
            ("Message Moderation Level", "messageModerationLevel"),
            ("Spam Moderation Level", "spamModerationLevel"),
        ],
    ),
    (
        "Email Settings",
        &[
            ("Send Message Deny Notification", "sendMessageDenyNotification"),
            ("Reply To", "replyTo"),
            ("Custom Reply To", "customReplyTo"),
            ("Include Custom Footer", "includeCustomFooter"),
            ("Custom Footer Text", "customFooterText"),
            ("Include in Global Address List", "includeInGlobalAddressList"),
        ],
    ),
    (
        "Moderation Settings",
        &[
            ("Who Can Contact Owner", "whoCanContactOwner"),
            ("Who Can Moderate Members", "whoCanModerateMembers"),
            ("Who Can Moderate Content", "whoCanModerateContent"),
        ],
    ),
    (
        "Archive Settings",
        &[
            ("Archive Only", "archiveOnly"),
            ("Message Display Font", "messageDisplayFont"),
            ("Show in Group Directory", "showInGroupDirectory"),
            ("Max Message Bytes", "maxMessageBytes"),
            ("Is Archived", "isArchived"),
        ],
    ),
    (
        "Member Settings",
        &[
            ("Who Can Leave Group", "whoCanLeaveGroup"),
            ("Who Can Add", "whoCanAdd"),
            ("Who Can Invite", "whoCanInvite"),
            ("Who Can Approve Members", "whoCanApproveMembers"),
            ("Who Can Ban Users", "whoCanBanUsers"),
            ("Allow Google Communication", "allowGoogleCommunication"),
            ("Members Can Post As The Group", "membersCanPostAsTheGroup"),
        ],
    ),
];

/// Settings flags for `group-settings update`.
///
/// Values are passed through as the API spells them: enum names such as
/// `ALL_IN_DOMAIN_CAN_JOIN`, or `true`/`false` for switches.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// CAN_REQUEST_TO_JOIN, ALL_IN_DOMAIN_CAN_JOIN, ANYONE_CAN_JOIN or INVITED_CAN_JOIN
    #[arg(long)]
    pub who_can_join: Option<String>,
    /// ANYONE_CAN_VIEW, ALL_IN_DOMAIN_CAN_VIEW, ALL_MEMBERS_CAN_VIEW or ALL_MANAGERS_CAN_VIEW
    #[arg(long)]
    pub who_can_view_group: Option<String>,
    #[arg(long)]
    pub who_can_view_membership: Option<String>,
    #[arg(long)]
    pub allow_external_members: Option<String>,
    /// NONE_CAN_POST, ALL_MANAGERS_CAN_POST, ALL_MEMBERS_CAN_POST, ALL_IN_DOMAIN_CAN_POST or ANYONE_CAN_POST
    #[arg(long)]
    pub who_can_post_message: Option<String>,
    #[arg(long)]
    pub allow_web_posting: Option<String>,
    /// MODERATE_ALL_MESSAGES, MODERATE_NON_MEMBERS, MODERATE_NEW_MEMBERS or MODERATE_NONE
    #[arg(long)]
    pub message_moderation_level: Option<String>,
    #[arg(long)]
    pub spam_moderation_level: Option<String>,
    /// REPLY_TO_CUSTOM, REPLY_TO_SENDER, REPLY_TO_LIST, REPLY_TO_OWNER or REPLY_TO_IGNORE
    #[arg(long)]
    pub reply_to: Option<String>,
    /// Address used with REPLY_TO_CUSTOM
    #[arg(long)]
    pub custom_reply_to: Option<String>,
    #[arg(long)]
    pub custom_footer_text: Option<String>,
    #[arg(long)]
    pub include_custom_footer: Option<String>,
    #[arg(long)]
    pub send_message_deny_notification: Option<String>,
    #[arg(long)]
    pub include_in_global_address_list: Option<String>,
    #[arg(long)]
    pub archive_only: Option<String>,
    #[arg(long)]
    pub show_in_group_directory: Option<String>,
    #[arg(long)]
    pub who_can_leave_group: Option<String>,
    #[arg(long)]
    pub who_can_add: Option<String>,
    #[arg(long)]
    pub who_can_invite: Option<String>,
    #[arg(long)]
    pub who_can_approve_members: Option<String>,
    #[arg(long)]
    pub allow_google_communication: Option<String>,
    #[arg(long)]
    pub members_can_post_as_the_group: Option<String>,
    #[arg(long)]
    pub who_can_contact_owner: Option<String>,
    #[arg(long)]
    pub who_can_moderate_members: Option<String>,
    #[arg(long)]
    pub who_can_moderate_content: Option<String>,
    #[arg(long)]
    pub who_can_ban_users: Option<String>,
}

impl SettingsArgs {
    /// Flags that were given, keyed by API field name, in declaration order
    fn given(&self) -> Vec<(&'static str, &str)> {
        [
            ("whoCanJoin", &self.who_can_join),
            ("whoCanViewGroup", &self.who_can_view_group),
            ("whoCanViewMembership", &self.who_can_view_membership),
            ("allowExternalMembers", &self.allow_external_members),
            ("whoCanPostMessage", &self.who_can_post_message),
            ("allowWebPosting", &self.allow_web_posting),
            ("messageModerationLevel", &self.message_moderation_level),
            ("spamModerationLevel", &self.spam_moderation_level),
            ("replyTo", &self.reply_to),
            ("customReplyTo", &self.custom_reply_to),
            ("customFooterText", &self.custom_footer_text),
            ("includeCustomFooter", &self.include_custom_footer),
            ("sendMessageDenyNotification", &self.send_message_deny_notification),
            ("includeInGlobalAddressList", &self.include_in_global_address_list),
            ("archiveOnly", &self.archive_only),
            ("showInGroupDirectory", &self.show_in_group_directory),
            ("whoCanLeaveGroup", &self.who_can_leave_group),
            ("whoCanAdd", &self.who_can_add),
            ("whoCanInvite", &self.who_can_invite),
            ("whoCanApproveMembers", &self.who_can_approve_members),
            ("allowGoogleCommunication", &self.allow_google_communication),
            ("membersCanPostAsTheGroup", &self.members_can_post_as_the_group),
            ("whoCanContactOwner", &self.who_can_contact_owner),
            ("whoCanModerateMembers", &self.who_can_moderate_members),
            ("whoCanModerateContent", &self.who_can_moderate_content),
            ("whoCanBanUsers", &self.who_can_ban_users),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Patch body holding only the given flags
    pub fn to_patch(&self) -> Result<Value> {
        let given = self.given();
        if given.is_empty() {
            return Err(Error::Validation(
                "No settings specified to update. Use --help to see available flags".to_string(),
            ));
        }

        let mut patch = Map::new();
        for (field, value) in given {
            let value = sanitize_input(value);
            if field == "customReplyTo" && !value.is_empty() {
                validate_email(&value)
                    .map_err(|e| Error::Validation(format!("custom reply-to: {}", e)))?;
            }
            patch.insert(field.to_string(), json!(value));
        }
        Ok(Value::Object(patch))
    }
}

fn group_email(ctx: &CommandContext, group: &str) -> Result<String> {
    let email = ctx.settings.qualify(&sanitize_input(group))?;
    validate_email(&email)?;
    Ok(email)
}

/// Run the group-settings list command
pub async fn list(opts: &GlobalOptions, group: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let email = group_email(&ctx, group)?;

    let settings = ctx
        .client
        .get_group_settings(&email)
        .await
        .context(format!("Unable to get group settings for {}", email))?;

    match ctx.output().format {
        OutputFormat::Plain => {
            print!("{}", render_report(&settings));
            Ok(())
        }
        _ => output::print_one(&settings, &[], ctx.output()),
    }
}

/// Run the group-settings update command
pub async fn update(opts: &GlobalOptions, group: &str, args: &SettingsArgs) -> Result<()> {
    let patch = args.to_patch()?;
    let ctx = CommandContext::new(opts).await?;
    let email = group_email(&ctx, group)?;

    let updated = ctx
        .client
        .update_group_settings(&email, &patch)
        .await
        .context(format!("Unable to update group settings for {}", email))?;

    let out = ctx.output();
    match out.format {
        OutputFormat::Plain | OutputFormat::Table => {
            let shown = updated
                .get("email")
                .and_then(Value::as_str)
                .unwrap_or(&email);
            output::message(out, format!("Successfully updated settings for group: {}", shown));
            output::message(out, "\nUpdated settings:");
            if let Some(fields) = patch.as_object() {
                for field in fields.keys() {
                    output::message(out, format!("  {}", field));
                }
            }
            Ok(())
        }
        _ => output::print_one(&updated, &[], out),
    }
}

/// Sectioned, human-readable settings report.
///
/// Absent, empty and zero values are left out.
pub fn render_report(settings: &Value) -> String {
    let mut out = String::from("Group Settings\n==============\n\n");

    for (title, rows) in SECTIONS {
        let indent = if title.is_empty() {
            ""
        } else {
            let _ = writeln!(out, "{}:", title);
            let _ = writeln!(out, "{}", "-".repeat(title.len() + 1));
            "  "
        };
        for (label, field) in rows.iter() {
            let text = match settings.get(*field) {
                None | Some(Value::Null) => continue,
                Some(value) => output::cell_text(value),
            };
            if text.is_empty() || text == "0" {
                continue;
            }
            let label = format!("{}{}", indent, label);
            let _ = writeln!(out, "{:<35}: {}", label, text);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWorkspaceClient;

    #[test]
    fn test_to_patch_requires_a_flag() {
        let err = SettingsArgs::default().to_patch().unwrap_err();
        assert!(err.to_string().contains("No settings specified to update"));
    }

    #[test]
    fn test_to_patch_maps_flags_to_api_fields() {
        let args = SettingsArgs {
            who_can_join: Some("INVITED_CAN_JOIN".to_string()),
            allow_external_members: Some("false".to_string()),
            members_can_post_as_the_group: Some("true".to_string()),
            ..SettingsArgs::default()
        };
        let patch = args.to_patch().unwrap();
        assert_eq!(
            patch,
            json!({
                "whoCanJoin": "INVITED_CAN_JOIN",
                "allowExternalMembers": "false",
                "membersCanPostAsTheGroup": "true"
            })
        );
    }

    #[test]
    fn test_to_patch_validates_custom_reply_to() {
        let args = SettingsArgs {
            custom_reply_to: Some("not an email".to_string()),
            ..SettingsArgs::default()
        };
        assert!(args.to_patch().is_err());
    }

    #[test]
    fn test_render_report_skips_empty_values() {
        let report = render_report(&json!({
            "email": "eng@example.com",
            "description": "",
            "whoCanJoin": "INVITED_CAN_JOIN",
            "maxMessageBytes": 0,
            "customFooterText": null
        }));

        assert!(report.starts_with("Group Settings\n==============\n\n"));
        assert!(report.contains(&format!("{:<35}: eng@example.com\n", "Email")));
        assert!(report.contains("Access Settings:\n----------------\n"));
        assert!(report.contains(&format!("{:<35}: INVITED_CAN_JOIN\n", "  Who Can Join")));
        assert!(!report.contains("Description"));
        assert!(!report.contains("Max Message Bytes"));
        assert!(!report.contains("Custom Footer Text"));
    }

    #[tokio::test]
    async fn test_update_patch_reaches_api() {
        let client = MockWorkspaceClient::new()
            .with_group_settings("eng@example.com", json!({"whoCanJoin": "ANYONE_CAN_JOIN"}))
            .await;
        let args = SettingsArgs {
            who_can_join: Some("INVITED_CAN_JOIN".to_string()),
            ..SettingsArgs::default()
        };

        let updated = client
            .update_group_settings("eng@example.com", &args.to_patch().unwrap())
            .await
            .unwrap();
        assert_eq!(updated["whoCanJoin"], "INVITED_CAN_JOIN");
    }
}
