//! Drive document ownership transfer

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use serde_json::{Value, json};

use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::client::{TransferApi, UsersApi};
use crate::error::{Error, Result, ResultExt};
use crate::output;
use crate::validation::{sanitize_input, validate_email};

/// Data Transfer application ID of Drive and Docs
pub const DRIVE_APPLICATION_ID: i64 = 55656082996;

const STATUS_COMPLETED: &str = "completed";
const STATUS_IN_PROGRESS: &str = "inProgress";

/// Retry and polling limits for one transfer
#[derive(Debug, Clone, Copy)]
pub struct TransferPolicy {
    /// Submissions before giving up, the first one included
    pub max_attempts: usize,
    /// Status checks per submission
    pub max_polls: usize,
    /// Pause before each retry and each status check
    pub interval: Duration,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            max_polls: 5,
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed,
    /// Still in progress after the last poll; Google finishes it in the background
    RunningLong,
}

/// Transfer request moving private and shared Drive files between owners
pub fn transfer_body(old_owner_id: &str, new_owner_id: &str) -> Value {
    json!({
        "oldOwnerUserId": old_owner_id,
        "newOwnerUserId": new_owner_id,
        "applicationDataTransfers": [{
            "applicationId": DRIVE_APPLICATION_ID,
            "applicationTransferParams": [{
                "key": "PRIVACY_LEVEL",
                "value": ["PRIVATE", "SHARED"],
            }],
        }],
    })
}

/// Run the transfer command
pub async fn run(opts: &GlobalOptions, from: &str, to: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let out = ctx.output();
    output::message(out, format!("document transfer: {} --> {}", from, to));

    let progress = if out.quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    };

    let result = transfer_documents(
        ctx.client.as_ref(),
        from,
        to,
        TransferPolicy::default(),
        &progress,
    )
    .await;
    progress.finish_and_clear();

    match result? {
        TransferOutcome::Completed => output::message(out, "transfer complete"),
        TransferOutcome::RunningLong => output::message(out, "transfer running long"),
    }
    Ok(())
}

/// Look up both owners, submit the transfer and wait for it.
///
/// A failed submission or a transfer that ends in any status other than
/// completed or in progress is re-submitted until the retries run out.
pub async fn transfer_documents<C>(
    client: &C,
    from: &str,
    to: &str,
    policy: TransferPolicy,
    progress: &ProgressBar,
) -> Result<TransferOutcome>
where
    C: UsersApi + TransferApi + ?Sized,
{
    let from_id = user_id(client, from).await?;
    let to_id = user_id(client, to).await?;
    let body = transfer_body(&from_id, &to_id);

    let mut attempt = 1;
    let mut retry = |reason: &str| -> bool {
        if attempt >= policy.max_attempts {
            return false;
        }
        attempt += 1;
        warn!("Transfer retry {}/{}: {}", attempt, policy.max_attempts, reason);
        progress.println(format!("retry {}/{}", attempt, policy.max_attempts));
        true
    };

    'submit: loop {
        progress.set_message("submitting transfer");
        let transfer = match client.insert_transfer(&body).await {
            Ok(transfer) => transfer,
            Err(e) => {
                if !retry(&e.to_string()) {
                    return Err(e).context("Unable to start document transfer");
                }
                tokio::time::sleep(policy.interval).await;
                continue 'submit;
            }
        };
        let id = transfer
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        debug!("Transfer {} submitted", id);

        for poll in 1..=policy.max_polls {
            tokio::time::sleep(policy.interval).await;
            let status = match client.get_transfer(&id).await {
                Ok(t) => t
                    .get("overallTransferStatusCode")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                Err(e) => {
                    debug!("Transfer status check failed: {}", e);
                    String::new()
                }
            };
            progress.set_message(format!("transfer {} ({}/{})", status, poll, policy.max_polls));

            if status == STATUS_COMPLETED {
                return Ok(TransferOutcome::Completed);
            }
            if poll == policy.max_polls {
                if status == STATUS_IN_PROGRESS {
                    return Ok(TransferOutcome::RunningLong);
                }
                if !retry(&format!("status {}", status)) {
                    return Err(Error::Other(format!("transfer failed (status: {})", status)));
                }
                continue 'submit;
            }
        }
        // Only reached with max_polls == 0
        return Ok(TransferOutcome::RunningLong);
    }
}

async fn user_id<C>(client: &C, email: &str) -> Result<String>
where
    C: UsersApi + ?Sized,
{
    let email = sanitize_input(email);
    validate_email(&email)?;
    let user = client
        .get_user(&email)
        .await
        .context(format!("unable to get ID for {}", email))?;
    user.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Other(format!("user {} has no ID", email)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWorkspaceClient;

    fn fast() -> TransferPolicy {
        TransferPolicy {
            interval: Duration::ZERO,
            ..TransferPolicy::default()
        }
    }

    async fn client() -> MockWorkspaceClient {
        MockWorkspaceClient::new()
            .with_users(vec![
                json!({"primaryEmail": "old@example.com", "id": "111"}),
                json!({"primaryEmail": "new@example.com", "id": "222"}),
            ])
            .await
    }

    #[test]
    fn test_transfer_body() {
        let body = transfer_body("111", "222");
        assert_eq!(body["oldOwnerUserId"], "111");
        assert_eq!(body["newOwnerUserId"], "222");
        assert_eq!(
            body["applicationDataTransfers"][0]["applicationId"],
            55656082996_i64
        );
        assert_eq!(
            body["applicationDataTransfers"][0]["applicationTransferParams"][0]["value"],
            json!(["PRIVATE", "SHARED"])
        );
    }

    #[tokio::test]
    async fn test_completes_after_polling() {
        let client = client()
            .await
            .with_transfer_statuses(&["new", "inProgress", "completed"])
            .await;

        let outcome = transfer_documents(
            &client,
            "old@example.com",
            "new@example.com",
            fast(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, TransferOutcome::Completed);
        assert_eq!(client.call_counts().await.get_transfer, 2);
    }

    #[tokio::test]
    async fn test_running_long() {
        let client = client()
            .await
            .with_transfer_statuses(&["inProgress"])
            .await;

        let outcome = transfer_documents(
            &client,
            "old@example.com",
            "new@example.com",
            fast(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, TransferOutcome::RunningLong);
        assert_eq!(client.call_counts().await.get_transfer, 5);
    }

    #[tokio::test]
    async fn test_submission_retries() {
        let client = client().await.with_transfer_failures(2).await;

        let outcome = transfer_documents(
            &client,
            "old@example.com",
            "new@example.com",
            fast(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, TransferOutcome::Completed);
        assert_eq!(client.call_counts().await.insert_transfer, 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let client = client().await.with_transfer_failures(10).await;

        let result = transfer_documents(
            &client,
            "old@example.com",
            "new@example.com",
            fast(),
            &ProgressBar::hidden(),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(client.call_counts().await.insert_transfer, 5);
    }

    #[tokio::test]
    async fn test_failed_status_is_an_error() {
        let client = client().await.with_transfer_statuses(&["failed"]).await;

        let err = transfer_documents(
            &client,
            "old@example.com",
            "new@example.com",
            fast(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("transfer failed (status: failed)"));
        assert_eq!(client.call_counts().await.insert_transfer, 5);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let client = client().await;
        let err = transfer_documents(
            &client,
            "ghost@example.com",
            "new@example.com",
            fast(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unable to get ID for ghost@example.com"));
    }
}
