//! Audit log export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use clap::ValueEnum;
use log::info;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::client::{ActivityQuery, ReportsApi};
use crate::credentials::validate_credential_path;
use crate::error::{Error, Result, ResultExt};
use crate::models::ActivityRow;
use crate::output::{self, Data, OutputOptions};
use crate::validation::{sanitize_input, validate_email};

/// Applications the Reports API exposes activities for
pub const APPLICATIONS: &[&str] = &[
    "admin",
    "login",
    "drive",
    "calendar",
    "groups",
    "mobile",
    "token",
    "groups_enterprise",
    "saml",
    "chrome",
    "gcp",
    "chat",
    "meet",
];

/// Default export window
const DEFAULT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Full activity records
    #[default]
    Json,
    /// Key fields only
    Csv,
}

/// Everything `audit export` was asked for
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub app: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub user: Option<String>,
    pub event_names: Vec<String>,
    pub actor_ip: Option<String>,
    pub max_results: Option<usize>,
    pub format: ExportFormat,
    pub output_file: Option<PathBuf>,
}

fn parse_time(value: &str, flag: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            Error::Validation(format!(
                "invalid {} format (expected RFC 3339): {}",
                flag, e
            ))
        })
}

/// Resolve the export window against `now`.
///
/// The end defaults to now and the start to 24 hours before the end.
pub fn time_range(
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(String, String)> {
    let end = match end {
        Some(end) => parse_time(end, "end-time")?,
        None => now,
    };
    let start = match start {
        Some(start) => parse_time(start, "start-time")?,
        None => end - Duration::hours(DEFAULT_WINDOW_HOURS),
    };
    if end < start {
        return Err(Error::Validation(
            "end-time must be after start-time".to_string(),
        ));
    }
    Ok((
        start.to_rfc3339_opts(SecondsFormat::Secs, true),
        end.to_rfc3339_opts(SecondsFormat::Secs, true),
    ))
}

impl ExportRequest {
    /// Validate the request and turn it into a Reports API query
    pub fn to_query(&self, now: DateTime<Utc>) -> Result<ActivityQuery> {
        let app = self.app.trim().to_lowercase();
        if !APPLICATIONS.contains(&app.as_str()) {
            return Err(Error::Validation(format!(
                "invalid application type: {} (valid: {})",
                app,
                APPLICATIONS.join(", ")
            )));
        }

        let (start, end) = time_range(
            self.start_time.as_deref(),
            self.end_time.as_deref(),
            now,
        )?;

        let mut query = ActivityQuery::new(app);
        if let Some(ref user) = self.user {
            let user = sanitize_input(user);
            validate_email(&user)?;
            query.user_key = user;
        }
        query.start_time = Some(start);
        query.end_time = Some(end);
        query.event_names = self.event_names.iter().map(|e| sanitize_input(e)).collect();
        query.actor_ip = self.actor_ip.as_deref().map(sanitize_input);
        query.max_results = self.max_results.filter(|max| *max > 0);
        Ok(query)
    }
}

/// Run the audit export command
pub async fn export(opts: &GlobalOptions, request: &ExportRequest) -> Result<()> {
    let query = request.to_query(Utc::now())?;
    if let Some(ref path) = request.output_file {
        validate_credential_path(path)?;
    }
    let ctx = CommandContext::new(opts).await?;

    info!(
        "Exporting {} audit logs from {} to {}",
        query.application,
        query.start_time.as_deref().unwrap_or_default(),
        query.end_time.as_deref().unwrap_or_default()
    );
    let activities = fetch_activities(ctx.client.as_ref(), &query).await?;

    match request.output_file {
        Some(ref path) => {
            let file = File::create(path)
                .context(format!("Unable to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_export(&mut writer, &activities, request.format)?;
            writer.flush()?;
            output::message(
                ctx.output(),
                format!("Exported {} activities to {}", activities.len(), path.display()),
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_export(&mut handle, &activities, request.format)?;
        }
    }
    Ok(())
}

pub async fn fetch_activities<C>(client: &C, query: &ActivityQuery) -> Result<Vec<Value>>
where
    C: ReportsApi + ?Sized,
{
    client
        .list_activities(query)
        .await
        .context(format!("Unable to list {} activities", query.application))
}

/// Full JSON records, or the key-field CSV with a header row
pub fn write_export<W: Write>(w: &mut W, activities: &[Value], format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut *w, activities)?;
            writeln!(w)?;
        }
        ExportFormat::Csv => {
            let rows: Vec<ActivityRow> = activities.iter().map(ActivityRow::from).collect();
            let options = OutputOptions {
                format: OutputFormat::Csv,
                quiet: false,
            };
            output::write_output(w, Some(Data::Many(&rows)), ActivityRow::HEADERS, &options)?;
        }
    }
    Ok(())
}
