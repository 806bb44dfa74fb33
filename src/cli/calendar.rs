//! Calendar event commands

use chrono::{DateTime, NaiveDate};
use clap::{Args, ValueEnum};
use log::debug;
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::client::{CalendarApi, EventQuery};
use crate::error::{Error, Result, ResultExt};
use crate::models::EventRow;
use crate::output::{self, OutputOptions};
use crate::validation::{sanitize_input, validate_email};

/// Length of a bare `YYYY-MM-DD` date; anything longer is a timestamp
const DATE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    fn rrule_name(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        }
    }
}

/// Event fields shared by create and update
#[derive(Debug, Clone, Args)]
pub struct EventArgs {
    /// Event title
    #[arg(long, short = 's')]
    pub summary: Option<String>,

    /// Start: RFC 3339 timestamp, or YYYY-MM-DD for an all-day event
    #[arg(long, short = 'b')]
    pub begin: Option<String>,

    /// End, in the same form as --begin
    #[arg(long, short = 'e')]
    pub end: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Attendee email (repeatable or comma-separated)
    #[arg(long = "attendee", short = 'a', value_delimiter = ',')]
    pub attendees: Vec<String>,

    /// Number of occurrences
    #[arg(long, short = 'c', default_value_t = 1)]
    pub count: u32,

    /// Recurrence frequency
    #[arg(long, short = 'f', value_enum, default_value_t = Frequency::Daily)]
    pub frequency: Frequency,
}

impl Default for EventArgs {
    fn default() -> Self {
        Self {
            summary: None,
            begin: None,
            end: None,
            description: None,
            location: None,
            attendees: Vec::new(),
            count: 1,
            frequency: Frequency::Daily,
        }
    }
}

/// `{"date": ..}` for a bare date, `{"dateTime": ..}` otherwise
fn event_time(value: &str) -> Result<Value> {
    let value = value.trim();
    if value.len() > DATE_LEN {
        DateTime::parse_from_rfc3339(value).map_err(|e| {
            Error::Validation(format!("invalid RFC 3339 timestamp '{}': {}", value, e))
        })?;
        Ok(json!({ "dateTime": value }))
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|e| Error::Validation(format!("invalid date '{}': {}", value, e)))?;
        Ok(json!({ "date": value }))
    }
}

fn check_order(begin: &str, end: &str) -> Result<()> {
    let before = match (
        DateTime::parse_from_rfc3339(begin.trim()),
        DateTime::parse_from_rfc3339(end.trim()),
    ) {
        (Ok(b), Ok(e)) => e < b,
        _ => match (
            NaiveDate::parse_from_str(begin.trim(), "%Y-%m-%d"),
            NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d"),
        ) {
            (Ok(b), Ok(e)) => e < b,
            _ => false,
        },
    };
    if before {
        return Err(Error::Validation(format!(
            "event end {} is before its start {}",
            end, begin
        )));
    }
    Ok(())
}

impl EventArgs {
    /// Event body from the given flags.
    ///
    /// With `require_core` the summary, begin and end must all be present.
    pub fn to_event(&self, require_core: bool) -> Result<Value> {
        if require_core && (self.summary.is_none() || self.begin.is_none() || self.end.is_none()) {
            return Err(Error::Validation(
                "--summary, --begin and --end required".to_string(),
            ));
        }

        let mut event = Map::new();
        if let Some(ref summary) = self.summary {
            event.insert("summary".into(), json!(sanitize_input(summary)));
        }
        if let Some(ref begin) = self.begin {
            event.insert("start".into(), event_time(begin)?);
        }
        if let Some(ref end) = self.end {
            event.insert("end".into(), event_time(end)?);
        }
        if let (Some(begin), Some(end)) = (&self.begin, &self.end) {
            check_order(begin, end)?;
        }
        if let Some(ref description) = self.description {
            event.insert("description".into(), json!(sanitize_input(description)));
        }
        if let Some(ref location) = self.location {
            event.insert("location".into(), json!(sanitize_input(location)));
        }

        if !self.attendees.is_empty() {
            let mut attendees = Vec::with_capacity(self.attendees.len());
            for attendee in &self.attendees {
                let email = sanitize_input(attendee);
                validate_email(&email)
                    .map_err(|e| Error::Validation(format!("attendee: {}", e)))?;
                attendees.push(json!({ "email": email }));
            }
            event.insert("attendees".into(), Value::Array(attendees));
        }

        if self.count == 0 {
            return Err(Error::Validation("--count must be at least 1".to_string()));
        }
        if self.count != 1 {
            event.insert(
                "recurrence".into(),
                json!([format!(
                    "RRULE:FREQ={};COUNT={}",
                    self.frequency.rrule_name(),
                    self.count
                )]),
            );
        }
        Ok(Value::Object(event))
    }
}

/// Run the calendar list command
pub async fn list(
    opts: &GlobalOptions,
    calendar: &str,
    max_results: u32,
    time_min: Option<&str>,
    time_max: Option<&str>,
) -> Result<()> {
    for bound in [time_min, time_max].into_iter().flatten() {
        DateTime::parse_from_rfc3339(bound).map_err(|e| {
            Error::Validation(format!("invalid RFC 3339 timestamp '{}': {}", bound, e))
        })?;
    }

    let ctx = CommandContext::new(opts).await?;
    let query = EventQuery {
        calendar_id: calendar.to_string(),
        max_results,
        time_min: time_min.map(str::to_string),
        time_max: time_max.map(str::to_string),
    };

    let events = ctx
        .client
        .list_events(&query)
        .await
        .context(format!("Unable to list events for {}", calendar))?;
    debug!("Fetched {} events from {}", events.len(), calendar);

    let out = ctx.output();
    match out.format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_many(&events, &[], out),
        _ if events.is_empty() => {
            output::message(out, "No upcoming events found.");
            Ok(())
        }
        _ => {
            let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
            output::print_many(&rows, EventRow::HEADERS, out)
        }
    }
}

/// Run the calendar create command
pub async fn create(opts: &GlobalOptions, calendar: &str, args: &EventArgs) -> Result<()> {
    let event = args.to_event(true)?;
    let ctx = CommandContext::new(opts).await?;

    let created = ctx
        .client
        .insert_event(calendar, &event)
        .await
        .context(format!("Unable to create event in {}", calendar))?;
    report(&event, &created, ctx.output())
}

/// Run the calendar update command
pub async fn update(
    opts: &GlobalOptions,
    calendar: &str,
    event_id: &str,
    args: &EventArgs,
) -> Result<()> {
    let patch = args.to_event(false)?;
    if patch.as_object().is_some_and(Map::is_empty) {
        return Err(Error::Validation(
            "No update fields specified. Use --summary, --begin, --end, --description, --location, --attendee or --count"
                .to_string(),
        ));
    }
    let ctx = CommandContext::new(opts).await?;

    let updated = ctx
        .client
        .patch_event(calendar, event_id, &patch)
        .await
        .context(format!("Unable to update event {}", event_id))?;
    report(&patch, &updated, ctx.output())
}

/// Sent body, then the event link; non-text formats print the API response
fn report(sent: &Value, returned: &Value, out: &OutputOptions) -> Result<()> {
    match out.format {
        OutputFormat::Plain | OutputFormat::Table => {
            if !out.quiet {
                println!("{}", serde_json::to_string_pretty(sent)?);
            }
            let link = returned
                .get("htmlLink")
                .and_then(Value::as_str)
                .unwrap_or_default();
            println!("event URL: {}", link);
            Ok(())
        }
        _ => output::print_one(returned, &[], out),
    }
}
