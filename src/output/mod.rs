//! Output formatting for CLI results
//!
//! One entry point, [`write_output`], presents a single record or a list of
//! records in any of the five output formats. Options travel with the call;
//! there is no process-wide output state.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::io::Write;

use crate::cli::OutputFormat;
use crate::error::{FormatError, Result};

pub mod formatters;
pub mod record;
pub mod table;

pub use record::{Fields, Record, cell_text, resolve_row};

/// Notice printed for absent data outside quiet mode
pub const NO_DATA: &str = "No data to display";

/// Output settings for one invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Suppress headers and informational messages
    pub quiet: bool,
}

/// A single record or a homogeneous list of records
pub enum Data<'a, T> {
    One(&'a T),
    Many(&'a [T]),
}

impl<T> Clone for Data<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Data<'_, T> {}

impl<'a, T> Data<'a, T> {
    fn records(self) -> Vec<&'a T> {
        match self {
            Data::One(record) => vec![record],
            Data::Many(records) => records.iter().collect(),
        }
    }
}

impl<T: Serialize> Serialize for Data<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Data::One(record) => record.serialize(serializer),
            Data::Many(records) => records.serialize(serializer),
        }
    }
}

/// Write `data` to `w` in the selected format.
///
/// `headers` select and order the columns for csv and table output; json,
/// yaml and plain ignore them.
pub fn write_output<W: Write, T: Record>(
    w: &mut W,
    data: Option<Data<'_, T>>,
    headers: &[&str],
    options: &OutputOptions,
) -> std::result::Result<(), FormatError> {
    let Some(data) = data else {
        if !options.quiet {
            writeln!(w, "{}", NO_DATA)?;
        }
        return Ok(());
    };

    match options.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *w, &data)?;
            writeln!(w)?;
        }
        OutputFormat::Yaml => serde_yaml::to_writer(&mut *w, &data)?,
        OutputFormat::Csv => write_csv(w, data, headers, options.quiet)?,
        OutputFormat::Table => {
            let rows = rows(data, headers)?;
            let headers = if options.quiet { &[][..] } else { headers };
            if let Some(table) = table::render_table(headers, rows) {
                writeln!(w, "{}", table)?;
            }
        }
        OutputFormat::Plain => write_plain(w, data)?,
    }
    Ok(())
}

fn rows<T: Record>(
    data: Data<'_, T>,
    headers: &[&str],
) -> std::result::Result<Vec<Vec<String>>, FormatError> {
    data.records()
        .into_iter()
        .map(|record| Ok(resolve_row(&record.fields()?, headers)))
        .collect()
}

fn write_csv<W: Write, T: Record>(
    w: &mut W,
    data: Data<'_, T>,
    headers: &[&str],
    quiet: bool,
) -> std::result::Result<(), FormatError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(w);

    if !quiet && !headers.is_empty() {
        writer.write_record(headers)?;
    }
    for row in rows(data, headers)? {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_plain<W: Write, T: Record>(
    w: &mut W,
    data: Data<'_, T>,
) -> std::result::Result<(), FormatError> {
    for record in data.records() {
        match record.fields()? {
            Fields::Named(pairs) => {
                for (name, value) in pairs {
                    writeln!(w, "{}: {}", name, value)?;
                }
            }
            Fields::Scalar(text) => writeln!(w, "{}", text)?,
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Print one record to stdout
pub fn print_one<T: Record>(record: &T, headers: &[&str], options: &OutputOptions) -> Result<()> {
    print(Some(Data::One(record)), headers, options)
}

/// Print a list of records to stdout
pub fn print_many<T: Record>(
    records: &[T],
    headers: &[&str],
    options: &OutputOptions,
) -> Result<()> {
    print(Some(Data::Many(records)), headers, options)
}

/// Write a listing: full API records for json and yaml, display rows otherwise
pub fn write_listing<W: Write, T: Record>(
    w: &mut W,
    records: &[Value],
    rows: &[T],
    headers: &[&str],
    options: &OutputOptions,
) -> std::result::Result<(), FormatError> {
    match options.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            write_output(w, Some(Data::Many(records)), &[], options)
        }
        _ => write_output(w, Some(Data::Many(rows)), headers, options),
    }
}

/// Print a listing to stdout; see [`write_listing`]
pub fn print_listing<T: Record>(
    records: &[Value],
    rows: &[T],
    headers: &[&str],
    options: &OutputOptions,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_listing(&mut handle, records, rows, headers, options)?;
    handle.flush().map_err(FormatError::from)?;
    Ok(())
}

/// Format and print data to stdout
pub fn print<T: Record>(
    data: Option<Data<'_, T>>,
    headers: &[&str],
    options: &OutputOptions,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_output(&mut handle, data, headers, options)?;
    handle.flush().map_err(FormatError::from)?;
    Ok(())
}

/// Print an informational line unless quiet
pub fn message(options: &OutputOptions, text: impl std::fmt::Display) {
    if !options.quiet {
        println!("{}", text);
    }
}
