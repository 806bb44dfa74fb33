//! Configuration file commands

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::{Config, Settings};
use crate::credentials::{
    ClientSecret, PermissionCheck, check_file_permissions, validate_credential_path,
};
use crate::error::{Error, Result};

/// One line of the validation report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Pass(String),
    Warning(String),
    Failure(String),
    Info(String),
}

/// Findings grouped under a heading
#[derive(Debug, Clone)]
pub struct Section {
    pub title: &'static str,
    pub findings: Vec<Finding>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            findings: Vec::new(),
        }
    }

    fn pass(&mut self, text: impl Into<String>) {
        self.findings.push(Finding::Pass(text.into()));
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.findings.push(Finding::Warning(text.into()));
    }

    fn fail(&mut self, text: impl Into<String>) {
        self.findings.push(Finding::Failure(text.into()));
    }

    fn info(&mut self, text: impl Into<String>) {
        self.findings.push(Finding::Info(text.into()));
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub sections: Vec<Section>,
}

impl ValidationReport {
    fn count(&self, pred: fn(&Finding) -> bool) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.findings.iter())
            .filter(|f| pred(f))
            .count()
    }

    pub fn errors(&self) -> usize {
        self.count(|f| matches!(f, Finding::Failure(_)))
    }

    pub fn warnings(&self) -> usize {
        self.count(|f| matches!(f, Finding::Warning(_)))
    }
}

/// Which credential file a check is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialKind {
    ClientSecret,
    Token,
}

/// Run the config validate command
pub fn validate(opts: &GlobalOptions) -> Result<()> {
    let report = check(opts, |name| std::env::var(name).ok());
    print_report(&report);

    match report.errors() {
        0 => Ok(()),
        n => Err(Error::Other(format!(
            "configuration validation found {} error(s)",
            n
        ))),
    }
}

/// Check the config file, domain and both credential files
pub fn check(opts: &GlobalOptions, env: impl Fn(&str) -> Option<String>) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut file = Section::new("📄 Configuration File");
    let loaded = match Config::load_at(opts.config.as_deref()) {
        Ok((config, path)) => {
            if path.exists() {
                file.pass(format!("Config file found: {}", path.display()));
            } else {
                file.info(format!(
                    "No config file at {} (using defaults)",
                    path.display()
                ));
            }
            Some((config, path))
        }
        Err(e) => {
            file.fail(e.to_string());
            None
        }
    };

    let settings = loaded.and_then(|(config, path)| {
        match Settings::from_parts(config, path, opts, &env) {
            Ok(settings) => Some(settings),
            Err(e) => {
                file.fail(e.to_string());
                None
            }
        }
    });
    report.sections.push(file);

    let Some(settings) = settings else {
        return report;
    };

    let mut domain = Section::new("🌐 Domain Configuration");
    match settings.domain.as_deref() {
        Some(d) if d.contains('.') => domain.pass(format!("Domain: {}", d)),
        Some(d) => domain.warn(format!("Domain '{}' does not look like a domain name", d)),
        None => domain.warn("No domain configured; set `domain` or pass --domain"),
    }
    report.sections.push(domain);

    report.sections.push(check_credential(
        "🔐 Client Secret File",
        &settings.client_secret,
        CredentialKind::ClientSecret,
    ));
    report.sections.push(check_credential(
        "💾 Token Cache File",
        &settings.token_file,
        CredentialKind::Token,
    ));

    report
}

fn check_credential(title: &'static str, path: &Path, kind: CredentialKind) -> Section {
    let mut section = Section::new(title);
    section.info(format!("Path: {}", path.display()));

    if let Err(e) = validate_credential_path(path) {
        section.fail(e.to_string());
        return section;
    }
    section.pass("Path is in an allowed location");

    if !path.exists() {
        match kind {
            CredentialKind::ClientSecret => section.fail("File does not exist"),
            CredentialKind::Token => {
                section.warn("File does not exist; authorize to create the token")
            }
        }
        return section;
    }
    section.pass("File exists");

    match check_file_permissions(path) {
        PermissionCheck::Secure => section.pass("Permissions are owner-only"),
        PermissionCheck::GroupReadable(mode) | PermissionCheck::WorldReadable(mode) => {
            section.warn(format!(
                "Permissions {:o} are too open; run `chmod 600 {}`",
                mode,
                path.display()
            ))
        }
        PermissionCheck::Missing => section.fail("File could not be read"),
    }

    match kind {
        CredentialKind::ClientSecret => match ClientSecret::load(path) {
            Ok(secret) => section.pass(format!("Valid client secret (client {})", secret.client_id)),
            Err(e) => section.fail(e.to_string()),
        },
        CredentialKind::Token => match std::fs::read_to_string(path) {
            Ok(contents) => match token_shape(&contents) {
                Ok(()) => section.pass("Token file contains JSON"),
                Err(reason) => section.fail(reason),
            },
            Err(e) => section.fail(format!("Unable to read file: {}", e)),
        },
    }
    section
}

/// Token files hold one JSON object
fn token_shape(contents: &str) -> std::result::Result<(), String> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err("Token file is empty".to_string());
    }
    if !trimmed.starts_with('{') {
        return Err("Token file does not contain a JSON object".to_string());
    }
    serde_json::from_str::<serde_json::Value>(trimmed)
        .map(|_| ())
        .map_err(|e| format!("Token file is not valid JSON: {}", e))
}

fn print_report(report: &ValidationReport) {
    println!("{}\n", "gac Configuration Validation".bold());

    for section in &report.sections {
        println!("{}", section.title.bold());
        for finding in &section.findings {
            match finding {
                Finding::Pass(text) => println!("  {} {}", "✓".green(), text),
                Finding::Warning(text) => println!("  {} {}", "⚠".yellow(), text),
                Finding::Failure(text) => println!("  {} {}", "✗".red(), text),
                Finding::Info(text) => println!("  {} {}", "ℹ".cyan(), text.dimmed()),
            }
        }
        println!();
    }

    println!("{}", "📊 Validation Summary".bold());
    let (errors, warnings) = (report.errors(), report.warnings());
    if errors > 0 {
        println!(
            "  {} Configuration has {} error(s) and {} warning(s)",
            "✗".red(),
            errors,
            warnings
        );
    } else if warnings > 0 {
        println!(
            "  {} Configuration is valid but has warnings ({})",
            "⚠".yellow(),
            warnings
        );
    } else {
        println!(
            "  {} Configuration is valid with no errors or warnings",
            "✓".green()
        );
    }
}

/// Run the config init command
pub fn init(opts: &GlobalOptions, force: bool) -> Result<()> {
    let path = match opts.config {
        Some(ref path) => path.clone(),
        None => Config::default_path()?,
    };
    let written = write_starter(&path, opts.domain.clone(), force)?;

    println!("{} Configuration saved to {}", "✓".green(), written.display());
    if opts.domain.is_none() {
        println!(
            "  → Add your domain with {} or edit the file",
            "gac --domain example.com config init --force".cyan()
        );
    }
    Ok(())
}

/// Write the starter config, refusing to replace an existing file unless forced
pub fn write_starter(path: &Path, domain: Option<String>, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(Error::Validation(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }
    Config::starter(domain).save_to(path)?;
    Ok(path.to_path_buf())
}
