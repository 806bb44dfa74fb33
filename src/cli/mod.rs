//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod alias;
pub mod args;
pub mod audit;
pub mod cache;
pub mod cal_resource;
pub mod calendar;
pub mod config;
pub mod context;
pub mod group;
pub mod group_settings;
pub mod ou;
pub mod transfer;
pub mod user;

pub use args::{GlobalOptions, LogLevel, OutputFormat};
pub use context::CommandContext;

use crate::client::OrgUnitListType;

/// gac - Google Workspace administration from the command line
#[derive(Parser, Debug)]
#[command(name = "gac")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default is ~/.google-admin.yaml)
    #[arg(long, global = true, env = "GAC_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// File containing the OAuth2 client secret JSON
    #[arg(long, global = true, env = "GAC_CLIENT_SECRET", hide_env = true)]
    pub client_secret: Option<String>,

    /// File containing the OAuth2 token cache
    #[arg(long, global = true, env = "GAC_CACHE_FILE", hide_env = true)]
    pub cache_file: Option<String>,

    /// Domain for email addresses (e.g. example.com)
    #[arg(long, global = true, env = "GAC_DOMAIN", hide_env = true)]
    pub domain: Option<String>,

    /// Output format: json, yaml, csv, table, plain (default: plain)
    #[arg(
        long,
        global = true,
        env = "GAC_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Quiet mode - minimal output suitable for scripting
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log level (debug, info, warn, error)
    #[arg(
        long,
        global = true,
        env = "GAC_LOG_LEVEL",
        hide_env = true,
        default_value = "warn"
    )]
    pub log_level: LogLevel,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub json_log: bool,

    /// Skip all confirmations for destructive operations (use with caution)
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Bypass cache, fetch fresh data from API
    #[arg(long, global = true, env = "GAC_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Response cache TTL (e.g. 15m, 1h)
    #[arg(long, global = true, env = "GAC_CACHE_TTL", hide_env = true)]
    pub cache_ttl: Option<String>,

    /// Response cache directory (default ~/.cache/gac)
    #[arg(long, global = true, env = "GAC_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<String>,

    /// API base URL override (development/testing)
    #[arg(long, global = true, env = "GAC_API_HOST", hide = true)]
    pub api_host: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage user accounts
    #[command(subcommand)]
    User(UserCommands),

    /// List groups and audit their membership
    #[command(subcommand)]
    Group(GroupCommands),

    /// View and change group settings
    #[command(subcommand)]
    GroupSettings(GroupSettingsCommands),

    /// Manage organizational units
    #[command(subcommand)]
    Ou(OuCommands),

    /// Manage user email aliases
    #[command(subcommand)]
    Alias(AliasCommands),

    /// Manage calendar resources (rooms, equipment)
    #[command(subcommand)]
    CalResource(CalResourceCommands),

    /// List and edit calendar events
    #[command(subcommand)]
    Calendar(CalendarCommands),

    /// Export audit logs from the Reports API
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Transfer Drive documents from one user to another
    #[command(after_help = "EXAMPLES:\n  \
            gac transfer --from leaver@example.com --to manager@example.com")]
    Transfer {
        /// Source email address
        #[arg(long, short = 'f')]
        from: String,

        /// Destination email address
        #[arg(long, short = 't')]
        to: String,
    },

    /// Manage local response cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Validate or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(after_help = "\
Static completions (subcommands/flags only):
  bash:   gac completion bash > /etc/bash_completion.d/gac
  zsh:    gac completion zsh > \"${fpath[1]}/_gac\"
  fish:   gac completion fish > ~/.config/fish/completions/gac.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version {
        /// Show version number only
        #[arg(long, short = 's')]
        short: bool,
    },
}

/// User management subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users, or show one user in full
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            gac user list                            # All users\n  \
            gac user list --disabled-only            # Users in the former employees OU\n  \
            gac user list ada@example.com            # Full record for one user\n  \
            gac user list --format csv > users.csv"
    )]
    List {
        /// User email; shows the full record
        email: Option<String>,

        /// List only accounts in the former employees OU
        #[arg(long, short = 'd')]
        disabled_only: bool,
    },

    /// Create a user with a random initial password
    #[command(after_help = "EXAMPLES:\n  \
            gac user create ada@example.com -f Ada -l Lovelace\n  \
            gac user create ada@example.com -f Ada -l Lovelace -e ada@home.net -g eng,all-staff")]
    Create {
        /// Primary email of the new account
        email: String,

        #[command(flatten)]
        fields: user::CreateArgs,
    },

    /// Update a user; with no field flags the JSON patch is read from stdin
    #[command(after_help = "EXAMPLES:\n  \
            gac user update ada@example.com --title CTO --dept Engineering\n  \
            gac user update ada@example.com --phone 'work:+1 555 0100;mobile:+1 555 0101'\n  \
            gac user update ada@example.com --remove --force\n  \
            echo '{\"suspended\": false}' | gac user update ada@example.com")]
    Update {
        /// User email
        email: String,

        #[command(flatten)]
        fields: user::UpdateArgs,
    },

    /// Suspend a user account
    Suspend {
        email: String,

        /// Reason for suspension
        #[arg(long, short = 'r')]
        reason: Option<String>,

        /// Confirm the operation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Restore a suspended user account
    Unsuspend {
        email: String,

        /// Confirm the operation
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Group subcommands
#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Audit all groups, or show one group
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            gac group list                           # Audit every group\n  \
            gac group list --former-employees-only   # Groups with former employees\n  \
            gac group list eng --members             # Members of eng@<domain>"
    )]
    List {
        /// Group name or email
        group: Option<String>,

        /// List the group members
        #[arg(long, short = 'm')]
        members: bool,

        /// Show only groups containing former employees
        #[arg(long, short = 'i')]
        former_employees_only: bool,
    },
}

/// Group settings subcommands
#[derive(Subcommand, Debug)]
pub enum GroupSettingsCommands {
    /// Show the settings of a group
    List {
        /// Group name or email
        group: String,
    },

    /// Change selected settings of a group
    #[command(after_help = "EXAMPLES:\n  \
            gac group-settings update eng --who-can-join INVITED_CAN_JOIN\n  \
            gac group-settings update eng --allow-external-members false --archive-only true")]
    Update {
        /// Group name or email
        group: String,

        #[command(flatten)]
        settings: group_settings::SettingsArgs,
    },
}

/// Organizational unit subcommands
#[derive(Subcommand, Debug)]
pub enum OuCommands {
    /// List organizational units
    #[command(visible_alias = "ls")]
    List {
        /// Parent OU path (default: root)
        path: Option<String>,

        /// all descendants, or immediate children only
        #[arg(long = "type", short = 't', value_enum, default_value = "all")]
        list_type: OrgUnitListType,
    },

    /// Create an organizational unit
    #[command(after_help = "EXAMPLES:\n  \
            gac ou create /Engineering --description \"Engineering department\"\n  \
            gac ou create /Engineering/Backend\n  \
            gac ou create /Contractors --block-inheritance")]
    Create {
        /// Full OU path, e.g. /Engineering/Backend
        path: String,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Parent OU path (derived from the path if not given)
        #[arg(long, short = 'p')]
        parent: Option<String>,

        /// Block policy inheritance from the parent
        #[arg(long, short = 'b')]
        block_inheritance: bool,
    },

    /// Update an organizational unit
    Update {
        /// OU path
        path: String,

        /// New name
        #[arg(long, short = 'n')]
        name: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New parent OU path
        #[arg(long, short = 'p')]
        parent: Option<String>,

        /// Block policy inheritance (true/false)
        #[arg(long, short = 'b')]
        block_inheritance: Option<bool>,
    },

    /// Delete an empty organizational unit
    Delete {
        /// OU path
        path: String,

        /// Confirm the deletion
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Alias subcommands
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// List aliases of a user
    #[command(visible_alias = "ls")]
    List { email: String },

    /// Add an alias to a user
    Add { email: String, alias: String },

    /// Remove an alias from a user
    Remove {
        email: String,
        alias: String,

        /// Confirm the removal
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Calendar resource subcommands
#[derive(Subcommand, Debug)]
pub enum CalResourceCommands {
    /// List calendar resources
    #[command(visible_alias = "ls")]
    List {
        /// Resource type filter
        #[arg(long = "type", short = 't', value_enum, default_value = "all")]
        resource_type: cal_resource::TypeFilter,
    },

    /// Create a calendar resource
    #[command(after_help = "EXAMPLES:\n  \
            gac cal-resource create room-101 --name \"Room 101\" --capacity 8 --building-id hq")]
    Create {
        /// Resource ID
        id: String,

        #[arg(long, short = 'n')]
        name: String,

        #[arg(long = "type", short = 't', value_enum, default_value = "room")]
        resource_type: cal_resource::ResourceKind,

        #[command(flatten)]
        fields: cal_resource::ResourceArgs,
    },

    /// Update a calendar resource
    Update {
        /// Resource ID
        id: String,

        #[arg(long, short = 'n')]
        name: Option<String>,

        #[command(flatten)]
        fields: cal_resource::ResourceArgs,
    },

    /// Delete a calendar resource
    Delete {
        /// Resource ID
        id: String,

        /// Confirm the deletion
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Calendar event subcommands
#[derive(Subcommand, Debug)]
pub enum CalendarCommands {
    /// List upcoming events
    #[command(visible_alias = "ls")]
    List {
        /// Calendar ID
        #[arg(long, default_value = "primary")]
        calendar: String,

        /// Number of events
        #[arg(long, short = 'n', default_value_t = 10)]
        num_events: u32,

        /// Lower bound (RFC 3339) for event end time
        #[arg(long)]
        time_min: Option<String>,

        /// Upper bound (RFC 3339) for event start time
        #[arg(long)]
        time_max: Option<String>,
    },

    /// Create an event
    #[command(after_help = "EXAMPLES:\n  \
            gac calendar create -s Standup -b 2025-03-03T09:00:00Z -e 2025-03-03T09:15:00Z -c 5\n  \
            gac calendar create -s Offsite -b 2025-03-10 -e 2025-03-11    # All-day event")]
    Create {
        /// Calendar ID
        #[arg(long, default_value = "primary")]
        calendar: String,

        #[command(flatten)]
        event: calendar::EventArgs,
    },

    /// Update an event
    Update {
        /// Calendar ID
        #[arg(long, default_value = "primary")]
        calendar: String,

        /// ID of the event to update
        #[arg(long, short = 'i')]
        event_id: String,

        #[command(flatten)]
        event: calendar::EventArgs,
    },
}

/// Audit log subcommands
#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// Export activity records for one application
    #[command(after_help = "EXAMPLES:\n  \
            gac audit export --app login                                 # Last 24 hours\n  \
            gac audit export --app drive --user ada@example.com -o csv\n  \
            gac audit export --app admin --start-time 2025-01-01T00:00:00Z -f admin.json")]
    Export {
        /// Application (admin, login, drive, calendar, groups, mobile, token, ...)
        #[arg(long)]
        app: String,

        /// Start time, RFC 3339 (default: 24 hours before end)
        #[arg(long)]
        start_time: Option<String>,

        /// End time, RFC 3339 (default: now)
        #[arg(long)]
        end_time: Option<String>,

        /// Filter by user email
        #[arg(long)]
        user: Option<String>,

        /// Filter by event name (repeatable)
        #[arg(long = "event-name")]
        event_names: Vec<String>,

        /// Filter by actor IP address
        #[arg(long)]
        actor_ip: Option<String>,

        /// Maximum number of activities (default: all)
        #[arg(long)]
        max_results: Option<usize>,

        /// Export format
        #[arg(long, short = 'o', value_enum, default_value = "json")]
        output: audit::ExportFormat,

        /// Write to a file instead of stdout
        #[arg(long, short = 'f')]
        output_file: Option<PathBuf>,
    },
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Clear cached responses
    #[command(after_help = "EXAMPLES:\n  \
            gac cache clear            # Everything\n  \
            gac cache clear users      # Only user listings")]
    Clear {
        /// Resource type: users, groups, orgunits, resources, all
        resource_type: Option<String>,

        /// Clear all cache entries
        #[arg(long)]
        all: bool,
    },

    /// Print the cache directory
    Path,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Check the configuration and credential files
    Validate,

    /// Write a starter configuration file (records --domain when given)
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },
}
