//! gac - Google Workspace administration from the command line

use clap::{CommandFactory, Parser};

mod cache;
mod cli;
mod client;
mod config;
mod credentials;
mod error;
mod logging;
mod models;
mod output;
mod validation;

use cli::{
    AliasCommands, AuditCommands, CacheCommands, CalResourceCommands, CalendarCommands, Cli,
    Commands, ConfigCommands, GlobalOptions, GroupCommands, GroupSettingsCommands, OuCommands,
    UserCommands,
};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_level, cli.json_log);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        let hints = err.hints();
        if !hints.is_empty() {
            eprintln!("\nCommon reasons for failure:");
            for hint in hints {
                eprintln!("  - {}", hint);
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::User(cmd) => match cmd {
            UserCommands::List {
                email,
                disabled_only,
            } => cli::user::list(&opts, email.as_deref(), disabled_only).await,
            UserCommands::Create { email, fields } => {
                cli::user::create(&opts, &email, &fields).await
            }
            UserCommands::Update { email, fields } => {
                cli::user::update(&opts, &email, &fields).await
            }
            UserCommands::Suspend {
                email,
                reason,
                force,
            } => cli::user::suspend(&opts, &email, reason.as_deref(), force).await,
            UserCommands::Unsuspend { email, force } => {
                cli::user::unsuspend(&opts, &email, force).await
            }
        },
        Commands::Group(cmd) => match cmd {
            GroupCommands::List {
                group,
                members,
                former_employees_only,
            } => cli::group::list(&opts, group.as_deref(), members, former_employees_only).await,
        },
        Commands::GroupSettings(cmd) => match cmd {
            GroupSettingsCommands::List { group } => cli::group_settings::list(&opts, &group).await,
            GroupSettingsCommands::Update { group, settings } => {
                cli::group_settings::update(&opts, &group, &settings).await
            }
        },
        Commands::Ou(cmd) => match cmd {
            OuCommands::List { path, list_type } => {
                cli::ou::list(&opts, path.as_deref(), list_type).await
            }
            OuCommands::Create {
                path,
                description,
                parent,
                block_inheritance,
            } => {
                cli::ou::create(
                    &opts,
                    &path,
                    description.as_deref(),
                    parent.as_deref(),
                    block_inheritance,
                )
                .await
            }
            OuCommands::Update {
                path,
                name,
                description,
                parent,
                block_inheritance,
            } => {
                let changes = cli::ou::OrgUnitChanges {
                    name,
                    description,
                    parent,
                    block_inheritance,
                };
                cli::ou::update(&opts, &path, &changes).await
            }
            OuCommands::Delete { path, force } => cli::ou::delete(&opts, &path, force).await,
        },
        Commands::Alias(cmd) => match cmd {
            AliasCommands::List { email } => cli::alias::list(&opts, &email).await,
            AliasCommands::Add { email, alias } => cli::alias::add(&opts, &email, &alias).await,
            AliasCommands::Remove {
                email,
                alias,
                force,
            } => cli::alias::remove(&opts, &email, &alias, force).await,
        },
        Commands::CalResource(cmd) => match cmd {
            CalResourceCommands::List { resource_type } => {
                cli::cal_resource::list(&opts, resource_type).await
            }
            CalResourceCommands::Create {
                id,
                name,
                resource_type,
                fields,
            } => cli::cal_resource::create(&opts, &id, &name, resource_type, &fields).await,
            CalResourceCommands::Update { id, name, fields } => {
                cli::cal_resource::update(&opts, &id, name.as_deref(), &fields).await
            }
            CalResourceCommands::Delete { id, force } => {
                cli::cal_resource::delete(&opts, &id, force).await
            }
        },
        Commands::Calendar(cmd) => match cmd {
            CalendarCommands::List {
                calendar,
                num_events,
                time_min,
                time_max,
            } => {
                cli::calendar::list(
                    &opts,
                    &calendar,
                    num_events,
                    time_min.as_deref(),
                    time_max.as_deref(),
                )
                .await
            }
            CalendarCommands::Create { calendar, event } => {
                cli::calendar::create(&opts, &calendar, &event).await
            }
            CalendarCommands::Update {
                calendar,
                event_id,
                event,
            } => cli::calendar::update(&opts, &calendar, &event_id, &event).await,
        },
        Commands::Audit(cmd) => match cmd {
            AuditCommands::Export {
                app,
                start_time,
                end_time,
                user,
                event_names,
                actor_ip,
                max_results,
                output,
                output_file,
            } => {
                let request = cli::audit::ExportRequest {
                    app,
                    start_time,
                    end_time,
                    user,
                    event_names,
                    actor_ip,
                    max_results,
                    format: output,
                    output_file,
                };
                cli::audit::export(&opts, &request).await
            }
        },
        Commands::Transfer { from, to } => cli::transfer::run(&opts, &from, &to).await,
        Commands::Cache(cmd) => match cmd {
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear { resource_type, all } => {
                cli::cache::clear(&opts, resource_type.as_deref(), all)
            }
            CacheCommands::Path => cli::cache::path(&opts),
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Validate => cli::config::validate(&opts),
            ConfigCommands::Init { force } => cli::config::init(&opts, force),
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "gac", &mut std::io::stdout());
            Ok(())
        }
        Commands::Version { short } => {
            if short {
                println!("{}", env!("CARGO_PKG_VERSION"));
            } else {
                println!("gac {}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        }
    }
}
