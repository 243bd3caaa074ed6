//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{
    CommandEnv, ResolveArgs, SettingsAction, run_config_show, run_config_validate, run_resolve,
    run_settings,
};
use error::CliError;
use format::{OutputArgs, OutputMode};
use output::CliOutput;
use quick_links_app::ButtonPatch;
use quick_links_domain::{LabelType, ScopeKey};
use quick_links_infra::LogFormat;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "qlinks",
    version,
    about = "Quick links panel configuration CLI",
    long_about = None
)]
struct Cli {
    /// Config file path (JSON/TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON object merged over the config file.
    #[arg(long, global = true)]
    overrides_json: Option<String>,

    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the quick links for one record.
    Resolve {
        /// Portal id (defaults to `portalId` from config).
        #[arg(long)]
        portal: Option<String>,
        /// CRM object type, e.g. CONTACT or COMPANY.
        #[arg(long)]
        object_type: Option<String>,
        /// Record id.
        #[arg(long)]
        record_id: Option<String>,
        /// JSON file of property values; forces the static property source.
        #[arg(long)]
        properties: Option<PathBuf>,
    },
    /// Inspect and edit stored settings.
    Settings {
        /// Portal id (defaults to `portalId` from config).
        #[arg(long, global = true)]
        portal: Option<String>,
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCommands {
    /// Show the migrated settings.
    Show {
        /// Limit output to one scope.
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
    /// Report how the stored document migrates.
    Migrate {
        /// Write the canonical document back to the store.
        #[arg(long)]
        write: bool,
    },
    /// Replace all settings with the built-in defaults.
    Reset,
    /// Append an unconfigured button.
    Add {
        #[arg(long, value_enum)]
        scope: ScopeArg,
    },
    /// Remove a button.
    Remove {
        #[arg(long, value_enum)]
        scope: ScopeArg,
        /// Button position, starting at 1.
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        position: u16,
    },
    /// Change fields of a button.
    Update {
        #[arg(long, value_enum)]
        scope: ScopeArg,
        /// Button position, starting at 1.
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        position: u16,
        #[arg(long)]
        url_property: Option<String>,
        #[arg(long, value_enum)]
        label_type: Option<LabelTypeArg>,
        #[arg(long)]
        label_property: Option<String>,
        #[arg(long)]
        static_label: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config with secrets redacted.
    Show,
    /// Validate the effective config.
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    Contact,
    Company,
}

impl From<ScopeArg> for ScopeKey {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Contact => Self::Contact,
            ScopeArg::Company => Self::Company,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LabelTypeArg {
    Property,
    Static,
}

impl From<LabelTypeArg> for LabelType {
    fn from(label_type: LabelTypeArg) -> Self {
        match label_type {
            LabelTypeArg::Property => Self::Property,
            LabelTypeArg::Static => Self::Static,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.output.log_json);

    let env = CommandEnv {
        mode: OutputMode::from_args(&cli.output),
        config_path: cli.config.clone(),
        overrides_json: cli.overrides_json.clone(),
        log_format: if cli.output.log_json {
            LogFormat::Json
        } else {
            LogFormat::Tracing
        },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => return exit_with_error(&CliError::Io(error)),
    };

    match runtime.block_on(run(cli.command, &env)) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

/// `QL_LOG` wins over `RUST_LOG`; the default keeps stderr quiet.
fn init_tracing(json: bool) {
    let filter = std::env::var("QL_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

async fn run(command: Commands, env: &CommandEnv) -> Result<CliOutput, CliError> {
    tracing::debug!(format = ?env.mode.format, config = ?env.config_path, "dispatching command");
    match command {
        Commands::Resolve {
            portal,
            object_type,
            record_id,
            properties,
        } => {
            run_resolve(
                env,
                ResolveArgs {
                    portal: portal.as_deref(),
                    object_type: object_type.as_deref(),
                    record_id: record_id.as_deref(),
                    properties: properties.as_deref(),
                },
            )
            .await
        },
        Commands::Settings { portal, command } => {
            run_settings(env, portal.as_deref(), settings_action(command)).await
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => run_config_show(env),
            ConfigCommands::Validate => run_config_validate(env),
        },
    }
}

fn settings_action(command: SettingsCommands) -> SettingsAction {
    match command {
        SettingsCommands::Show { scope } => SettingsAction::Show {
            scope: scope.map(ScopeKey::from),
        },
        SettingsCommands::Migrate { write } => SettingsAction::Migrate { write },
        SettingsCommands::Reset => SettingsAction::Reset,
        SettingsCommands::Add { scope } => SettingsAction::Add {
            scope: scope.into(),
        },
        SettingsCommands::Remove { scope, position } => SettingsAction::Remove {
            scope: scope.into(),
            position: usize::from(position),
        },
        SettingsCommands::Update {
            scope,
            position,
            url_property,
            label_type,
            label_property,
            static_label,
        } => SettingsAction::Update {
            scope: scope.into(),
            position: usize::from(position),
            patch: ButtonPatch {
                url_property,
                label_type: label_type.map(LabelType::from),
                label_property,
                static_label,
            },
        },
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
