mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "confirm")]
#[command(about = "Validate, migrate and document configuration files against a schema")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a configuration file against a schema
    Validate {
        /// Path to the schema file
        schema: PathBuf,

        /// Path to the configuration file
        config: PathBuf,

        /// Show typo suggestions even when warnings are hidden
        #[arg(short, long)]
        typos: bool,

        /// Show warnings
        #[arg(short, long)]
        warnings: bool,

        /// Show informational messages
        #[arg(short, long)]
        infos: bool,

        /// Report deprecated sections and options as errors
        #[arg(short, long)]
        deprecation: bool,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Migrate a configuration file to a schema
    Migrate {
        /// Path to the schema file
        schema: PathBuf,

        /// Path to the configuration file
        config: PathBuf,
    },

    /// Generate a configuration template from a schema
    Generate {
        /// Path to the schema file
        schema: PathBuf,

        /// Include every option from the schema
        #[arg(short, long)]
        all: bool,
    },

    /// Generate reStructuredText documentation from a schema
    Document {
        /// Path to the schema file
        schema: PathBuf,
    },

    /// Initialize a schema from an existing configuration file
    Init {
        /// Path to the configuration file
        config: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CONFIRM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate {
            schema,
            config,
            typos,
            warnings,
            infos,
            deprecation,
            json,
        } => commands::validate::run(
            &schema,
            &config,
            commands::validate::Flags {
                typos,
                warnings,
                infos,
                deprecation,
                json,
            },
        ),
        Command::Migrate { schema, config } => commands::migrate::run(&schema, &config),
        Command::Generate { schema, all } => commands::generate::run(&schema, all),
        Command::Document { schema } => commands::document::run(&schema),
        Command::Init { config } => commands::init::run(&config),
    }
}
